//! Typed calls over the untyped request channel.
use client_transport::{Endpoint, RequestChannel};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{BattleError, Result};

/// Sends `body` to `endpoint` and decodes the reply.
///
/// An empty (`null`) reply decodes as `{}` so envelopes made only of
/// optional fields still succeed.
pub(crate) async fn fetch<T: DeserializeOwned>(
    channel: &dyn RequestChannel,
    endpoint: Endpoint,
    body: Option<Value>,
) -> Result<T> {
    let value = channel.request(endpoint, body).await?;
    let value = if value.is_null() {
        Value::Object(Default::default())
    } else {
        value
    };
    serde_json::from_value(value).map_err(|err| BattleError::malformed(endpoint, err))
}

pub(crate) fn encode<T: Serialize>(endpoint: Endpoint, request: &T) -> Result<Value> {
    serde_json::to_value(request).map_err(|err| BattleError::malformed(endpoint, err))
}

pub(crate) fn empty_body() -> Option<Value> {
    Some(Value::Object(Default::default()))
}
