//! Scripted request channel for testing without a server.
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::channel::RequestChannel;
use crate::endpoint::{Endpoint, Method};
use crate::error::NetworkError;

/// A request as the mock received it.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub endpoint: Endpoint,
    pub body: Option<Value>,
}

#[derive(Default)]
struct MockState {
    queued: HashMap<Endpoint, VecDeque<Result<Value, NetworkError>>>,
    fallback: HashMap<Endpoint, Result<Value, NetworkError>>,
    latency: HashMap<Endpoint, Duration>,
    calls: Vec<RecordedCall>,
}

/// Mock channel answering from per-endpoint scripts.
///
/// Queued responses are consumed first; once a queue is empty the endpoint's
/// fallback (if any) answers every further call. An endpoint with neither
/// fails with a connection error.
#[derive(Clone, Default)]
pub struct MockChannel {
    state: Arc<Mutex<MockState>>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues one successful reply.
    pub fn respond(&self, endpoint: Endpoint, payload: Value) -> &Self {
        self.state()
            .queued
            .entry(endpoint)
            .or_default()
            .push_back(Ok(payload));
        self
    }

    /// Queues one failure.
    pub fn fail(&self, endpoint: Endpoint, error: NetworkError) -> &Self {
        self.state()
            .queued
            .entry(endpoint)
            .or_default()
            .push_back(Err(error));
        self
    }

    /// Reply used whenever the endpoint's queue is empty.
    pub fn respond_always(&self, endpoint: Endpoint, payload: Value) -> &Self {
        self.state().fallback.insert(endpoint, Ok(payload));
        self
    }

    /// Delays every reply from `endpoint`.
    pub fn with_latency(&self, endpoint: Endpoint, latency: Duration) -> &Self {
        self.state().latency.insert(endpoint, latency);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.endpoint == endpoint)
            .count()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.state().calls.iter().map(|call| call.endpoint).collect()
    }
}

#[async_trait]
impl RequestChannel for MockChannel {
    async fn send(
        &self,
        method: Method,
        endpoint: Endpoint,
        body: Option<Value>,
    ) -> Result<Value, NetworkError> {
        let (reply, latency) = {
            let mut guard = self.state();
            let state = &mut *guard;
            state.calls.push(RecordedCall {
                method,
                endpoint,
                body,
            });
            let queued = state
                .queued
                .get_mut(&endpoint)
                .and_then(VecDeque::pop_front);
            let reply = match queued {
                Some(reply) => reply,
                None => state.fallback.get(&endpoint).cloned().unwrap_or_else(|| {
                    Err(NetworkError::Connection {
                        attempts: 1,
                        message: format!("no scripted response for {endpoint}"),
                    })
                }),
            };
            (reply, state.latency.get(&endpoint).copied())
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        reply
    }
}
