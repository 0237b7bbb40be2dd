//! reqwest-backed [`Transport`].
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::channel::{RetryPolicy, RetryingChannel, Transport};
use crate::endpoint::{Endpoint, Method};
use crate::error::AttemptError;

/// Production channel: HTTP attempts wrapped in bounded retry.
pub type HttpChannel = RetryingChannel<HttpTransport>;

#[derive(Clone, Debug)]
pub struct HttpConfig {
    /// Server root, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Per-attempt timeout.
    pub timeout: Duration,
}

impl HttpConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8000";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

pub struct HttpTransport {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

impl HttpChannel {
    /// Builds the HTTP transport and wraps it with `policy`.
    pub fn http(config: HttpConfig, policy: RetryPolicy) -> Result<Self, reqwest::Error> {
        Ok(RetryingChannel::new(HttpTransport::new(config)?, policy))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn attempt(
        &self,
        method: Method,
        endpoint: Endpoint,
        body: Option<&Value>,
    ) -> Result<Value, AttemptError> {
        let url = self.url(endpoint);
        let empty = Value::Object(Default::default());

        let request = match method {
            Method::Get => self.http_client.get(&url),
            Method::Post => self.http_client.post(&url).json(body.unwrap_or(&empty)),
        };

        let response = request
            .send()
            .await
            .map_err(|err| AttemptError::Connection(err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| AttemptError::Connection(err.to_string()))?;

        tracing::debug!(%url, status = status.as_u16(), "response: {text}");

        if !status.is_success() {
            return Err(AttemptError::Protocol {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|err| AttemptError::Malformed(format!("{err} (body: {text})")))
    }
}

/// Server error text: the JSON `detail` field when present, else the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| match value.get("detail")? {
            Value::String(detail) => Some(detail.clone()),
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| body.trim().to_string())
}
