//! Request channel trait and the bounded-retry implementation.
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::endpoint::{Endpoint, Method};
use crate::error::{AttemptError, NetworkError};

// ============================================================================
// Traits
// ============================================================================

/// Performs exactly one request attempt and classifies its outcome.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn attempt(
        &self,
        method: Method,
        endpoint: Endpoint,
        body: Option<&Value>,
    ) -> Result<Value, AttemptError>;
}

/// Logical request channel used by the battle engine.
///
/// Stateless: calls may be in flight concurrently and no ordering is
/// guaranteed between independently issued calls. Callers that need ordering
/// must serialize themselves.
#[async_trait]
pub trait RequestChannel: Send + Sync {
    async fn send(
        &self,
        method: Method,
        endpoint: Endpoint,
        body: Option<Value>,
    ) -> Result<Value, NetworkError>;

    /// Sends a request with the endpoint's canonical verb.
    async fn request(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Value, NetworkError> {
        self.send(endpoint.method(), endpoint, body).await
    }
}

// ============================================================================
// Retry
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = `max_retries + 1`).
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: u32 = 5;
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RETRIES, Self::DEFAULT_DELAY)
    }
}

/// Wraps a [`Transport`] with bounded retry on connection failures.
pub struct RetryingChannel<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingChannel<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: Transport> RequestChannel for RetryingChannel<T> {
    async fn send(
        &self,
        method: Method,
        endpoint: Endpoint,
        body: Option<Value>,
    ) -> Result<Value, NetworkError> {
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            tracing::debug!(%method, path = endpoint.path(), attempts, "sending request");

            match self.transport.attempt(method, endpoint, body.as_ref()).await {
                Ok(payload) => return Ok(payload),
                Err(AttemptError::Connection(message)) => {
                    if attempts > self.policy.max_retries {
                        tracing::error!(
                            path = endpoint.path(),
                            attempts,
                            "connection failed after {attempts} attempts: {message}"
                        );
                        return Err(NetworkError::Connection { attempts, message });
                    }

                    tracing::warn!(
                        path = endpoint.path(),
                        "connection failed ({message}), retrying in {:?} ({attempts}/{})",
                        self.policy.delay,
                        self.policy.max_retries
                    );
                    tokio::time::sleep(self.policy.delay).await;
                }
                Err(AttemptError::Protocol { status, message }) => {
                    tracing::warn!(path = endpoint.path(), status, "request rejected: {message}");
                    return Err(NetworkError::Protocol { status, message });
                }
                Err(AttemptError::Malformed(reason)) => {
                    tracing::warn!(path = endpoint.path(), "malformed response: {reason}");
                    return Err(NetworkError::Malformed(reason));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use serde_json::json;

    use super::*;

    /// Replays scripted attempt outcomes; repeats the last one when exhausted.
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<Value, AttemptError>>>,
        fallback: Result<Value, AttemptError>,
        attempts: AtomicU32,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<Value, AttemptError>>, fallback: Result<Value, AttemptError>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback,
                attempts: AtomicU32::new(0),
            }
        }

        fn always(outcome: Result<Value, AttemptError>) -> Self {
            Self::new(Vec::new(), outcome)
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn attempt(
            &self,
            _method: Method,
            _endpoint: Endpoint,
            _body: Option<&Value>,
        ) -> Result<Value, AttemptError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| self.fallback.clone())
        }
    }

    fn refused() -> Result<Value, AttemptError> {
        Err(AttemptError::Connection("connection refused".into()))
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_exactly_five_retries() {
        let channel = RetryingChannel::new(ScriptedTransport::always(refused()), RetryPolicy::default());
        let started = tokio::time::Instant::now();

        let err = channel.request(Endpoint::Entities, None).await.unwrap_err();

        assert_eq!(
            err,
            NetworkError::Connection {
                attempts: 6,
                message: "connection refused".into()
            }
        );
        // One initial attempt plus five retries, one delay before each retry.
        assert_eq!(channel.transport().attempts(), 6);
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_when_connection_comes_back() {
        let transport = ScriptedTransport::new(
            vec![refused(), refused()],
            Ok(json!({"current_turn": "P1"})),
        );
        let channel = RetryingChannel::new(transport, RetryPolicy::default());

        let payload = channel.request(Endpoint::BattleState, None).await.unwrap();

        assert_eq!(payload["current_turn"], "P1");
        assert_eq!(channel.transport().attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn protocol_errors_are_not_retried() {
        let transport = ScriptedTransport::always(Err(AttemptError::Protocol {
            status: 400,
            message: "Not your turn".into(),
        }));
        let channel = RetryingChannel::new(transport, RetryPolicy::default());
        let started = tokio::time::Instant::now();

        let err = channel
            .request(Endpoint::Move, Some(json!({"actor_id": "P1", "target_pos": [1, 1]})))
            .await
            .unwrap_err();

        assert!(err.is_protocol());
        assert_eq!(err.to_string(), "Not your turn");
        assert_eq!(channel.transport().attempts(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retry_policy_fails_fast() {
        let channel = RetryingChannel::new(
            ScriptedTransport::always(refused()),
            RetryPolicy::new(0, Duration::from_secs(1)),
        );

        let err = channel.request(Endpoint::Entities, None).await.unwrap_err();

        assert!(matches!(err, NetworkError::Connection { attempts: 1, .. }));
    }
}
