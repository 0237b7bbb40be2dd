//! Transport error taxonomy.

/// Failure of a single attempt, as classified by a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
    /// Network-level failure; worth retrying.
    #[error("connection error: {0}")]
    Connection(String),

    /// The server answered and rejected the request.
    #[error("protocol error ({status}): {message}")]
    Protocol { status: u16, message: String },

    /// The server answered 2xx but the body was not usable JSON.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Final outcome of a failed channel call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("connection failed after {attempts} attempts: {message}")]
    Connection { attempts: u32, message: String },

    #[error("{message}")]
    Protocol { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl NetworkError {
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }
}
