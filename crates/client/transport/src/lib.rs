//! Request channel between the battle client and the game server.
//!
//! This is the only place the client touches the network.
//!
//! # Architecture
//!
//! ```text
//! RequestChannel (trait, what callers use)
//!   └── RetryingChannel<T>   bounded retry on connection failures
//!         └── Transport      one attempt, classifies the outcome
//!               └── HttpTransport (reqwest)
//! ```
//!
//! Protocol errors (the server answered with a non-2xx status) are surfaced
//! immediately and never retried: a rejected action does not become valid by
//! repetition.

pub mod channel;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod mock;

pub use channel::{RequestChannel, RetryPolicy, RetryingChannel, Transport};
pub use endpoint::{Endpoint, Method};
pub use error::{AttemptError, NetworkError};
pub use http::{HttpChannel, HttpConfig, HttpTransport};
pub use mock::{MockChannel, RecordedCall};
