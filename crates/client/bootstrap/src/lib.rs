//! Shared bootstrap utilities for client front-ends.
//!
//! Provides configuration loading and session assembly that can be reused by
//! the console client or any other front-end crate.
pub mod builder;
pub mod config;

pub use builder::{SessionBuilder, SessionSetup};
pub use config::ClientConfig;
