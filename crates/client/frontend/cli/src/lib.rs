//! Line-based console frontend for the battle client.
//!
//! Reads commands from stdin (`click 3 4`, `target Gravity__Crush`, `end`,
//! ...), forwards them to the session and prints narration as it arrives.
//! The frontend never owns the session; the binary builds it and hands it in.
mod app;
mod command;
mod config;
mod presentation;

pub use app::CliFrontend;
pub use command::{Command, CommandError};
pub use config::{CliConfig, UiConfig};

// Re-export for convenience (used in main.rs)
pub use client_frontend_core::FrontendConfig;
