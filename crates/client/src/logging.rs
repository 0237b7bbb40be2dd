//! File logging for the console client.
//!
//! Stdout belongs to the console, so tracing output only goes to
//! `<log_dir>/<session_id>/client.log`.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global subscriber. Keep the guard alive until exit or the
/// tail of the log is lost.
pub fn setup_logging(log_dir: &Path, session_id: &str) -> Result<(WorkerGuard, PathBuf)> {
    let session_log_dir = log_dir.join(session_id);
    std::fs::create_dir_all(&session_log_dir).with_context(|| {
        format!("failed to create log directory {}", session_log_dir.display())
    })?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "client.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    let log_file = session_log_dir.join("client.log");
    tracing::info!(session = session_id, "logging initialized");
    tracing::info!("log file: {}", log_file.display());

    Ok((guard, log_file))
}
