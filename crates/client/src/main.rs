//! Battle client binary.
//!
//! Composition root: loads `.env`, sets up file logging, builds the HTTP
//! session and runs the console frontend until the user quits.
use std::sync::Arc;

use anyhow::Result;
use battle_client::{Client, logging};
use client_bootstrap::{ClientConfig, SessionBuilder};
use client_frontend_cli::{CliConfig, CliFrontend, FrontendConfig};
use client_frontend_core::StatusPanel;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // 1. Load configuration from environment
    let client_config = ClientConfig::from_env();
    let frontend_config = FrontendConfig::from_env();
    let cli_config = CliConfig::from_env();

    // 2. Setup logging
    let session_id = client_config.session_id();
    let (_log_guard, log_file) = logging::setup_logging(&client_config.log_dir(), &session_id)?;
    println!("battle client, logging to {}", log_file.display());

    tracing::info!("Starting battle client");
    tracing::info!(server = %client_config.http.base_url, actor = %client_config.session.local_actor);

    // 3. Build the session; the status panel is shared with the frontend
    let status = Arc::new(StatusPanel::new());
    let setup = SessionBuilder::new(client_config)
        .status(status.clone())
        .event_buffer(frontend_config.channels.event_buffer)
        .build()?;

    // 4. Build frontend and client
    let frontend = CliFrontend::new(frontend_config, cli_config, status);
    let client = Client::builder()
        .session(setup.session)
        .frontend(frontend)
        .build()?;

    client.run().await?;

    tracing::info!("Client shutdown complete");
    Ok(())
}
