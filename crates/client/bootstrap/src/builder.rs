//! Builds the request channel and battle session used by front-ends.
use std::sync::Arc;

use anyhow::{Context, Result};
use battle_runtime::{ActorView, BattleSession, HeadlessView, StatusDisplay};
use client_transport::{HttpChannel, RequestChannel};

use crate::config::ClientConfig;

/// Builder that assembles the channel, view collaborators and session.
///
/// Without overrides it talks HTTP to `config.http.base_url` and renders
/// nothing; front-ends plug in their own view and status panel.
pub struct SessionBuilder {
    config: ClientConfig,
    channel: Option<Arc<dyn RequestChannel>>,
    view: Arc<dyn ActorView>,
    status: Arc<dyn StatusDisplay>,
}

impl SessionBuilder {
    pub fn new(config: ClientConfig) -> Self {
        let headless = Arc::new(HeadlessView::default());
        Self {
            config,
            channel: None,
            view: Arc::clone(&headless) as Arc<dyn ActorView>,
            status: headless,
        }
    }

    /// Use a prebuilt channel instead of the HTTP one (tests, replays).
    pub fn channel(mut self, channel: Arc<dyn RequestChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn view(mut self, view: Arc<dyn ActorView>) -> Self {
        self.view = view;
        self
    }

    pub fn status(mut self, status: Arc<dyn StatusDisplay>) -> Self {
        self.status = status;
        self
    }

    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.config.session.event_buffer_size = capacity.max(1);
        self
    }

    pub fn build(self) -> Result<SessionSetup> {
        let channel = match self.channel {
            Some(channel) => channel,
            None => {
                let http = HttpChannel::http(self.config.http.clone(), self.config.retry)
                    .with_context(|| {
                        format!("failed to build HTTP client for {}", self.config.http.base_url)
                    })?;
                tracing::info!(
                    server = %self.config.http.base_url,
                    max_retries = self.config.retry.max_retries,
                    "HTTP channel ready"
                );
                Arc::new(http)
            }
        };

        let session = BattleSession::new(
            channel,
            self.view,
            self.status,
            self.config.session.clone(),
        );

        Ok(SessionSetup {
            config: self.config,
            session,
        })
    }
}

pub struct SessionSetup {
    pub config: ClientConfig,
    pub session: BattleSession,
}
