//! Top-level client wiring a battle session to a frontend.
//!
//! ```text
//! Client
//!   ├─→ BattleSession (request channel, reconciler, turns, router, replay)
//!   └─→ Frontend (console today; anything implementing `Frontend`)
//! ```
mod builder;

pub mod logging;

pub use builder::ClientBuilder;

// Re-export Frontend trait from client-frontend-core
pub use client_frontend_core::Frontend;

use anyhow::Result;
use battle_runtime::BattleSession;

pub struct Client {
    session: BattleSession,
    frontend: Box<dyn Frontend>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn session(&self) -> &BattleSession {
        &self.session
    }

    /// Hands the session to the frontend and blocks until the user quits.
    ///
    /// A battle left mid-turn is not ended on the server; the next client to
    /// connect picks it up from `/battle/state`.
    pub async fn run(self) -> Result<()> {
        let mut frontend = self.frontend;
        let state = self.session.turns().state();
        tracing::info!(phase = %state.phase, "handing control to frontend");

        let result = frontend.run(self.session).await;

        match &result {
            Ok(()) => tracing::info!("frontend exited"),
            Err(err) => tracing::error!("frontend error: {err:#}"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use battle_runtime::{HeadlessView, SessionConfig};
    use client_transport::MockChannel;

    use super::*;

    struct Probe(Arc<AtomicBool>);

    #[async_trait]
    impl Frontend for Probe {
        async fn run(&mut self, session: BattleSession) -> Result<()> {
            assert_eq!(session.config().local_actor, "P1");
            self.0.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn session() -> BattleSession {
        let view = Arc::new(HeadlessView::default());
        BattleSession::new(
            Arc::new(MockChannel::new()),
            view.clone(),
            view,
            SessionConfig::default(),
        )
    }

    #[tokio::test]
    async fn run_hands_session_to_frontend() {
        let ran = Arc::new(AtomicBool::new(false));
        let client = Client::builder()
            .session(session())
            .frontend(Probe(ran.clone()))
            .build()
            .unwrap();

        client.run().await.unwrap();

        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn build_requires_frontend() {
        let err = Client::builder().session(session()).build().err().unwrap();
        assert!(err.to_string().contains("Frontend is required"));
    }
}
