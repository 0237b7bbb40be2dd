//! Client builder with dependency injection pattern.
use anyhow::{Context, Result};
use battle_runtime::BattleSession;

use crate::{Client, Frontend};

/// Builder for constructing a [`Client`].
///
/// Both the session and the frontend are required; `build` fails fast when
/// either is missing.
#[derive(Default)]
pub struct ClientBuilder {
    session: Option<BattleSession>,
    frontend: Option<Box<dyn Frontend>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the battle session (required).
    ///
    /// Usually assembled by `SessionBuilder` from the `client-bootstrap` crate.
    pub fn session(mut self, session: BattleSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the frontend (required).
    pub fn frontend(mut self, frontend: impl Frontend + 'static) -> Self {
        self.frontend = Some(Box::new(frontend));
        self
    }

    pub fn build(self) -> Result<Client> {
        let session = self
            .session
            .context("Session is required. Use .session() to set it.")?;

        let frontend = self
            .frontend
            .context("Frontend is required. Use .frontend() to set it.")?;

        Ok(Client { session, frontend })
    }
}
