//! Trait describing a runnable client front-end.
use anyhow::Result;
use async_trait::async_trait;
use battle_runtime::BattleSession;

/// Frontend abstraction for UI layers.
///
/// Frontends talk to the battle through a [`BattleSession`]:
/// - subscribe to the narration, presentation and turn topics
/// - forward clicks to the interaction router
/// - ask the turn coordinator to start the battle or end the turn
///
/// The session is built by the bootstrap layer; a frontend only borrows its
/// components and never constructs channels itself.
#[async_trait]
pub trait Frontend: Send {
    /// Run the frontend event loop until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the frontend encounters a fatal I/O error.
    async fn run(&mut self, session: BattleSession) -> Result<()>;
}
