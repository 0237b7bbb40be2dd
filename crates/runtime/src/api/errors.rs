//! Error type surfaced by the battle runtime API.
//!
//! Local refusals (battle over, not our turn, end-turn already running) are
//! reported before anything reaches the network; transport failures are
//! wrapped unchanged.
use battle_core::BattlePhase;
use client_transport::{Endpoint, NetworkError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BattleError>;

#[derive(Debug, Error)]
pub enum BattleError {
    #[error("battle is over ({phase})")]
    BattleOver { phase: BattlePhase },

    #[error("not your turn ({phase})")]
    NotPlayerTurn { phase: BattlePhase },

    #[error("an end-turn request is already in flight")]
    EndTurnPending,

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("unexpected {endpoint} response: {reason}")]
    Malformed { endpoint: Endpoint, reason: String },
}

impl BattleError {
    pub(crate) fn malformed(endpoint: Endpoint, err: serde_json::Error) -> Self {
        Self::Malformed {
            endpoint,
            reason: err.to_string(),
        }
    }

    /// True for refusals decided locally without a request.
    pub fn is_local_refusal(&self) -> bool {
        matches!(
            self,
            Self::BattleOver { .. } | Self::NotPlayerTurn { .. } | Self::EndTurnPending
        )
    }
}
