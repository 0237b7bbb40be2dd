//! Turn ownership and battle phase.
//!
//! The server reports *who* holds the turn (`current_turn`) and, separately,
//! whether the battle has ended (`battle_state`). The client folds both into a
//! single [`TurnState`] whose phase is derived relative to the locally
//! controlled actor.
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ids::ActorId;

/// Battle phase as seen from the local player's side of the table.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
pub enum BattlePhase {
    /// No battle running (free roam).
    #[default]
    Inactive,
    PlayerTurn,
    OpponentTurn,
    Victory,
    Defeat,
}

impl BattlePhase {
    /// Victory and Defeat never transition again.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }

    /// Whether the local player may issue a move right now.
    ///
    /// Free roam (no battle) counts as allowed; the server decides whether
    /// the move itself is legal.
    pub const fn allows_local_action(self) -> bool {
        matches!(self, Self::Inactive | Self::PlayerTurn)
    }
}

/// Terminal marker carried by `battle_state`.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

impl BattleOutcome {
    /// Parses a `battle_state` marker. `None`, `"Ongoing"` and any unknown
    /// value mean the battle continues.
    pub fn from_marker(marker: Option<&str>) -> Option<Self> {
        let marker = marker?.trim();
        match Self::from_str(marker) {
            Ok(outcome) => Some(outcome),
            Err(_) => {
                if !marker.is_empty() && !marker.eq_ignore_ascii_case("ongoing") {
                    tracing::debug!(marker, "unrecognized battle_state marker, treating as ongoing");
                }
                None
            }
        }
    }

    pub const fn phase(self) -> BattlePhase {
        match self {
            Self::Victory => BattlePhase::Victory,
            Self::Defeat => BattlePhase::Defeat,
        }
    }
}

/// Result of folding a server response into [`TurnState`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnTransition {
    /// Nothing observable changed.
    Unchanged,
    /// Turn owner or phase changed; the epoch was bumped.
    Advanced { from: BattlePhase, to: BattlePhase },
    /// A terminal marker arrived; the epoch was bumped.
    Ended(BattleOutcome),
    /// The battle was already over; the response was discarded.
    AlreadyOver,
}

impl TurnTransition {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Advanced { .. } | Self::Ended(_))
    }
}

/// Current turn identity plus phase.
///
/// `epoch` increases on every transition. Callers capture it to make
/// once-per-turn decisions and to recognise responses that belong to a turn
/// that has already passed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnState {
    pub current_turn: Option<ActorId>,
    pub phase: BattlePhase,
    pub epoch: u64,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn is_turn_of(&self, actor: &ActorId) -> bool {
        self.current_turn.as_ref() == Some(actor)
    }

    /// Folds a `current_turn` / `battle_state` pair into the state.
    pub fn apply(
        &mut self,
        current_turn: Option<&ActorId>,
        outcome: Option<BattleOutcome>,
        local_actor: &ActorId,
    ) -> TurnTransition {
        self.transition(current_turn, outcome, local_actor, false)
    }

    /// Like [`apply`](Self::apply) but always opens a new epoch, even when the
    /// same actor keeps the turn. Used after a successful end-turn.
    pub fn apply_new_turn(
        &mut self,
        current_turn: Option<&ActorId>,
        outcome: Option<BattleOutcome>,
        local_actor: &ActorId,
    ) -> TurnTransition {
        self.transition(current_turn, outcome, local_actor, true)
    }

    /// Applies only a terminal marker (action responses carry no turn owner).
    pub fn apply_outcome(&mut self, outcome: Option<BattleOutcome>) -> TurnTransition {
        if self.is_terminal() {
            return TurnTransition::AlreadyOver;
        }
        match outcome {
            Some(outcome) => self.end(outcome),
            None => TurnTransition::Unchanged,
        }
    }

    fn transition(
        &mut self,
        current_turn: Option<&ActorId>,
        outcome: Option<BattleOutcome>,
        local_actor: &ActorId,
        force_new_turn: bool,
    ) -> TurnTransition {
        if self.is_terminal() {
            return TurnTransition::AlreadyOver;
        }
        if let Some(outcome) = outcome {
            return self.end(outcome);
        }

        let current_turn = current_turn.filter(|id| !id.is_empty()).cloned();
        let phase = match &current_turn {
            None => BattlePhase::Inactive,
            Some(id) if id == local_actor => BattlePhase::PlayerTurn,
            Some(_) => BattlePhase::OpponentTurn,
        };

        if !force_new_turn && current_turn == self.current_turn && phase == self.phase {
            return TurnTransition::Unchanged;
        }

        let from = self.phase;
        self.current_turn = current_turn;
        self.phase = phase;
        self.epoch += 1;
        TurnTransition::Advanced { from, to: phase }
    }

    fn end(&mut self, outcome: BattleOutcome) -> TurnTransition {
        self.current_turn = None;
        self.phase = outcome.phase();
        self.epoch += 1;
        TurnTransition::Ended(outcome)
    }
}
