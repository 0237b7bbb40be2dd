//! Shared battle types for the tactical client.
//!
//! The backend is authoritative for every rule, so this crate holds no game
//! logic. It describes:
//! - identifiers and grid cells ([`ActorId`], [`Position`])
//! - the per-sync entity snapshot ([`EntitySnapshot`])
//! - turn ownership and battle phase ([`TurnState`], [`BattlePhase`])
//! - replayable AI actions ([`ActionEvent`], [`ActionKind`])
//! - request bodies and response envelopes ([`protocol`])
//!
//! Decoding is lenient on purpose at the edges: missing optional fields take
//! defaults and unknown action tags become [`ActionKind::Unknown`].
pub mod event;
pub mod ids;
pub mod protocol;
pub mod snapshot;
pub mod turn;

pub use event::{ActionEvent, ActionKind};
pub use ids::{ActorId, Position};
pub use protocol::{
    AbilityRequest, ActionResponse, ActionResult, AttackRequest, BattleStartResponse,
    BattleStateResponse, EndTurnResponse, EntityListResponse, Mechanics, MoveRequest, Narrative,
    SkillDef, SkillListResponse,
};
pub use snapshot::{EntitySnapshot, Team, VisualTags};
pub use turn::{BattleOutcome, BattlePhase, TurnState, TurnTransition};
