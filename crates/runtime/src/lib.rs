//! Battle synchronization engine for the tactical client.
//!
//! The server decides everything; this crate keeps the client's picture of
//! the battle consistent with it while requests, polls and replays overlap.
//!
//! Modules are organized by responsibility:
//! - [`reconciler`] owns the local actor table and its animation state
//! - [`turn`] runs the turn/phase state machine, end-turn and AI polling
//! - [`interaction`] turns clicks into move/attack/ability requests
//! - [`replay`] plays back AI actions in order, with pacing
//! - [`events`] provides the topic-based event bus presentation listens to
//! - [`session`] assembles all of the above around one request channel
pub mod api;
pub mod config;
pub mod events;
pub mod interaction;
pub mod reconciler;
pub mod replay;
pub mod session;
pub mod turn;

mod animator;
mod request;

pub use animator::Animator;
pub use api::{ActorView, BattleError, HeadlessView, Result, StatusDisplay, VisualHandle};
pub use config::{MotionConfig, SessionConfig};
pub use events::{
    DamageIndicator, Event, EventBus, MessageLevel, NarrationEvent, PresentationEvent, Tone,
    Topic, TurnEvent,
};
pub use interaction::{ClickOutcome, InteractionMode, InteractionRouter, RejectReason, prettify};
pub use reconciler::{
    HealthBar, LocalActor, ReconcileReport, Reconciler, RenderPosition, SyncTicket,
};
pub use replay::{ReplaySequencer, ReplaySummary};
pub use session::BattleSession;
pub use turn::TurnCoordinator;
