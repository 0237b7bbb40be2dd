//! Session tuning knobs.
//!
//! Defaults mirror the live client: one-second polling, half-second replay
//! pauses, five cells per second token movement.
use std::time::Duration;

use battle_core::ActorId;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Actor driven by this client.
    pub local_actor: ActorId,
    /// Ability id routed to the attack endpoint instead of the ability one.
    pub basic_ability_id: String,
    /// Auto end-turn fires when the local actor's AP drops below this.
    pub min_action_points: i32,
    /// Delay between polls while the opponent holds the turn.
    pub poll_interval: Duration,
    /// Pause around each replayed attack/wait step.
    pub replay_pause: Duration,
    /// Upper bound on waiting for a replayed move to arrive.
    pub move_timeout: Duration,
    pub motion: MotionConfig,
    pub event_buffer_size: usize,
}

impl SessionConfig {
    pub const DEFAULT_LOCAL_ACTOR: &'static str = "P1";
    pub const DEFAULT_BASIC_ABILITY: &'static str = "Physical";

    pub fn for_actor(local_actor: impl Into<ActorId>) -> Self {
        Self {
            local_actor: local_actor.into(),
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            local_actor: ActorId::from(Self::DEFAULT_LOCAL_ACTOR),
            basic_ability_id: Self::DEFAULT_BASIC_ABILITY.to_string(),
            min_action_points: 1,
            poll_interval: Duration::from_secs(1),
            replay_pause: Duration::from_millis(500),
            move_timeout: Duration::from_secs(2),
            motion: MotionConfig::default(),
            event_buffer_size: 100,
        }
    }
}

/// Visual interpolation parameters used by the reconciler's `advance`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionConfig {
    /// Cells per second.
    pub move_speed: f32,
    /// Distance under which a moving actor snaps onto its target cell.
    pub arrive_threshold: f32,
    /// Health bar fill change per second.
    pub health_ease_rate: f32,
    /// Animation tick.
    pub frame_interval: Duration,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            arrive_threshold: 0.01,
            health_ease_rate: 2.0,
            frame_interval: Duration::from_millis(16),
        }
    }
}
