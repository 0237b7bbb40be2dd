//! Routes grid clicks to move, attack and ability requests.
//!
//! The router keeps one piece of local state, the [`InteractionMode`]. A
//! targeting mode remembers the turn epoch it was entered in, so it lapses on
//! its own once that turn is over.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use battle_core::{
    AbilityRequest, ActionResponse, ActorId, AttackRequest, MoveRequest, Position,
};
use client_transport::{Endpoint, RequestChannel};

use crate::api::{BattleError, Result};
use crate::config::SessionConfig;
use crate::events::{DamageIndicator, EventBus, MessageLevel, PresentationEvent};
use crate::reconciler::Reconciler;
use crate::request::{encode, fetch};
use crate::turn::TurnCoordinator;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InteractionMode {
    #[default]
    Normal,
    /// Next click picks the target for `ability_id`.
    Targeting { ability_id: String, epoch: u64 },
}

impl InteractionMode {
    pub fn is_targeting(&self) -> bool {
        matches!(self, Self::Targeting { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum RejectReason {
    BattleOver,
    NotYourTurn,
}

/// What a click turned into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    Moved { to: Position },
    Attacked { target: ActorId },
    AbilityUsed { target: ActorId, ability_id: String },
    /// Targeting ended on an empty cell; nothing was sent.
    Cancelled,
    /// Refused locally; nothing was sent.
    Rejected(RejectReason),
    /// Sent, but the server refused or the request failed.
    Failed { message: String },
}

pub struct InteractionRouter {
    channel: Arc<dyn RequestChannel>,
    reconciler: Arc<Reconciler>,
    turns: Arc<TurnCoordinator>,
    bus: EventBus,
    local_actor: ActorId,
    basic_ability_id: String,
    mode: Mutex<InteractionMode>,
}

impl InteractionRouter {
    pub fn new(
        channel: Arc<dyn RequestChannel>,
        reconciler: Arc<Reconciler>,
        turns: Arc<TurnCoordinator>,
        bus: EventBus,
        config: &SessionConfig,
    ) -> Self {
        Self {
            channel,
            reconciler,
            turns,
            bus,
            local_actor: config.local_actor.clone(),
            basic_ability_id: config.basic_ability_id.clone(),
            mode: Mutex::new(InteractionMode::Normal),
        }
    }

    fn mode_slot(&self) -> MutexGuard<'_, InteractionMode> {
        self.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current mode; targeting from an earlier turn reads as `Normal`.
    pub fn mode(&self) -> InteractionMode {
        let mut mode = self.mode_slot();
        if let InteractionMode::Targeting { epoch, .. } = *mode
            && epoch != self.turns.epoch()
        {
            *mode = InteractionMode::Normal;
        }
        mode.clone()
    }

    /// Arms targeting for `ability_id`, replacing any previous mode.
    pub fn start_targeting(&self, ability_id: impl Into<String>) -> Result<()> {
        if let Err(err) = self.turns.ensure_can_act() {
            self.bus.narrate_at(MessageLevel::Warning, refusal_line(&err));
            return Err(err);
        }

        let ability_id = ability_id.into();
        self.bus
            .narrate(format!("Select a target for {}", prettify(&ability_id)));
        *self.mode_slot() = InteractionMode::Targeting {
            ability_id,
            epoch: self.turns.epoch(),
        };
        Ok(())
    }

    pub fn cancel_targeting(&self) {
        *self.mode_slot() = InteractionMode::Normal;
    }

    /// Turns a click on `cell` into at most one request.
    pub async fn resolve_click(&self, cell: Position) -> ClickOutcome {
        if self.turns.phase().is_terminal() {
            self.cancel_targeting();
            return ClickOutcome::Rejected(RejectReason::BattleOver);
        }

        // Any click leaves targeting mode, hit or miss.
        let mode = std::mem::take(&mut *self.mode_slot());
        let mode = match mode {
            InteractionMode::Targeting { epoch, .. } if epoch != self.turns.epoch() => {
                InteractionMode::Normal
            }
            mode => mode,
        };

        if !self.turns.can_act() {
            self.bus.narrate_at(MessageLevel::Warning, "Not your turn!");
            return ClickOutcome::Rejected(RejectReason::NotYourTurn);
        }

        match mode {
            InteractionMode::Targeting { ability_id, .. } => {
                let Some(target) = self.reconciler.actor_at(cell) else {
                    tracing::debug!(%cell, "targeting cancelled on empty cell");
                    self.bus.narrate("Targeting cancelled.");
                    return ClickOutcome::Cancelled;
                };
                if ability_id == self.basic_ability_id {
                    self.attack(target).await
                } else {
                    self.use_ability(target, ability_id).await
                }
            }
            InteractionMode::Normal => self.move_to(cell).await,
        }
    }

    async fn move_to(&self, cell: Position) -> ClickOutcome {
        let request = MoveRequest {
            actor_id: self.local_actor.clone(),
            target_pos: cell,
        };
        tracing::debug!(?request, "requesting move");

        match self.send(Endpoint::Move, &request).await {
            Ok(response) if response.is_success() => {
                if let Some(narrative) = response.narrative() {
                    self.bus.narrate(narrative);
                }
                self.turns.apply_outcome(response.outcome());
                self.refresh().await;
                ClickOutcome::Moved { to: cell }
            }
            Ok(response) => self.move_failed(response.failure_message()),
            Err(err) => self.move_failed(&err.to_string()),
        }
    }

    fn move_failed(&self, message: &str) -> ClickOutcome {
        tracing::warn!("move rejected: {message}");
        self.bus
            .narrate_at(MessageLevel::Warning, format!("Move Failed: {message}"));
        self.cue(&self.local_actor, "Blocked!");
        ClickOutcome::Failed {
            message: message.to_string(),
        }
    }

    async fn attack(&self, target: ActorId) -> ClickOutcome {
        let request = AttackRequest {
            actor_id: self.local_actor.clone(),
            target_id: target.clone(),
        };
        tracing::debug!(?request, "requesting attack");

        match self.send(Endpoint::Attack, &request).await {
            Ok(response) if response.is_success() => {
                self.land_hit(&target, &response).await;
                ClickOutcome::Attacked { target }
            }
            Ok(response) => {
                let message = response.failure_message();
                self.bus
                    .narrate_at(MessageLevel::Warning, format!("Attack Failed: {message}"));
                ClickOutcome::Failed {
                    message: message.to_string(),
                }
            }
            Err(err) => {
                tracing::warn!(%err, "attack request failed");
                self.bus
                    .narrate_at(MessageLevel::Error, format!("Attack Error: {err}"));
                self.cue(&self.local_actor, "Failed!");
                ClickOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    async fn use_ability(&self, target: ActorId, ability_id: String) -> ClickOutcome {
        let request = AbilityRequest {
            actor_id: self.local_actor.clone(),
            target_id: target.clone(),
            ability_id: ability_id.clone(),
        };
        tracing::debug!(?request, "requesting ability");

        match self.send(Endpoint::Ability, &request).await {
            Ok(response) if response.is_success() => {
                self.land_hit(&target, &response).await;
                ClickOutcome::AbilityUsed { target, ability_id }
            }
            Ok(response) => {
                let message = response.failure_message();
                self.bus
                    .narrate_at(MessageLevel::Warning, format!("Ability Failed: {message}"));
                ClickOutcome::Failed {
                    message: message.to_string(),
                }
            }
            Err(err) => {
                tracing::warn!(%err, "ability request failed");
                self.bus
                    .narrate_at(MessageLevel::Error, format!("Ability Error: {err}"));
                self.cue(&self.local_actor, "Failed!");
                ClickOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    /// Shared success path of attacks and abilities.
    async fn land_hit(&self, target: &ActorId, response: &ActionResponse) {
        if let Some(narrative) = response.narrative() {
            self.bus.narrate(narrative);
        }

        let (amount, damage_type) = response
            .mechanics()
            .map(|m| (m.damage_amount, m.damage_type.as_deref()))
            .unwrap_or((0, None));
        if let Some(position) = self.reconciler.position_of(target) {
            self.bus
                .present(PresentationEvent::Indicator(DamageIndicator::damage(
                    position,
                    amount,
                    damage_type,
                )));
        }

        self.turns.apply_outcome(response.outcome());
        self.refresh().await;
    }

    async fn send<T: serde::Serialize>(
        &self,
        endpoint: Endpoint,
        request: &T,
    ) -> Result<ActionResponse> {
        let body = encode(endpoint, request)?;
        fetch(self.channel.as_ref(), endpoint, Some(body)).await
    }

    async fn refresh(&self) {
        if let Err(err) = self.turns.refresh().await {
            tracing::warn!(%err, "refresh after action failed");
        }
    }

    fn cue(&self, actor: &ActorId, label: &str) {
        if let Some(position) = self.reconciler.position_of(actor) {
            self.bus.present(PresentationEvent::Rejection {
                actor: actor.clone(),
                position,
                label: label.to_string(),
            });
        }
    }
}

fn refusal_line(err: &BattleError) -> &'static str {
    match err {
        BattleError::BattleOver { .. } => "The battle is over.",
        _ => "Not your turn!",
    }
}

/// Display form of a skill id: `"Gravity__Crush"` -> `"Gravity Crush"`.
pub fn prettify(skill_id: &str) -> String {
    skill_id
        .replace("__", " ")
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
