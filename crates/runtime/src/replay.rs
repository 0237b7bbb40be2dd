//! Paced playback of the AI actions reported by an end-turn response.
//!
//! Steps run strictly in list order and each one finishes, pause included,
//! before the next begins. Nothing here talks to the server; the replay only
//! retargets actors and publishes presentation events.
use std::sync::Arc;
use std::time::Duration;

use battle_core::{ActionEvent, ActionKind, ActorId, Position};

use crate::config::SessionConfig;
use crate::events::{DamageIndicator, EventBus, PresentationEvent};
use crate::reconciler::Reconciler;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub played: usize,
    pub skipped: usize,
}

pub struct ReplaySequencer {
    reconciler: Arc<Reconciler>,
    bus: EventBus,
    pause: Duration,
    move_timeout: Duration,
    settle_poll: Duration,
}

impl ReplaySequencer {
    pub fn new(reconciler: Arc<Reconciler>, bus: EventBus, config: &SessionConfig) -> Self {
        Self {
            reconciler,
            bus,
            pause: config.replay_pause,
            move_timeout: config.move_timeout,
            settle_poll: config.motion.frame_interval,
        }
    }

    pub async fn play(&self, events: &[ActionEvent]) -> ReplaySummary {
        let mut summary = ReplaySummary::default();

        for (index, event) in events.iter().enumerate() {
            let actor = &event.actor_id;
            let played = match &event.kind {
                ActionKind::Move { destination } => self.play_move(actor, *destination).await,
                ActionKind::Attack {
                    target,
                    damage,
                    damage_type,
                } => {
                    self.play_attack(actor, target.as_ref(), damage.unwrap_or(0), damage_type.as_deref())
                        .await
                }
                ActionKind::Wait { message } => self.play_wait(actor, message.as_deref()).await,
                ActionKind::Unknown { tag } => {
                    tracing::warn!(index, %actor, tag, "skipping unknown ai action");
                    false
                }
            };

            if played {
                summary.played += 1;
            } else {
                summary.skipped += 1;
            }
        }

        tracing::debug!(played = summary.played, skipped = summary.skipped, "replay finished");
        summary
    }

    async fn play_move(&self, actor: &ActorId, destination: Option<Position>) -> bool {
        let Some(destination) = destination else {
            tracing::warn!(%actor, "move without destination, skipping");
            return false;
        };
        if !self.reconciler.retarget(actor, destination) {
            tracing::warn!(%actor, %destination, "move for unknown actor, skipping");
            return false;
        }

        let arrival = async {
            while !self.reconciler.has_arrived(actor, destination) {
                tokio::time::sleep(self.settle_poll).await;
            }
        };
        let reached = tokio::time::timeout(self.move_timeout, arrival).await.is_ok();
        if !reached {
            tracing::debug!(%actor, %destination, "move animation timed out");
        }

        self.bus.present(PresentationEvent::MoveAnimated {
            actor: actor.clone(),
            destination,
            reached,
        });
        true
    }

    async fn play_attack(
        &self,
        actor: &ActorId,
        target: Option<&ActorId>,
        amount: i32,
        damage_type: Option<&str>,
    ) -> bool {
        tokio::time::sleep(self.pause).await;

        // Resolved after the wind-up so the indicator follows a target that moved.
        let position = target
            .and_then(|target| self.reconciler.position_of(target))
            .or_else(|| self.reconciler.position_of(actor));
        let Some(position) = position else {
            tracing::warn!(%actor, ?target, "attack between unknown actors, skipping");
            return false;
        };

        self.bus
            .present(PresentationEvent::Indicator(DamageIndicator::damage(
                position,
                amount,
                damage_type,
            )));
        tokio::time::sleep(self.pause).await;
        true
    }

    async fn play_wait(&self, actor: &ActorId, message: Option<&str>) -> bool {
        let Some(position) = self.reconciler.position_of(actor) else {
            tracing::warn!(%actor, "wait for unknown actor, skipping");
            return false;
        };

        if let Some(message) = message.map(str::trim).filter(|m| !m.is_empty()) {
            self.bus.narrate(format!("{actor}: {message}"));
        }
        self.bus
            .present(PresentationEvent::Indicator(DamageIndicator::neutral(position)));
        tokio::time::sleep(self.pause).await;
        true
    }
}
