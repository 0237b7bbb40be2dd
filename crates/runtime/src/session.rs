//! Composition root for one battle.
//!
//! Builds every component exactly once and hands out shared references;
//! nothing in this crate reaches for a global.
use std::sync::Arc;

use client_transport::RequestChannel;
use tokio::sync::broadcast;

use crate::animator::Animator;
use crate::api::{ActorView, StatusDisplay};
use crate::config::SessionConfig;
use crate::events::{Event, EventBus, Topic};
use crate::interaction::InteractionRouter;
use crate::reconciler::Reconciler;
use crate::replay::ReplaySequencer;
use crate::turn::TurnCoordinator;

#[derive(Clone)]
pub struct BattleSession {
    config: SessionConfig,
    bus: EventBus,
    channel: Arc<dyn RequestChannel>,
    reconciler: Arc<Reconciler>,
    replay: Arc<ReplaySequencer>,
    turns: Arc<TurnCoordinator>,
    router: Arc<InteractionRouter>,
}

impl BattleSession {
    pub fn new(
        channel: Arc<dyn RequestChannel>,
        view: Arc<dyn ActorView>,
        status: Arc<dyn StatusDisplay>,
        config: SessionConfig,
    ) -> Self {
        let bus = EventBus::with_capacity(config.event_buffer_size);
        let reconciler = Arc::new(Reconciler::new(
            view,
            status,
            config.local_actor.clone(),
            config.motion,
        ));
        let replay = Arc::new(ReplaySequencer::new(
            Arc::clone(&reconciler),
            bus.clone(),
            &config,
        ));
        let turns = Arc::new(TurnCoordinator::new(
            Arc::clone(&channel),
            Arc::clone(&reconciler),
            Arc::clone(&replay),
            bus.clone(),
            &config,
        ));
        let router = Arc::new(InteractionRouter::new(
            Arc::clone(&channel),
            Arc::clone(&reconciler),
            Arc::clone(&turns),
            bus.clone(),
            &config,
        ));

        tracing::debug!(local_actor = %config.local_actor, "battle session assembled");

        Self {
            config,
            bus,
            channel,
            reconciler,
            replay,
            turns,
            router,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn channel(&self) -> &Arc<dyn RequestChannel> {
        &self.channel
    }

    pub fn reconciler(&self) -> &Arc<Reconciler> {
        &self.reconciler
    }

    pub fn replay(&self) -> &Arc<ReplaySequencer> {
        &self.replay
    }

    pub fn turns(&self) -> &Arc<TurnCoordinator> {
        &self.turns
    }

    pub fn router(&self) -> &Arc<InteractionRouter> {
        &self.router
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    /// Starts the frame loop that animates actors toward their targets.
    pub fn spawn_animator(&self) -> Animator {
        Animator::spawn(Arc::clone(&self.reconciler))
    }
}
