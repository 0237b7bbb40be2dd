//! Turn coordination: who may act, ending turns, and waiting out the AI.
//!
//! Phases move Inactive -> PlayerTurn <-> OpponentTurn -> Victory | Defeat.
//! The current [`TurnState`] lives in a `watch` channel so waiters notice a
//! terminal transition made by any other flow without polling for it.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use battle_core::{
    ActorId, BattleOutcome, BattlePhase, BattleStartResponse, BattleStateResponse,
    EndTurnResponse, EntityListResponse, TurnState, TurnTransition,
};
use client_transport::{Endpoint, RequestChannel};
use tokio::sync::watch;

use crate::api::{BattleError, Result};
use crate::config::SessionConfig;
use crate::events::{EventBus, MessageLevel, TurnEvent};
use crate::reconciler::{ReconcileReport, Reconciler};
use crate::replay::ReplaySequencer;
use crate::request::{empty_body, fetch};

/// Holds the end-turn slot; releasing it on drop.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct TurnCoordinator {
    channel: Arc<dyn RequestChannel>,
    reconciler: Arc<Reconciler>,
    replay: Arc<ReplaySequencer>,
    bus: EventBus,
    local_actor: ActorId,
    min_action_points: i32,
    poll_interval: Duration,
    state: watch::Sender<TurnState>,
    end_turn_in_flight: AtomicBool,
    /// Epoch for which auto end-turn already fired.
    auto_ended: Mutex<Option<u64>>,
}

impl TurnCoordinator {
    pub fn new(
        channel: Arc<dyn RequestChannel>,
        reconciler: Arc<Reconciler>,
        replay: Arc<ReplaySequencer>,
        bus: EventBus,
        config: &SessionConfig,
    ) -> Self {
        Self {
            channel,
            reconciler,
            replay,
            bus,
            local_actor: config.local_actor.clone(),
            min_action_points: config.min_action_points,
            poll_interval: config.poll_interval,
            state: watch::channel(TurnState::new()).0,
            end_turn_in_flight: AtomicBool::new(false),
            auto_ended: Mutex::new(None),
        }
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    pub fn state(&self) -> TurnState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> BattlePhase {
        self.state.borrow().phase
    }

    pub fn epoch(&self) -> u64 {
        self.state.borrow().epoch
    }

    /// Player turn, or free roam before any battle.
    pub fn can_act(&self) -> bool {
        self.phase().allows_local_action()
    }

    pub fn is_end_turn_pending(&self) -> bool {
        self.end_turn_in_flight.load(Ordering::Acquire)
    }

    pub fn controls_enabled(&self) -> bool {
        !self.is_end_turn_pending() && self.can_act()
    }

    pub fn subscribe(&self) -> watch::Receiver<TurnState> {
        self.state.subscribe()
    }

    pub fn local_actor(&self) -> &ActorId {
        &self.local_actor
    }

    /// Refuses locally when the battle is over or another actor holds the turn.
    pub fn ensure_can_act(&self) -> Result<()> {
        let phase = self.phase();
        if phase.is_terminal() {
            return Err(BattleError::BattleOver { phase });
        }
        if !phase.allows_local_action() {
            return Err(BattleError::NotPlayerTurn { phase });
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // State transitions
    // ------------------------------------------------------------------------

    fn update(&self, apply: impl FnOnce(&mut TurnState) -> TurnTransition) -> TurnTransition {
        let mut transition = TurnTransition::Unchanged;
        self.state.send_if_modified(|state| {
            transition = apply(state);
            transition.changed()
        });
        self.announce(&transition);
        transition
    }

    fn announce(&self, transition: &TurnTransition) {
        let state = self.state();
        match *transition {
            TurnTransition::Advanced { from, to } => {
                tracing::info!(
                    %from,
                    %to,
                    current_turn = ?state.current_turn,
                    epoch = state.epoch,
                    "turn advanced"
                );
                self.bus.turn(TurnEvent::PhaseChanged {
                    from,
                    to,
                    current_turn: state.current_turn,
                    epoch: state.epoch,
                });
            }
            TurnTransition::Ended(outcome) => {
                tracing::info!(%outcome, epoch = state.epoch, "battle ended");
                self.bus.turn(TurnEvent::BattleEnded(outcome));
                self.bus.turn(TurnEvent::ControlsEnabled(false));
                self.bus.narrate(match outcome {
                    BattleOutcome::Victory => "Victory!",
                    BattleOutcome::Defeat => "Defeat...",
                });
            }
            TurnTransition::AlreadyOver => {
                tracing::debug!("late response after battle end ignored");
            }
            TurnTransition::Unchanged => {}
        }
    }

    /// Folds an action response's terminal marker into the turn state.
    pub fn apply_outcome(&self, outcome: Option<BattleOutcome>) -> TurnTransition {
        self.update(|state| state.apply_outcome(outcome))
    }

    /// [`apply_outcome`](Self::apply_outcome) from a raw `battle_state` marker.
    pub fn apply_battle_state(&self, battle_state: Option<&str>) -> TurnTransition {
        self.apply_outcome(BattleOutcome::from_marker(battle_state))
    }

    // ------------------------------------------------------------------------
    // Server flows
    // ------------------------------------------------------------------------

    /// Fetches `/entities` under a fresh ticket and reconciles it.
    pub async fn sync_entities(&self) -> Result<ReconcileReport> {
        let ticket = self.reconciler.begin_sync();
        let response: EntityListResponse =
            fetch(self.channel.as_ref(), Endpoint::Entities, None).await?;
        Ok(self
            .reconciler
            .reconcile_ticketed(ticket, &response.entities))
    }

    /// Fetches `/battle/state` and applies it.
    ///
    /// A reply is dropped when the epoch moved while it was out, or when an
    /// end-turn is in flight; that flow owns the turn state until it returns.
    pub async fn poll_state(&self) -> Result<TurnTransition> {
        self.poll_state_as(false).await
    }

    async fn poll_state_as(&self, end_turn_owner: bool) -> Result<TurnTransition> {
        let epoch = self.epoch();
        let response: BattleStateResponse =
            fetch(self.channel.as_ref(), Endpoint::BattleState, None).await?;

        let current = self.epoch();
        if current != epoch || (!end_turn_owner && self.is_end_turn_pending()) {
            tracing::debug!(
                sent_at = epoch,
                current,
                current_turn = ?response.current_turn,
                "stale battle state ignored"
            );
            return Ok(TurnTransition::Unchanged);
        }

        Ok(self.update(|state| {
            state.apply(
                response.current_turn.as_ref(),
                response.outcome(),
                &self.local_actor,
            )
        }))
    }

    pub async fn start_battle(&self) -> Result<TurnState> {
        let phase = self.phase();
        if phase.is_terminal() {
            return Err(BattleError::BattleOver { phase });
        }

        let response: BattleStartResponse =
            match fetch(self.channel.as_ref(), Endpoint::BattleStart, empty_body()).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::error!(%err, "failed to start battle");
                    self.bus
                        .narrate_at(MessageLevel::Error, format!("Failed to start battle: {err}"));
                    return Err(err);
                }
            };

        if let Some(message) = response.message.as_deref() {
            tracing::info!(turn_order = ?response.turn_order, "{message}");
        }
        self.update(|state| {
            state.apply_new_turn(
                response.current_turn.as_ref(),
                response.outcome(),
                &self.local_actor,
            )
        });
        if let Some(narrative) = response.narrative() {
            self.bus.narrate(narrative);
        }

        if let Err(err) = self.sync_entities().await {
            tracing::warn!(%err, "initial entity sync failed");
        }
        if self.phase() == BattlePhase::OpponentTurn {
            self.wait_for_player_turn().await;
        }

        self.bus.turn(TurnEvent::ControlsEnabled(self.controls_enabled()));
        self.auto_end_if_exhausted().await;
        Ok(self.state())
    }

    /// Ends the local player's turn, replays the AI's actions and waits until
    /// control comes back (or the battle ends).
    ///
    /// Refused without a request unless it is the player's turn; a second call
    /// while one is running is refused with [`BattleError::EndTurnPending`].
    ///
    /// When control comes back with the local actor already out of AP, the
    /// new turn is ended as well (once per epoch).
    pub async fn end_turn(&self) -> Result<TurnState> {
        let mut state = self.end_turn_once().await?;
        while self.claim_auto_end() {
            match self.end_turn_once().await {
                Ok(next) => state = next,
                Err(err) => {
                    tracing::warn!(%err, "auto end turn failed");
                    break;
                }
            }
        }
        Ok(state)
    }

    async fn end_turn_once(&self) -> Result<TurnState> {
        let phase = self.phase();
        if phase.is_terminal() {
            return Err(BattleError::BattleOver { phase });
        }
        if phase != BattlePhase::PlayerTurn {
            return Err(BattleError::NotPlayerTurn { phase });
        }

        let result = {
            let Some(_slot) = InFlight::acquire(&self.end_turn_in_flight) else {
                return Err(BattleError::EndTurnPending);
            };
            self.bus.turn(TurnEvent::ControlsEnabled(false));
            self.run_end_turn().await
        };

        if let Err(err) = &result {
            tracing::warn!(%err, "end turn failed");
            self.bus
                .narrate_at(MessageLevel::Error, format!("End Turn Failed: {err}"));
        }
        self.bus.turn(TurnEvent::ControlsEnabled(self.controls_enabled()));
        result
    }

    async fn run_end_turn(&self) -> Result<TurnState> {
        tracing::debug!("requesting end turn");
        let response: EndTurnResponse =
            fetch(self.channel.as_ref(), Endpoint::EndTurn, empty_body()).await?;

        self.update(|state| {
            state.apply_new_turn(
                response.current_turn.as_ref(),
                response.outcome(),
                &self.local_actor,
            )
        });

        if let Some(narrative) = response.narrative() {
            self.bus.narrate(narrative);
        }
        if let Some(current) = self.state().current_turn {
            self.bus.narrate(format!("Turn: {current}"));
        }

        let events = response.events();
        if !events.is_empty() {
            self.replay.play(&events).await;
        }

        if let Err(err) = self.sync_entities().await {
            tracing::warn!(%err, "entity sync after end turn failed");
        }
        if self.phase() == BattlePhase::OpponentTurn {
            self.await_turn(true).await;
        }
        Ok(self.state())
    }

    /// Polls entities and battle state every `poll_interval` while the
    /// opponent holds the turn. Returns once the phase is anything else.
    pub async fn wait_for_player_turn(&self) -> TurnState {
        self.await_turn(false).await
    }

    async fn await_turn(&self, end_turn_owner: bool) -> TurnState {
        let mut rx = self.state.subscribe();
        let mut polled = false;

        loop {
            let phase = rx.borrow_and_update().phase;
            if phase != BattlePhase::OpponentTurn {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }

            polled = true;
            tracing::debug!("waiting for opponent");
            if let Err(err) = self.sync_entities().await {
                tracing::warn!(%err, "entity poll failed");
            }
            if let Err(err) = self.poll_state_as(end_turn_owner).await {
                tracing::warn!(%err, "battle state poll failed");
            }
        }

        let state = self.state();
        if polled && state.phase == BattlePhase::PlayerTurn {
            self.bus.narrate("Your Turn!");
        }
        state
    }

    /// Re-reads battle state and entities after an accepted action, then
    /// applies the auto end-turn rule.
    pub async fn refresh(&self) -> Result<ReconcileReport> {
        if let Err(err) = self.poll_state().await {
            tracing::warn!(%err, "battle state poll after action failed");
        }
        let report = self.sync_entities().await?;
        self.auto_end_if_exhausted().await;
        Ok(report)
    }

    /// Ends the turn once per epoch when the local actor runs out of AP.
    /// Returns whether an end-turn was issued.
    pub async fn auto_end_if_exhausted(&self) -> bool {
        if !self.claim_auto_end() {
            return false;
        }
        match self.end_turn().await {
            Ok(_) | Err(BattleError::EndTurnPending) => {}
            Err(err) => tracing::warn!(%err, "auto end turn failed"),
        }
        true
    }

    /// Spends this epoch's auto end-turn if the local actor is out of AP.
    fn claim_auto_end(&self) -> bool {
        let state = self.state();
        if state.phase != BattlePhase::PlayerTurn || self.is_end_turn_pending() {
            return false;
        }
        let Some(actor) = self.reconciler.actor(&self.local_actor) else {
            return false;
        };
        if actor.snapshot.ap >= self.min_action_points {
            return false;
        }

        let mut fired = self.auto_ended.lock().unwrap_or_else(PoisonError::into_inner);
        if *fired == Some(state.epoch) {
            return false;
        }
        *fired = Some(state.epoch);

        tracing::info!(ap = actor.snapshot.ap, epoch = state.epoch, "auto-ending turn, out of action points");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HeadlessView;
    use client_transport::MockChannel;
    use serde_json::json;

    fn coordinator(mock: &MockChannel) -> TurnCoordinator {
        let config = SessionConfig::default();
        let view = Arc::new(HeadlessView::default());
        let reconciler = Arc::new(Reconciler::new(
            view.clone(),
            view,
            config.local_actor.clone(),
            config.motion,
        ));
        let bus = EventBus::new();
        let replay = Arc::new(ReplaySequencer::new(reconciler.clone(), bus.clone(), &config));
        TurnCoordinator::new(Arc::new(mock.clone()), reconciler, replay, bus, &config)
    }

    #[tokio::test(start_paused = true)]
    async fn start_without_turn_owner_is_free_roam() {
        let mock = MockChannel::new();
        mock.respond(
            Endpoint::BattleStart,
            json!({"message": "Battle started", "turn_order": ["P1", "E1"], "current_turn": null, "battle_state": "Ongoing"}),
        )
        .respond(Endpoint::Entities, json!({"entities": [{"id": "P1", "x": 1, "y": 1}]}));
        let turns = coordinator(&mock);

        let state = turns.start_battle().await.unwrap();

        assert_eq!(state.phase, BattlePhase::Inactive);
        assert!(turns.can_act());
        assert!(turns.controls_enabled());
        assert_eq!(mock.endpoints(), vec![Endpoint::BattleStart, Endpoint::Entities]);
    }

    #[tokio::test(start_paused = true)]
    async fn end_turn_outside_player_turn_sends_nothing() {
        let mock = MockChannel::new();
        let turns = coordinator(&mock);

        let err = turns.end_turn().await.unwrap_err();

        assert!(matches!(
            err,
            BattleError::NotPlayerTurn {
                phase: BattlePhase::Inactive
            }
        ));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_end_turn_keeps_phase_and_controls() {
        let mock = MockChannel::new();
        mock.respond(Endpoint::BattleState, json!({"current_turn": "P1"}));
        mock.fail(
            Endpoint::EndTurn,
            client_transport::NetworkError::Protocol {
                status: 500,
                message: "boom".into(),
            },
        );
        let turns = coordinator(&mock);
        turns.poll_state().await.unwrap();
        let epoch = turns.epoch();

        assert!(turns.end_turn().await.is_err());

        assert_eq!(turns.phase(), BattlePhase::PlayerTurn);
        assert_eq!(turns.epoch(), epoch);
        assert!(turns.controls_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_action_outcome_is_sticky() {
        let mock = MockChannel::new();
        mock.respond_always(Endpoint::BattleState, json!({"current_turn": "P1"}));
        let turns = coordinator(&mock);
        turns.poll_state().await.unwrap();

        let transition = turns.apply_battle_state(Some("Defeat"));
        assert_eq!(transition, TurnTransition::Ended(BattleOutcome::Defeat));

        assert_eq!(turns.poll_state().await.unwrap(), TurnTransition::AlreadyOver);
        assert_eq!(turns.phase(), BattlePhase::Defeat);
        assert!(!turns.can_act());
        assert!(matches!(
            turns.ensure_can_act(),
            Err(BattleError::BattleOver { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_failures_do_not_stop_waiting() {
        let mock = MockChannel::new();
        mock.respond(Endpoint::BattleState, json!({"current_turn": "E1"}))
            .fail(
                Endpoint::BattleState,
                client_transport::NetworkError::Connection {
                    attempts: 6,
                    message: "refused".into(),
                },
            )
            .respond(Endpoint::BattleState, json!({"current_turn": "P1"}))
            .respond_always(Endpoint::Entities, json!({"entities": []}));
        let turns = coordinator(&mock);
        turns.poll_state().await.unwrap();

        let state = turns.wait_for_player_turn().await;

        assert_eq!(state.phase, BattlePhase::PlayerTurn);
        assert_eq!(mock.count(Endpoint::BattleState), 3);
    }
}
