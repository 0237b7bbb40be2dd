//! Utilities for reacting to battle events inside UI layers.
use battle_core::{BattleOutcome, BattlePhase};
use battle_runtime::{Event, TurnEvent};

use crate::message::{MessageEntry, MessageLog};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventImpact {
    pub requires_redraw: bool,
}

impl EventImpact {
    pub const fn none() -> Self {
        Self {
            requires_redraw: false,
        }
    }

    pub const fn redraw() -> Self {
        Self {
            requires_redraw: true,
        }
    }

    pub fn combine(self, other: Self) -> Self {
        Self {
            requires_redraw: self.requires_redraw || other.requires_redraw,
        }
    }
}

pub trait EventConsumer {
    fn on_event(&mut self, event: &Event) -> EventImpact;
    fn message_log(&self) -> &MessageLog;
    fn message_log_mut(&mut self) -> &mut MessageLog;
    fn take_message_log(self) -> MessageLog
    where
        Self: Sized;
}

/// Keeps the narration log and the bits of turn state a HUD shows.
#[derive(Clone, Debug)]
pub struct BattleLogConsumer {
    log: MessageLog,
    phase: BattlePhase,
    controls_enabled: bool,
    outcome: Option<BattleOutcome>,
}

impl BattleLogConsumer {
    pub fn new(log: MessageLog) -> Self {
        Self {
            log,
            phase: BattlePhase::default(),
            controls_enabled: false,
            outcome: None,
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Whether the end-turn control should be clickable.
    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }
}

impl EventConsumer for BattleLogConsumer {
    fn on_event(&mut self, event: &Event) -> EventImpact {
        match event {
            Event::Narration(line) => {
                if self.log.push(MessageEntry::from(line)) {
                    EventImpact::redraw()
                } else {
                    EventImpact::none()
                }
            }
            Event::Turn(TurnEvent::PhaseChanged { to, .. }) => {
                self.phase = *to;
                EventImpact::redraw()
            }
            Event::Turn(TurnEvent::ControlsEnabled(enabled)) => {
                let changed = self.controls_enabled != *enabled;
                self.controls_enabled = *enabled;
                if changed {
                    EventImpact::redraw()
                } else {
                    EventImpact::none()
                }
            }
            Event::Turn(TurnEvent::BattleEnded(outcome)) => {
                self.outcome = Some(*outcome);
                self.phase = outcome.phase();
                self.controls_enabled = false;
                EventImpact::redraw()
            }
            // Animations and indicators are drawn on the grid, not logged.
            Event::Presentation(_) => EventImpact::redraw(),
        }
    }

    fn message_log(&self) -> &MessageLog {
        &self.log
    }

    fn message_log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    fn take_message_log(self) -> MessageLog {
        self.log
    }
}
