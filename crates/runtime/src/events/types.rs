//! Event payloads for each topic.
use battle_core::{ActorId, BattleOutcome, BattlePhase, Position};
use serde::{Deserialize, Serialize};

/// Severity of a narration line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
pub enum MessageLevel {
    #[default]
    Info,
    Warning,
    Error,
}

/// One line for the narration log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationEvent {
    pub level: MessageLevel,
    pub text: String,
}

/// Colour family of a floating combat number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
pub enum Tone {
    Red,
    Orange,
    Yellow,
    /// Neutral: misses, waits, rejection cues.
    Gray,
}

impl Tone {
    /// `Meat` hits are red, `Burn` orange, any other tag yellow; zero is neutral.
    pub fn for_damage(amount: i32, damage_type: Option<&str>) -> Self {
        if amount == 0 {
            return Self::Gray;
        }
        match damage_type {
            Some("Meat") => Self::Red,
            Some("Burn") => Self::Orange,
            _ => Self::Yellow,
        }
    }
}

/// Floating number shown at a grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageIndicator {
    pub position: Position,
    pub amount: i32,
    pub tone: Tone,
    pub label: Option<String>,
}

impl DamageIndicator {
    pub fn damage(position: Position, amount: i32, damage_type: Option<&str>) -> Self {
        Self {
            position,
            amount,
            tone: Tone::for_damage(amount, damage_type),
            label: (amount == 0).then(|| "Miss".to_string()),
        }
    }

    /// Zero-amount marker with no label (AI waits).
    pub fn neutral(position: Position) -> Self {
        Self {
            position,
            amount: 0,
            tone: Tone::Gray,
            label: None,
        }
    }
}

/// Visual cues, kept on one topic so consumers see them in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationEvent {
    /// A replayed move finished (or gave up waiting).
    MoveAnimated {
        actor: ActorId,
        destination: Position,
        reached: bool,
    },
    Indicator(DamageIndicator),
    /// Short cue over an actor whose request was refused ("Blocked!").
    Rejection {
        actor: ActorId,
        position: Position,
        label: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    PhaseChanged {
        from: BattlePhase,
        to: BattlePhase,
        current_turn: Option<ActorId>,
        epoch: u64,
    },
    /// Whether the local player may act (end-turn button, clicks).
    ControlsEnabled(bool),
    BattleEnded(BattleOutcome),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_follows_damage_type() {
        assert_eq!(Tone::for_damage(5, Some("Meat")), Tone::Red);
        assert_eq!(Tone::for_damage(3, Some("Burn")), Tone::Orange);
        assert_eq!(Tone::for_damage(3, Some("Gravity")), Tone::Yellow);
        assert_eq!(Tone::for_damage(3, None), Tone::Yellow);
        assert_eq!(Tone::for_damage(0, Some("Meat")), Tone::Gray);
    }

    #[test]
    fn zero_damage_reads_as_miss() {
        let indicator = DamageIndicator::damage(Position::new(1, 1), 0, Some("Meat"));
        assert_eq!(indicator.label.as_deref(), Some("Miss"));
        assert_eq!(DamageIndicator::neutral(Position::ORIGIN).label, None);
    }
}
