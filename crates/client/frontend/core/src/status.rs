//! Player card: the local actor's name, class line and stat bars.
use std::sync::{Mutex, PoisonError};

use battle_core::EntitySnapshot;
use battle_runtime::StatusDisplay;

/// One labelled bar, e.g. `HP 7 / 10`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatBar {
    pub label: &'static str,
    pub current: i32,
    pub maximum: i32,
}

impl StatBar {
    pub const fn new(label: &'static str, current: i32, maximum: i32) -> Self {
        Self {
            label,
            current,
            maximum,
        }
    }

    /// Fill ratio in `[0, 1]`; a non-positive maximum reads as empty.
    pub fn fill(&self) -> f32 {
        if self.maximum <= 0 {
            return 0.0;
        }
        (self.current as f32 / self.maximum as f32).clamp(0.0, 1.0)
    }

    /// Text-mode bar `[####------]` of `width` cells.
    pub fn gauge(&self, width: usize) -> String {
        let filled = (self.fill() * width as f32).round() as usize;
        format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled.min(width)))
    }
}

impl std::fmt::Display for StatBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} / {}", self.label, self.current, self.maximum)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusCard {
    pub name: String,
    /// `role / infusion`.
    pub class_line: String,
    pub bars: [StatBar; 4],
}

impl StatusCard {
    pub fn from_snapshot(snapshot: &EntitySnapshot) -> Self {
        let tags = &snapshot.visual_tags;
        Self {
            name: snapshot.name.clone(),
            class_line: format!("{} / {}", tags.role, tags.infusion),
            bars: [
                StatBar::new("HP", snapshot.hp, snapshot.max_hp),
                StatBar::new("Stamina", snapshot.stamina, snapshot.max_stamina),
                StatBar::new("Focus", snapshot.focus, snapshot.max_focus),
                StatBar::new("Composure", snapshot.composure, snapshot.max_composure),
            ],
        }
    }
}

/// [`StatusDisplay`] that keeps the latest card for whoever draws it.
///
/// Hidden until the reconciler reports the local actor for the first time.
#[derive(Debug, Default)]
pub struct StatusPanel {
    card: Mutex<Option<StatusCard>>,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.card().is_some()
    }

    pub fn card(&self) -> Option<StatusCard> {
        self.card
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StatusDisplay for StatusPanel {
    fn show(&self, snapshot: &EntitySnapshot) {
        let card = StatusCard::from_snapshot(snapshot);
        *self.card.lock().unwrap_or_else(PoisonError::into_inner) = Some(card);
    }
}
