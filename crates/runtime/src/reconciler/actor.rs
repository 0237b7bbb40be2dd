//! Client-side actor record and its interpolated visuals.
use battle_core::{ActorId, EntitySnapshot, Position};
use serde::{Deserialize, Serialize};

/// Continuous on-screen position, in cell units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderPosition {
    pub x: f32,
    pub y: f32,
}

impl RenderPosition {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn from_cell(cell: Position) -> Self {
        Self::new(cell.x as f32, cell.y as f32)
    }

    pub fn distance_to(self, cell: Position) -> f32 {
        let dx = cell.x as f32 - self.x;
        let dy = cell.y as f32 - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Moves at most `max_step` towards `cell`, snapping onto it once within
    /// `threshold`. Returns `true` when the position sits on the cell.
    pub fn step_toward(&mut self, cell: Position, max_step: f32, threshold: f32) -> bool {
        let distance = self.distance_to(cell);
        if distance <= threshold || distance <= max_step {
            *self = Self::from_cell(cell);
            return true;
        }

        let ratio = max_step / distance;
        self.x += (cell.x as f32 - self.x) * ratio;
        self.y += (cell.y as f32 - self.y) * ratio;
        false
    }
}

/// Cached health with a fill ratio that eases toward `current / maximum`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthBar {
    pub current: i32,
    pub maximum: i32,
    pub displayed_fill: f32,
}

impl HealthBar {
    pub fn new(current: i32, maximum: i32) -> Self {
        let mut bar = Self {
            current,
            maximum,
            displayed_fill: 0.0,
        };
        bar.displayed_fill = bar.target_fill();
        bar
    }

    /// Fill ratio in `[0, 1]`; a non-positive maximum reads as empty.
    pub fn target_fill(&self) -> f32 {
        if self.maximum <= 0 {
            return 0.0;
        }
        (self.current as f32 / self.maximum as f32).clamp(0.0, 1.0)
    }

    pub fn set(&mut self, current: i32, maximum: i32) {
        self.current = current;
        self.maximum = maximum;
    }

    pub fn is_settled(&self) -> bool {
        self.displayed_fill == self.target_fill()
    }

    /// Moves the displayed fill by at most `max_delta`. Returns `true` while
    /// still short of the target.
    pub fn ease(&mut self, max_delta: f32) -> bool {
        let target = self.target_fill();
        let gap = target - self.displayed_fill;
        if gap.abs() <= max_delta {
            self.displayed_fill = target;
            false
        } else {
            self.displayed_fill += max_delta.copysign(gap);
            true
        }
    }
}

/// One actor as the client currently shows it.
///
/// `rendered` lags `target` while a move animates; everything else comes from
/// the latest snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalActor {
    pub id: ActorId,
    pub rendered: RenderPosition,
    pub target: Position,
    pub health: HealthBar,
    pub snapshot: EntitySnapshot,
}

impl LocalActor {
    /// New actors appear directly on their cell.
    pub fn spawn(snapshot: &EntitySnapshot) -> Self {
        let cell = snapshot.position();
        Self {
            id: snapshot.id.clone(),
            rendered: RenderPosition::from_cell(cell),
            target: cell,
            health: HealthBar::new(snapshot.hp, snapshot.max_hp),
            snapshot: snapshot.clone(),
        }
    }

    /// Takes the new stats; the rendered position is left to the animator.
    pub fn update(&mut self, snapshot: &EntitySnapshot) {
        self.target = snapshot.position();
        self.health.set(snapshot.hp, snapshot.max_hp);
        self.snapshot = snapshot.clone();
    }

    pub fn is_at(&self, cell: Position, threshold: f32) -> bool {
        self.target == cell && self.rendered.distance_to(cell) <= threshold
    }

    pub fn is_settled(&self, threshold: f32) -> bool {
        self.is_at(self.target, threshold) && self.health.is_settled()
    }
}
