//! Authoritative per-entity state reported by `/entities`.
use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::{ActorId, Position};

/// Team tag attached to every entity.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
pub enum Team {
    #[default]
    Player,
    Enemy,
    /// Any tag this client does not know about.
    #[serde(other)]
    Neutral,
}

/// Visual descriptor used by sprite composition (out of scope here, carried through).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualTags {
    #[serde(default, deserialize_with = "null_as_default")]
    pub chassis: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub infusion: String,
}

/// One entity as the server sees it at the moment of the query.
///
/// Superseded wholesale by the next snapshot; never patched in place. Every
/// field except `id` tolerates being absent or `null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: ActorId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team: Team,
    #[serde(default, deserialize_with = "null_as_default")]
    pub x: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub y: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hp: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_hp: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ap: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub composure: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_composure: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stamina: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_stamina: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub focus: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_focus: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub known_skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_effects: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visual_tags: VisualTags,
}

impl EntitySnapshot {
    /// Minimal snapshot, mostly useful for fixtures.
    pub fn new(id: impl Into<ActorId>, position: Position, hp: i32, max_hp: i32) -> Self {
        Self {
            id: id.into(),
            x: position.x,
            y: position.y,
            hp,
            max_hp,
            ..Self::default()
        }
    }

    pub fn with_ap(mut self, ap: i32) -> Self {
        self.ap = ap;
        self
    }

    pub fn with_team(mut self, team: Team) -> Self {
        self.team = team;
        self
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

/// Treats an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
