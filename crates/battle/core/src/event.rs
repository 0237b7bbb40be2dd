//! AI action events embedded in an end-turn response.
//!
//! The server describes each AI step with a string tag (`"action": "Move"`)
//! plus loosely shaped extra fields. They are decoded here, once, into
//! [`ActionKind`] so the replay code can match exhaustively.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{ActorId, Position};

/// One replayable step, consumed once and in list order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionEvent {
    pub actor_id: ActorId,
    pub kind: ActionKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    Move {
        destination: Option<Position>,
    },
    Attack {
        target: Option<ActorId>,
        damage: Option<i32>,
        damage_type: Option<String>,
    },
    Wait {
        message: Option<String>,
    },
    /// Tag not understood by this client, or an entry that failed to decode.
    Unknown {
        tag: String,
    },
}

impl ActionKind {
    pub fn label(&self) -> &str {
        match self {
            Self::Move { .. } => "Move",
            Self::Attack { .. } => "Attack",
            Self::Wait { .. } => "Wait",
            Self::Unknown { tag } => tag,
        }
    }
}

/// Wire shape of an AI action. Every field is optional so decoding never
/// fails on a partially filled entry.
#[derive(Debug, Default, Deserialize)]
struct RawActionEvent {
    #[serde(default)]
    actor_id: Option<ActorId>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    to: Option<Position>,
    #[serde(default)]
    target: Option<ActorId>,
    #[serde(default)]
    damage: Option<i32>,
    #[serde(default, rename = "type")]
    damage_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ActionEvent {
    pub fn new(actor_id: impl Into<ActorId>, kind: ActionKind) -> Self {
        Self {
            actor_id: actor_id.into(),
            kind,
        }
    }

    /// Decodes one `ai_actions` entry.
    ///
    /// Never fails: anything that cannot be understood becomes
    /// [`ActionKind::Unknown`] so the rest of the sequence still plays.
    pub fn decode(value: &Value) -> Self {
        let raw = match RawActionEvent::deserialize(value) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(%error, "undecodable ai action entry");
                return Self {
                    actor_id: ActorId::default(),
                    kind: ActionKind::Unknown {
                        tag: "<malformed>".to_string(),
                    },
                };
            }
        };

        let actor_id = raw.actor_id.unwrap_or_default();
        let tag = raw.action.unwrap_or_default();
        let kind = match tag.as_str() {
            "Move" => ActionKind::Move {
                destination: raw.to,
            },
            "Attack" => ActionKind::Attack {
                target: raw.target.filter(|id| !id.is_empty()),
                damage: raw.damage,
                damage_type: raw.damage_type,
            },
            "Wait" => ActionKind::Wait {
                message: raw.message,
            },
            _ => ActionKind::Unknown { tag },
        };

        Self { actor_id, kind }
    }

    /// Decodes a whole `ai_actions` array, preserving order.
    pub fn decode_all(values: &[Value]) -> Vec<Self> {
        values.iter().map(Self::decode).collect()
    }
}
