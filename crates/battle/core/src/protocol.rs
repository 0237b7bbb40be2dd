//! Request bodies and response envelopes for the battle endpoints.
//!
//! Response types are deliberately permissive: every field has a default so
//! a response missing an optional field still decodes, and the caller can
//! degrade instead of failing the whole flow.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::ActionEvent;
use crate::ids::{ActorId, Position};
use crate::snapshot::{EntitySnapshot, null_as_default};
use crate::turn::BattleOutcome;

// ============================================================================
// Requests
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MoveRequest {
    pub actor_id: ActorId,
    pub target_pos: Position,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttackRequest {
    pub actor_id: ActorId,
    pub target_id: ActorId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AbilityRequest {
    pub actor_id: ActorId,
    pub target_id: ActorId,
    pub ability_id: String,
}

// ============================================================================
// Responses
// ============================================================================

/// Narration text. The ability endpoint nests it one level deeper
/// (`{"narrative": {"narrative": "..."}}`), the others send a plain string.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Narrative {
    Text(String),
    Nested {
        #[serde(default)]
        narrative: Option<String>,
    },
}

impl Narrative {
    /// Non-empty narration text, if any.
    pub fn text(&self) -> Option<&str> {
        let text = match self {
            Self::Text(text) => Some(text.as_str()),
            Self::Nested { narrative } => narrative.as_deref(),
        }?;
        let text = text.trim();
        (!text.is_empty()).then_some(text)
    }
}

fn narrative_text(narrative: &Option<Narrative>) -> Option<&str> {
    narrative.as_ref().and_then(Narrative::text)
}

/// `POST /battle/start`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BattleStartResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub turn_order: Vec<ActorId>,
    #[serde(default)]
    pub current_turn: Option<ActorId>,
    #[serde(default)]
    pub battle_state: Option<String>,
    #[serde(default)]
    pub narrative: Option<Narrative>,
}

impl BattleStartResponse {
    pub fn outcome(&self) -> Option<BattleOutcome> {
        BattleOutcome::from_marker(self.battle_state.as_deref())
    }

    pub fn narrative(&self) -> Option<&str> {
        narrative_text(&self.narrative)
    }
}

/// `GET /battle/state`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BattleStateResponse {
    #[serde(default)]
    pub current_turn: Option<ActorId>,
    #[serde(default)]
    pub battle_state: Option<String>,
    #[serde(default)]
    pub round: Option<u32>,
}

impl BattleStateResponse {
    pub fn outcome(&self) -> Option<BattleOutcome> {
        BattleOutcome::from_marker(self.battle_state.as_deref())
    }
}

/// `GET /entities`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EntityListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: Vec<EntitySnapshot>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Mechanics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub damage_amount: i32,
    #[serde(default)]
    pub damage_type: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ActionResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub mechanics: Option<Mechanics>,
}

/// Shared envelope for move, attack and ability responses.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub result: Option<ActionResult>,
    #[serde(default)]
    pub battle_state: Option<String>,
    #[serde(default)]
    pub narrative: Option<Narrative>,
}

impl ActionResponse {
    pub fn outcome(&self) -> Option<BattleOutcome> {
        BattleOutcome::from_marker(self.battle_state.as_deref())
    }

    pub fn narrative(&self) -> Option<&str> {
        narrative_text(&self.narrative)
    }

    /// A response without a `result` block counts as accepted (the move
    /// endpoint may answer with narration only); an explicit
    /// `success: false` is a rejection.
    pub fn is_success(&self) -> bool {
        self.result.as_ref().is_none_or(|result| result.success)
    }

    pub fn failure_message(&self) -> &str {
        self.result
            .as_ref()
            .and_then(|result| result.message.as_deref())
            .unwrap_or("Unknown Error")
    }

    pub fn mechanics(&self) -> Option<&Mechanics> {
        self.result.as_ref().and_then(|result| result.mechanics.as_ref())
    }
}

/// `POST /battle/turn/end`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EndTurnResponse {
    #[serde(default)]
    pub current_turn: Option<ActorId>,
    #[serde(default)]
    pub battle_state: Option<String>,
    #[serde(default)]
    pub narrative: Option<Narrative>,
    /// Kept raw so one bad entry cannot fail the whole response.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ai_actions: Vec<Value>,
}

impl EndTurnResponse {
    pub fn outcome(&self) -> Option<BattleOutcome> {
        BattleOutcome::from_marker(self.battle_state.as_deref())
    }

    pub fn narrative(&self) -> Option<&str> {
        narrative_text(&self.narrative)
    }

    pub fn events(&self) -> Vec<ActionEvent> {
        ActionEvent::decode_all(&self.ai_actions)
    }
}

/// Entry of `GET /data/abilities/list`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SkillDef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub narrative: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SkillListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<SkillDef>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ActionKind;
    use serde_json::json;

    #[test]
    fn move_request_body_shape() {
        let body = serde_json::to_value(MoveRequest {
            actor_id: "P1".into(),
            target_pos: Position::new(3, 3),
        })
        .unwrap();
        assert_eq!(body, json!({"actor_id": "P1", "target_pos": [3, 3]}));
    }

    #[test]
    fn end_turn_response_keeps_event_order() {
        let response: EndTurnResponse = serde_json::from_value(json!({
            "current_turn": "AI1",
            "battle_state": null,
            "ai_actions": [
                {"actor_id": "AI1", "action": "Move", "to": [4, 4]},
                {"actor_id": "AI1", "action": "Attack", "target": "P1", "damage": 5}
            ]
        }))
        .unwrap();

        let events = response.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].kind, ActionKind::Move { .. }));
        assert!(matches!(events[1].kind, ActionKind::Attack { damage: Some(5), .. }));
        assert_eq!(response.outcome(), None);
    }

    #[test]
    fn rejected_attack_reports_message() {
        let response: ActionResponse = serde_json::from_value(json!({
            "result": {"success": false, "message": "Out of range"}
        }))
        .unwrap();
        assert!(!response.is_success());
        assert_eq!(response.failure_message(), "Out of range");
    }

    #[test]
    fn narrative_accepts_plain_and_nested() {
        let plain: ActionResponse =
            serde_json::from_value(json!({"narrative": "The bear roars."})).unwrap();
        assert_eq!(plain.narrative(), Some("The bear roars."));

        let nested: ActionResponse =
            serde_json::from_value(json!({"narrative": {"narrative": "Sparks fly."}})).unwrap();
        assert_eq!(nested.narrative(), Some("Sparks fly."));

        let blank: ActionResponse = serde_json::from_value(json!({"narrative": ""})).unwrap();
        assert_eq!(blank.narrative(), None);
    }
}
