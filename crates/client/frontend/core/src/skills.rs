//! Skill definitions fetched from the server and the three-key hotbar.
use std::collections::BTreeMap;

use battle_core::{SkillDef, SkillListResponse};
use battle_runtime::{BattleError, EventBus, InteractionRouter, prettify};
use client_transport::{Endpoint, RequestChannel};

pub const HOTBAR_SLOTS: usize = 3;

const DEFAULT_ICON: &str = "default_icon";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Skill {
    pub id: String,
    /// Prettified id, used everywhere a skill is shown.
    pub name: String,
    pub icon: String,
    pub narrative: String,
}

impl Skill {
    fn from_def(def: SkillDef) -> Self {
        Self {
            name: prettify(&def.id),
            icon: def
                .icon
                .filter(|icon| !icon.is_empty())
                .unwrap_or_else(|| DEFAULT_ICON.to_string()),
            narrative: def.narrative.unwrap_or_default(),
            id: def.id,
        }
    }

    /// Stand-in for ids the server did not list.
    fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: prettify(id),
            icon: DEFAULT_ICON.to_string(),
            narrative: "Unknown".to_string(),
        }
    }
}

/// Lookup table of every skill the server knows.
#[derive(Clone, Debug, Default)]
pub struct SkillCatalog {
    skills: BTreeMap<String, Skill>,
}

impl SkillCatalog {
    pub fn from_defs(defs: impl IntoIterator<Item = SkillDef>) -> Self {
        let skills = defs
            .into_iter()
            .filter(|def| !def.id.is_empty())
            .map(|def| {
                let skill = Skill::from_def(def);
                (skill.id.clone(), skill)
            })
            .collect();
        Self { skills }
    }

    /// Loads the catalog; a failed fetch leaves it empty.
    pub async fn fetch(channel: &dyn RequestChannel) -> Self {
        let payload = match channel.request(Endpoint::AbilityList, None).await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(%err, "failed to load skill catalog");
                return Self::default();
            }
        };

        match serde_json::from_value::<SkillListResponse>(payload) {
            Ok(list) => {
                let catalog = Self::from_defs(list.skills);
                tracing::info!(count = catalog.len(), "skill catalog loaded");
                catalog
            }
            Err(err) => {
                tracing::warn!(%err, "skill catalog response did not decode");
                Self::default()
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Skill> {
        self.skills.get(id)
    }

    /// Like [`get`](Self::get), falling back to a placeholder for unlisted ids.
    pub fn resolve(&self, id: &str) -> Skill {
        self.get(id).cloned().unwrap_or_else(|| Skill::unknown(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HotbarError {
    #[error("no hotbar key {0}, keys are 1 to {max}", max = HOTBAR_SLOTS)]
    InvalidSlot(usize),
    #[error("key {0} has no skill bound")]
    EmptySlot(usize),
    #[error(transparent)]
    Battle(#[from] BattleError),
}

/// Number keys 1..=3 bound to skill ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hotbar {
    slots: [Option<String>; HOTBAR_SLOTS],
}

impl Hotbar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `skill_id` to key `key` (1-based) and narrates it.
    pub fn bind(
        &mut self,
        key: usize,
        skill_id: impl Into<String>,
        bus: &EventBus,
    ) -> Result<(), HotbarError> {
        let index = Self::index(key)?;
        let skill_id = skill_id.into();
        bus.narrate(format!("Bound {} to Key {key}", prettify(&skill_id)));
        self.slots[index] = Some(skill_id);
        Ok(())
    }

    pub fn slot(&self, key: usize) -> Option<&str> {
        let index = Self::index(key).ok()?;
        self.slots[index].as_deref()
    }

    /// Arms targeting with the skill bound to `key`.
    pub fn activate(&self, key: usize, router: &InteractionRouter) -> Result<String, HotbarError> {
        let skill_id = self.slot(key).ok_or_else(|| match Self::index(key) {
            Ok(_) => HotbarError::EmptySlot(key),
            Err(err) => err,
        })?;
        router.start_targeting(skill_id)?;
        Ok(skill_id.to_string())
    }

    /// `(key, skill id)` for every key, bound or not.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<&str>)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (index + 1, slot.as_deref()))
    }

    fn index(key: usize) -> Result<usize, HotbarError> {
        if (1..=HOTBAR_SLOTS).contains(&key) {
            Ok(key - 1)
        } else {
            Err(HotbarError::InvalidSlot(key))
        }
    }
}
