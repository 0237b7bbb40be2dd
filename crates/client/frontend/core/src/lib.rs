//! Cross-frontend primitives for presenting a battle.
//!
//! Houses the narration log, the local actor's status panel, the skill
//! catalog with its hotbar and the event consumer that both the console
//! client and future graphical clients can reuse.
pub mod config;
pub mod event;
pub mod frontend;
pub mod message;
pub mod skills;
pub mod status;

pub use config::{ChannelConfig, FrontendConfig, MessageConfig};
pub use event::{BattleLogConsumer, EventConsumer, EventImpact};
pub use frontend::Frontend;
pub use message::{MessageEntry, MessageLog};
pub use skills::{HOTBAR_SLOTS, Hotbar, HotbarError, Skill, SkillCatalog};
pub use status::{StatBar, StatusCard, StatusPanel};
