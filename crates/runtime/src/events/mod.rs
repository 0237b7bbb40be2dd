//! Topic-based event bus for runtime events.
//!
//! Every component publishes here instead of calling presentation code, so a
//! frontend only has to subscribe to the topics it renders.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{
    DamageIndicator, MessageLevel, NarrationEvent, PresentationEvent, Tone, TurnEvent,
};
