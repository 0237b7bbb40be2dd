//! Public runtime API surface: errors and presentation collaborators.

pub mod errors;
pub mod view;

pub use errors::{BattleError, Result};
pub use view::{ActorView, HeadlessView, StatusDisplay, VisualHandle};
