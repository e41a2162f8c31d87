//! Alien AI: line of sight and the stalking state machine

pub mod stalker;
pub mod vision;

pub use stalker::{Stalker, StalkerConfig, StalkerState};
pub use vision::{can_see_player, line_of_sight};
