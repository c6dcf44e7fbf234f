//! Per-player state owned by the plugin.

mod data;
mod game_mode;

pub use data::{PlayerData, TeamData};
pub use game_mode::GameMode;
