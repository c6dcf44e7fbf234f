use std::fmt;

use serde::{Deserialize, Serialize};

/// Game mode a player can be switched into after arriving on their island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Normal survival play.
    Survival,
    /// Unlimited resources, flight.
    Creative,
    /// Survival without block breaking.
    Adventure,
    /// Invisible, no-clip observer.
    Spectator,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Survival => "survival",
            Self::Creative => "creative",
            Self::Adventure => "adventure",
            Self::Spectator => "spectator",
        })
    }
}
