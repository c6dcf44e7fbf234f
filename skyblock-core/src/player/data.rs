//! Saved per-player island data: homes, challenge progress, bans and team.
//!
//! Challenge names are case-insensitive. They are stored lowercase and every
//! lookup lowercases its argument first.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Team membership of a player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamData {
    /// Whether the player is in a team at all.
    pub in_team: bool,
    /// Name of the team leader.
    pub leader: Option<String>,
    /// Serialized location of the team island.
    pub island_location: Option<String>,
    /// Names of the team members.
    pub members: Vec<String>,
}

/// Everything the plugin remembers about one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerData {
    /// The player's name.
    pub player_name: String,
    /// How many home slots the player may use.
    pub homes: u32,
    /// Island resets the player has left.
    pub reset_left: i32,
    /// Challenge name to completion flag.
    challenges: FxHashMap<String, bool>,
    /// Challenge name to number of completions.
    challenge_times: FxHashMap<String, u32>,
    /// Players banned from this player's island.
    pub ban_list: Vec<String>,
    /// Team membership.
    pub team: TeamData,
}

impl PlayerData {
    /// Creates data for a fresh player.
    pub fn new(player_name: impl Into<String>, homes: u32, reset_left: i32) -> Self {
        Self {
            player_name: player_name.into(),
            homes,
            reset_left,
            ..Self::default()
        }
    }

    /// Whether the challenge is known at all, completed or not.
    #[must_use]
    pub fn challenge_exists(&self, challenge: &str) -> bool {
        self.challenges.contains_key(&challenge.to_lowercase())
    }

    /// Whether the challenge is marked complete.
    #[must_use]
    pub fn check_challenge(&self, challenge: &str) -> bool {
        self.challenges
            .get(&challenge.to_lowercase())
            .copied()
            .unwrap_or(false)
    }

    /// How many times the challenge was completed.
    #[must_use]
    pub fn check_challenge_times(&self, challenge: &str) -> u32 {
        self.challenge_times
            .get(&challenge.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Completion flags for every known challenge.
    #[must_use]
    pub const fn challenge_status(&self) -> &FxHashMap<String, bool> {
        &self.challenges
    }

    /// Marks the challenge complete and bumps its completion count, even if
    /// it was already complete.
    pub fn complete_challenge(&mut self, challenge: &str) {
        let key = challenge.to_lowercase();
        *self.challenge_times.entry(key.clone()).or_insert(0) += 1;
        self.challenges.insert(key, true);
    }

    /// Whether `name` is banned from the island. Names compare
    /// case-insensitively.
    #[must_use]
    pub fn is_banned(&self, name: &str) -> bool {
        self.ban_list
            .iter()
            .any(|banned| banned.eq_ignore_ascii_case(name))
    }

    /// Bans `name`. Returns `false` if they were already banned.
    pub fn ban(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.is_banned(&name) {
            return false;
        }
        self.ban_list.push(name);
        true
    }

    /// Lifts the ban on `name`. Returns whether they were banned.
    pub fn unban(&mut self, name: &str) -> bool {
        let before = self.ban_list.len();
        self.ban_list
            .retain(|banned| !banned.eq_ignore_ascii_case(name));
        self.ban_list.len() != before
    }
}
