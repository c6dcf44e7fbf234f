//! The game server as seen by the plugin.
//!
//! The plugin never touches server internals directly. Everything it needs,
//! from sending a chat line to loading a chunk, goes through these traits so
//! the teleport logic can run against a real server or the in-memory
//! [`memory`] host.

pub mod memory;

use skyblock_utils::{ChunkPos, Location, WorldId};
use uuid::Uuid;

use crate::player::GameMode;
use crate::teleport::TeleportMessage;

/// Permission that lets a player skip the teleport countdown.
pub const BYPASS_WAIT_PERMISSION: &str = "is.bypass.wait";

/// A player that can be teleported.
pub trait TeleportSubject: Send + Sync {
    /// Stable unique id of the player.
    fn uuid(&self) -> Uuid;

    /// Display name, used for logging.
    fn name(&self) -> &str;

    /// Where the player currently is.
    fn location(&self) -> Location;

    /// Whether the player holds `permission`.
    fn has_permission(&self, permission: &str) -> bool;

    /// Sends a chat message to the player.
    fn send_message(&self, message: &TeleportMessage);

    /// Moves the player to `destination`.
    fn teleport(&self, destination: &Location);

    /// Switches the player's game mode.
    fn set_game_mode(&self, mode: GameMode);
}

/// Server-wide services used while teleporting.
pub trait TeleportHost: Send + Sync {
    /// Whether `world` exists and can be teleported into.
    fn world_exists(&self, world: &WorldId) -> bool;

    /// Whether the chunk is already loaded.
    fn is_chunk_loaded(&self, world: &WorldId, chunk: ChunkPos) -> bool;

    /// Loads the chunk, blocking until it is available.
    fn load_chunk(&self, world: &WorldId, chunk: ChunkPos) -> anyhow::Result<()>;

    /// Persists the player's inventory.
    fn save_inventory(&self, subject: &dyn TeleportSubject) -> anyhow::Result<()>;

    /// Shows the "welcome to your island" title after arrival.
    fn show_arrival_title(&self, subject: &dyn TeleportSubject);
}
