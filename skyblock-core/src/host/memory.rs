//! In-memory host.
//!
//! Records every side effect instead of performing it. Used by the headless
//! simulation and by tests, where the recorded effects are what gets asserted.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::bail;
use rustc_hash::FxHashSet;
use skyblock_utils::locks::{SyncMutex, SyncRwLock};
use skyblock_utils::{ChunkPos, Location, WorldId};
use uuid::Uuid;

use super::{TeleportHost, TeleportSubject};
use crate::player::GameMode;
use crate::teleport::TeleportMessage;

/// A player that lives only in memory.
pub struct MemoryPlayer {
    uuid: Uuid,
    name: String,
    location: SyncMutex<Location>,
    permissions: FxHashSet<String>,
    messages: SyncMutex<Vec<TeleportMessage>>,
    teleports: SyncMutex<Vec<Location>>,
    game_mode: SyncMutex<Option<GameMode>>,
}

impl MemoryPlayer {
    /// Creates a player with a random id standing at `location`.
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            location: SyncMutex::new(location),
            permissions: FxHashSet::default(),
            messages: SyncMutex::new(Vec::new()),
            teleports: SyncMutex::new(Vec::new()),
            game_mode: SyncMutex::new(None),
        }
    }

    /// Grants `permission` to the player.
    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Walks the player to `location` without teleporting.
    pub fn walk_to(&self, location: Location) {
        *self.location.lock() = location;
    }

    /// Messages received so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<TeleportMessage> {
        self.messages.lock().clone()
    }

    /// Teleport destinations so far, oldest first.
    #[must_use]
    pub fn teleports(&self) -> Vec<Location> {
        self.teleports.lock().clone()
    }

    /// The last game mode the player was switched into.
    #[must_use]
    pub fn game_mode(&self) -> Option<GameMode> {
        *self.game_mode.lock()
    }
}

impl TeleportSubject for MemoryPlayer {
    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Location {
        self.location.lock().clone()
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    fn send_message(&self, message: &TeleportMessage) {
        log::debug!("[{}] {message}", self.name);
        self.messages.lock().push(message.clone());
    }

    fn teleport(&self, destination: &Location) {
        *self.location.lock() = destination.clone();
        self.teleports.lock().push(destination.clone());
    }

    fn set_game_mode(&self, mode: GameMode) {
        *self.game_mode.lock() = Some(mode);
    }
}

/// A server with a fixed set of worlds and lazily loaded chunks.
#[derive(Default)]
pub struct MemoryHost {
    worlds: SyncRwLock<FxHashSet<WorldId>>,
    loaded_chunks: SyncMutex<FxHashSet<(WorldId, ChunkPos)>>,
    chunk_loads: AtomicUsize,
    inventory_saves: AtomicUsize,
    titles_shown: AtomicUsize,
    fail_chunk_loads: AtomicBool,
    fail_inventory_saves: AtomicBool,
}

impl MemoryHost {
    /// Creates a host with the given worlds.
    pub fn new(worlds: impl IntoIterator<Item = WorldId>) -> Self {
        let host = Self::default();
        host.worlds.write().extend(worlds);
        host
    }

    /// Adds a world.
    pub fn add_world(&self, world: WorldId) {
        self.worlds.write().insert(world);
    }

    /// Makes every subsequent chunk load fail.
    pub fn fail_chunk_loads(&self, fail: bool) {
        self.fail_chunk_loads.store(fail, Ordering::Relaxed);
    }

    /// Makes every subsequent inventory save fail.
    pub fn fail_inventory_saves(&self, fail: bool) {
        self.fail_inventory_saves.store(fail, Ordering::Relaxed);
    }

    /// Number of chunk loads performed.
    #[must_use]
    pub fn chunk_loads(&self) -> usize {
        self.chunk_loads.load(Ordering::Relaxed)
    }

    /// Number of successful inventory saves.
    #[must_use]
    pub fn inventory_saves(&self) -> usize {
        self.inventory_saves.load(Ordering::Relaxed)
    }

    /// Number of arrival titles shown.
    #[must_use]
    pub fn titles_shown(&self) -> usize {
        self.titles_shown.load(Ordering::Relaxed)
    }
}

impl TeleportHost for MemoryHost {
    fn world_exists(&self, world: &WorldId) -> bool {
        self.worlds.read().contains(world)
    }

    fn is_chunk_loaded(&self, world: &WorldId, chunk: ChunkPos) -> bool {
        self.loaded_chunks.lock().contains(&(world.clone(), chunk))
    }

    fn load_chunk(&self, world: &WorldId, chunk: ChunkPos) -> anyhow::Result<()> {
        self.chunk_loads.fetch_add(1, Ordering::Relaxed);
        if self.fail_chunk_loads.load(Ordering::Relaxed) {
            bail!("chunk {},{} in {world} failed to load", chunk.x, chunk.z);
        }
        self.loaded_chunks.lock().insert((world.clone(), chunk));
        Ok(())
    }

    fn save_inventory(&self, subject: &dyn TeleportSubject) -> anyhow::Result<()> {
        if self.fail_inventory_saves.load(Ordering::Relaxed) {
            bail!("inventory store unavailable for {}", subject.name());
        }
        self.inventory_saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn show_arrival_title(&self, _subject: &dyn TeleportSubject) {
        self.titles_shown.fetch_add(1, Ordering::Relaxed);
    }
}
