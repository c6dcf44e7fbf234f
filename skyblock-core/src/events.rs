//! Player movement events.
//!
//! The host fires a [`PlayerMoveEvent`] for every position update. Listeners
//! subscribe explicitly through a [`MoveEventBus`].

use std::sync::Arc;

use skyblock_utils::Location;
use skyblock_utils::locks::SyncRwLock;

use crate::host::TeleportSubject;

/// A player changed position.
pub struct PlayerMoveEvent<'a> {
    /// The player that moved.
    pub subject: &'a dyn TeleportSubject,
    /// The new position, if the host could resolve one.
    pub to: Option<Location>,
    /// Whether another handler already cancelled the move.
    pub cancelled: bool,
}

/// Receives movement events.
pub trait MoveListener: Send + Sync {
    /// Called for every position update. Runs on the movement hot path.
    fn on_player_move(&self, event: &PlayerMoveEvent<'_>);
}

/// Something listeners can subscribe to.
pub trait MoveEventBus: Send + Sync {
    /// Registers `listener` for all future events.
    fn subscribe(&self, listener: Arc<dyn MoveListener>);
}

/// Fans each event out to every subscribed listener in subscription order.
#[derive(Default)]
pub struct MoveDispatcher {
    listeners: SyncRwLock<Vec<Arc<dyn MoveListener>>>,
}

impl MoveDispatcher {
    /// Creates a dispatcher with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to every listener.
    pub fn dispatch(&self, event: &PlayerMoveEvent<'_>) {
        for listener in self.listeners.read().iter() {
            listener.on_player_move(event);
        }
    }

    /// Number of subscribed listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl MoveEventBus for MoveDispatcher {
    fn subscribe(&self, listener: Arc<dyn MoveListener>) {
        self.listeners.write().push(listener);
    }
}
