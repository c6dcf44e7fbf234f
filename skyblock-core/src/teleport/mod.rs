//! Delayed island teleports.
//!
//! A teleport request either moves the player right away or starts a
//! countdown. While the countdown runs the player has to stay put: the
//! [`MovementObserver`] cancels the teleport as soon as they drift further
//! than the configured distance from where they started.
//!
//! Completion and cancellation race for the same entry in
//! [`PendingTeleports`]. Whichever side removes it acts on it; the other finds
//! nothing and does nothing.

mod message;
mod movement;
mod registry;
mod scheduler;
pub mod timer;

pub use message::TeleportMessage;
pub use movement::MovementObserver;
pub use registry::{ConcurrentPendingTeleports, PendingTeleport, PendingTeleports};
pub use scheduler::{TeleportOutcome, TeleportScheduler};

use skyblock_utils::WorldId;
use thiserror::Error;

/// An error that can occur when requesting a teleport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TeleportError {
    /// The destination world does not exist or is not loaded.
    #[error("Destination world {world} is unavailable")]
    DestinationUnavailable {
        /// The world that could not be resolved.
        world: WorldId,
    },
}
