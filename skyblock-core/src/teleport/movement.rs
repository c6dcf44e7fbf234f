//! Cancels pending teleports when players walk away.

use std::sync::Arc;

use skyblock_utils::Location;

use super::TeleportMessage;
use super::registry::PendingTeleports;
use crate::events::{MoveListener, PlayerMoveEvent};
use crate::host::TeleportSubject;

/// Watches movement and calls off teleports for players who moved too far.
///
/// Runs for every position update on the server, so the common case (no
/// pending teleport) is a single map lookup.
pub struct MovementObserver {
    pending: Arc<dyn PendingTeleports>,
    cancel_distance: f64,
}

impl MovementObserver {
    /// Creates an observer over `pending` with the given radius.
    #[must_use]
    pub fn new(pending: Arc<dyn PendingTeleports>, cancel_distance: f64) -> Self {
        Self {
            pending,
            cancel_distance,
        }
    }

    /// Evaluates one position update. Returns `true` if it cancelled a
    /// teleport.
    pub fn on_position_changed(
        &self,
        subject: &dyn TeleportSubject,
        to: Option<&Location>,
        cancelled: bool,
    ) -> bool {
        if cancelled {
            return false;
        }
        let Some(to) = to else {
            return false;
        };

        let id = subject.uuid();
        let Some(pending) = self.pending.get(&id) else {
            return false;
        };
        if !pending.moved_too_far(to, self.cancel_distance) {
            return false;
        }

        // The timer may have fired in the meantime; if so it owns the entry.
        let Some(pending) = self.pending.remove_if_ticket(&id, pending.ticket()) else {
            return false;
        };
        pending.timer().cancel();
        subject.send_message(&TeleportMessage::Cancelled);
        log::debug!(
            "Cancelled teleport for {}: moved from {} to {to}",
            subject.name(),
            pending.origin()
        );
        true
    }
}

impl MoveListener for MovementObserver {
    fn on_player_move(&self, event: &PlayerMoveEvent<'_>) {
        self.on_position_changed(event.subject, event.to.as_ref(), event.cancelled);
    }
}
