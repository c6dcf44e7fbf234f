//! Pending teleports keyed by player.

use scc::hash_map::Entry;
use skyblock_utils::Location;
use uuid::Uuid;

use super::timer::TimerHandle;

/// A countdown in flight for one player.
///
/// Records are never mutated after insertion; readers get their own copy.
#[derive(Clone, Debug)]
pub struct PendingTeleport {
    ticket: u64,
    origin: Location,
    timer: TimerHandle,
}

impl PendingTeleport {
    /// Creates a record.
    ///
    /// `ticket` must be unique per request so that a stale timer can never
    /// claim a newer request's entry.
    #[must_use]
    pub const fn new(ticket: u64, origin: Location, timer: TimerHandle) -> Self {
        Self {
            ticket,
            origin,
            timer,
        }
    }

    /// Identifies the request this record belongs to.
    #[must_use]
    pub const fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Where the player stood when the countdown started.
    #[must_use]
    pub const fn origin(&self) -> &Location {
        &self.origin
    }

    /// The countdown's timer.
    #[must_use]
    pub const fn timer(&self) -> &TimerHandle {
        &self.timer
    }

    /// Whether being at `to` means the player left the allowed radius.
    ///
    /// Exactly `cancel_distance` away still counts as standing still, and a
    /// position in another world never cancels.
    #[must_use]
    pub fn moved_too_far(&self, to: &Location, cancel_distance: f64) -> bool {
        self.origin
            .distance_in_world(to)
            .is_some_and(|distance| distance > cancel_distance)
    }
}

/// Thread-safe store of pending teleports, at most one per player.
///
/// Every operation is atomic on its own. Removal is how completion and
/// cancellation decide who won: only the caller that gets the record back may
/// act on it.
pub trait PendingTeleports: Send + Sync {
    /// Inserts `pending` for `subject`, returning the record it replaced.
    fn put(&self, subject: Uuid, pending: PendingTeleport) -> Option<PendingTeleport>;

    /// A copy of the current record for `subject`.
    fn get(&self, subject: &Uuid) -> Option<PendingTeleport>;

    /// Removes whatever record `subject` has. Removing nothing is not an error.
    fn remove(&self, subject: &Uuid) -> Option<PendingTeleport>;

    /// Removes the record for `subject` only if it belongs to `ticket`.
    fn remove_if_ticket(&self, subject: &Uuid, ticket: u64) -> Option<PendingTeleport>;

    /// Whether `subject` has a record.
    fn contains(&self, subject: &Uuid) -> bool;

    /// Number of records.
    fn len(&self) -> usize;

    /// Whether there are no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns every record.
    fn clear(&self) -> Vec<PendingTeleport>;
}

/// [`PendingTeleports`] on top of a lock-free `scc` hash map.
#[derive(Default)]
pub struct ConcurrentPendingTeleports {
    map: scc::HashMap<Uuid, PendingTeleport>,
}

impl ConcurrentPendingTeleports {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PendingTeleports for ConcurrentPendingTeleports {
    fn put(&self, subject: Uuid, pending: PendingTeleport) -> Option<PendingTeleport> {
        match self.map.entry(subject) {
            Entry::Occupied(mut occupied) => Some(occupied.insert(pending)),
            Entry::Vacant(vacant) => {
                vacant.insert_entry(pending);
                None
            }
        }
    }

    fn get(&self, subject: &Uuid) -> Option<PendingTeleport> {
        self.map.read(subject, |_, pending| pending.clone())
    }

    fn remove(&self, subject: &Uuid) -> Option<PendingTeleport> {
        self.map.remove(subject).map(|(_, pending)| pending)
    }

    fn remove_if_ticket(&self, subject: &Uuid, ticket: u64) -> Option<PendingTeleport> {
        self.map
            .remove_if(subject, |pending| pending.ticket == ticket)
            .map(|(_, pending)| pending)
    }

    fn contains(&self, subject: &Uuid) -> bool {
        self.map.contains(subject)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn clear(&self) -> Vec<PendingTeleport> {
        let mut drained = Vec::new();
        self.map.retain(|_, pending| {
            drained.push(pending.clone());
            false
        });
        drained
    }
}

#[cfg(test)]
mod tests {
    use skyblock_utils::WorldId;

    use super::*;

    fn at(world: &str, x: f64, y: f64, z: f64) -> Location {
        Location::new(WorldId::from(world), x, y, z)
    }

    fn record(ticket: u64) -> PendingTeleport {
        PendingTeleport::new(ticket, at("world", 0.0, 0.0, 0.0), TimerHandle::new())
    }

    #[test]
    fn put_replaces_and_returns_previous() {
        let store = ConcurrentPendingTeleports::new();
        let id = Uuid::new_v4();

        assert!(store.put(id, record(1)).is_none());
        let previous = store.put(id, record(2)).expect("replaced");
        assert_eq!(previous.ticket(), 1);
        assert_eq!(store.get(&id).map(|p| p.ticket()), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let store = ConcurrentPendingTeleports::new();
        let id = Uuid::new_v4();
        store.put(id, record(7));

        assert_eq!(store.remove(&id).map(|p| p.ticket()), Some(7));
        assert!(store.remove(&id).is_none());
        assert!(store.remove(&Uuid::new_v4()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn stale_ticket_cannot_remove_newer_record() {
        let store = ConcurrentPendingTeleports::new();
        let id = Uuid::new_v4();
        store.put(id, record(1));
        store.put(id, record(2));

        assert!(store.remove_if_ticket(&id, 1).is_none());
        assert!(store.contains(&id));
        assert_eq!(store.remove_if_ticket(&id, 2).map(|p| p.ticket()), Some(2));
        assert!(!store.contains(&id));
    }

    #[test]
    fn clear_drains_everything() {
        let store = ConcurrentPendingTeleports::new();
        for ticket in 0..5 {
            store.put(Uuid::new_v4(), record(ticket));
        }

        let mut tickets: Vec<u64> = store.clear().iter().map(PendingTeleport::ticket).collect();
        tickets.sort_unstable();
        assert_eq!(tickets, vec![0, 1, 2, 3, 4]);
        assert!(store.is_empty());
    }

    #[test]
    fn cancel_rule_is_strict_and_world_bound() {
        let pending = record(1);

        assert!(!pending.moved_too_far(&at("world", 0.0, 0.0, 0.2), 0.2));
        assert!(pending.moved_too_far(&at("world", 0.0, 0.0, 0.3), 0.2));
        assert!(!pending.moved_too_far(&at("nether", 500.0, 0.0, 500.0), 0.2));
    }
}
