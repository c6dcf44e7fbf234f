//! The teleport entry point used by island commands.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use skyblock_utils::Location;
use uuid::Uuid;

use super::movement::MovementObserver;
use super::registry::{PendingTeleport, PendingTeleports};
use super::timer::{TimerHandle, TimerService};
use super::{TeleportError, TeleportMessage};
use crate::config::TeleportConfig;
use crate::events::MoveEventBus;
use crate::host::{BYPASS_WAIT_PERMISSION, TeleportHost, TeleportSubject};
use crate::player::GameMode;

/// How a successful request was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeleportOutcome {
    /// The player was moved right away.
    Immediate,
    /// A countdown started.
    Scheduled,
}

/// Starts island teleports, with or without a countdown.
pub struct TeleportScheduler {
    config: TeleportConfig,
    host: Arc<dyn TeleportHost>,
    timer: Arc<dyn TimerService>,
    pending: Arc<dyn PendingTeleports>,
    next_ticket: AtomicU64,
}

impl TeleportScheduler {
    /// Creates a scheduler and subscribes its movement observer to `events`.
    pub fn new(
        config: TeleportConfig,
        host: Arc<dyn TeleportHost>,
        timer: Arc<dyn TimerService>,
        pending: Arc<dyn PendingTeleports>,
        events: &dyn MoveEventBus,
    ) -> Self {
        events.subscribe(Arc::new(MovementObserver::new(
            pending.clone(),
            config.cancel_distance,
        )));

        Self {
            config,
            host,
            timer,
            pending,
            next_ticket: AtomicU64::new(0),
        }
    }

    /// The settings this scheduler runs with.
    #[must_use]
    pub const fn config(&self) -> &TeleportConfig {
        &self.config
    }

    /// Teleports `subject` to the block at `destination`.
    ///
    /// Players with the bypass permission, forced requests and a zero delay
    /// are moved at once. Everyone else gets a countdown that movement can
    /// cancel. A new request replaces (and cancels) any countdown already
    /// running for the player. `slot` only changes the arrival message.
    pub fn request_teleport(
        &self,
        subject: Arc<dyn TeleportSubject>,
        destination: &Location,
        force: bool,
        slot: u32,
    ) -> Result<TeleportOutcome, TeleportError> {
        if !self.host.world_exists(&destination.world) {
            return Err(TeleportError::DestinationUnavailable {
                world: destination.world.clone(),
            });
        }

        let target = destination.block_centered();
        let id = subject.uuid();

        if force || self.config.is_instant() || subject.has_permission(BYPASS_WAIT_PERMISSION) {
            if let Some(previous) = self.pending.remove(&id) {
                previous.timer().cancel();
            }
            subject.teleport(&target);
            log::debug!("Teleported {} to {target}", subject.name());
            return Ok(TeleportOutcome::Immediate);
        }

        subject.send_message(&TeleportMessage::Delay {
            seconds: self.config.delay_seconds,
        });

        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let handle = TimerHandle::new();
        let origin = subject.location();

        // Publish the record before arming so a short timer can't fire first.
        if let Some(previous) = self
            .pending
            .put(id, PendingTeleport::new(ticket, origin, handle.clone()))
        {
            previous.timer().cancel();
            log::debug!("Replaced pending teleport for {}", subject.name());
        }

        let completion = Completion {
            ticket,
            slot,
            target,
            subject,
            host: self.host.clone(),
            pending: self.pending.clone(),
            save_inventory: self.config.save_inventory,
            game_mode: self.config.game_mode,
        };
        self.timer
            .arm(self.config.delay(), handle, Box::new(move || completion.run()));

        Ok(TeleportOutcome::Scheduled)
    }

    /// Drops the player's countdown without telling them, e.g. when they
    /// disconnect. Returns whether there was one.
    pub fn cancel_pending(&self, subject: &Uuid) -> bool {
        let Some(pending) = self.pending.remove(subject) else {
            return false;
        };
        pending.timer().cancel();
        true
    }

    /// Drops every countdown. Used on shutdown.
    pub fn cancel_all(&self) -> usize {
        let drained = self.pending.clear();
        for pending in &drained {
            pending.timer().cancel();
        }
        if !drained.is_empty() {
            log::info!("Cancelled {} pending teleports", drained.len());
        }
        drained.len()
    }

    /// Whether the player has a countdown running.
    #[must_use]
    pub fn has_pending(&self, subject: &Uuid) -> bool {
        self.pending.contains(subject)
    }

    /// Number of countdowns running.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// What happens when a countdown runs out.
struct Completion {
    ticket: u64,
    slot: u32,
    target: Location,
    subject: Arc<dyn TeleportSubject>,
    host: Arc<dyn TeleportHost>,
    pending: Arc<dyn PendingTeleports>,
    save_inventory: bool,
    game_mode: Option<GameMode>,
}

impl Completion {
    #[tracing::instrument(level = "debug", skip_all, fields(subject = self.subject.name(), slot = self.slot))]
    fn run(self) {
        let subject = &*self.subject;

        if self
            .pending
            .remove_if_ticket(&subject.uuid(), self.ticket)
            .is_none()
        {
            log::debug!("Teleport for {} was called off before it fired", subject.name());
            return;
        }

        if self.save_inventory {
            if let Err(err) = self.host.save_inventory(subject) {
                log::warn!("Failed to save inventory of {}: {err:#}", subject.name());
            }
        }

        let chunk = self.target.chunk();
        if !self.host.is_chunk_loaded(&self.target.world, chunk) {
            if let Err(err) = self.host.load_chunk(&self.target.world, chunk) {
                log::warn!(
                    "Failed to load chunk {},{} in {} for {}: {err:#}",
                    chunk.x,
                    chunk.z,
                    self.target.world,
                    subject.name()
                );
            }
        }

        subject.send_message(&TeleportMessage::Arrived { slot: self.slot });
        subject.teleport(&self.target);
        self.host.show_arrival_title(subject);

        if let Some(mode) = self.game_mode {
            subject.set_game_mode(mode);
        }

        log::info!("{} arrived at {}", subject.name(), self.target);
    }
}
