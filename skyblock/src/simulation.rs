//! Scripted players walking (or not) through island teleports.

use std::sync::Arc;
use std::time::Duration;

use skyblock_core::config::SkyblockConfig;
use skyblock_core::events::{MoveDispatcher, PlayerMoveEvent};
use skyblock_core::host::memory::{MemoryHost, MemoryPlayer};
use skyblock_core::host::{BYPASS_WAIT_PERMISSION, TeleportSubject};
use skyblock_core::teleport::timer::TimerService;
use skyblock_core::teleport::{
    ConcurrentPendingTeleports, TeleportMessage, TeleportOutcome, TeleportScheduler,
};
use skyblock_utils::{Location, WorldId};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Same cadence as a game server tick.
const TICK: Duration = Duration::from_millis(50);
/// Ticks to keep going after the longest countdown before giving up.
const GRACE_TICKS: u64 = 40;
const WORLD: &str = "skyblock";

#[derive(Clone, Copy, Debug)]
enum Behaviour {
    /// Doesn't touch the keyboard.
    StandStill,
    /// Shuffles in place, never leaving the allowed radius.
    Fidget,
    /// Walks off.
    Wander,
}

struct SimPlayer {
    player: Arc<MemoryPlayer>,
    behaviour: Behaviour,
    island: Location,
    slot: u32,
}

pub struct Simulation {
    scheduler: TeleportScheduler,
    events: MoveDispatcher,
    host: Arc<MemoryHost>,
    players: Vec<SimPlayer>,
    max_ticks: u64,
}

impl Simulation {
    pub fn new(config: &SkyblockConfig, timer: Arc<dyn TimerService>) -> Self {
        let world = WorldId::from(WORLD);
        let host = Arc::new(MemoryHost::new([world.clone()]));
        let events = MoveDispatcher::new();
        let scheduler = TeleportScheduler::new(
            config.teleport.clone(),
            host.clone(),
            timer,
            Arc::new(ConcurrentPendingTeleports::new()),
            &events,
        );

        let script = [
            ("Alice", Behaviour::StandStill, false),
            ("Bob", Behaviour::Wander, false),
            ("Carol", Behaviour::Fidget, false),
            ("Dave", Behaviour::Wander, true),
            ("Erin", Behaviour::StandStill, false),
        ];
        let players = script
            .into_iter()
            .zip(0_i32..)
            .map(|((name, behaviour, bypass), index)| {
                let spawn = Location::new(world.clone(), 0.5, 64.0, f64::from(index) * 4.0);
                let mut player = MemoryPlayer::new(name, spawn);
                if bypass {
                    player = player.with_permission(BYPASS_WAIT_PERMISSION);
                }
                SimPlayer {
                    player: Arc::new(player),
                    behaviour,
                    island: Location::new(world.clone(), f64::from(index) * 200.0, 64.0, 0.0),
                    slot: index.unsigned_abs() % 3 + 1,
                }
            })
            .collect();

        let max_ticks = u64::from(config.teleport.delay_seconds) * 20 + GRACE_TICKS;

        Self {
            scheduler,
            events,
            host,
            players,
            max_ticks,
        }
    }

    /// Every player asks to go to their island.
    pub fn start(&self) -> anyhow::Result<()> {
        for sim in &self.players {
            let outcome =
                self.scheduler
                    .request_teleport(sim.player.clone(), &sim.island, false, sim.slot)?;
            log::info!(
                "{} ({:?}) requested island #{}: {outcome:?}",
                sim.player.name(),
                sim.behaviour,
                sim.slot
            );
        }
        Ok(())
    }

    /// Ticks until every teleport is resolved, the tick budget runs out or
    /// `cancel_token` fires.
    pub async fn run(&self, cancel_token: CancellationToken) {
        let mut tick = 0;

        while !self.all_resolved() {
            if tick >= self.max_ticks {
                log::warn!("Gave up after {tick} ticks");
                self.scheduler.cancel_all();
                break;
            }

            tokio::select! {
                () = cancel_token.cancelled() => {
                    self.scheduler.cancel_all();
                    break;
                }
                () = sleep(TICK) => {}
            }

            self.tick(tick);
            tick += 1;
        }
    }

    fn tick(&self, tick: u64) {
        for sim in &self.players {
            if !self.scheduler.has_pending(&sim.player.uuid()) {
                continue;
            }

            let step = match sim.behaviour {
                Behaviour::StandStill => continue,
                Behaviour::Fidget if tick % 2 == 0 => 0.05,
                Behaviour::Fidget => -0.05,
                Behaviour::Wander => 0.15,
            };

            let mut to = sim.player.location();
            to.position.x += step;
            sim.player.walk_to(to.clone());
            self.events.dispatch(&PlayerMoveEvent {
                subject: &*sim.player,
                to: Some(to),
                cancelled: false,
            });
        }
    }

    fn all_resolved(&self) -> bool {
        self.players.iter().all(|sim| {
            !sim.player.teleports().is_empty()
                || sim.player.messages().contains(&TeleportMessage::Cancelled)
        })
    }

    pub fn report(&self) {
        let mut arrived = 0;
        let mut cancelled = 0;

        for sim in &self.players {
            let player = &sim.player;
            if let Some(destination) = player.teleports().last() {
                arrived += 1;
                tracing::info!(player = player.name(), %destination, "Arrived");
            } else if player.messages().contains(&TeleportMessage::Cancelled) {
                cancelled += 1;
                tracing::info!(player = player.name(), location = %player.location(), "Cancelled");
            } else {
                tracing::warn!(player = player.name(), "Unresolved");
            }
        }

        tracing::info!(
            arrived,
            cancelled,
            chunk_loads = self.host.chunk_loads(),
            titles = self.host.titles_shown(),
            "Simulation finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use skyblock_core::teleport::timer::ManualTimer;

    use super::*;

    #[test]
    fn script_resolves_every_player() {
        let timer = Arc::new(ManualTimer::new());
        let simulation = Simulation::new(&SkyblockConfig::default(), timer.clone());
        simulation.start().expect("world exists");

        for tick in 0..simulation.max_ticks {
            simulation.tick(tick);
            timer.advance(TICK);
        }

        assert!(simulation.all_resolved());
        assert_eq!(simulation.scheduler.pending_count(), 0);
        let by_name = |name: &str| {
            simulation
                .players
                .iter()
                .find(|sim| sim.player.name() == name)
                .expect("scripted player")
        };
        assert_eq!(by_name("Alice").player.teleports().len(), 1);
        assert_eq!(by_name("Carol").player.teleports().len(), 1);
        assert!(by_name("Bob").player.teleports().is_empty());
        // Bypass players never get a countdown to walk out of.
        assert_eq!(by_name("Dave").player.teleports().len(), 1);
        assert_eq!(
            by_name("Erin").player.messages().last(),
            Some(&TeleportMessage::Arrived { slot: 2 })
        );
    }

    #[test]
    fn immediate_outcome_for_bypass() {
        let timer = Arc::new(ManualTimer::new());
        let simulation = Simulation::new(&SkyblockConfig::default(), timer);
        let dave = simulation
            .players
            .iter()
            .find(|sim| sim.player.name() == "Dave")
            .expect("scripted player");

        assert_eq!(
            simulation
                .scheduler
                .request_teleport(dave.player.clone(), &dave.island, false, 1),
            Ok(TeleportOutcome::Immediate)
        );
    }
}
