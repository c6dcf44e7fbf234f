//! Completion and cancellation racing for the same teleport.
//!
//! Whatever the interleaving, each countdown must end in exactly one of
//! "arrived" or "cancelled".

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use skyblock_core::config::TeleportConfig;
use skyblock_core::events::{MoveDispatcher, PlayerMoveEvent};
use skyblock_core::host::TeleportSubject;
use skyblock_core::host::memory::{MemoryHost, MemoryPlayer};
use skyblock_core::teleport::timer::ManualTimer;
use skyblock_core::teleport::{ConcurrentPendingTeleports, TeleportMessage, TeleportScheduler};
use skyblock_utils::{Location, WorldId};

const PLAYERS: usize = 32;
const ROUNDS: usize = 50;

fn world(x: f64, y: f64, z: f64) -> Location {
    Location::new(WorldId::from("world"), x, y, z)
}

fn outcomes(player: &MemoryPlayer) -> (usize, usize) {
    let messages = player.messages();
    let arrived = messages
        .iter()
        .filter(|m| matches!(m, TeleportMessage::Arrived { .. }))
        .count();
    let cancelled = messages
        .iter()
        .filter(|m| matches!(m, TeleportMessage::Cancelled))
        .count();
    (arrived, cancelled)
}

#[test]
fn fire_and_cancel_resolve_exactly_once() {
    for round in 0..ROUNDS {
        let host = Arc::new(MemoryHost::new([WorldId::from("world")]));
        let timer = Arc::new(ManualTimer::new());
        let events = Arc::new(MoveDispatcher::new());
        let scheduler = TeleportScheduler::new(
            TeleportConfig::default(),
            host,
            timer.clone(),
            Arc::new(ConcurrentPendingTeleports::new()),
            &*events,
        );

        let players: Vec<Arc<MemoryPlayer>> = (0..PLAYERS)
            .map(|i| Arc::new(MemoryPlayer::new(format!("p{i}"), world(0.0, 0.0, 0.0))))
            .collect();
        for player in &players {
            scheduler
                .request_teleport(player.clone(), &world(100.0, 64.0, 100.0), false, 1)
                .expect("world exists");
        }

        let barrier = Arc::new(Barrier::new(2));

        let firing = {
            let barrier = barrier.clone();
            let timer = timer.clone();
            thread::spawn(move || {
                barrier.wait();
                timer.advance(Duration::from_secs(2))
            })
        };

        let moving = {
            let barrier = barrier.clone();
            let events = events.clone();
            let players = players.clone();
            thread::spawn(move || {
                barrier.wait();
                for player in &players {
                    let to = world(5.0, 0.0, 5.0);
                    events.dispatch(&PlayerMoveEvent {
                        subject: &**player,
                        to: Some(to),
                        cancelled: false,
                    });
                }
            })
        };

        firing.join().expect("timer thread");
        moving.join().expect("movement thread");

        for player in &players {
            let (arrived, cancelled) = outcomes(player);
            assert_eq!(
                arrived + cancelled,
                1,
                "round {round}: {} arrived {arrived} times and was cancelled {cancelled} times",
                player.name()
            );
            assert_eq!(player.teleports().len(), arrived);
        }
        assert_eq!(scheduler.pending_count(), 0, "round {round}");
    }
}
