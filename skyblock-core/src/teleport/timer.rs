//! One-shot timers with cancellable handles.
//!
//! [`TokioTimer`] runs on a tokio runtime. [`ManualTimer`] only moves forward
//! when told to, for hosts that drive timers from their own tick loop.

use std::time::Duration;

use skyblock_utils::locks::SyncMutex;
use tokio::runtime::Handle;
use tokio::task::spawn_blocking;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Work run when a timer fires.
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Cancellation capability for one scheduled timer.
///
/// Cancelling is idempotent, and cancelling a timer that already fired does
/// nothing.
#[derive(Clone, Debug, Default)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    /// Creates a handle that is not yet attached to a timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the timer from firing if it has not fired yet.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Schedules work to run once after a delay.
pub trait TimerService: Send + Sync {
    /// Arms `task` to run after `delay` unless `handle` is cancelled first.
    ///
    /// Taking the handle up front lets callers publish it before the timer can
    /// possibly fire.
    fn arm(&self, delay: Duration, handle: TimerHandle, task: TimerTask);

    /// Arms `task` under a fresh handle and returns that handle.
    fn schedule_once(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let handle = TimerHandle::new();
        self.arm(delay, handle.clone(), task);
        handle
    }
}

/// Timer backed by a tokio runtime.
///
/// Fired tasks run on the blocking pool, since they may wait on chunk loads
/// or inventory saves.
pub struct TokioTimer {
    runtime: Handle,
}

impl TokioTimer {
    /// Creates a timer that spawns onto `runtime`.
    #[must_use]
    pub const fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Creates a timer on the runtime of the calling task.
    ///
    /// # Panics
    /// Panics when called outside of a tokio runtime.
    #[must_use]
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl TimerService for TokioTimer {
    fn arm(&self, delay: Duration, handle: TimerHandle, task: TimerTask) {
        let token = handle.token;
        self.runtime.spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                () = sleep(delay) => {
                    if let Err(err) = spawn_blocking(task).await {
                        log::error!("Timer task panicked: {err}");
                    }
                }
            }
        });
    }
}

struct ManualEntry {
    due: Duration,
    seq: u64,
    handle: TimerHandle,
    task: TimerTask,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_seq: u64,
    queue: Vec<ManualEntry>,
}

/// Timer driven by explicit calls to [`advance`](Self::advance).
///
/// Tasks fire on the thread calling `advance`, in deadline order, with ties
/// broken by scheduling order.
#[derive(Default)]
pub struct ManualTimer {
    clock: SyncMutex<ManualClock>,
}

impl ManualTimer {
    /// Creates a timer at time zero with nothing scheduled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.lock().now
    }

    /// Timers that are armed and not cancelled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.clock
            .lock()
            .queue
            .iter()
            .filter(|entry| !entry.handle.is_cancelled())
            .count()
    }

    /// Moves time forward by `by`, firing every timer that comes due.
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.clock.lock().now + by;
        let mut fired = 0;

        loop {
            // The lock is released before running the task so it can arm new timers.
            let entry = {
                let mut clock = self.clock.lock();
                clock.queue.retain(|entry| !entry.handle.is_cancelled());
                let next = clock
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.due <= target)
                    .min_by_key(|(_, entry)| (entry.due, entry.seq))
                    .map(|(index, _)| index);

                let Some(index) = next else {
                    clock.now = target;
                    break;
                };
                let entry = clock.queue.swap_remove(index);
                clock.now = entry.due;
                entry
            };

            (entry.task)();
            fired += 1;
        }

        fired
    }
}

impl TimerService for ManualTimer {
    fn arm(&self, delay: Duration, handle: TimerHandle, task: TimerTask) {
        let mut clock = self.clock.lock();
        let seq = clock.next_seq;
        clock.next_seq += 1;
        let due = clock.now + delay;
        clock.queue.push(ManualEntry {
            due,
            seq,
            handle,
            task,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting_task(counter: &Arc<AtomicUsize>) -> TimerTask {
        let counter = counter.clone();
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn manual_timer_fires_only_when_due() {
        let timer = ManualTimer::new();
        let fired = Arc::new(AtomicUsize::new(0));
        timer.schedule_once(Duration::from_secs(2), counting_task(&fired));

        assert_eq!(timer.advance(Duration::from_millis(1999)), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(timer.advance(Duration::from_millis(1)), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timer.pending(), 0);
        assert_eq!(timer.now(), Duration::from_secs(2));
    }

    #[test]
    fn manual_timer_runs_in_deadline_order() {
        let timer = Arc::new(ManualTimer::new());
        let order = Arc::new(SyncMutex::new(Vec::new()));

        for (label, secs) in [("late", 3), ("early", 1), ("middle", 2)] {
            let order = order.clone();
            timer.schedule_once(
                Duration::from_secs(secs),
                Box::new(move || order.lock().push(label)),
            );
        }

        assert_eq!(timer.advance(Duration::from_secs(10)), 3);
        assert_eq!(*order.lock(), vec!["early", "middle", "late"]);
    }

    #[test]
    fn cancelled_manual_timer_never_fires() {
        let timer = ManualTimer::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let handle = timer.schedule_once(Duration::from_secs(1), counting_task(&fired));

        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(timer.pending(), 0);
        assert_eq!(timer.advance(Duration::from_secs(5)), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn task_can_arm_another_timer() {
        let timer = Arc::new(ManualTimer::new());
        let fired = Arc::new(AtomicUsize::new(0));

        let inner_timer = timer.clone();
        let inner_task = counting_task(&fired);
        timer.schedule_once(
            Duration::from_secs(1),
            Box::new(move || {
                inner_timer.schedule_once(Duration::from_secs(1), inner_task);
            }),
        );

        assert_eq!(timer.advance(Duration::from_secs(3)), 2);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timer_fires_after_delay() {
        let timer = TokioTimer::current();
        let (tx, rx) = tokio::sync::oneshot::channel();
        timer.schedule_once(
            Duration::from_secs(2),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );

        tokio::time::timeout(Duration::from_secs(3), rx)
            .await
            .expect("timer fired in time")
            .expect("sender kept alive");
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timer_cancel_is_final() {
        let timer = TokioTimer::current();
        let fired = Arc::new(AtomicUsize::new(0));
        let handle = timer.schedule_once(Duration::from_secs(2), counting_task(&fired));

        sleep(Duration::from_secs(1)).await;
        handle.cancel();
        sleep(Duration::from_secs(5)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        // Late cancels are harmless.
        handle.cancel();
    }
}
