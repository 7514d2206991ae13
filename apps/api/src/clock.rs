//! Clock capability: wall-clock time plus delayed callbacks.
//!
//! All timer use in the workflow (smart generation delay, print-dialog delay) goes
//! through this trait so tests can drive time by hand with [`ManualClock`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A callback run once when its timer fires.
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Identifies a scheduled callback so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

pub trait Clock: Send + Sync {
    /// Current wall-clock time (used for submission timestamps).
    fn now(&self) -> DateTime<Utc>;

    /// Runs `task` once after `delay`.
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle;

    /// Cancels a pending callback. Cancelling a fired or unknown handle is a no-op.
    fn cancel(&self, handle: TimerHandle);
}

// ────────────────────────────────────────────────────────────────────────────
// Tokio clock
// ────────────────────────────────────────────────────────────────────────────

/// Production clock backed by `tokio::time`. Must be used from within a runtime.
#[derive(Default)]
pub struct TokioClock {
    next_id: AtomicU64,
    timers: Arc<Mutex<HashMap<u64, JoinHandle<()>>>>,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("No tokio runtime available, timer {id} dropped: {e}");
                return TimerHandle(id);
            }
        };

        // Hold the map lock across spawn so the task cannot remove itself before insertion.
        let timers = Arc::clone(&self.timers);
        let mut pending = lock(&self.timers);
        let join = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            lock(&timers).remove(&id);
            task();
        });
        pending.insert(id, join);

        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(join) = lock(&self.timers).remove(&handle.0) {
            debug!("Cancelled timer {}", handle.0);
            join.abort();
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Manual clock
// ────────────────────────────────────────────────────────────────────────────

struct PendingTimer {
    id: u64,
    due: Duration,
    task: TimerTask,
}

/// Deterministic clock for tests and headless drivers. Time only moves on [`advance`].
///
/// [`advance`]: ManualClock::advance
pub struct ManualClock {
    next_id: AtomicU64,
    state: Mutex<ManualState>,
}

struct ManualState {
    now: DateTime<Utc>,
    elapsed: Duration,
    pending: Vec<PendingTimer>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            state: Mutex::new(ManualState {
                now: start,
                elapsed: Duration::ZERO,
                pending: Vec::new(),
            }),
        }
    }

    /// Moves time forward and runs every callback that became due, in due order.
    /// Callbacks scheduled by a running callback fire too if they fall inside the window.
    pub fn advance(&self, by: Duration) {
        let target = lock(&self.state).elapsed + by;

        loop {
            let next = {
                let mut state = lock(&self.state);
                let due_idx = state
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.id))
                    .map(|(idx, _)| idx);
                match due_idx {
                    Some(idx) => {
                        let timer = state.pending.remove(idx);
                        move_to(&mut state, timer.due);
                        Some(timer.task)
                    }
                    None => {
                        move_to(&mut state, target);
                        None
                    }
                }
            };

            // Run outside the lock; the task may schedule or cancel timers.
            match next {
                Some(task) => task(),
                None => break,
            }
        }
    }

    /// Number of callbacks still waiting to fire.
    pub fn pending_count(&self) -> usize {
        lock(&self.state).pending.len()
    }
}

fn move_to(state: &mut ManualState, elapsed: Duration) {
    if elapsed > state.elapsed {
        let step = elapsed - state.elapsed;
        state.now += chrono::Duration::from_std(step).unwrap_or_else(|_| chrono::Duration::zero());
        state.elapsed = elapsed;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        lock(&self.state).now
    }

    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut state = lock(&self.state);
        let due = state.elapsed + delay;
        state.pending.push(PendingTimer { id, due, task });
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        lock(&self.state).pending.retain(|t| t.id != handle.0);
    }
}

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
