//! Virtual-clock scheduler for self-rescheduling tasks.
//!
//! Time only moves when the owner advances it. The owner pops due entries one
//! at a time, runs them to completion, and re-enqueues the ones that repeat.
//! Nothing runs concurrently, so a task never observes another half-way
//! through an update.
//!
//! Termination is explicit: every entry carries a [`CancelToken`], and a
//! cancelled entry is dropped instead of being returned.
//!
//! Repeating chains skip missed periods: however far one advance reaches, a
//! chain re-enqueued through [`Scheduler::repeat`] runs at most once in it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Shared cancellation flag for one task chain.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct Entry<T> {
    due: Duration,
    seq: u64,
    task: T,
    token: CancelToken,
}

/// A task whose time has come.
#[derive(Debug)]
pub struct Due<T> {
    pub task: T,
    pub token: CancelToken,
    /// The instant the task was due, on the scheduler's clock.
    pub at: Duration,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    /// Furthest `until` handed to [`Scheduler::pop_due`].
    horizon: Duration,
    next_seq: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            horizon: Duration::ZERO,
            next_seq: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time on the virtual clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Enqueue a new task chain `delay` from now.
    pub fn schedule(&mut self, task: T, delay: Duration) -> CancelToken {
        let token = CancelToken::new();
        self.schedule_at(task, self.now.saturating_add(delay), token.clone());
        token
    }

    /// Re-enqueue a task that just ran, one `period` after it was due.
    ///
    /// Periods that have already elapsed within the current advance are
    /// skipped rather than replayed.
    pub fn repeat(&mut self, due: Due<T>, period: Duration) {
        let next = next_due(due.at, period, self.horizon);
        self.schedule_at(due.task, next, due.token);
    }

    fn schedule_at(&mut self, task: T, due: Duration, token: CancelToken) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            due,
            seq,
            task,
            token,
        });
    }

    /// Pop the earliest entry due at or before `until`, moving the clock to its
    /// due time. Entries due at the same instant come out in insertion order.
    pub fn pop_due(&mut self, until: Duration) -> Option<Due<T>> {
        self.horizon = self.horizon.max(until);
        self.entries.retain(|entry| !entry.token.is_cancelled());
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= until)
            .min_by_key(|(_, entry)| (entry.due, entry.seq))
            .map(|(index, _)| index)?;
        let entry = self.entries.swap_remove(index);
        self.now = self.now.max(entry.due);
        Some(Due {
            task: entry.task,
            token: entry.token,
            at: entry.due,
        })
    }

    /// Move the clock forward without running anything.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Drop every pending entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live (not cancelled) entries.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| !entry.token.is_cancelled())
            .count()
    }
}

/// First `last + k * period` (k >= 1) strictly after `horizon`.
fn next_due(last: Duration, period: Duration, horizon: Duration) -> Duration {
    let next = last.saturating_add(period);
    if next > horizon {
        return next;
    }
    // Zero periods fire once per advance.
    if period.is_zero() {
        return horizon.saturating_add(Duration::from_nanos(1));
    }
    let periods = (horizon - last).as_nanos() / period.as_nanos() + 1;
    u32::try_from(periods)
        .ok()
        .and_then(|n| period.checked_mul(n))
        .map_or(Duration::MAX, |step| last.saturating_add(step))
}
