use std::time::{Duration, Instant};

/// Opaque handle for a scheduled timer. Handles are never reused by a
/// scheduler instance, so a stale handle can't cancel a newer timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    #[inline]
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Single-threaded cooperative timer facility.
///
/// Instead of running callbacks itself, the scheduler hands due events back
/// to whoever drives the event loop (`pop_due`), which dispatches them to
/// their owner. Cancellation is explicit: a cancelled event is never
/// returned by `pop_due`.
pub trait Scheduler<E> {
    /// Schedule `event` to become due `delay` from now.
    fn schedule(&mut self, delay: Duration, event: E) -> TimerHandle;

    /// Cancel a pending timer. Returns false when it already fired or was
    /// cancelled before.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    fn is_pending(&self, handle: TimerHandle) -> bool;

    /// Number of timers still pending.
    fn pending(&self) -> usize;

    /// Deadline of the earliest pending timer.
    fn next_deadline(&self) -> Option<Instant>;

    /// Remove and return the earliest timer whose deadline has passed.
    fn pop_due(&mut self) -> Option<E>;
}
