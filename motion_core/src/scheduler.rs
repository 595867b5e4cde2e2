//! Deterministic timer queue driven by an injected `Clock`.
//!
//! The queue never runs anything on its own. The event loop asks for the
//! next deadline, lets time pass (really or on a `ManualClock`), then drains
//! due events with `pop_due` and hands them to the controller.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use motion_traits::clock::Clock;
use motion_traits::scheduler::{Scheduler, TimerHandle};

/// Timers owned by the motion controller and its filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerEvent {
    /// Debounce elapsed: arm the motion detector.
    ArmDetector,
    /// Verification window elapsed without a location update.
    SessionTimeout,
}

/// Fallback horizon when `now + delay` would overflow `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

pub struct TimerQueue<E> {
    clock: Arc<dyn Clock + Send + Sync>,
    next_id: u64,
    timers: BTreeMap<TimerHandle, (Instant, E)>,
}

impl<E> core::fmt::Debug for TimerQueue<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.timers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<E> TimerQueue<E> {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            clock,
            next_id: 1,
            timers: BTreeMap::new(),
        }
    }

    /// Deadline of a specific pending timer.
    pub fn deadline(&self, handle: TimerHandle) -> Option<Instant> {
        self.timers.get(&handle).map(|(at, _)| *at)
    }

    /// Earliest due entry; ties go to the timer scheduled first.
    fn earliest(&self) -> Option<(TimerHandle, Instant)> {
        self.timers
            .iter()
            .map(|(h, (at, _))| (*h, *at))
            .min_by_key(|(h, at)| (*at, *h))
    }
}

impl<E> Scheduler<E> for TimerQueue<E> {
    fn schedule(&mut self, delay: Duration, event: E) -> TimerHandle {
        let now = self.clock.now();
        let deadline = now
            .checked_add(delay)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let handle = TimerHandle::from_raw(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.timers.insert(handle, (deadline, event));
        tracing::trace!(
            timer = handle.id(),
            delay_ms = delay.as_millis() as u64,
            "timer scheduled"
        );
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let removed = self.timers.remove(&handle).is_some();
        if removed {
            tracing::trace!(timer = handle.id(), "timer cancelled");
        }
        removed
    }

    fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }

    fn pending(&self) -> usize {
        self.timers.len()
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.earliest().map(|(_, at)| at)
    }

    fn pop_due(&mut self) -> Option<E> {
        let (handle, at) = self.earliest()?;
        if at > self.clock.now() {
            return None;
        }
        self.timers.remove(&handle).map(|(_, ev)| ev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motion_traits::ManualClock;

    fn queue() -> (ManualClock, TimerQueue<&'static str>) {
        let clock = ManualClock::new();
        let q = TimerQueue::new(Arc::new(clock.clone()));
        (clock, q)
    }

    #[test]
    fn nothing_is_due_before_deadline() {
        let (clock, mut q) = queue();
        q.schedule(Duration::from_secs(5), "arm");
        clock.advance(Duration::from_millis(4999));
        assert_eq!(q.pop_due(), None);
        clock.advance(Duration::from_millis(1));
        assert_eq!(q.pop_due(), Some("arm"));
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let (clock, mut q) = queue();
        let h = q.schedule(Duration::from_secs(1), "stale");
        assert!(q.cancel(h));
        assert!(!q.cancel(h));
        clock.advance(Duration::from_secs(2));
        assert_eq!(q.pop_due(), None);
    }

    #[test]
    fn due_timers_pop_in_deadline_order() {
        let (clock, mut q) = queue();
        q.schedule(Duration::from_secs(3), "late");
        q.schedule(Duration::from_secs(1), "early");
        q.schedule(Duration::from_secs(1), "early-second");
        clock.advance(Duration::from_secs(10));
        assert_eq!(q.pop_due(), Some("early"));
        assert_eq!(q.pop_due(), Some("early-second"));
        assert_eq!(q.pop_due(), Some("late"));
        assert_eq!(q.pop_due(), None);
    }

    #[test]
    fn next_deadline_tracks_earliest() {
        let (clock, mut q) = queue();
        let t0 = clock.now();
        let late = q.schedule(Duration::from_secs(30), "late");
        q.schedule(Duration::from_secs(20), "soon");
        assert_eq!(q.next_deadline(), Some(t0 + Duration::from_secs(20)));
        assert_eq!(q.deadline(late), Some(t0 + Duration::from_secs(30)));
    }

    #[test]
    fn handles_are_not_reused() {
        let (_clock, mut q) = queue();
        let a = q.schedule(Duration::ZERO, "a");
        q.cancel(a);
        let b = q.schedule(Duration::ZERO, "b");
        assert_ne!(a, b);
        assert!(!q.is_pending(a));
        assert!(q.is_pending(b));
    }
}
