//! GPS-displacement check that weeds out false motion events.
//!
//! When the detector fires, the filter listens for one live fix and compares
//! it with the baseline captured when scanning paused. A fix closer than the
//! minimum distance means the device never really moved (vibration, a phone
//! riding in a car) and the motion is rejected. Every other outcome accepts
//! the motion: no baseline, no fix within the window, or a GPS baseline
//! older than the warm window.

use std::sync::Arc;
use std::time::Instant;

use motion_traits::clock::Clock;
use motion_traits::scheduler::{Scheduler, TimerHandle};
use motion_traits::{LocationProvider, LocationSample};

use crate::config::FilterCfg;
use crate::geo;
use crate::hw_error::map_hw_error;
use crate::scheduler::TimerEvent;
use crate::signal::{ConfirmReason, Verdict};

/// An open listening window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSession {
    pub started_at: Instant,
    timeout: TimerHandle,
}

impl FilterSession {
    pub fn timeout_handle(&self) -> TimerHandle {
        self.timeout
    }
}

/// Result of trying to open a verification window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStart {
    Opened,
    /// Nothing cached to compare against; the filter stays out of the way.
    NoBaseline,
    /// The location provider refused live updates.
    SubscriptionFailed,
}

pub struct FalsePositiveFilter {
    location: Box<dyn LocationProvider>,
    clock: Arc<dyn Clock + Send + Sync>,
    cfg: FilterCfg,
    min_motion_distance_m: f64,
    last_location: Option<LocationSample>,
    // Warmth clock: first use since the last reset
    warm_since: Option<Instant>,
    session: Option<FilterSession>,
}

impl core::fmt::Debug for FalsePositiveFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FalsePositiveFilter")
            .field("min_motion_distance_m", &self.min_motion_distance_m)
            .field("has_baseline", &self.last_location.is_some())
            .field("warm_since", &self.warm_since)
            .field("listening", &self.session.is_some())
            .finish()
    }
}

impl FalsePositiveFilter {
    pub fn new(
        location: Box<dyn LocationProvider>,
        clock: Arc<dyn Clock + Send + Sync>,
        cfg: FilterCfg,
        min_motion_distance_m: f64,
    ) -> Self {
        Self {
            location,
            clock,
            cfg,
            min_motion_distance_m,
            last_location: None,
            warm_since: None,
            session: None,
        }
    }

    pub fn cfg(&self) -> &FilterCfg {
        &self.cfg
    }

    pub fn min_motion_distance_m(&self) -> f64 {
        self.min_motion_distance_m
    }

    pub fn set_min_motion_distance_m(&mut self, meters: f64) {
        self.min_motion_distance_m = meters;
    }

    /// Cached baseline fix, if any.
    pub fn last_location(&self) -> Option<&LocationSample> {
        self.last_location.as_ref()
    }

    /// When the warmth clock was started, if it is running.
    pub fn warm_since(&self) -> Option<Instant> {
        self.warm_since
    }

    pub fn session(&self) -> Option<&FilterSession> {
        self.session.as_ref()
    }

    pub fn is_listening(&self) -> bool {
        self.session.is_some()
    }

    fn init_warmth(&mut self) {
        if self.warm_since.is_none() {
            self.warm_since = Some(self.clock.now());
        }
    }

    /// Refresh the baseline when scanning pauses.
    ///
    /// Ends any open session and starts the warmth clock if it isn't running.
    /// An existing baseline is kept; otherwise the provider's last-known fix
    /// is taken (which may be none).
    pub fn update_location(&mut self, scheduler: &mut dyn Scheduler<TimerEvent>) {
        self.end_session(scheduler);
        self.init_warmth();

        if self.last_location.is_none() {
            self.last_location = self.location.last_known_location();
            tracing::debug!(
                found = self.last_location.is_some(),
                "refreshed false-positive filter baseline"
            );
        }
    }

    /// True while the warmth clock is younger than the warm window.
    pub fn is_gps_still_warm(&mut self) -> bool {
        self.init_warmth();
        let since = self.warm_since.unwrap_or_else(|| self.clock.now());
        self.clock.now().saturating_duration_since(since) < self.cfg.warm_window
    }

    /// Open a verification window: subscribe to live fixes and arm the
    /// session timeout. Any previous window is closed first.
    pub fn start_session(&mut self, scheduler: &mut dyn Scheduler<TimerEvent>) -> SessionStart {
        self.end_session(scheduler);

        if self.last_location.is_none() {
            tracing::debug!("no baseline fix; skipping verification");
            return SessionStart::NoBaseline;
        }

        if let Err(e) = self.location.subscribe() {
            let err = map_hw_error(&*e);
            tracing::warn!(error = %err, "location updates unavailable; accepting motion");
            return SessionStart::SubscriptionFailed;
        }

        let timeout = scheduler.schedule(self.cfg.session_timeout, TimerEvent::SessionTimeout);
        self.session = Some(FilterSession {
            started_at: self.clock.now(),
            timeout,
        });
        tracing::debug!(
            timeout_ms = self.cfg.session_timeout.as_millis() as u64,
            "verification window opened"
        );
        SessionStart::Opened
    }

    /// Drop the subscription and the session timeout. Safe to call anytime.
    pub fn end_session(&mut self, scheduler: &mut dyn Scheduler<TimerEvent>) {
        self.location.unsubscribe();
        if let Some(session) = self.session.take() {
            scheduler.cancel(session.timeout);
        }
    }

    /// Forget the baseline and stop the warmth clock.
    pub fn reset(&mut self, scheduler: &mut dyn Scheduler<TimerEvent>) {
        self.end_session(scheduler);
        self.warm_since = None;
        self.last_location = None;
    }

    /// Judge a live fix. Updates outside an open window are ignored.
    pub fn on_location_update(
        &mut self,
        fix: LocationSample,
        scheduler: &mut dyn Scheduler<TimerEvent>,
    ) -> Option<Verdict> {
        let session = self.session?;
        let elapsed = self.clock.now().saturating_duration_since(session.started_at);
        self.end_session(scheduler);

        if elapsed >= self.cfg.session_timeout {
            tracing::debug!(
                elapsed_ms = elapsed.as_millis() as u64,
                "fix arrived after the window closed"
            );
            return Some(Verdict::Confirmed(ConfirmReason::SessionTimedOut));
        }

        let Some(baseline) = self.last_location else {
            return Some(Verdict::Confirmed(ConfirmReason::NoBaseline));
        };

        let distance_m = geo::distance_m(&baseline, &fix);
        if distance_m < self.min_motion_distance_m {
            // Keep the baseline: the next cycle compares against the same spot
            tracing::info!(distance_m, "not moved; rejecting motion");
            Some(Verdict::Rejected { distance_m })
        } else {
            tracing::debug!(distance_m, "moved; motion confirmed");
            self.reset(scheduler);
            Some(Verdict::Confirmed(ConfirmReason::Displaced { distance_m }))
        }
    }

    /// The session timer fired with no fix received. Fails open.
    pub fn on_session_timeout(
        &mut self,
        scheduler: &mut dyn Scheduler<TimerEvent>,
    ) -> Option<Verdict> {
        if self.session.is_none() {
            return None;
        }
        self.end_session(scheduler);
        tracing::debug!("verification window expired without a fix; accepting motion");
        Some(Verdict::Confirmed(ConfirmReason::SessionTimedOut))
    }
}
