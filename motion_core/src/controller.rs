//! The motion controller (`MotionController`).
//!
//! Decides when the motion detector listens and routes its events through
//! the false-positive filter.
//!
//! # State Machine
//!
//! ```text
//!          start()               debounce timer fires
//!  Idle ───────────► DebouncePending ───────────────────► Armed
//!   ▲                                                       │
//!   │         stop() / detector motion / fully stopped      │
//!   └───────────────────────────────────────────────────────┘
//! ```
//!
//! - **Idle:** scanning runs, or motion gating is off.
//! - **DebouncePending:** scanning paused; all motion is ignored until the
//!   debounce elapses, which caps how often false triggers can wake the
//!   scanner.
//! - **Armed:** the detector listens. The first motion event publishes
//!   `MotionDetected` and runs `stop()`, which may open a verification
//!   window in the filter.
//!
//! At most one debounce timer and one detector are ever live, and never both
//! at once.

use std::sync::Arc;
use std::time::Instant;

use motion_traits::clock::Clock;
use motion_traits::scheduler::{Scheduler, TimerHandle};
use motion_traits::{
    DetectorKind, LocationSample, MotionDetector, SensorPlatform, SensorReading,
};

use crate::config::{PreferenceStore, Preferences};
use crate::detector::select_detector;
use crate::filter::{FalsePositiveFilter, SessionStart};
use crate::hw_error::map_hw_error;
use crate::logger::DiagnosticSink;
use crate::scheduler::TimerEvent;
use crate::signal::{Broadcaster, ConfirmReason, MotionSignal, Verdict};

/// Externally visible controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    DebouncePending,
    Armed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetectorState {
    Idle,
    Armed,
}

pub struct MotionController {
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) scheduler: Box<dyn Scheduler<TimerEvent>>,
    platform: Box<dyn SensorPlatform>,
    pub(crate) preferences: Box<dyn PreferenceStore>,
    pub(crate) prefs: Preferences,
    pub(crate) detector: Box<dyn MotionDetector>,
    detector_state: DetectorState,
    // Debounce timer in flight; Some only while the detector is idle
    pending_arm: Option<TimerHandle>,
    pub(crate) filter: FalsePositiveFilter,
    pub(crate) broadcaster: Box<dyn Broadcaster>,
    pub(crate) sink: Box<dyn DiagnosticSink>,
}

impl core::fmt::Debug for MotionController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MotionController")
            .field("state", &self.state())
            .field("detector", &self.detector.kind())
            .field("prefs", &self.prefs)
            .field("filter", &self.filter)
            .finish()
    }
}

impl MotionController {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        clock: Arc<dyn Clock + Send + Sync>,
        scheduler: Box<dyn Scheduler<TimerEvent>>,
        platform: Box<dyn SensorPlatform>,
        preferences: Box<dyn PreferenceStore>,
        filter: FalsePositiveFilter,
        broadcaster: Box<dyn Broadcaster>,
        sink: Box<dyn DiagnosticSink>,
    ) -> Self {
        let prefs = preferences.load();
        let detector = select_detector(prefs.detector_kind, platform.as_ref());
        let mut filter = filter;
        filter.set_min_motion_distance_m(prefs.min_motion_distance_m);
        Self {
            clock,
            scheduler,
            platform,
            preferences,
            prefs,
            detector,
            detector_state: DetectorState::Idle,
            pending_arm: None,
            filter,
            broadcaster,
            sink,
        }
    }

    pub fn state(&self) -> ControllerState {
        match (self.detector_state, self.pending_arm) {
            (DetectorState::Armed, _) => ControllerState::Armed,
            (DetectorState::Idle, Some(_)) => ControllerState::DebouncePending,
            (DetectorState::Idle, None) => ControllerState::Idle,
        }
    }

    /// Variant currently selected.
    pub fn detector_kind(&self) -> DetectorKind {
        self.detector.kind()
    }

    /// Whether this controller's platform offers a significant-motion sensor.
    pub fn significant_motion_available(&self) -> bool {
        crate::detector::significant_motion_available(self.platform.as_ref())
    }

    /// Whether the detector itself reports it is listening.
    pub fn is_detector_active(&self) -> bool {
        self.detector.is_active()
    }

    /// Preferences snapshot in effect.
    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn filter(&self) -> &FalsePositiveFilter {
        &self.filter
    }

    /// Number of timers (debounce + session timeout) currently scheduled.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// When the next timer is due; the event loop should wake up then.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Scanning paused: arm the detector after the debounce window.
    ///
    /// No-op when motion gating is disabled, the detector is already armed,
    /// or a debounce timer is already pending.
    pub fn start(&mut self) {
        if !self.prefs.motion_enabled
            || self.detector_state == DetectorState::Armed
            || self.detector.is_active()
            || self.pending_arm.is_some()
        {
            tracing::trace!(state = ?self.state(), "start ignored");
            return;
        }

        self.cancel_pending_arm();

        let delay = self.prefs.debounce();
        self.sink
            .note(&format!("Sleep for {}ms", delay.as_millis()));
        tracing::debug!(
            debounce_ms = delay.as_millis() as u64,
            detector = %self.detector.kind(),
            "motion detection sleeping"
        );
        self.pending_arm = Some(self.scheduler.schedule(delay, TimerEvent::ArmDetector));

        self.filter.update_location(self.scheduler.as_mut());
    }

    /// Scanning resumes: disarm the detector and, if the GPS baseline is
    /// still warm, open a verification window.
    ///
    /// Returns a verdict when the outcome is known right away (filter
    /// skipped); `None` when nothing was armed or a window is now open.
    pub fn stop(&mut self) -> Option<Verdict> {
        if self.detector_state != DetectorState::Armed && !self.detector.is_active() {
            return None;
        }

        self.cancel_pending_arm();
        self.detector.disarm();
        self.detector_state = DetectorState::Idle;
        tracing::debug!("motion detector disarmed");

        if !self.filter.is_gps_still_warm() {
            tracing::info!("GPS baseline is cold; accepting motion unverified");
            return Some(Verdict::Confirmed(ConfirmReason::GpsCold));
        }

        match self.filter.start_session(self.scheduler.as_mut()) {
            SessionStart::Opened => None,
            SessionStart::NoBaseline => Some(Verdict::Confirmed(ConfirmReason::NoBaseline)),
            SessionStart::SubscriptionFailed => {
                Some(Verdict::Confirmed(ConfirmReason::SubscriptionFailed))
            }
        }
    }

    /// Scanning fully stopped (not merely paused).
    ///
    /// Tears down the detector and any timers, reloads preferences,
    /// re-selects the detector variant and clears the filter baseline.
    pub fn scanner_fully_stopped(&mut self) {
        self.cancel_pending_arm();
        self.detector.disarm();
        self.detector_state = DetectorState::Idle;

        let reloaded = self.preferences.load();
        match reloaded.validate() {
            Ok(()) => self.prefs = reloaded,
            Err(e) => tracing::warn!(
                error = %e,
                "reloaded preferences rejected; keeping previous snapshot"
            ),
        }
        self.filter
            .set_min_motion_distance_m(self.prefs.min_motion_distance_m);
        self.detector = select_detector(self.prefs.detector_kind, self.platform.as_ref());
        self.filter.reset(self.scheduler.as_mut());
        tracing::debug!(
            detector = %self.detector.kind(),
            enabled = self.prefs.motion_enabled,
            "scanner fully stopped; preferences reloaded"
        );
    }

    /// Feed a raw sensor event. Ignored unless the detector is armed.
    pub fn on_sensor(&mut self, reading: SensorReading) -> Option<Verdict> {
        if self.detector_state != DetectorState::Armed {
            return None;
        }
        if !self.detector.on_reading(&reading) {
            return None;
        }
        self.motion_detected()
    }

    /// Debug hook: act as if the armed detector just fired.
    pub fn debug_motion_detected(&mut self) -> Option<Verdict> {
        if self.detector_state != DetectorState::Armed && !self.detector.is_active() {
            return None;
        }
        self.sink.note("TEST: Major motion detected.");
        self.motion_detected()
    }

    /// Feed a live location fix to the filter.
    pub fn on_location_update(&mut self, fix: LocationSample) -> Option<Verdict> {
        let verdict = self
            .filter
            .on_location_update(fix, self.scheduler.as_mut())?;
        if let Some(d) = verdict.distance_m() {
            self.sink.note(&format!("Distance moved: {d:.1} m"));
        }
        if let Verdict::Rejected { .. } = verdict {
            self.sink.note("not moved");
            self.broadcaster.publish(MotionSignal::LocationNotChanging);
        }
        Some(verdict)
    }

    /// Dispatch every timer that is due by now. Verdicts produced by the
    /// dispatched timers are returned in firing order.
    pub fn poll(&mut self) -> Vec<Verdict> {
        let mut verdicts = Vec::new();
        while let Some(event) = self.scheduler.pop_due() {
            if let Some(v) = self.on_timer(event) {
                verdicts.push(v);
            }
        }
        verdicts
    }

    fn on_timer(&mut self, event: TimerEvent) -> Option<Verdict> {
        match event {
            TimerEvent::ArmDetector => {
                self.arm_detector();
                None
            }
            TimerEvent::SessionTimeout => self.filter.on_session_timeout(self.scheduler.as_mut()),
        }
    }

    fn arm_detector(&mut self) {
        let Some(handle) = self.pending_arm.take() else {
            return;
        };
        // Already popped in the normal path; covers a timer dispatched out of band
        self.scheduler.cancel(handle);

        match self.detector.arm() {
            Ok(()) => {
                self.detector_state = DetectorState::Armed;
                tracing::debug!(detector = %self.detector.kind(), "motion detector armed");
            }
            Err(e) => {
                let err = map_hw_error(&*e);
                tracing::warn!(error = %err, "failed to arm motion detector; staying idle");
            }
        }
    }

    fn motion_detected(&mut self) -> Option<Verdict> {
        tracing::info!(detector = %self.detector.kind(), "major motion detected");
        self.sink.note("Major motion detected.");
        self.broadcaster.publish(MotionSignal::MotionDetected);
        self.stop()
    }

    fn cancel_pending_arm(&mut self) {
        if let Some(handle) = self.pending_arm.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Elapsed milliseconds since `epoch` on the controller's clock.
    pub fn ms_since(&self, epoch: Instant) -> u64 {
        self.clock.ms_since(epoch)
    }
}
