//! Type-state builder for `MotionController`.

use std::marker::PhantomData;
use std::sync::Arc;

use motion_traits::clock::{Clock, MonotonicClock};
use motion_traits::scheduler::Scheduler;
use motion_traits::{LocationProvider, SensorPlatform};

use crate::config::{FilterCfg, PreferenceStore, Preferences};
use crate::controller::MotionController;
use crate::error::{BuildError, Result};
use crate::filter::FalsePositiveFilter;
use crate::logger::{DiagnosticSink, NullSink};
use crate::scheduler::{TimerEvent, TimerQueue};
use crate::signal::{Broadcaster, NullBroadcaster};

pub struct Missing;
pub struct Set;

type SchedulerFactory = Box<dyn FnOnce(Arc<dyn Clock + Send + Sync>) -> Box<dyn Scheduler<TimerEvent>>>;

/// Builder for `MotionController`. Platform and location provider are
/// required; everything else has a default.
pub struct ControllerBuilder<P, L> {
    platform: Option<Box<dyn SensorPlatform>>,
    location: Option<Box<dyn LocationProvider>>,
    preferences: Option<Box<dyn PreferenceStore>>,
    filter: Option<FilterCfg>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    scheduler: Option<SchedulerFactory>,
    broadcaster: Option<Box<dyn Broadcaster>>,
    sink: Option<Box<dyn DiagnosticSink>>,
    _p: PhantomData<P>,
    _l: PhantomData<L>,
}

impl Default for ControllerBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            platform: None,
            location: None,
            preferences: None,
            filter: None,
            clock: None,
            scheduler: None,
            broadcaster: None,
            sink: None,
            _p: PhantomData,
            _l: PhantomData,
        }
    }
}

impl MotionController {
    /// Start building a controller.
    pub fn builder() -> ControllerBuilder<Missing, Missing> {
        ControllerBuilder::default()
    }
}

fn validate(prefs: &Preferences, filter: &FilterCfg) -> std::result::Result<(), BuildError> {
    if filter.warm_window.is_zero() {
        return Err(BuildError::InvalidConfig("warm_window must be > 0"));
    }
    if filter.session_timeout.is_zero() {
        return Err(BuildError::InvalidConfig("session_timeout must be > 0"));
    }
    prefs.validate()
}

impl<P, L> ControllerBuilder<P, L> {
    /// Fallible build available in any type-state; reports what is missing.
    pub fn try_build(self) -> Result<MotionController> {
        let platform = self
            .platform
            .ok_or_else(|| eyre::Report::new(BuildError::MissingPlatform))?;
        let location = self
            .location
            .ok_or_else(|| eyre::Report::new(BuildError::MissingLocationProvider))?;
        let preferences: Box<dyn PreferenceStore> = self
            .preferences
            .unwrap_or_else(|| Box::new(Preferences::default()));
        let filter_cfg = self.filter.unwrap_or_default();

        validate(&preferences.load(), &filter_cfg).map_err(eyre::Report::new)?;

        let clock: Arc<dyn Clock + Send + Sync> = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let scheduler: Box<dyn Scheduler<TimerEvent>> = match self.scheduler {
            Some(make) => make(clock.clone()),
            None => Box::new(TimerQueue::new(clock.clone())),
        };
        let prefs = preferences.load();
        let filter = FalsePositiveFilter::new(
            location,
            clock.clone(),
            filter_cfg,
            prefs.min_motion_distance_m,
        );

        Ok(MotionController::from_parts(
            clock,
            scheduler,
            platform,
            preferences,
            filter,
            self.broadcaster.unwrap_or_else(|| Box::new(NullBroadcaster)),
            self.sink.unwrap_or_else(|| Box::new(NullSink)),
        ))
    }

    fn retag<P2, L2>(self) -> ControllerBuilder<P2, L2> {
        ControllerBuilder {
            platform: self.platform,
            location: self.location,
            preferences: self.preferences,
            filter: self.filter,
            clock: self.clock,
            scheduler: self.scheduler,
            broadcaster: self.broadcaster,
            sink: self.sink,
            _p: PhantomData,
            _l: PhantomData,
        }
    }

    /// Preference source; reloaded on every `scanner_fully_stopped()`.
    pub fn with_preferences(mut self, store: impl PreferenceStore + 'static) -> Self {
        self.preferences = Some(Box::new(store));
        self
    }

    pub fn with_filter(mut self, filter: FilterCfg) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replace the default `TimerQueue`. The factory receives the clock the
    /// controller ends up with.
    pub fn with_scheduler<F>(mut self, make: F) -> Self
    where
        F: FnOnce(Arc<dyn Clock + Send + Sync>) -> Box<dyn Scheduler<TimerEvent>> + 'static,
    {
        self.scheduler = Some(Box::new(make));
        self
    }

    pub fn with_broadcaster(mut self, broadcaster: impl Broadcaster + 'static) -> Self {
        self.broadcaster = Some(Box::new(broadcaster));
        self
    }

    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }
}

// Setters that advance type-state
impl<L> ControllerBuilder<Missing, L> {
    pub fn with_platform(
        mut self,
        platform: impl SensorPlatform + 'static,
    ) -> ControllerBuilder<Set, L> {
        self.platform = Some(Box::new(platform));
        self.retag()
    }
}

impl<P> ControllerBuilder<P, Missing> {
    pub fn with_location(
        mut self,
        location: impl LocationProvider + 'static,
    ) -> ControllerBuilder<P, Set> {
        self.location = Some(Box::new(location));
        self.retag()
    }
}

impl ControllerBuilder<Set, Set> {
    /// Validate and build. Only available once platform and location are set.
    pub fn build(self) -> Result<MotionController> {
        self.try_build()
    }
}
