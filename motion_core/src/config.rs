//! Runtime configuration types for the motion controller.
//!
//! These are separate from the TOML-deserialized config in `motion_config`;
//! see `conversions` for the mapping.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use motion_traits::DetectorKind;

use crate::error::BuildError;

/// GPS baseline is trusted for this long after first use.
pub const GPS_WARM_WINDOW: Duration = Duration::from_secs(2 * 60 * 60);
/// Longest a single verification window may stay open.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MIN_MOTION_DISTANCE_M: f64 = 10.0;
pub const DEFAULT_DEBOUNCE_SECS: u64 = 20;

/// Read-only snapshot of the user's motion preferences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preferences {
    pub motion_enabled: bool,
    pub detector_kind: DetectorKind,
    /// Minimum pause before arming the detector, in whole seconds.
    pub debounce_secs: u64,
    /// Displacement below which motion counts as a false positive.
    pub min_motion_distance_m: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            motion_enabled: true,
            detector_kind: DetectorKind::SignificantMotion,
            debounce_secs: DEFAULT_DEBOUNCE_SECS,
            min_motion_distance_m: DEFAULT_MIN_MOTION_DISTANCE_M,
        }
    }
}

impl Preferences {
    pub fn debounce(&self) -> Duration {
        Duration::from_secs(self.debounce_secs)
    }

    /// Reject values the filter cannot compare against.
    pub fn validate(&self) -> Result<(), BuildError> {
        if !self.min_motion_distance_m.is_finite() || self.min_motion_distance_m <= 0.0 {
            return Err(BuildError::InvalidConfig(
                "min_motion_distance_m must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Where the controller reads its preferences from. Read at construction
/// and again on every `scanner_fully_stopped()`.
pub trait PreferenceStore {
    fn load(&self) -> Preferences;
}

impl PreferenceStore for Preferences {
    fn load(&self) -> Preferences {
        *self
    }
}

/// Shared, editable store; edits become visible at the next reload.
impl PreferenceStore for Rc<Cell<Preferences>> {
    fn load(&self) -> Preferences {
        self.get()
    }
}

/// False-positive filter timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterCfg {
    pub warm_window: Duration,
    pub session_timeout: Duration,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            warm_window: GPS_WARM_WINDOW,
            session_timeout: SESSION_TIMEOUT,
        }
    }
}
