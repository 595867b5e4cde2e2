//! `From` implementations bridging `motion_config` types to `motion_core` types.

use std::time::Duration;

use motion_traits::DetectorKind;

use crate::config::{FilterCfg, Preferences};

// ── DetectorKind ─────────────────────────────────────────────────────────────

// Both types are foreign here, so this can't be a `From` impl.
pub fn detector_kind(c: motion_config::DetectorChoice) -> DetectorKind {
    match c {
        motion_config::DetectorChoice::Significant => DetectorKind::SignificantMotion,
        motion_config::DetectorChoice::Continuous => DetectorKind::Continuous,
    }
}

// ── Preferences ──────────────────────────────────────────────────────────────

impl From<&motion_config::MotionCfg> for Preferences {
    fn from(c: &motion_config::MotionCfg) -> Self {
        Self {
            motion_enabled: c.enabled,
            detector_kind: detector_kind(c.detector),
            debounce_secs: c.debounce_secs,
            min_motion_distance_m: c.min_motion_distance_m,
        }
    }
}

// ── FilterCfg ────────────────────────────────────────────────────────────────

impl From<&motion_config::FilterCfg> for FilterCfg {
    fn from(c: &motion_config::FilterCfg) -> Self {
        Self {
            warm_window: Duration::from_secs(c.warm_window_secs),
            session_timeout: Duration::from_secs(c.session_timeout_secs),
        }
    }
}
