//! Detector variant selection.

use motion_traits::{DetectorKind, MotionDetector, SensorPlatform};

/// Build the detector the preferences ask for, falling back to the
/// continuous detector when the device lacks a significant-motion sensor.
pub fn select_detector(kind: DetectorKind, platform: &dyn SensorPlatform) -> Box<dyn MotionDetector> {
    match kind {
        DetectorKind::Continuous => platform.continuous_detector(),
        DetectorKind::SignificantMotion => match platform.significant_motion_detector() {
            Some(det) => det,
            None => {
                tracing::info!("no significant-motion sensor; using continuous detector");
                platform.continuous_detector()
            }
        },
    }
}

/// Whether the device can provide a significant-motion detector at all.
pub fn significant_motion_available(platform: &dyn SensorPlatform) -> bool {
    platform.significant_motion_detector().is_some()
}
