//! Maps `Box<dyn Error>` from trait boundaries to typed `MotionError`.
//!
//! The traits in `motion_traits` use `Box<dyn Error + Send + Sync>` for maximum
//! flexibility; this module converts those to our typed error enum, with an
//! optional feature-gated path for `motion_hardware::HwError` downcasting.

use crate::error::MotionError;

/// Map a trait-boundary error to a typed `MotionError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> MotionError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<motion_hardware::error::HwError>() {
            return match hw {
                motion_hardware::error::HwError::SensorUnavailable => {
                    MotionError::Detector(hw.to_string())
                }
                motion_hardware::error::HwError::SubscriptionRejected(_) => {
                    MotionError::Location(hw.to_string())
                }
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("location") || lower.contains("subscri") || lower.contains("gps") {
        MotionError::Location(s)
    } else {
        MotionError::Detector(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_errors_fall_back_to_string_heuristics() {
        let e = std::io::Error::other("gps permission denied");
        assert!(matches!(map_hw_error(&e), MotionError::Location(_)));

        let e = std::io::Error::other("accelerometer gone");
        assert!(matches!(map_hw_error(&e), MotionError::Detector(_)));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn hardware_errors_are_downcast() {
        let e = motion_hardware::error::HwError::SensorUnavailable;
        assert!(matches!(map_hw_error(&e), MotionError::Detector(_)));

        let e = motion_hardware::error::HwError::SubscriptionRejected("denied".into());
        assert!(matches!(map_hw_error(&e), MotionError::Location(_)));
    }
}
