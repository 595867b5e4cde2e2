pub mod clock;
pub mod scheduler;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use scheduler::{Scheduler, TimerHandle};

use std::fmt;
use std::time::Instant;

/// Which motion detector variant the preferences ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DetectorKind {
    /// Raw accelerometer sampling; may fire repeatedly while armed.
    Continuous,
    /// Platform one-shot large-displacement trigger.
    #[default]
    SignificantMotion,
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorKind::Continuous => f.write_str("continuous"),
            DetectorKind::SignificantMotion => f.write_str("significant"),
        }
    }
}

/// A raw event coming from the device's motion sensors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    /// Accelerometer sample in m/s^2, gravity included.
    Acceleration { x: f64, y: f64, z: f64 },
    /// The platform's significant-motion trigger fired.
    SignificantMotion,
}

/// A position fix and the moment it was captured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSample {
    pub lat: f64,
    pub lon: f64,
    pub captured_at: Instant,
}

impl LocationSample {
    pub fn new(lat: f64, lon: f64, captured_at: Instant) -> Self {
        Self {
            lat,
            lon,
            captured_at,
        }
    }
}

pub trait MotionDetector {
    fn kind(&self) -> DetectorKind;

    /// Start listening. Idempotent when already armed.
    fn arm(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Stop listening. Idempotent when already idle.
    fn disarm(&mut self);

    fn is_active(&self) -> bool;

    /// Feed one sensor event; returns true when it counts as motion.
    /// Readings delivered while disarmed never count.
    fn on_reading(&mut self, reading: &SensorReading) -> bool;
}

/// The device's motion-sensing capabilities.
pub trait SensorPlatform {
    fn continuous_detector(&self) -> Box<dyn MotionDetector>;

    /// `None` when the device has no significant-motion sensor.
    fn significant_motion_detector(&self) -> Option<Box<dyn MotionDetector>>;
}

/// Source of position fixes.
pub trait LocationProvider {
    /// Best cached fix, if the platform has one. Never blocks.
    fn last_known_location(&self) -> Option<LocationSample>;

    /// Ask for live updates. Updates are delivered by the host event loop.
    fn subscribe(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Stop live updates. Idempotent.
    fn unsubscribe(&mut self);
}
