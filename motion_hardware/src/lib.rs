#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Simulated sensor and location backends.
//!
//! The detectors here hold no signal processing beyond a single magnitude
//! threshold; real drivers plug in behind the same `motion_traits` traits.
pub mod error;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use motion_traits::{
    DetectorKind, LocationProvider, LocationSample, MotionDetector, SensorPlatform, SensorReading,
};

use crate::error::{HwError, Result};

/// Standard gravity in m/s^2.
pub const GRAVITY_MPS2: f64 = 9.806_65;

/// Default deviation from 1 g that counts as movement for the continuous
/// detector.
pub const DEFAULT_THRESHOLD_MPS2: f64 = 0.8;

#[inline]
fn check_sensor(fault: &Cell<bool>) -> Result<()> {
    if fault.get() {
        Err(HwError::SensorUnavailable)
    } else {
        Ok(())
    }
}

/// Accelerometer-backed detector. Reports motion on every sample whose
/// magnitude deviates from gravity by more than the threshold, for as long
/// as it stays armed.
#[derive(Debug)]
pub struct ContinuousDetector {
    threshold_mps2: f64,
    armed: bool,
    fault: Rc<Cell<bool>>,
}

impl ContinuousDetector {
    pub fn new(threshold_mps2: f64) -> Self {
        Self {
            threshold_mps2,
            armed: false,
            fault: Rc::new(Cell::new(false)),
        }
    }

    pub fn threshold_mps2(&self) -> f64 {
        self.threshold_mps2
    }
}

impl Default for ContinuousDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_MPS2)
    }
}

impl MotionDetector for ContinuousDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Continuous
    }

    fn arm(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.armed {
            return Ok(());
        }
        check_sensor(&self.fault)?;
        self.armed = true;
        tracing::debug!(threshold_mps2 = self.threshold_mps2, "accelerometer listener armed");
        Ok(())
    }

    fn disarm(&mut self) {
        if self.armed {
            self.armed = false;
            tracing::debug!("accelerometer listener disarmed");
        }
    }

    fn is_active(&self) -> bool {
        self.armed
    }

    fn on_reading(&mut self, reading: &SensorReading) -> bool {
        if !self.armed {
            return false;
        }
        match *reading {
            SensorReading::Acceleration { x, y, z } => {
                let magnitude = (x * x + y * y + z * z).sqrt();
                (magnitude - GRAVITY_MPS2).abs() > self.threshold_mps2
            }
            SensorReading::SignificantMotion => false,
        }
    }
}

/// One-shot significant-motion trigger. Disarms itself when it fires.
#[derive(Debug, Default)]
pub struct SignificantMotionDetector {
    armed: bool,
    fault: Rc<Cell<bool>>,
}

impl SignificantMotionDetector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MotionDetector for SignificantMotionDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::SignificantMotion
    }

    fn arm(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.armed {
            return Ok(());
        }
        check_sensor(&self.fault)?;
        self.armed = true;
        tracing::debug!("significant-motion trigger requested");
        Ok(())
    }

    fn disarm(&mut self) {
        if self.armed {
            self.armed = false;
            tracing::debug!("significant-motion trigger cancelled");
        }
    }

    fn is_active(&self) -> bool {
        self.armed
    }

    fn on_reading(&mut self, reading: &SensorReading) -> bool {
        if !self.armed || !matches!(reading, SensorReading::SignificantMotion) {
            return false;
        }
        self.armed = false;
        true
    }
}

/// Simulated device: hands out detectors and can pretend a sensor broke.
#[derive(Debug, Clone)]
pub struct SimulatedPlatform {
    significant_available: bool,
    threshold_mps2: f64,
    fault: Rc<Cell<bool>>,
}

impl SimulatedPlatform {
    pub fn new(significant_available: bool, threshold_mps2: f64) -> Self {
        Self {
            significant_available,
            threshold_mps2,
            fault: Rc::new(Cell::new(false)),
        }
    }

    /// Make every detector handed out by this platform fail to arm.
    pub fn set_sensor_fault(&self, fault: bool) {
        self.fault.set(fault);
    }
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new(true, DEFAULT_THRESHOLD_MPS2)
    }
}

impl SensorPlatform for SimulatedPlatform {
    fn continuous_detector(&self) -> Box<dyn MotionDetector> {
        Box::new(ContinuousDetector {
            threshold_mps2: self.threshold_mps2,
            armed: false,
            fault: Rc::clone(&self.fault),
        })
    }

    fn significant_motion_detector(&self) -> Option<Box<dyn MotionDetector>> {
        if !self.significant_available {
            return None;
        }
        Some(Box::new(SignificantMotionDetector {
            armed: false,
            fault: Rc::clone(&self.fault),
        }))
    }
}

#[derive(Debug, Default)]
struct LocationState {
    last_known: Option<LocationSample>,
    subscribed: bool,
    subscribe_calls: u32,
    deny: Option<String>,
}

/// Scripted location provider. Clones share state, so a driver can keep one
/// handle while the filter owns another.
#[derive(Debug, Clone, Default)]
pub struct SimulatedLocationProvider {
    state: Rc<RefCell<LocationState>>,
}

impl SimulatedLocationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_last_known(&self, sample: LocationSample) {
        self.state.borrow_mut().last_known = Some(sample);
    }

    pub fn clear_last_known(&self) {
        self.state.borrow_mut().last_known = None;
    }

    /// Reject subscriptions with the given reason (e.g. missing permission).
    pub fn deny_subscriptions(&self, reason: Option<String>) {
        self.state.borrow_mut().deny = reason;
    }

    pub fn is_subscribed(&self) -> bool {
        self.state.borrow().subscribed
    }

    /// How many times a subscription was successfully opened.
    pub fn subscribe_calls(&self) -> u32 {
        self.state.borrow().subscribe_calls
    }
}

impl LocationProvider for SimulatedLocationProvider {
    fn last_known_location(&self) -> Option<LocationSample> {
        self.state.borrow().last_known
    }

    fn subscribe(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut st = self.state.borrow_mut();
        if let Some(reason) = st.deny.clone() {
            return Err(Box::new(HwError::SubscriptionRejected(reason)));
        }
        if !st.subscribed {
            st.subscribed = true;
            st.subscribe_calls = st.subscribe_calls.saturating_add(1);
        }
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.state.borrow_mut().subscribed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shake(g: f64) -> SensorReading {
        SensorReading::Acceleration {
            x: 0.0,
            y: 0.0,
            z: g,
        }
    }

    #[test]
    fn continuous_ignores_readings_while_disarmed() {
        let mut det = ContinuousDetector::default();
        assert!(!det.on_reading(&shake(20.0)));
    }

    #[test]
    fn continuous_fires_repeatedly_while_armed() {
        let mut det = ContinuousDetector::new(0.5);
        det.arm().unwrap();
        assert!(!det.on_reading(&shake(GRAVITY_MPS2 + 0.1)));
        assert!(det.on_reading(&shake(GRAVITY_MPS2 + 2.0)));
        assert!(det.on_reading(&shake(GRAVITY_MPS2 - 2.0)));
        assert!(det.is_active());
    }

    #[test]
    fn significant_is_one_shot() {
        let mut det = SignificantMotionDetector::new();
        det.arm().unwrap();
        assert!(det.on_reading(&SensorReading::SignificantMotion));
        assert!(!det.is_active());
        assert!(!det.on_reading(&SensorReading::SignificantMotion));
    }

    #[test]
    fn arm_and_disarm_are_idempotent() {
        let mut det = SignificantMotionDetector::new();
        det.arm().unwrap();
        det.arm().unwrap();
        assert!(det.is_active());
        det.disarm();
        det.disarm();
        assert!(!det.is_active());
    }

    #[test]
    fn platform_without_significant_sensor() {
        let platform = SimulatedPlatform::new(false, DEFAULT_THRESHOLD_MPS2);
        assert!(platform.significant_motion_detector().is_none());
        assert_eq!(
            platform.continuous_detector().kind(),
            DetectorKind::Continuous
        );
    }

    #[test]
    fn sensor_fault_blocks_arming() {
        let platform = SimulatedPlatform::default();
        let mut det = platform.continuous_detector();
        platform.set_sensor_fault(true);
        let err = det.arm().expect_err("fault should block arm");
        assert!(err.to_string().contains("unavailable"));
        assert!(!det.is_active());
    }

    #[test]
    fn location_provider_shares_state_between_clones() {
        let handle = SimulatedLocationProvider::new();
        let mut owned = handle.clone();
        owned.subscribe().unwrap();
        assert!(handle.is_subscribed());
        owned.unsubscribe();
        assert!(!handle.is_subscribed());
        assert_eq!(handle.subscribe_calls(), 1);
    }
}
