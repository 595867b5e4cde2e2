//! Scenario replay: drives a controller on simulated hardware and prints
//! every outward signal and verdict.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use motion_config::{Config, ScenarioEvent, ScenarioRow};
use motion_core::error::{MotionError, Result};
use motion_core::{
    ChannelBroadcaster, ConfirmReason, FileSink, FilterCfg, MotionController, MotionSignal,
    Preferences, SignalReceiver, Verdict,
};
use motion_hardware::{SimulatedLocationProvider, SimulatedPlatform};
use motion_traits::clock::{Clock, MonotonicClock};
use motion_traits::{LocationSample, ManualClock, SensorReading};
use serde_json::json;

pub fn confirm_reason_name(r: &ConfirmReason) -> &'static str {
    match r {
        ConfirmReason::Displaced { .. } => "Displaced",
        ConfirmReason::SessionTimedOut => "SessionTimedOut",
        ConfirmReason::GpsCold => "GpsCold",
        ConfirmReason::NoBaseline => "NoBaseline",
        ConfirmReason::SubscriptionFailed => "SubscriptionFailed",
    }
}

/// Counts reported at the end of a replay.
#[derive(Debug, Default, Clone, Copy)]
pub struct Summary {
    pub rows: usize,
    pub motion_detected: usize,
    pub not_moving: usize,
    pub confirmed: usize,
    pub rejected: usize,
    pub interrupted: bool,
}

pub struct SimOptions<'a> {
    pub realtime: bool,
    pub json: bool,
    pub notes: Option<&'a Path>,
    pub shutdown: Arc<AtomicBool>,
}

struct Replay {
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    location: SimulatedLocationProvider,
    signals: SignalReceiver,
    ctl: MotionController,
    json: bool,
    summary: Summary,
}

impl Replay {
    fn t_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    fn sleep_until(&self, target: Instant) {
        let now = self.clock.now();
        if target > now {
            self.clock.sleep(target - now);
        }
    }

    fn report_signals(&mut self) {
        let t_ms = self.t_ms();
        let pending: Vec<MotionSignal> = self.signals.try_iter().collect();
        for s in pending {
            match s {
                MotionSignal::MotionDetected => self.summary.motion_detected += 1,
                MotionSignal::LocationNotChanging => self.summary.not_moving += 1,
            }
            if self.json {
                println!(
                    "{}",
                    json!({ "t_ms": t_ms, "kind": "signal", "name": s.name() })
                );
            } else {
                println!("[{t_ms:>9} ms] signal  {}", s.name());
            }
        }
    }

    fn report_verdict(&mut self, verdict: Option<Verdict>) {
        self.report_signals();
        let Some(v) = verdict else {
            return;
        };
        let t_ms = self.t_ms();
        let (outcome, reason) = match &v {
            Verdict::Confirmed(r) => {
                self.summary.confirmed += 1;
                ("confirmed", confirm_reason_name(r))
            }
            Verdict::Rejected { .. } => {
                self.summary.rejected += 1;
                ("rejected", "NotMoved")
            }
        };
        if self.json {
            println!(
                "{}",
                json!({
                    "t_ms": t_ms,
                    "kind": "verdict",
                    "outcome": outcome,
                    "reason": reason,
                    "distance_m": v.distance_m(),
                })
            );
        } else {
            match v.distance_m() {
                Some(d) => println!("[{t_ms:>9} ms] verdict {outcome} ({reason}, {d:.1} m)"),
                None => println!("[{t_ms:>9} ms] verdict {outcome} ({reason})"),
            }
        }
    }

    /// Fire every timer due up to `target`, in deadline order, then land on it.
    fn advance_to(&mut self, target: Instant) {
        while let Some(deadline) = self.ctl.next_deadline() {
            if deadline > target {
                break;
            }
            self.sleep_until(deadline);
            for v in self.ctl.poll() {
                self.report_verdict(Some(v));
            }
            self.report_signals();
        }
        self.sleep_until(target);
        for v in self.ctl.poll() {
            self.report_verdict(Some(v));
        }
    }

    fn apply(&mut self, row: &ScenarioRow, line: usize) -> Result<()> {
        match row.event {
            ScenarioEvent::Start => self.ctl.start(),
            ScenarioEvent::Stop => {
                let v = self.ctl.stop();
                self.report_verdict(v);
            }
            ScenarioEvent::FullyStopped => self.ctl.scanner_fully_stopped(),
            ScenarioEvent::Accel => {
                let (x, y, z) = row.acceleration().ok_or_else(|| {
                    MotionError::Scenario(format!("row {line}: accel needs ax, ay and az"))
                })?;
                let v = self.ctl.on_sensor(SensorReading::Acceleration { x, y, z });
                self.report_verdict(v);
            }
            ScenarioEvent::Significant => {
                let v = self.ctl.on_sensor(SensorReading::SignificantMotion);
                self.report_verdict(v);
            }
            ScenarioEvent::DebugMotion => {
                let v = self.ctl.debug_motion_detected();
                self.report_verdict(v);
            }
            ScenarioEvent::Location => {
                let fix = self.sample(row, line)?;
                let v = self.ctl.on_location_update(fix);
                self.report_verdict(v);
            }
            ScenarioEvent::LastKnown => {
                let fix = self.sample(row, line)?;
                self.location.set_last_known(fix);
            }
        }
        Ok(())
    }

    fn sample(&self, row: &ScenarioRow, line: usize) -> Result<LocationSample> {
        let (lat, lon) = row.position().ok_or_else(|| {
            MotionError::Scenario(format!("row {line}: {:?} needs lat and lon", row.event))
        })?;
        Ok(LocationSample::new(lat, lon, self.clock.now()))
    }
}

/// Replay `rows` against a controller configured from `cfg`.
pub fn run_scenario(cfg: &Config, rows: &[ScenarioRow], opts: &SimOptions<'_>) -> Result<Summary> {
    let clock: Arc<dyn Clock + Send + Sync> = if opts.realtime {
        Arc::new(MonotonicClock::new())
    } else {
        Arc::new(ManualClock::new())
    };
    let platform = SimulatedPlatform::new(
        cfg.platform.significant_motion_available,
        cfg.continuous.threshold_mps2,
    );
    let location = SimulatedLocationProvider::new();
    let (broadcaster, signals) = ChannelBroadcaster::unbounded();

    let builder = MotionController::builder()
        .with_platform(platform)
        .with_location(location.clone())
        .with_preferences(Preferences::from(&cfg.motion))
        .with_filter(FilterCfg::from(&cfg.filter))
        .with_clock(clock.clone())
        .with_broadcaster(broadcaster);
    let ctl = match opts.notes {
        Some(path) => builder.with_diagnostics(FileSink::new(path)).build()?,
        None => builder.build()?,
    };

    tracing::info!(
        rows = rows.len(),
        realtime = opts.realtime,
        detector = %ctl.detector_kind(),
        "replaying scenario"
    );

    let mut replay = Replay {
        epoch: clock.now(),
        clock,
        location,
        signals,
        ctl,
        json: opts.json,
        summary: Summary::default(),
    };

    for (idx, row) in rows.iter().enumerate() {
        if opts.shutdown.load(Ordering::Relaxed) {
            replay.summary.interrupted = true;
            break;
        }
        let target = replay.epoch + Duration::from_millis(row.at_ms);
        replay.advance_to(target);
        replay.apply(row, idx + 2)?;
        replay.report_signals();
        replay.summary.rows += 1;
    }

    // Let outstanding timers play out (session timeout, a pending arm)
    while !replay.summary.interrupted {
        let Some(deadline) = replay.ctl.next_deadline() else {
            break;
        };
        if opts.shutdown.load(Ordering::Relaxed) {
            replay.summary.interrupted = true;
            break;
        }
        replay.advance_to(deadline);
    }

    let summary = replay.summary;
    let t_ms = replay.t_ms();
    if opts.json {
        println!(
            "{}",
            json!({
                "t_ms": t_ms,
                "kind": "summary",
                "rows": summary.rows,
                "motion_detected": summary.motion_detected,
                "location_not_changing": summary.not_moving,
                "confirmed": summary.confirmed,
                "rejected": summary.rejected,
                "interrupted": summary.interrupted,
            })
        );
    } else {
        println!(
            "Replay complete: {} rows, {} motion, {} confirmed, {} rejected{}",
            summary.rows,
            summary.motion_detected,
            summary.confirmed,
            summary.rejected,
            if summary.interrupted { " (interrupted)" } else { "" }
        );
    }
    Ok(summary)
}

/// Load the scenario CSV and replay it.
pub fn run_simulate(cfg: &Config, scenario: &Path, opts: &SimOptions<'_>) -> Result<Summary> {
    let rows = motion_config::load_scenario_csv(scenario)
        .map_err(|e| eyre::Report::new(MotionError::Scenario(e.to_string())))?;
    run_scenario(cfg, &rows, opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> SimOptions<'static> {
        SimOptions {
            realtime: false,
            json: true,
            notes: None,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    fn rows(csv: &str) -> Vec<ScenarioRow> {
        let text = format!("at_ms,event,lat,lon,ax,ay,az\n{csv}");
        motion_config::scenario_from_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn rejected_motion_is_counted() {
        let cfg = Config::default();
        let rows = rows(
            "0,last_known,52.0,4.0,,,\n0,start,,,,,\n20000,significant,,,,,\n21000,location,52.00002,4.0,,,\n",
        );
        let s = run_scenario(&cfg, &rows, &opts()).unwrap();
        assert_eq!(s.rows, 4);
        assert_eq!(s.motion_detected, 1);
        assert_eq!(s.not_moving, 1);
        assert_eq!(s.rejected, 1);
        assert_eq!(s.confirmed, 0);
    }

    #[test]
    fn open_window_times_out_after_last_row() {
        let cfg = Config::default();
        let rows = rows("0,last_known,52.0,4.0,,,\n0,start,,,,,\n20000,significant,,,,,\n");
        let s = run_scenario(&cfg, &rows, &opts()).unwrap();
        assert_eq!(s.confirmed, 1);
        assert_eq!(s.rejected, 0);
    }

    #[test]
    fn shutdown_stops_before_first_row() {
        let o = opts();
        o.shutdown.store(true, Ordering::Relaxed);
        let s = run_scenario(&Config::default(), &rows("0,start,,,,,\n"), &o).unwrap();
        assert!(s.interrupted);
        assert_eq!(s.rows, 0);
    }
}
