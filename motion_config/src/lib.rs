#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and replay-scenario parsing for the motion service.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//!   Every section is optional; missing keys fall back to the defaults the
//!   service ships with.
//! - The scenario CSV loader enforces headers and per-event required columns
//!   so the replay driver never has to guess.
use serde::Deserialize;
use std::io::Read;

/// Detector variant as spelled in the config file.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DetectorChoice {
    #[default]
    Significant,
    Continuous,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MotionCfg {
    /// Master switch for motion-gated scanning
    pub enabled: bool,
    pub detector: DetectorChoice,
    /// Minimum pause before the detector is armed (whole seconds)
    pub debounce_secs: u64,
    /// Displacement below which a motion event is treated as a false positive
    pub min_motion_distance_m: f64,
}

impl Default for MotionCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            detector: DetectorChoice::Significant,
            debounce_secs: 20,
            min_motion_distance_m: 10.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilterCfg {
    /// After this long since first use the GPS baseline is considered cold
    pub warm_window_secs: u64,
    /// Max length of one verification window
    pub session_timeout_secs: u64,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            warm_window_secs: 2 * 60 * 60,
            session_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContinuousCfg {
    /// Deviation from 1 g (m/s^2) that counts as movement
    pub threshold_mps2: f64,
}

impl Default for ContinuousCfg {
    fn default() -> Self {
        Self {
            threshold_mps2: 0.8,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlatformCfg {
    /// Whether the simulated device exposes a significant-motion sensor
    pub significant_motion_available: bool,
}

impl Default for PlatformCfg {
    fn default() -> Self {
        Self {
            significant_motion_available: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub motion: MotionCfg,
    pub filter: FilterCfg,
    pub continuous: ContinuousCfg,
    pub platform: PlatformCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const ROTATIONS: [&str; 3] = ["never", "daily", "hourly"];

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Motion
        if self.motion.debounce_secs > 24 * 60 * 60 {
            eyre::bail!("motion.debounce_secs is unreasonably large (>24h)");
        }
        let d = self.motion.min_motion_distance_m;
        if !d.is_finite() || d <= 0.0 {
            eyre::bail!("motion.min_motion_distance_m must be a finite value > 0");
        }
        if d > 10_000.0 {
            eyre::bail!("motion.min_motion_distance_m is unreasonably large (>10km)");
        }

        // Filter
        if self.filter.warm_window_secs == 0 {
            eyre::bail!("filter.warm_window_secs must be >= 1");
        }
        if self.filter.session_timeout_secs == 0 {
            eyre::bail!("filter.session_timeout_secs must be >= 1");
        }
        if self.filter.session_timeout_secs > 10 * 60 {
            eyre::bail!("filter.session_timeout_secs is unreasonably large (>10min)");
        }

        // Continuous detector
        let t = self.continuous.threshold_mps2;
        if !t.is_finite() || t <= 0.0 {
            eyre::bail!("continuous.threshold_mps2 must be a finite value > 0");
        }

        // Logging
        if let Some(level) = self.logging.level.as_deref() {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                eyre::bail!("logging.level must be one of {}", LOG_LEVELS.join("|"));
            }
        }
        if let Some(rot) = self.logging.rotation.as_deref() {
            if !ROTATIONS.contains(&rot.to_ascii_lowercase().as_str()) {
                eyre::bail!("logging.rotation must be one of {}", ROTATIONS.join("|"));
            }
        }

        Ok(())
    }
}

/// Event kinds understood by the replay driver.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioEvent {
    /// Scanning paused: controller.start()
    Start,
    /// Scanning resumed by the host: controller.stop()
    Stop,
    /// Scanning fully stopped: controller.scanner_fully_stopped()
    FullyStopped,
    /// Accelerometer sample (ax, ay, az)
    Accel,
    /// Significant-motion trigger
    Significant,
    /// Live GPS fix (lat, lon)
    Location,
    /// Update the platform's cached last-known fix (lat, lon)
    LastKnown,
    /// Debug hook: pretend the detector fired
    DebugMotion,
}

/// Replay scenario CSV schema.
///
/// Expected headers:
/// at_ms,event,lat,lon,ax,ay,az
///
/// Example:
/// at_ms,event,lat,lon,ax,ay,az
/// 0,last_known,52.52,13.405,,,
/// 0,start,,,,,
/// 25000,significant,,,,,
/// 26000,location,52.5201,13.405,,,
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ScenarioRow {
    pub at_ms: u64,
    pub event: ScenarioEvent,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub ax: Option<f64>,
    pub ay: Option<f64>,
    pub az: Option<f64>,
}

impl ScenarioRow {
    /// (lat, lon) when both are present.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lon?))
    }

    /// (ax, ay, az) when all three are present.
    pub fn acceleration(&self) -> Option<(f64, f64, f64)> {
        Some((self.ax?, self.ay?, self.az?))
    }
}

const SCENARIO_HEADERS: [&str; 7] = ["at_ms", "event", "lat", "lon", "ax", "ay", "az"];

/// Parse a scenario from any reader. Rows must be ordered by `at_ms`.
pub fn scenario_from_reader<R: Read>(reader: R) -> eyre::Result<Vec<ScenarioRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read scenario CSV headers: {}", e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != SCENARIO_HEADERS {
        eyre::bail!(
            "scenario CSV must have headers '{}', got: {}",
            SCENARIO_HEADERS.join(","),
            actual.join(",")
        );
    }

    let mut rows: Vec<ScenarioRow> = Vec::new();
    for (idx, rec) in rdr.deserialize::<ScenarioRow>().enumerate() {
        let line = idx + 2;
        let row = rec.map_err(|e| eyre::eyre!("invalid scenario row {}: {}", line, e))?;

        if let Some(prev) = rows.last() {
            if row.at_ms < prev.at_ms {
                eyre::bail!(
                    "scenario row {} goes back in time ({} ms < {} ms)",
                    line,
                    row.at_ms,
                    prev.at_ms
                );
            }
        }
        match row.event {
            ScenarioEvent::Location | ScenarioEvent::LastKnown => {
                let (lat, lon) = row
                    .position()
                    .ok_or_else(|| eyre::eyre!("scenario row {} needs lat and lon", line))?;
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    eyre::bail!("scenario row {} has an out-of-range position", line);
                }
            }
            ScenarioEvent::Accel => {
                if row.acceleration().is_none() {
                    eyre::bail!("scenario row {} needs ax, ay and az", line);
                }
            }
            _ => {}
        }
        rows.push(row);
    }

    Ok(rows)
}

pub fn load_scenario_csv(path: &std::path::Path) -> eyre::Result<Vec<ScenarioRow>> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("open scenario CSV {:?}: {}", path, e))?;
    scenario_from_reader(file)
}
