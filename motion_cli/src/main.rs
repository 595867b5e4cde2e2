#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod error_fmt;
mod simulate;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use motion_config::Config;
use motion_core::error::{MotionError, Result};
use motion_core::{FilterCfg, Preferences, select_detector, significant_motion_available};
use motion_hardware::SimulatedPlatform;
use serde_json::json;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::simulate::{SimOptions, run_simulate};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = run(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run(cli: Cli) -> Result<()> {
    let cfg = load_config(&cli.config)?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging);
    tracing::debug!(config = %cli.config.display(), "configuration loaded");

    match cli.cmd {
        Commands::Simulate {
            scenario,
            realtime,
            notes,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            if realtime {
                let flag = Arc::clone(&shutdown);
                if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                    tracing::warn!(error = %e, "could not install Ctrl-C handler");
                }
            }
            let opts = SimOptions {
                realtime,
                json: cli.json,
                notes: notes.as_deref(),
                shutdown,
            };
            run_simulate(&cfg, &scenario, &opts)?;
        }
        Commands::CheckConfig => check_config(&cfg, &cli.config, cli.json),
        Commands::SelfCheck => self_check(&cfg, cli.json),
    }
    Ok(())
}

/// Read and validate the TOML config. A missing file yields the defaults.
fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = motion_config::load_toml(&text)
        .map_err(|e| MotionError::Config(format!("{}: {e}", path.display())))?;
    cfg.validate()
        .map_err(|e| MotionError::Config(e.to_string()))?;
    Ok(cfg)
}

fn init_tracing(json: bool, level: &str, logging: &motion_config::Logging) {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    };

    let file_layer = logging.file.as_deref().map(|file| {
        let path = PathBuf::from(file);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let name = path
            .file_name()
            .map_or_else(|| "motion.log".into(), |n| n.to_os_string());
        let appender = match logging.rotation.as_deref().unwrap_or("never") {
            "daily" => tracing_appender::rolling::daily(dir, name),
            "hourly" => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_filter(EnvFilter::new(logging.level.as_deref().unwrap_or("info")))
    });

    let _ = tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init();
}

fn check_config(cfg: &Config, path: &Path, json: bool) {
    let prefs = Preferences::from(&cfg.motion);
    let filter = FilterCfg::from(&cfg.filter);
    if json {
        println!(
            "{}",
            json!({
                "config": path.display().to_string(),
                "loaded": path.exists(),
                "motion_enabled": prefs.motion_enabled,
                "detector": prefs.detector_kind.to_string(),
                "debounce_secs": prefs.debounce_secs,
                "min_motion_distance_m": prefs.min_motion_distance_m,
                "warm_window_secs": filter.warm_window.as_secs(),
                "session_timeout_secs": filter.session_timeout.as_secs(),
                "threshold_mps2": cfg.continuous.threshold_mps2,
            })
        );
    } else {
        let source = if path.exists() {
            path.display().to_string()
        } else {
            "built-in defaults".to_string()
        };
        println!("Config OK ({source})");
        println!("  motion enabled:        {}", prefs.motion_enabled);
        println!("  detector:              {}", prefs.detector_kind);
        println!("  debounce:              {} s", prefs.debounce_secs);
        println!("  min motion distance:   {:.1} m", prefs.min_motion_distance_m);
        println!("  GPS warm window:       {} s", filter.warm_window.as_secs());
        println!("  session timeout:       {} s", filter.session_timeout.as_secs());
        println!("  continuous threshold:  {} m/s^2", cfg.continuous.threshold_mps2);
    }
}

fn self_check(cfg: &Config, json: bool) {
    let platform = SimulatedPlatform::new(
        cfg.platform.significant_motion_available,
        cfg.continuous.threshold_mps2,
    );
    let prefs = Preferences::from(&cfg.motion);
    let available = significant_motion_available(&platform);
    let selected = select_detector(prefs.detector_kind, &platform).kind();
    if json {
        println!(
            "{}",
            json!({
                "significant_motion_available": available,
                "requested": prefs.detector_kind.to_string(),
                "selected": selected.to_string(),
            })
        );
    } else {
        println!("Self-check OK");
        println!("  significant motion sensor: {}", if available { "yes" } else { "no" });
        println!("  requested detector:        {}", prefs.detector_kind);
        println!("  selected detector:         {selected}");
    }
}
