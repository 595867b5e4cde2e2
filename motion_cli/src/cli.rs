//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "motion", version, about = "Motion-gated scan duty cycling")]
pub struct Cli {
    /// Path to config TOML; a missing file means built-in defaults
    #[arg(long, value_name = "FILE", default_value = "etc/motion_config.toml")]
    pub config: PathBuf,

    /// Emit JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a scenario CSV against a controller on simulated hardware
    Simulate {
        /// Scenario CSV (headers: at_ms,event,lat,lon,ax,ay,az)
        #[arg(long, value_name = "FILE")]
        scenario: PathBuf,
        /// Follow the scenario timestamps on the wall clock instead of a manual clock
        #[arg(long, action = ArgAction::SetTrue)]
        realtime: bool,
        /// Append user-facing diagnostic notes to this file
        #[arg(long, value_name = "FILE")]
        notes: Option<PathBuf>,
    },
    /// Load and validate the config, then print the effective settings
    CheckConfig,
    /// Report sensor capabilities and the detector that would be used
    SelfCheck,
}
