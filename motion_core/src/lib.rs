#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Motion-aware duty cycling (hardware-agnostic).
//!
//! Pauses a power-hungry scanning pipeline while the device sits still and
//! resumes it on real motion. All sensor and location access goes through the
//! `motion_traits` seams.
//!
//! ## Architecture
//!
//! - **Controller**: Idle / DebouncePending / Armed state machine (`controller`)
//! - **Filter**: GPS displacement check against false motion (`filter`)
//! - **Timers**: deterministic `TimerQueue` on an injected clock (`scheduler`)
//! - **Signals**: `MotionDetected` / `LocationNotChanging` broadcast (`signal`)
//!
//! Everything runs on one logical thread. The host pushes scanner lifecycle
//! events, sensor readings and location fixes in, and calls `poll()` when the
//! next deadline passes.

pub mod builder;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod detector;
pub mod error;
pub mod filter;
pub mod geo;
pub mod hw_error;
pub mod logger;
pub mod mocks;
pub mod scheduler;
pub mod signal;

pub use builder::{ControllerBuilder, Missing, Set};
pub use config::{FilterCfg, PreferenceStore, Preferences};
pub use controller::{ControllerState, MotionController};
pub use detector::{select_detector, significant_motion_available};
pub use error::{BuildError, MotionError, Result};
pub use filter::{FalsePositiveFilter, FilterSession, SessionStart};
pub use logger::{DiagnosticSink, FileSink, NullSink};
pub use scheduler::{TimerEvent, TimerQueue};
pub use signal::{
    Broadcaster, ChannelBroadcaster, ConfirmReason, MotionSignal, NullBroadcaster, SignalReceiver,
    Verdict,
};
