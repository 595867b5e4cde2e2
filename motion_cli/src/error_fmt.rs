//! Human-readable error descriptions and structured JSON error formatting.

use motion_core::error::{BuildError, MotionError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingPlatform => {
                "What happened: No sensor platform was provided to the controller.\nLikely causes: The platform failed to initialize or was not wired into the builder.\nHow to fix: Pass a platform via with_platform(...).".to_string()
            }
            BuildError::MissingLocationProvider => {
                "What happened: No location provider was provided to the controller.\nLikely causes: The provider failed to initialize or was not wired into the builder.\nHow to fix: Pass a provider via with_location(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun `motion check-config`."
            ),
        };
    }

    if let Some(me) = err.downcast_ref::<MotionError>() {
        return match me {
            MotionError::Config(msg) => format!(
                "What happened: The config file could not be used ({msg}).\nLikely causes: A typo in a key, a wrong type, or an out-of-range value.\nHow to fix: Fix the named key in the TOML and rerun `motion check-config`."
            ),
            MotionError::Scenario(msg) if msg.contains("must have headers") => {
                "Invalid headers in scenario CSV. Expected 'at_ms,event,lat,lon,ax,ay,az'.".to_string()
            }
            MotionError::Scenario(msg) => format!(
                "What happened: The scenario could not be replayed ({msg}).\nLikely causes: Rows out of time order, a misspelled event, or missing coordinates.\nHow to fix: Correct the named row in the CSV."
            ),
            MotionError::Detector(msg) => format!(
                "What happened: Motion sensor failure ({msg}).\nLikely causes: The sensor is missing or busy.\nHow to fix: Switch motion.detector to \"continuous\" or check platform.significant_motion_available."
            ),
            MotionError::Location(msg) => format!(
                "What happened: Location provider failure ({msg}).\nLikely causes: Location permission denied or GPS disabled.\nHow to fix: Grant location access; motion is accepted unverified meanwhile."
            ),
        };
    }

    let msg = err.to_string();

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per error family; anything untyped returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(me) = err.downcast_ref::<MotionError>() {
        return match me {
            MotionError::Config(_) => 3,
            MotionError::Scenario(_) => 4,
            MotionError::Detector(_) => 5,
            MotionError::Location(_) => 6,
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 7;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(me) = err.downcast_ref::<MotionError>() {
        return match me {
            MotionError::Config(_) => "Config",
            MotionError::Scenario(_) => "Scenario",
            MotionError::Detector(_) => "Detector",
            MotionError::Location(_) => "Location",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
