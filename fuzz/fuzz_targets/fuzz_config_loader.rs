#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = toml::from_str::<motion_config::Config>(data) {
        if cfg.validate().is_ok() {
            // Accepted configs never carry a non-positive distance or timeout
            assert!(cfg.motion.min_motion_distance_m > 0.0);
            assert!(cfg.filter.session_timeout_secs > 0);
        }
    }
});
