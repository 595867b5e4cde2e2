#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(rows) = motion_config::scenario_from_reader(data) {
        // Accepted scenarios are time-ordered
        assert!(rows.windows(2).all(|w| w[0].at_ms <= w[1].at_ms));
    }
});
