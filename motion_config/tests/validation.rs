use motion_config::{DetectorChoice, load_toml};
use rstest::rstest;

#[test]
fn full_config_parses_and_validates() {
    let toml = r#"
[motion]
enabled = true
detector = "continuous"
debounce_secs = 15
min_motion_distance_m = 25.0

[filter]
warm_window_secs = 3600
session_timeout_secs = 45

[continuous]
threshold_mps2 = 1.2

[platform]
significant_motion_available = false

[logging]
level = "debug"
rotation = "daily"
file = "motion.log"
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config");
    assert_eq!(cfg.motion.detector, DetectorChoice::Continuous);
    assert_eq!(cfg.motion.debounce_secs, 15);
    assert_eq!(cfg.filter.session_timeout_secs, 45);
    assert!(!cfg.platform.significant_motion_available);
    assert_eq!(cfg.logging.file.as_deref(), Some("motion.log"));
}

#[test]
fn partial_sections_keep_defaults() {
    let cfg = load_toml("[motion]\ndebounce_secs = 7\n").expect("parse TOML");
    cfg.validate().expect("valid config");
    assert_eq!(cfg.motion.debounce_secs, 7);
    assert_eq!(cfg.motion.detector, DetectorChoice::Significant);
    assert_eq!(cfg.filter.warm_window_secs, 7200);
    assert_eq!(cfg.continuous.threshold_mps2, 0.8);
}

#[test]
fn unknown_detector_is_a_parse_error() {
    assert!(load_toml("[motion]\ndetector = \"gyro\"\n").is_err());
}

#[rstest]
#[case("[motion]\ndebounce_secs = 90000\n", "debounce_secs")]
#[case("[motion]\nmin_motion_distance_m = 0.0\n", "min_motion_distance_m")]
#[case("[motion]\nmin_motion_distance_m = -3.0\n", "min_motion_distance_m")]
#[case("[motion]\nmin_motion_distance_m = 20000.0\n", "min_motion_distance_m")]
#[case("[filter]\nwarm_window_secs = 0\n", "warm_window_secs")]
#[case("[filter]\nsession_timeout_secs = 0\n", "session_timeout_secs")]
#[case("[filter]\nsession_timeout_secs = 601\n", "session_timeout_secs")]
#[case("[continuous]\nthreshold_mps2 = 0.0\n", "threshold_mps2")]
#[case("[logging]\nlevel = \"loud\"\n", "logging.level")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation")]
fn rejects_invalid_values(#[case] toml: &str, #[case] key: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(key),
        "error '{err}' should name {key}"
    );
}
