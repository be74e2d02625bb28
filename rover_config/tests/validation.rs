use rover_config::{MotorBackend, PowerCurve, load_path, load_toml};
use rstest::rstest;

const PINS: &str = r#"
[pins]
left_forward_pwm = 24
left_backward_pwm = 27
right_forward_pwm = 23
right_backward_pwm = 17
front_trigger = 9
front_echo = 8
rear_trigger = 10
rear_echo = 25
reset_in = 21
"#;

fn with_pins(rest: &str) -> String {
    format!("{PINS}\n{rest}")
}

#[test]
fn minimal_config_uses_defaults() {
    let cfg = load_toml(PINS).expect("parse TOML");
    cfg.validate().expect("defaults must validate");
    assert_eq!(cfg.network.port, 9999);
    assert_eq!(cfg.ramp.curve, PowerCurve::Quadratic);
    assert_eq!(cfg.safety.max_actuator_failures, 3);
    assert_eq!(cfg.motor_serial.backend, MotorBackend::Gpio);
    assert_eq!(cfg.pins.reset_in, Some(21));
}

#[test]
fn missing_pins_section_is_a_parse_error() {
    let err = load_toml("[network]\nport = 10000\n").expect_err("pins are required");
    assert!(format!("{err}").contains("pins"));
}

#[rstest]
#[case("[ramp]\nincrement = 0", "ramp.increment")]
#[case("[ramp]\nmin_step = 101", "ramp.min_step")]
#[case("[control]\ntick_hz = 0", "control.tick_hz")]
#[case("[safety]\nthreshold_cm = 0.0", "safety.threshold_cm")]
#[case("[safety]\nsample_hz = 0", "safety.sample_hz")]
#[case("[safety]\nmax_actuator_failures = 0", "safety.max_actuator_failures")]
#[case("[hardware]\nsensor_read_timeout_ms = 0", "hardware.sensor_read_timeout_ms")]
#[case("[reset]\ndebounce_n = 0", "reset.debounce_n")]
#[case("[network]\nqueue_depth = 0", "network.queue_depth")]
#[case("[logging]\nrotation = \"weekly\"", "logging.rotation")]
fn rejects_out_of_range_values(#[case] section: &str, #[case] needle: &str) {
    let cfg = load_toml(&with_pins(section)).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "expected {needle:?} in {err}"
    );
}

#[test]
fn linear_table_must_cover_every_level() {
    let cfg = load_toml(&with_pins(
        "[ramp]\ncurve = \"linear\"\nduty_table = [0, 20, 40]",
    ))
    .expect("parse TOML");
    let err = cfg.validate().expect_err("short table");
    assert!(format!("{err}").contains("10 entries"));
}

#[test]
fn linear_table_must_be_monotonic() {
    let cfg = load_toml(&with_pins(
        "[ramp]\ncurve = \"linear\"\nduty_table = [0, 20, 40, 30, 50, 60, 70, 80, 90, 100]",
    ))
    .expect("parse TOML");
    let err = cfg.validate().expect_err("non-monotonic table");
    assert!(format!("{err}").contains("non-decreasing"));
}

#[test]
fn half_configured_sensor_is_rejected() {
    let toml = r#"
[pins]
left_forward_pwm = 24
left_backward_pwm = 27
right_forward_pwm = 23
right_backward_pwm = 17
front_trigger = 9
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("echo pin missing");
    assert!(format!("{err}").contains("front_echo"));
}

#[test]
fn duplicate_motor_pin_is_rejected() {
    let toml = r#"
[pins]
left_forward_pwm = 24
left_backward_pwm = 24
right_forward_pwm = 23
right_backward_pwm = 17
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("duplicate pin");
    assert!(format!("{err}").contains("assigned twice"));
}

#[test]
fn load_path_reads_and_validates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rover.toml");
    std::fs::write(&path, with_pins("[safety]\nthreshold_cm = 35.0")).expect("write");
    let cfg = load_path(&path).expect("valid file");
    assert!((cfg.safety.threshold_cm - 35.0).abs() < f32::EPSILON);

    std::fs::write(&path, with_pins("[control]\ntick_hz = 5000")).expect("write");
    let err = load_path(&path).expect_err("invalid tick rate");
    assert!(format!("{err}").contains("control.tick_hz"));
}

#[test]
fn shipped_sample_config_is_valid() {
    let cfg = load_toml(include_str!("../../etc/rover_config.toml")).expect("sample parses");
    cfg.validate().expect("sample validates");
    assert_eq!(cfg.network.port, 9999);
    assert_eq!(cfg.pins.reset_in, Some(21));
}
