use rstest::rstest;
use thermo_config::{TuningSource, load_file, load_toml};

const FULL: &str = r#"
[control]
period_ms = 250
setpoint_min = 0.0
setpoint_max = 600.0
output_min = 0.0
output_max = 255.0
kp = 3
ki = 4
kd = 0

[filter]
alpha = 0.22

[tuning]
source = "analog"
channels = [3, 4, 5]
full_scale = 1023
max_coefficient = 10
hysteresis_counts = 4

[serial]
max_line_len = 128
error_queue_len = 8

[logging]
level = "debug"
rotation = "daily"

[sim]
ambient_c = 20.0
fault_after = 40
"#;

#[test]
fn parses_every_section() {
    let cfg = load_toml(FULL).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.control.period_ms, 250);
    assert_eq!(cfg.tuning.source, TuningSource::Analog);
    assert_eq!(cfg.tuning.channels, [3, 4, 5]);
    assert_eq!(cfg.serial.max_line_len, 128);
    assert_eq!(cfg.sim.fault_after, Some(40));
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[rstest]
#[case("[control]\nperiod_ms = 0\n", "control.period_ms must be >= 1")]
#[case("[filter]\nalpha = 0.0\n", "filter.alpha must be in (0.0, 1.0)")]
#[case("[filter]\nalpha = 1.0\n", "filter.alpha must be in (0.0, 1.0)")]
#[case(
    "[control]\nsetpoint_min = 10.0\nsetpoint_max = 5.0\n",
    "control.setpoint_min must be <="
)]
#[case(
    "[control]\noutput_min = 255.0\noutput_max = 0.0\n",
    "control.output_min must be <"
)]
#[case("[serial]\nmax_line_len = 0\n", "serial.max_line_len must be >= 1")]
#[case("[serial]\nerror_queue_len = 0\n", "serial.error_queue_len must be >= 1")]
#[case("[tuning]\nfull_scale = 0\n", "tuning.full_scale must be >= 1")]
#[case(
    "[tuning]\nhysteresis_counts = 2000\n",
    "tuning.hysteresis_counts must be <"
)]
#[case("[sim]\ntuning_raw = [0, 0, 4000]\n", "sim.tuning_raw values must be <=")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation must be one of")]
fn rejects_out_of_range(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "expected {needle:?} in {err}"
    );
}

#[test]
fn load_file_reports_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_file(&dir.path().join("absent.toml")).expect_err("missing file");
    assert!(format!("{err}").contains("read config"));
}

#[test]
fn load_file_reads_written_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("thermo.toml");
    std::fs::write(&path, FULL).unwrap();
    let cfg = load_file(&path).unwrap();
    assert_eq!(cfg.control.kp, 3);
}

#[test]
fn load_file_wraps_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[control]\nperiod_ms = \"fast\"\n").unwrap();
    let err = load_file(&path).expect_err("type mismatch");
    assert!(format!("{err}").contains("invalid configuration"));
}
