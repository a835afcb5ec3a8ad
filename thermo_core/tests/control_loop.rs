use thermo_core::error::BuildError;
use thermo_core::mocks::{FixedTuningInput, MemoryTransport, RecordingActuator, ScriptedThermocouple};
use thermo_core::{
    Coefficients, ControlCfg, Controller, ControllerError, FilterCfg, Mode, TuningCfg, TuningMode,
};
use thermo_traits::Reading;
use thermo_traits::clock::test_clock::TestClock;

fn automatic(
    sensor: ScriptedThermocouple,
    actuator: RecordingActuator,
) -> Controller<ScriptedThermocouple, RecordingActuator, MemoryTransport> {
    let mut c = Controller::builder(sensor, actuator, MemoryTransport::default())
        .build()
        .unwrap();
    c.dispatch("CTRL:SET 300");
    c.dispatch("CTRL:ON");
    c
}

#[test]
fn disable_forces_zero_drive_next_cycle() {
    let mut c = automatic(ScriptedThermocouple::celsius([50.0]), RecordingActuator::new());
    let report = c.step();
    assert!(report.applied > 0.0);

    c.transport_mut().push("CTRL:OFF");
    c.step();
    let report = c.step();
    assert_eq!(report.mode, Mode::Manual);
    assert_eq!(report.applied, 0.0);
    assert_eq!(c.actuator().last(), Some(0.0));
}

#[test]
fn enable_then_immediate_disable_drives_zero() {
    let mut c = Controller::builder(
        ScriptedThermocouple::celsius([50.0]),
        RecordingActuator::new(),
        MemoryTransport::default(),
    )
    .build()
    .unwrap();
    c.dispatch("CTRL:SET 300");
    c.dispatch("CTRL:ON");
    c.dispatch("CTRL:OFF");

    let report = c.step();
    assert_eq!(report.mode, Mode::Manual);
    assert!(report.output > 0.0);
    assert_eq!(report.applied, 0.0);
    assert_eq!(c.actuator().drives(), [0.0]);
}

#[test]
fn fault_holds_temperature_and_cuts_heater() {
    // priming discards the first conversion and seeds from the second
    let sensor = ScriptedThermocouple::celsius([100.0, 100.0])
        .then(Reading::Fault)
        .then(Reading::Fault)
        .then(Reading::Celsius(100.0));
    let mut c = automatic(sensor, RecordingActuator::new());
    let clock = TestClock::new();
    c.prime(&clock);
    assert_eq!(c.state().temperature(), 100.0);

    let faulted = c.step();
    assert!(faulted.sensor_fault);
    assert_eq!(faulted.temperature, 100.0);
    assert_eq!(faulted.applied, 0.0);

    let still = c.step();
    assert!(still.sensor_fault);
    assert_eq!(still.temperature, 100.0);

    let recovered = c.step();
    assert!(!recovered.sensor_fault);
    assert!((recovered.temperature - 100.0).abs() < 1e-9);
    assert!(recovered.applied > 0.0);
}

#[test]
fn sensor_io_error_is_treated_as_fault() {
    let sensor = ScriptedThermocouple::celsius([40.0]).then_error("spi bus stuck");
    let mut c = automatic(sensor, RecordingActuator::new());
    c.step();
    let held = c.state().temperature();
    let report = c.step();
    assert!(report.sensor_fault);
    assert_eq!(report.temperature, held);
    assert_eq!(
        report.hardware_errors,
        vec![ControllerError::Hardware("spi bus stuck".into())]
    );
}

#[test]
fn actuator_failure_does_not_stop_the_loop() {
    let mut c = automatic(ScriptedThermocouple::celsius([20.0]), RecordingActuator::failing());
    for _ in 0..3 {
        let report = c.step();
        assert_eq!(report.hardware_errors.len(), 1);
    }
    assert_eq!(c.actuator().drives().len(), 3);
    c.transport_mut().push("CTRL:SET 10");
    c.step();
    assert_eq!(c.state().setpoint(), 10.0);
}

#[test]
fn analog_tuning_updates_coefficients_every_cycle() {
    let dials = FixedTuningInput::new([1023, 512, 0]);
    let mut c = Controller::builder(
        ScriptedThermocouple::celsius([20.0]),
        RecordingActuator::new(),
        MemoryTransport::default(),
    )
    .with_tuning(TuningCfg {
        mode: TuningMode::Analog,
        ..TuningCfg::default()
    })
    .with_tuning_input(Box::new(dials.clone()))
    .build()
    .unwrap();

    assert_eq!(c.state().coefficients(), Coefficients::default());
    c.step();
    assert_eq!(c.state().coefficients(), Coefficients { p: 10, i: 5, d: 0 });
    assert_eq!(c.dispatch("CTRL:COEFF?").as_deref(), Some("10,5,0"));

    c.step();
    assert_eq!(c.state().coefficients(), Coefficients { p: 10, i: 5, d: 0 });

    dials.set([0, 1023, 307]);
    c.step();
    assert_eq!(c.state().coefficients(), Coefficients { p: 0, i: 10, d: 3 });
    assert_eq!(c.dispatch("CTRL:COEFF?").as_deref(), Some("0,10,3"));
}

#[test]
fn failed_tuning_read_keeps_previous_coefficients() {
    let mut c = Controller::builder(
        ScriptedThermocouple::celsius([20.0]),
        RecordingActuator::new(),
        MemoryTransport::default(),
    )
    .with_tuning(TuningCfg {
        mode: TuningMode::Analog,
        channels: [0, 1, 7],
        ..TuningCfg::default()
    })
    .with_tuning_input(Box::new(FixedTuningInput::new([1023, 1023, 1023])))
    .build()
    .unwrap();

    let report = c.step();
    assert_eq!(report.hardware_errors.len(), 1);
    assert_eq!(c.state().coefficients(), Coefficients::default());
}

#[test]
fn analog_tuning_without_input_is_a_build_error() {
    let err = Controller::builder(
        ScriptedThermocouple::default(),
        RecordingActuator::new(),
        MemoryTransport::default(),
    )
    .with_tuning(TuningCfg {
        mode: TuningMode::Analog,
        ..TuningCfg::default()
    })
    .build()
    .unwrap_err();
    assert_eq!(err, BuildError::MissingTuningInput);
}

#[test]
fn invalid_alpha_and_period_are_rejected() {
    let err = Controller::builder(
        ScriptedThermocouple::default(),
        RecordingActuator::new(),
        MemoryTransport::default(),
    )
    .with_filter(FilterCfg { alpha: 1.0 })
    .build()
    .unwrap_err();
    assert!(matches!(err, BuildError::InvalidConfig(_)));

    let err = Controller::builder(
        ScriptedThermocouple::default(),
        RecordingActuator::new(),
        MemoryTransport::default(),
    )
    .with_control(ControlCfg {
        period_ms: 0,
        ..ControlCfg::default()
    })
    .build()
    .unwrap_err();
    assert!(matches!(err, BuildError::InvalidConfig(_)));
}

#[test]
fn builder_applies_loaded_config() {
    let cfg = thermo_config::load_toml(
        r#"
        [control]
        period_ms = 250
        setpoint_max = 400.0

        [serial]
        error_queue_len = 3
        "#,
    )
    .unwrap();
    let mut c = Controller::builder(
        ScriptedThermocouple::default(),
        RecordingActuator::new(),
        MemoryTransport::default(),
    )
    .with_config(&cfg)
    .build()
    .unwrap();
    assert_eq!(c.period().as_millis(), 250);
    assert_eq!(c.errors().capacity(), 3);
    c.dispatch("CTRL:SET 450");
    assert_eq!(c.state().setpoint(), 0.0);
}
