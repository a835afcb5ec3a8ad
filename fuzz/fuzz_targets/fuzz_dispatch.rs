#![no_main]
use libfuzzer_sys::fuzz_target;
use thermo_core::Controller;
use thermo_core::mocks::{MemoryTransport, RecordingActuator, ScriptedThermocouple};

fuzz_target!(|data: &str| {
    let Ok(mut c) = Controller::builder(
        ScriptedThermocouple::celsius([21.5]),
        RecordingActuator::new(),
        MemoryTransport::new(data.lines()),
    )
    .build() else {
        return;
    };
    for _ in 0..data.lines().count().min(64) {
        let report = c.step();
        assert!(report.output.is_finite());
    }
    assert!(c.errors().len() <= c.errors().capacity());
    let sp = c.state().setpoint();
    assert!((0.0..=600.0).contains(&sp));
});
