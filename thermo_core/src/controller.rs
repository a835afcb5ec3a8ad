//! The temperature control loop (`Controller`).
//!
//! Each call to [`Controller::step`] runs one full cycle: sense, smooth,
//! sample tuning dials, compute PID, actuate, then handle at most one command
//! line. Pacing is left to the caller (see `runner`).

use std::time::Duration;

use thermo_traits::{Actuator, Clock, Line, LineTransport, Reading, Thermocouple, TuningInput};

use crate::commands::{CommandContext, execute};
use crate::config::{ControlCfg, ProtocolCfg};
use crate::error::ControllerError;
use crate::error_queue::{ErrorQueue, ErrorRecord};
use crate::filter::Smoother;
use crate::hw_error::{map_hw_error, map_transport_error};
use crate::pid::PidController;
use crate::router::{CommandTree, RouteError};
use crate::state::{ControllerState, Mode};
use crate::status::CycleReport;
use crate::tuning::TuningMapper;

pub struct Controller<S: Thermocouple, A: Actuator, L: LineTransport> {
    pub(crate) sensor: S,
    pub(crate) actuator: A,
    pub(crate) transport: L,
    pub(crate) tuning_input: Option<Box<dyn TuningInput>>,
    pub(crate) tuning: Option<TuningMapper>,
    pub(crate) tree: CommandTree,
    pub(crate) state: ControllerState,
    pub(crate) errors: ErrorQueue,
    pub(crate) pid: PidController,
    pub(crate) smoother: Smoother,
    /// Priming failed to seed the filter; the next good reading does it.
    pub(crate) awaiting_seed: bool,
    pub(crate) control: ControlCfg,
    pub(crate) protocol: ProtocolCfg,
}

impl<S: Thermocouple, A: Actuator, L: LineTransport> core::fmt::Debug for Controller<S, A, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("state", &self.state)
            .field("pending_errors", &self.errors.len())
            .field("analog_tuning", &self.tuning.is_some())
            .finish()
    }
}

impl<S: Thermocouple, A: Actuator, L: LineTransport> Controller<S, A, L> {
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn errors(&self) -> &ErrorQueue {
        &self.errors
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    pub fn control_cfg(&self) -> &ControlCfg {
        &self.control
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.control.period_ms)
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn transport(&self) -> &L {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut L {
        &mut self.transport
    }

    /// Startup sequence: discard one conversion, wait a period, then seed the
    /// smoothed temperature with the first real reading.
    ///
    /// A fault here sets the fault flag and defers seeding to the first good
    /// reading the loop sees.
    pub fn prime<C: Clock + ?Sized>(&mut self, clock: &C) {
        if let Err(e) = self.sensor.read_temperature() {
            tracing::debug!(error = %e, "discarded priming conversion failed");
        }
        clock.sleep(self.period());

        match self.sensor.read_temperature() {
            Ok(Reading::Celsius(t)) if t.is_finite() => {
                self.seed(t);
                tracing::info!(temperature = t, "sensor primed");
                return;
            }
            Ok(_) => tracing::warn!("sensor fault during priming"),
            Err(e) => {
                tracing::warn!(error = %map_hw_error(&*e), "sensor read failed during priming");
            }
        }
        self.state.set_sensor_fault(true);
        self.awaiting_seed = true;
        self.pid.initialize(self.state.temperature(), 0.0);
    }

    fn seed(&mut self, t: f64) {
        self.state.set_temperature(t);
        self.state.set_sensor_fault(false);
        self.awaiting_seed = false;
        self.pid.initialize(t, 0.0);
    }

    /// One control cycle. Never fails; collaborator errors are logged and reported.
    pub fn step(&mut self) -> CycleReport {
        let mut hardware_errors = Vec::new();

        let reading = match self.sensor.read_temperature() {
            Ok(r) => r,
            Err(e) => {
                let err = map_hw_error(&*e);
                tracing::warn!(error = %err, "thermocouple read failed");
                hardware_errors.push(err);
                Reading::Fault
            }
        };
        self.absorb(reading);

        if let Some(c) = self.sample_tuning(&mut hardware_errors) {
            if c != self.state.coefficients() {
                tracing::debug!(coefficients = %c, "tunings changed");
                self.state.set_coefficients(c);
            }
            self.pid.set_tunings(c);
        }

        let output = self.pid.compute(self.state.setpoint(), self.state.temperature());
        self.state.set_output(output);

        let applied = match self.state.mode() {
            Mode::Automatic if !self.state.sensor_fault() => output,
            _ => 0.0,
        };
        if let Err(e) = self.actuator.drive(applied) {
            let err = map_hw_error(&*e);
            tracing::warn!(error = %err, "actuator drive failed");
            hardware_errors.push(err);
        }

        let dispatched = self.poll_line(&mut hardware_errors);

        tracing::debug!(
            temperature = self.state.temperature(),
            output,
            applied,
            "cycle"
        );
        CycleReport {
            temperature: self.state.temperature(),
            output,
            applied,
            mode: self.state.mode(),
            sensor_fault: self.state.sensor_fault(),
            dispatched,
            hardware_errors,
        }
    }

    /// Route and execute one command line, queueing any protocol error.
    ///
    /// Returns the response line, if the command produced one. Does not touch
    /// the transport.
    pub fn dispatch(&mut self, line: &str) -> Option<String> {
        let resolved = match self.tree.resolve(line) {
            Ok(r) => r,
            Err(RouteError::Empty) => return None,
            Err(RouteError::UndefinedHeader(header)) => {
                tracing::debug!(%header, "undefined header");
                self.errors.enqueue(ErrorRecord::undefined_header());
                return None;
            }
        };

        let mut ctx = CommandContext {
            state: &mut self.state,
            errors: &mut self.errors,
            limits: &self.control.limits,
        };
        let outcome = execute(resolved.handler, &resolved.args, &mut ctx);
        if let Some(record) = outcome.error {
            self.errors.enqueue(record);
        }
        outcome.response
    }

    fn absorb(&mut self, reading: Reading) {
        match reading {
            Reading::Celsius(t) if t.is_finite() => {
                if self.state.sensor_fault() {
                    tracing::info!(temperature = t, "sensor recovered");
                }
                if self.awaiting_seed {
                    tracing::debug!(temperature = t, "seeding filter from first good reading");
                    self.seed(t);
                    return;
                }
                self.state.set_sensor_fault(false);
                let smoothed = self.smoother.apply(self.state.temperature(), t);
                self.state.set_temperature(smoothed);
            }
            _ => {
                if !self.state.sensor_fault() {
                    tracing::warn!(
                        held = self.state.temperature(),
                        "thermocouple fault; holding last temperature"
                    );
                }
                self.state.set_sensor_fault(true);
            }
        }
    }

    fn sample_tuning(
        &mut self,
        hardware_errors: &mut Vec<ControllerError>,
    ) -> Option<crate::state::Coefficients> {
        let (Some(mapper), Some(input)) = (self.tuning.as_mut(), self.tuning_input.as_mut()) else {
            return None;
        };
        let mut raw = [0u16; 3];
        for (slot, channel) in mapper.channels().into_iter().enumerate() {
            match input.read_raw(channel) {
                Ok(v) => raw[slot] = v,
                Err(e) => {
                    let err = map_hw_error(&*e);
                    tracing::warn!(channel, error = %err, "tuning read failed; keeping coefficients");
                    hardware_errors.push(err);
                    return None;
                }
            }
        }
        Some(mapper.update(raw))
    }

    fn poll_line(&mut self, hardware_errors: &mut Vec<ControllerError>) -> bool {
        let line = match self.transport.read_line(self.protocol.max_line_len) {
            Ok(Some(line)) => line,
            Ok(None) => return false,
            Err(e) => {
                let err = map_transport_error(&*e);
                tracing::warn!(error = %err, "transport read failed");
                hardware_errors.push(err);
                return false;
            }
        };
        if let Some(response) = self.handle_line(line)
            && let Err(e) = self.transport.write_line(&response)
        {
            let err = map_transport_error(&*e);
            tracing::warn!(error = %err, "transport write failed");
            hardware_errors.push(err);
        }
        true
    }

    fn handle_line(&mut self, line: Line) -> Option<String> {
        if line.overflowed {
            tracing::warn!(
                max_len = self.protocol.max_line_len,
                "command line too long; rejected"
            );
            self.errors.enqueue(ErrorRecord::too_much_data());
            return None;
        }
        self.dispatch(&line.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_queue::codes;
    use crate::mocks::{MemoryTransport, RecordingActuator, ScriptedThermocouple};
    use thermo_traits::clock::test_clock::TestClock;

    type TestController = Controller<ScriptedThermocouple, RecordingActuator, MemoryTransport>;

    fn controller(readings: &[f64], lines: &[&str]) -> TestController {
        Controller::builder(
            ScriptedThermocouple::celsius(readings.iter().copied()),
            RecordingActuator::new(),
            MemoryTransport::new(lines.iter().copied()),
        )
        .build()
        .unwrap()
    }

    #[test]
    fn prime_discards_first_conversion_and_seeds_filter() {
        let mut c = controller(&[999.0, 100.0, 200.0], &[]);
        let clock = TestClock::new();
        c.prime(&clock);
        assert_eq!(c.state().temperature(), 100.0);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(500)]);

        let report = c.step();
        assert!((report.temperature - 122.0).abs() < 1e-9);
    }

    #[test]
    fn faulted_prime_seeds_from_first_good_reading() {
        let mut c = Controller::builder(
            ScriptedThermocouple::new([
                Reading::Celsius(300.0),
                Reading::Fault,
                Reading::Celsius(300.0),
            ]),
            RecordingActuator::new(),
            MemoryTransport::default(),
        )
        .build()
        .unwrap();
        c.prime(&TestClock::new());
        assert!(c.state().sensor_fault());

        let report = c.step();
        assert_eq!(report.temperature, 300.0);
        assert!(!report.sensor_fault);

        let next = c.step();
        assert!((next.temperature - 300.0).abs() < 1e-9);
    }

    #[test]
    fn unchanged_dials_still_push_tunings() {
        use crate::config::{TuningCfg, TuningMode};
        use crate::mocks::FixedTuningInput;
        use crate::state::Coefficients;

        let mut c = Controller::builder(
            ScriptedThermocouple::celsius([20.0]),
            RecordingActuator::new(),
            MemoryTransport::default(),
        )
        .with_tuning(TuningCfg {
            mode: TuningMode::Analog,
            ..TuningCfg::default()
        })
        .with_tuning_input(Box::new(FixedTuningInput::new([1023, 512, 0])))
        .build()
        .unwrap();
        c.step();
        assert_eq!(c.pid.gains(), (10.0, 2.5, 0.0));

        c.pid.set_tunings(Coefficients { p: 0, i: 0, d: 0 });
        c.step();
        assert_eq!(c.pid.gains(), (10.0, 2.5, 0.0));
    }

    #[test]
    fn manual_mode_computes_but_drives_zero() {
        let mut c = controller(&[20.0], &["CTRL:SET 300"]);
        c.step();
        let report = c.step();
        assert_eq!(report.mode, Mode::Manual);
        assert!(report.output > 0.0);
        assert_eq!(report.applied, 0.0);
        assert!(c.actuator().drives().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn commands_take_effect_next_cycle() {
        let mut c = controller(&[20.0], &["CTRL:SET 300", "CTRL:ON"]);
        let first = c.step();
        assert!(first.dispatched);
        assert_eq!(first.applied, 0.0);
        c.step();
        let third = c.step();
        assert_eq!(third.mode, Mode::Automatic);
        assert_eq!(third.applied, third.output);
        assert!(third.applied > 0.0);
    }

    #[test]
    fn over_long_line_is_rejected_with_too_much_data() {
        let long = format!("CTRL:SET {}", "1".repeat(300));
        let mut c = controller(&[20.0], &[&long]);
        c.step();
        assert_eq!(c.state().setpoint(), 0.0);
        assert_eq!(c.errors().iter().next().map(|r| r.code), Some(codes::TOO_MUCH_DATA));
    }

    #[test]
    fn unknown_header_queues_undefined_header() {
        let mut c = controller(&[20.0], &[]);
        assert_eq!(c.dispatch("CTRL:BOGUS?"), None);
        assert_eq!(c.errors().iter().next().map(|r| r.code), Some(codes::UNDEFINED_HEADER));
        assert_eq!(c.dispatch("SYST:ERR?").as_deref(), Some("-113,\"Undefined header\""));
        assert_eq!(c.dispatch("SYST:ERR?").as_deref(), Some("0,\"No error\""));
    }

    #[test]
    fn responses_are_written_to_transport() {
        let mut c = controller(&[20.0], &["*IDN?"]);
        c.step();
        assert_eq!(c.transport().written(), ["OIC,Embedded SCPI Example,1,10"]);
    }
}
