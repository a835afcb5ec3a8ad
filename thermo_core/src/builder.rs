//! Builder for `Controller`.
//!
//! The three mandatory collaborators are taken up front; everything else has
//! a default. `build()` validates the combined configuration.

use thermo_traits::{Actuator, LineTransport, Thermocouple, TuningInput};

use crate::commands::build_command_tree;
use crate::config::{ControlCfg, FilterCfg, ProtocolCfg, TuningCfg, TuningMode};
use crate::controller::Controller;
use crate::error::BuildError;
use crate::error_queue::ErrorQueue;
use crate::filter::Smoother;
use crate::pid::PidController;
use crate::state::ControllerState;
use crate::tuning::TuningMapper;

pub struct ControllerBuilder<S, A, L> {
    sensor: S,
    actuator: A,
    transport: L,
    tuning_input: Option<Box<dyn TuningInput>>,
    control: ControlCfg,
    filter: FilterCfg,
    tuning: TuningCfg,
    protocol: ProtocolCfg,
}

impl<S: Thermocouple, A: Actuator, L: LineTransport> Controller<S, A, L> {
    /// Start building a Controller.
    pub fn builder(sensor: S, actuator: A, transport: L) -> ControllerBuilder<S, A, L> {
        ControllerBuilder {
            sensor,
            actuator,
            transport,
            tuning_input: None,
            control: ControlCfg::default(),
            filter: FilterCfg::default(),
            tuning: TuningCfg::default(),
            protocol: ProtocolCfg::default(),
        }
    }
}

impl<S: Thermocouple, A: Actuator, L: LineTransport> ControllerBuilder<S, A, L> {
    pub fn with_control(mut self, control: ControlCfg) -> Self {
        self.control = control;
        self
    }

    pub fn with_filter(mut self, filter: FilterCfg) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_tuning(mut self, tuning: TuningCfg) -> Self {
        self.tuning = tuning;
        self
    }

    /// Required when the tuning mode is `Analog`; ignored otherwise.
    pub fn with_tuning_input(mut self, input: Box<dyn TuningInput>) -> Self {
        self.tuning_input = Some(input);
        self
    }

    pub fn with_protocol(mut self, protocol: ProtocolCfg) -> Self {
        self.protocol = protocol;
        self
    }

    /// Apply every section of a loaded config file.
    pub fn with_config(self, cfg: &thermo_config::Config) -> Self {
        self.with_control((&cfg.control).into())
            .with_filter((&cfg.filter).into())
            .with_tuning((&cfg.tuning).into())
            .with_protocol((&cfg.serial).into())
    }

    pub fn build(self) -> Result<Controller<S, A, L>, BuildError> {
        let c = &self.control;
        if c.period_ms == 0 {
            return Err(BuildError::InvalidConfig("period_ms must be >= 1"));
        }
        if !(c.limits.min.is_finite() && c.limits.max.is_finite()) || c.limits.min > c.limits.max {
            return Err(BuildError::InvalidConfig("setpoint limits must be finite with min <= max"));
        }
        if c.output_min.is_nan() || c.output_max.is_nan() || c.output_min >= c.output_max {
            return Err(BuildError::InvalidConfig("output_min must be < output_max"));
        }
        if !(0.0 < self.filter.alpha && self.filter.alpha < 1.0) {
            return Err(BuildError::InvalidConfig("filter alpha must be in (0.0, 1.0)"));
        }
        if self.protocol.max_line_len == 0 {
            return Err(BuildError::InvalidConfig("max_line_len must be >= 1"));
        }
        if self.protocol.error_queue_len == 0 {
            return Err(BuildError::InvalidConfig("error_queue_len must be >= 1"));
        }

        let tuning = match self.tuning.mode {
            TuningMode::Fixed => None,
            TuningMode::Analog => {
                if self.tuning_input.is_none() {
                    return Err(BuildError::MissingTuningInput);
                }
                Some(TuningMapper::new(self.tuning.clone()))
            }
        };

        let coefficients = c.coefficients;
        let pid = PidController::new(coefficients, c.period_ms, c.output_min, c.output_max);
        tracing::debug!(
            period_ms = c.period_ms,
            alpha = self.filter.alpha,
            analog_tuning = tuning.is_some(),
            "controller built"
        );

        Ok(Controller {
            sensor: self.sensor,
            actuator: self.actuator,
            transport: self.transport,
            tuning_input: self.tuning_input,
            tuning,
            tree: build_command_tree(),
            state: ControllerState::new(coefficients),
            errors: ErrorQueue::new(self.protocol.error_queue_len),
            pid,
            smoother: Smoother::new(self.filter.alpha),
            awaiting_seed: false,
            control: self.control,
            protocol: self.protocol,
        })
    }
}
