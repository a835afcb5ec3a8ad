//! The controller's single owned state record.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Output computed but never applied; heater held at zero.
    #[default]
    Manual,
    /// Computed output drives the heater.
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coefficients {
    pub p: u8,
    pub i: u8,
    pub d: u8,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self { p: 2, i: 5, d: 1 }
    }
}

/// `P,I,D` as reported by `CTRL:COEFF?`.
impl fmt::Display for Coefficients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.p, self.i, self.d)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    setpoint: f64,
    temperature: f64,
    output: f64,
    coefficients: Coefficients,
    mode: Mode,
    sensor_fault: bool,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new(Coefficients::default())
    }
}

impl ControllerState {
    pub fn new(coefficients: Coefficients) -> Self {
        Self {
            setpoint: 0.0,
            temperature: 0.0,
            output: 0.0,
            coefficients,
            mode: Mode::Manual,
            sensor_fault: false,
        }
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Smoothed temperature in degrees C.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Last PID output, whether or not it was applied.
    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn sensor_fault(&self) -> bool {
        self.sensor_fault
    }

    pub fn enable(&mut self) {
        if self.mode != Mode::Automatic {
            tracing::info!("controller enabled");
        }
        self.mode = Mode::Automatic;
    }

    pub fn disable(&mut self) {
        if self.mode != Mode::Manual {
            tracing::info!("controller disabled");
        }
        self.mode = Mode::Manual;
    }

    /// Only reachable through `commands::validate_setpoint`.
    pub(crate) fn commit_setpoint(&mut self, value: f64) {
        self.setpoint = value;
    }

    pub(crate) fn set_temperature(&mut self, smoothed: f64) {
        self.temperature = smoothed;
    }

    pub(crate) fn set_output(&mut self, output: f64) {
        self.output = output;
    }

    pub(crate) fn set_coefficients(&mut self, coefficients: Coefficients) {
        self.coefficients = coefficients;
    }

    pub(crate) fn set_sensor_fault(&mut self, fault: bool) {
        self.sensor_fault = fault;
    }
}
