//! Per-cycle report returned by `Controller::step`.

use crate::error::ControllerError;
use crate::state::Mode;

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Smoothed temperature after this cycle.
    pub temperature: f64,
    /// PID output computed this cycle.
    pub output: f64,
    /// Value handed to the actuator (0 unless Automatic and no sensor fault).
    pub applied: f64,
    pub mode: Mode,
    pub sensor_fault: bool,
    /// Whether a command line was consumed this cycle.
    pub dispatched: bool,
    /// Collaborator failures seen this cycle. Never fatal.
    pub hardware_errors: Vec<ControllerError>,
}

impl CycleReport {
    pub fn is_clean(&self) -> bool {
        self.hardware_errors.is_empty() && !self.sensor_fault
    }
}
