//! Runtime configuration for the controller.
//!
//! These are the structs `Controller` consumes. They are separate from the
//! TOML-deserialized config in `thermo_config`; see `conversions` for the bridge.

use crate::state::Coefficients;

/// Admissible setpoint range, in degrees C.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetpointLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for SetpointLimits {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 600.0,
        }
    }
}

/// Control loop timing and PID output policy.
#[derive(Debug, Clone)]
pub struct ControlCfg {
    /// Fixed loop period in milliseconds; also the PID sample time.
    pub period_ms: u64,
    pub limits: SetpointLimits,
    /// PID output range (the actuator clamps again on its side).
    pub output_min: f64,
    pub output_max: f64,
    /// Startup coefficients, and the permanent ones when tuning is fixed.
    pub coefficients: Coefficients,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            period_ms: 500,
            limits: SetpointLimits::default(),
            output_min: 0.0,
            output_max: 255.0,
            coefficients: Coefficients::default(),
        }
    }
}

/// Exponential smoothing applied to each thermocouple reading.
#[derive(Debug, Clone)]
pub struct FilterCfg {
    /// Weight of the newest reading. Range: (0.0, 1.0).
    pub alpha: f64,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self { alpha: 0.22 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TuningMode {
    #[default]
    Fixed,
    /// Re-read the tuning dials every cycle.
    Analog,
}

#[derive(Debug, Clone)]
pub struct TuningCfg {
    pub mode: TuningMode,
    /// Analog channels for P, I and D.
    pub channels: [u8; 3],
    pub full_scale: u16,
    pub max_coefficient: u8,
    /// Raw changes smaller than this are ignored; 0 follows every change.
    pub hysteresis_counts: u16,
}

impl Default for TuningCfg {
    fn default() -> Self {
        Self {
            mode: TuningMode::Fixed,
            channels: [0, 1, 2],
            full_scale: 1023,
            max_coefficient: 10,
            hysteresis_counts: 0,
        }
    }
}

/// Serial protocol limits.
#[derive(Debug, Clone)]
pub struct ProtocolCfg {
    pub max_line_len: usize,
    pub error_queue_len: usize,
}

impl Default for ProtocolCfg {
    fn default() -> Self {
        Self {
            max_line_len: 256,
            error_queue_len: 10,
        }
    }
}
