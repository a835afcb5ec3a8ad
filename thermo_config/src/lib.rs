#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the temperature controller.
//!
//! - `Config` and its sections are deserialized from TOML; every section is optional
//!   and falls back to the controller's stock behavior (500 ms period, alpha 0.22,
//!   setpoint range 0..=600 C, 256-byte lines).
//! - `Config::validate` rejects out-of-range values with `section.field` messages.
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlCfg {
    /// Control loop period in milliseconds.
    pub period_ms: u64,
    pub setpoint_min: f64,
    pub setpoint_max: f64,
    /// Actuator range the PID output is clamped to (8-bit PWM by default).
    pub output_min: f64,
    pub output_max: f64,
    /// Coefficients used when `tuning.source = "fixed"`, and at startup otherwise.
    pub kp: u8,
    pub ki: u8,
    pub kd: u8,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            period_ms: 500,
            setpoint_min: 0.0,
            setpoint_max: 600.0,
            output_min: 0.0,
            output_max: 255.0,
            kp: 2,
            ki: 5,
            kd: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilterCfg {
    /// Exponential smoothing factor. Range: (0.0, 1.0).
    pub alpha: f64,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self { alpha: 0.22 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TuningSource {
    #[default]
    Fixed,
    Analog,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TuningCfg {
    pub source: TuningSource,
    /// Analog channels for P, I and D.
    pub channels: [u8; 3],
    /// Raw reading at full scale (10-bit converter).
    pub full_scale: u16,
    /// Coefficient produced at full scale.
    pub max_coefficient: u8,
    /// Ignore raw changes smaller than this many counts (0 keeps every change).
    pub hysteresis_counts: u16,
}

impl Default for TuningCfg {
    fn default() -> Self {
        Self {
            source: TuningSource::Fixed,
            channels: [0, 1, 2],
            full_scale: 1023,
            max_coefficient: 10,
            hysteresis_counts: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SerialCfg {
    /// Longest accepted command line in bytes (terminator excluded).
    pub max_line_len: usize,
    /// Capacity of the error queue; the oldest entry is dropped on overflow.
    pub error_queue_len: usize,
    /// Optional device path; stdin/stdout are used when absent.
    pub port: Option<String>,
}

impl Default for SerialCfg {
    fn default() -> Self {
        Self {
            max_line_len: 256,
            error_queue_len: 10,
            port: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimCfg {
    pub ambient_c: f64,
    pub gain_c_per_unit: f64,
    pub loss_per_s: f64,
    pub noise_c: f64,
    /// Report a thermocouple fault after this many reads (fault injection).
    pub fault_after: Option<u64>,
    /// Raw dial positions for the simulated tuning inputs.
    pub tuning_raw: [u16; 3],
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            ambient_c: 22.0,
            gain_c_per_unit: 0.02,
            loss_per_s: 0.01,
            noise_c: 0.25,
            fault_after: None,
            tuning_raw: [205, 512, 102],
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub control: ControlCfg,
    pub filter: FilterCfg,
    pub tuning: TuningCfg,
    pub serial: SerialCfg,
    pub logging: Logging,
    pub sim: SimCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration in {:?}: {}", path, e))
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Control
        if self.control.period_ms == 0 {
            eyre::bail!("control.period_ms must be >= 1");
        }
        if self.control.period_ms > 60 * 60 * 1000 {
            eyre::bail!("control.period_ms is unreasonably large (>1h)");
        }
        if !self.control.setpoint_min.is_finite() || !self.control.setpoint_max.is_finite() {
            eyre::bail!("control.setpoint_min and control.setpoint_max must be finite");
        }
        if self.control.setpoint_min > self.control.setpoint_max {
            eyre::bail!("control.setpoint_min must be <= control.setpoint_max");
        }
        if !(self.control.output_min.is_finite() && self.control.output_max.is_finite())
            || self.control.output_min >= self.control.output_max
        {
            eyre::bail!("control.output_min must be < control.output_max");
        }

        // Filter
        if !(self.filter.alpha > 0.0 && self.filter.alpha < 1.0) {
            eyre::bail!("filter.alpha must be in (0.0, 1.0)");
        }

        // Tuning
        if self.tuning.full_scale == 0 {
            eyre::bail!("tuning.full_scale must be >= 1");
        }
        if self.tuning.hysteresis_counts >= self.tuning.full_scale {
            eyre::bail!("tuning.hysteresis_counts must be < tuning.full_scale");
        }

        // Serial
        if self.serial.max_line_len == 0 {
            eyre::bail!("serial.max_line_len must be >= 1");
        }
        if self.serial.error_queue_len == 0 {
            eyre::bail!("serial.error_queue_len must be >= 1");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly (got {r:?})");
        }

        // Sim
        if self.sim.loss_per_s < 0.0 {
            eyre::bail!("sim.loss_per_s must be >= 0.0");
        }
        if let Some(raw) = self.sim.tuning_raw.iter().find(|r| **r > self.tuning.full_scale) {
            eyre::bail!(
                "sim.tuning_raw values must be <= tuning.full_scale ({} > {})",
                raw,
                self.tuning.full_scale
            );
        }

        Ok(())
    }
}
