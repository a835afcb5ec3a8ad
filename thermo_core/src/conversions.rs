//! `From` implementations bridging `thermo_config` types to `thermo_core` types.

use crate::config::{ControlCfg, FilterCfg, ProtocolCfg, SetpointLimits, TuningCfg, TuningMode};
use crate::state::Coefficients;

// ── ControlCfg ───────────────────────────────────────────────────────────────

impl From<&thermo_config::ControlCfg> for ControlCfg {
    fn from(c: &thermo_config::ControlCfg) -> Self {
        Self {
            period_ms: c.period_ms,
            limits: SetpointLimits {
                min: c.setpoint_min,
                max: c.setpoint_max,
            },
            output_min: c.output_min,
            output_max: c.output_max,
            coefficients: Coefficients {
                p: c.kp,
                i: c.ki,
                d: c.kd,
            },
        }
    }
}

// ── FilterCfg ────────────────────────────────────────────────────────────────

impl From<&thermo_config::FilterCfg> for FilterCfg {
    fn from(c: &thermo_config::FilterCfg) -> Self {
        Self { alpha: c.alpha }
    }
}

// ── TuningCfg ────────────────────────────────────────────────────────────────

impl From<thermo_config::TuningSource> for TuningMode {
    fn from(s: thermo_config::TuningSource) -> Self {
        match s {
            thermo_config::TuningSource::Fixed => TuningMode::Fixed,
            thermo_config::TuningSource::Analog => TuningMode::Analog,
        }
    }
}

impl From<&thermo_config::TuningCfg> for TuningCfg {
    fn from(c: &thermo_config::TuningCfg) -> Self {
        Self {
            mode: c.source.into(),
            channels: c.channels,
            full_scale: c.full_scale,
            max_coefficient: c.max_coefficient,
            hysteresis_counts: c.hysteresis_counts,
        }
    }
}

// ── ProtocolCfg ──────────────────────────────────────────────────────────────

impl From<&thermo_config::SerialCfg> for ProtocolCfg {
    fn from(c: &thermo_config::SerialCfg) -> Self {
        Self {
            max_line_len: c.max_line_len,
            error_queue_len: c.error_queue_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_agree_across_crates() {
        let file = thermo_config::Config::default();
        let control = ControlCfg::from(&file.control);
        assert_eq!(control.period_ms, ControlCfg::default().period_ms);
        assert_eq!(control.limits, SetpointLimits::default());
        assert_eq!(control.coefficients, Coefficients::default());
        assert_eq!(FilterCfg::from(&file.filter).alpha, FilterCfg::default().alpha);
        assert_eq!(TuningCfg::from(&file.tuning).mode, TuningMode::Fixed);
        assert_eq!(ProtocolCfg::from(&file.serial).max_line_len, 256);
    }
}
