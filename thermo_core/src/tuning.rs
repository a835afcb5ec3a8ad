//! Tuning dial sampling: raw ADC counts to integer PID coefficients.

use crate::config::TuningCfg;
use crate::state::Coefficients;

/// Linear integer map of `raw` onto `[0, max]`.
///
/// Inputs above `full_scale` saturate. Monotonic non-decreasing in `raw`.
#[inline]
pub fn map_raw(raw: u16, full_scale: u16, max: u8) -> u8 {
    let full = u32::from(full_scale.max(1));
    let scaled = u32::from(raw.min(full_scale)) * u32::from(max) / full;
    // scaled <= max by construction
    u8::try_from(scaled).unwrap_or(max)
}

/// Tracks the last accepted raw reading per channel and applies the deadband.
#[derive(Debug, Clone)]
pub struct TuningMapper {
    cfg: TuningCfg,
    accepted: [Option<u16>; 3],
}

impl TuningMapper {
    pub fn new(cfg: TuningCfg) -> Self {
        Self {
            cfg,
            accepted: [None; 3],
        }
    }

    pub fn channels(&self) -> [u8; 3] {
        self.cfg.channels
    }

    /// Map one raw P, I, D triple to coefficients.
    ///
    /// With `hysteresis_counts == 0` every change is followed.
    pub fn update(&mut self, raw: [u16; 3]) -> Coefficients {
        let mut out = [0u8; 3];
        for (slot, (&r, last)) in raw.iter().zip(self.accepted.iter_mut()).enumerate() {
            let value = match *last {
                Some(prev) if r.abs_diff(prev) < self.cfg.hysteresis_counts => prev,
                _ => {
                    *last = Some(r);
                    r
                }
            };
            out[slot] = map_raw(value, self.cfg.full_scale, self.cfg.max_coefficient);
        }
        Coefficients {
            p: out[0],
            i: out[1],
            d: out[2],
        }
    }
}
