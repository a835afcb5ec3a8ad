//! Discrete PID with proportional-on-measurement and direct action.
//!
//! Gains are given per second and scaled to the sample period on
//! [`PidController::set_tunings`]: `ki * dt`, `kd / dt`. The proportional term
//! acts on the change in input rather than on the error, so a setpoint step
//! produces no output kick. The integral accumulator is clamped to the output
//! limits every step, which doubles as anti-windup.

use crate::state::Coefficients;

#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    sample_time_s: f64,
    out_min: f64,
    out_max: f64,
    output_sum: f64,
    last_input: f64,
}

impl PidController {
    /// `sample_time_ms` is clamped to at least 1.
    pub fn new(coefficients: Coefficients, sample_time_ms: u64, out_min: f64, out_max: f64) -> Self {
        let mut pid = Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            sample_time_s: sample_time_ms.max(1) as f64 / 1000.0,
            out_min,
            out_max,
            output_sum: 0.0,
            last_input: 0.0,
        };
        pid.set_tunings(coefficients);
        pid
    }

    pub fn set_tunings(&mut self, c: Coefficients) {
        self.kp = f64::from(c.p);
        self.ki = f64::from(c.i) * self.sample_time_s;
        self.kd = f64::from(c.d) / self.sample_time_s;
    }

    /// Seed the accumulator and derivative memory for a bumpless start.
    pub fn initialize(&mut self, input: f64, output: f64) {
        self.last_input = input;
        self.output_sum = output.clamp(self.out_min, self.out_max);
    }

    pub fn compute(&mut self, setpoint: f64, input: f64) -> f64 {
        let error = setpoint - input;
        let d_input = input - self.last_input;

        self.output_sum += self.ki * error;
        self.output_sum -= self.kp * d_input;
        self.output_sum = self.output_sum.clamp(self.out_min, self.out_max);

        self.last_input = input;
        (self.output_sum - self.kd * d_input).clamp(self.out_min, self.out_max)
    }

    /// Gains as applied per sample: `(kp, ki * dt, kd / dt)`.
    pub fn gains(&self) -> (f64, f64, f64) {
        (self.kp, self.ki, self.kd)
    }

    pub fn output_limits(&self) -> (f64, f64) {
        (self.out_min, self.out_max)
    }
}
