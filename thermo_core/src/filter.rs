//! First-order IIR low-pass applied to thermocouple readings.

#[derive(Debug, Clone, Copy)]
pub struct Smoother {
    alpha: f64,
}

impl Smoother {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// `alpha * reading + (1 - alpha) * previous`
    #[inline]
    pub fn apply(&self, previous: f64, reading: f64) -> f64 {
        self.alpha * reading + (1.0 - self.alpha) * previous
    }
}
