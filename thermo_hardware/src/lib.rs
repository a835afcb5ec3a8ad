pub mod error;
#[cfg(feature = "hardware")]
pub mod max6675;
pub mod transport;

use std::cell::Cell;
use std::rc::Rc;

use thermo_traits::{Actuator, Reading, Thermocouple, TuningInput};

pub use transport::StreamTransport;

/// First-order thermal model shared by the simulated heater and thermocouple.
#[derive(Debug, Clone, Copy)]
pub struct PlantParams {
    pub ambient_c: f64,
    /// Steady-state rise per unit of heater drive, in °C per second.
    pub gain_c_per_unit: f64,
    /// Fraction of the excess over ambient lost per second.
    pub loss_per_s: f64,
    /// Peak amplitude of the deterministic measurement jitter.
    pub noise_c: f64,
    /// Simulated time between reads, in seconds.
    pub dt_s: f64,
    /// Report a sensor fault on every read after this many good ones.
    pub fault_after: Option<u64>,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            ambient_c: 22.0,
            gain_c_per_unit: 0.02,
            loss_per_s: 0.01,
            noise_c: 0.25,
            dt_s: 0.5,
            fault_after: None,
        }
    }
}

/// Shared plant state. Clone handles to hand to the thermocouple and actuator.
#[derive(Debug, Clone)]
pub struct SimulatedPlant {
    temperature: Rc<Cell<f64>>,
    drive: Rc<Cell<f64>>,
    params: PlantParams,
}

impl SimulatedPlant {
    pub fn new(params: PlantParams) -> Self {
        Self {
            temperature: Rc::new(Cell::new(params.ambient_c)),
            drive: Rc::new(Cell::new(0.0)),
            params,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.get()
    }

    pub fn drive(&self) -> f64 {
        self.drive.get()
    }

    fn advance(&self) -> f64 {
        let p = &self.params;
        let t = self.temperature.get();
        let heat = p.gain_c_per_unit * self.drive.get();
        let loss = p.loss_per_s * (t - p.ambient_c);
        let next = t + (heat - loss) * p.dt_s;
        self.temperature.set(next);
        next
    }

    pub fn thermocouple(&self) -> SimulatedThermocouple {
        SimulatedThermocouple {
            plant: self.clone(),
            reads: 0,
        }
    }

    pub fn actuator(&self, min: f64, max: f64) -> SimulatedActuator {
        SimulatedActuator {
            plant: self.clone(),
            min,
            max,
        }
    }
}

/// Simulated thermocouple; advances the plant by one step per read.
pub struct SimulatedThermocouple {
    plant: SimulatedPlant,
    reads: u64,
}

impl Thermocouple for SimulatedThermocouple {
    fn read_temperature(&mut self) -> Result<Reading, Box<dyn std::error::Error + Send + Sync>> {
        self.reads = self.reads.saturating_add(1);
        let t = self.plant.advance();
        if let Some(n) = self.plant.params.fault_after
            && self.reads > n
        {
            tracing::trace!(reads = self.reads, "simulated thermocouple fault");
            return Ok(Reading::Fault);
        }
        let jitter = (self.reads as f64 * 0.7).sin() * self.plant.params.noise_c;
        // MAX6675 resolution
        let measured = ((t + jitter) * 4.0).round() / 4.0;
        tracing::trace!(measured, "simulated thermocouple read");
        Ok(Reading::Celsius(measured))
    }
}

/// Simulated heater drive, clamped to `[min, max]`.
pub struct SimulatedActuator {
    plant: SimulatedPlant,
    min: f64,
    max: f64,
}

impl Actuator for SimulatedActuator {
    fn drive(&mut self, value: f64) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let v = if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.min
        };
        self.plant.drive.set(v);
        Ok(())
    }
}

/// Fixed potentiometer positions for the three tuning channels.
#[derive(Debug, Clone)]
pub struct SimulatedTuningInput {
    raw: Rc<[Cell<u16>; 3]>,
}

impl SimulatedTuningInput {
    pub fn new(p: u16, i: u16, d: u16) -> Self {
        Self {
            raw: Rc::new([Cell::new(p), Cell::new(i), Cell::new(d)]),
        }
    }

    /// Turn one of the dials; the handle is shared across clones.
    pub fn set(&self, channel: u8, raw: u16) {
        if let Some(c) = self.raw.get(usize::from(channel)) {
            c.set(raw.min(1023));
        }
    }
}

impl TuningInput for SimulatedTuningInput {
    fn read_raw(&mut self, channel: u8) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        self.raw
            .get(usize::from(channel))
            .map(Cell::get)
            .ok_or_else(|| error::HwError::Channel(channel).into())
    }
}

#[cfg(feature = "hardware")]
pub use max6675::{HardwareHeater, Max6675};

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> PlantParams {
        PlantParams {
            noise_c: 0.0,
            ..PlantParams::default()
        }
    }

    #[test]
    fn plant_heats_when_driven() {
        let plant = SimulatedPlant::new(quiet());
        let mut tc = plant.thermocouple();
        let mut heater = plant.actuator(0.0, 255.0);
        heater.drive(255.0).unwrap();
        let first = tc.read_temperature().unwrap();
        for _ in 0..20 {
            tc.read_temperature().unwrap();
        }
        let later = tc.read_temperature().unwrap();
        match (first, later) {
            (Reading::Celsius(a), Reading::Celsius(b)) => assert!(b > a),
            other => panic!("unexpected readings: {other:?}"),
        }
    }

    #[test]
    fn plant_holds_ambient_when_idle() {
        let plant = SimulatedPlant::new(quiet());
        let mut tc = plant.thermocouple();
        assert_eq!(tc.read_temperature().unwrap(), Reading::Celsius(22.0));
    }

    #[test]
    fn actuator_clamps_to_range() {
        let plant = SimulatedPlant::new(quiet());
        let mut heater = plant.actuator(0.0, 255.0);
        heater.drive(1000.0).unwrap();
        assert_eq!(plant.drive(), 255.0);
        heater.drive(-3.0).unwrap();
        assert_eq!(plant.drive(), 0.0);
        heater.drive(f64::NAN).unwrap();
        assert_eq!(plant.drive(), 0.0);
    }

    #[test]
    fn fault_after_reports_fault() {
        let plant = SimulatedPlant::new(PlantParams {
            fault_after: Some(1),
            ..quiet()
        });
        let mut tc = plant.thermocouple();
        assert!(matches!(tc.read_temperature().unwrap(), Reading::Celsius(_)));
        assert_eq!(tc.read_temperature().unwrap(), Reading::Fault);
    }

    #[test]
    fn tuning_channels_out_of_range_error() {
        let mut tuning = SimulatedTuningInput::new(0, 512, 1023);
        assert_eq!(tuning.read_raw(1).unwrap(), 512);
        assert!(tuning.read_raw(3).is_err());
    }
}
