use rppal::pwm::{Channel, Polarity, Pwm};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use thermo_traits::{Actuator, Reading, Thermocouple};
use tracing::trace;

use crate::error::{HwError, Result};

/// Open-thermocouple flag in the MAX6675 frame.
const OPEN_INPUT_BIT: u16 = 0x0004;

/// MAX6675 K-type thermocouple converter on the SPI bus.
pub struct Max6675 {
    spi: Spi,
}

impl Max6675 {
    pub fn new(bus: u8, chip_select: u8) -> Result<Self> {
        let bus = match bus {
            0 => Bus::Spi0,
            1 => Bus::Spi1,
            other => return Err(HwError::Spi(format!("unsupported bus {other}"))),
        };
        let ss = match chip_select {
            0 => SlaveSelect::Ss0,
            1 => SlaveSelect::Ss1,
            2 => SlaveSelect::Ss2,
            other => return Err(HwError::Spi(format!("unsupported chip select {other}"))),
        };
        // 4.3 MHz max per datasheet
        let spi = Spi::new(bus, ss, 4_000_000, Mode::Mode0).map_err(|e| HwError::Spi(e.to_string()))?;
        Ok(Self { spi })
    }

    fn read_frame(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        let n = self
            .spi
            .read(&mut buf)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        if n != buf.len() {
            return Err(HwError::Timeout);
        }
        let frame = u16::from_be_bytes(buf);
        trace!(frame, "max6675 raw frame");
        Ok(frame)
    }
}

/// Decode a 16-bit MAX6675 frame: 12-bit temperature in quarter degrees, bit 2 flags an open input.
pub fn decode_frame(frame: u16) -> Reading {
    if frame & OPEN_INPUT_BIT != 0 {
        return Reading::Fault;
    }
    Reading::Celsius(f64::from(frame >> 3) * 0.25)
}

impl Thermocouple for Max6675 {
    fn read_temperature(&mut self) -> std::result::Result<Reading, Box<dyn std::error::Error + Send + Sync>> {
        let frame = self.read_frame()?;
        Ok(decode_frame(frame))
    }
}

/// Heater driven from a hardware PWM channel; drive values map linearly onto duty cycle.
pub struct HardwareHeater {
    pwm: Pwm,
    full_scale: f64,
}

impl HardwareHeater {
    pub fn new(channel: u8, frequency_hz: f64, full_scale: f64) -> Result<Self> {
        let channel = match channel {
            0 => Channel::Pwm0,
            1 => Channel::Pwm1,
            other => return Err(HwError::Pwm(format!("unsupported channel {other}"))),
        };
        let pwm = Pwm::with_frequency(channel, frequency_hz, 0.0, Polarity::Normal, true)
            .map_err(|e| HwError::Pwm(e.to_string()))?;
        Ok(Self { pwm, full_scale })
    }
}

impl Actuator for HardwareHeater {
    fn drive(&mut self, value: f64) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let duty = if value.is_finite() && self.full_scale > 0.0 {
            (value / self.full_scale).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|e| HwError::Pwm(e.to_string()))?;
        trace!(duty, "heater duty");
        Ok(())
    }
}

impl Drop for HardwareHeater {
    fn drop(&mut self) {
        if let Err(e) = self.pwm.set_duty_cycle(0.0) {
            tracing::warn!(error = %e, "failed to zero heater on shutdown");
        }
    }
}
