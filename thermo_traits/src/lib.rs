pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// One conversion from the thermocouple front end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Celsius(f64),
    /// Open thermocouple or converter fault.
    Fault,
}

pub trait Thermocouple {
    fn read_temperature(&mut self) -> Result<Reading, Box<dyn std::error::Error + Send + Sync>>;
}

/// Raw analog inputs used to dial in PID coefficients (10-bit converters).
pub trait TuningInput {
    fn read_raw(&mut self, channel: u8) -> Result<u16, Box<dyn std::error::Error + Send + Sync>>;
}

/// Heater drive. Implementations clamp `value` to their own output range.
pub trait Actuator {
    fn drive(&mut self, value: f64) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Line-oriented serial link.
pub trait LineTransport {
    /// Return one complete line if one is buffered, without blocking.
    ///
    /// At most `max_len` bytes are retained; an over-long line is returned
    /// truncated with `overflowed` set so the caller can reject it.
    fn read_line(
        &mut self,
        max_len: usize,
    ) -> Result<Option<Line>, Box<dyn std::error::Error + Send + Sync>>;

    fn write_line(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// True once the peer is gone and no buffered lines remain.
    fn is_closed(&self) -> bool {
        false
    }
}

impl<T: Thermocouple + ?Sized> Thermocouple for Box<T> {
    fn read_temperature(&mut self) -> Result<Reading, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_temperature()
    }
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn drive(&mut self, value: f64) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).drive(value)
    }
}

impl<T: LineTransport + ?Sized> LineTransport for Box<T> {
    fn read_line(
        &mut self,
        max_len: usize,
    ) -> Result<Option<Line>, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_line(max_len)
    }

    fn write_line(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).write_line(text)
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

/// A line pulled off the transport, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub overflowed: bool,
}

impl Line {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            overflowed: false,
        }
    }

    /// Build a line from raw input, truncating to `max_len` bytes on a char boundary.
    pub fn bounded(raw: &str, max_len: usize) -> Self {
        let raw = raw.trim_end_matches(['\r', '\n']);
        if raw.len() <= max_len {
            return Self::new(raw);
        }
        let mut cut = max_len;
        while cut > 0 && !raw.is_char_boundary(cut) {
            cut -= 1;
        }
        Self {
            text: raw[..cut].to_string(),
            overflowed: true,
        }
    }
}
