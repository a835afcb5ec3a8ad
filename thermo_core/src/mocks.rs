//! In-memory collaborators for tests, fuzzing and dry runs.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use thermo_traits::{Actuator, Line, LineTransport, Reading, Thermocouple, TuningInput};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
enum Step {
    Reading(Reading),
    Error(String),
}

/// Plays back a fixed script of readings, then repeats the last one.
#[derive(Debug, Default)]
pub struct ScriptedThermocouple {
    script: VecDeque<Step>,
    last: Option<Reading>,
}

impl ScriptedThermocouple {
    pub fn new(readings: impl IntoIterator<Item = Reading>) -> Self {
        Self {
            script: readings.into_iter().map(Step::Reading).collect(),
            last: None,
        }
    }

    pub fn celsius(values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(values.into_iter().map(Reading::Celsius))
    }

    /// Queue a read that fails with an I/O-style error.
    pub fn then_error(mut self, message: impl Into<String>) -> Self {
        self.script.push_back(Step::Error(message.into()));
        self
    }

    pub fn then(mut self, reading: Reading) -> Self {
        self.script.push_back(Step::Reading(reading));
        self
    }
}

impl Thermocouple for ScriptedThermocouple {
    fn read_temperature(&mut self) -> Result<Reading, BoxError> {
        match self.script.pop_front() {
            Some(Step::Reading(r)) => {
                self.last = Some(r);
                Ok(r)
            }
            Some(Step::Error(msg)) => Err(std::io::Error::other(msg).into()),
            None => Ok(self.last.unwrap_or(Reading::Fault)),
        }
    }
}

/// Records every value it is driven with.
#[derive(Debug, Default)]
pub struct RecordingActuator {
    drives: Vec<f64>,
    fail: bool,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An actuator whose every `drive` call errors (after recording the value).
    pub fn failing() -> Self {
        Self {
            drives: Vec::new(),
            fail: true,
        }
    }

    pub fn drives(&self) -> &[f64] {
        &self.drives
    }

    pub fn last(&self) -> Option<f64> {
        self.drives.last().copied()
    }
}

impl Actuator for RecordingActuator {
    fn drive(&mut self, value: f64) -> Result<(), BoxError> {
        self.drives.push(value);
        if self.fail {
            return Err(std::io::Error::other("heater offline").into());
        }
        Ok(())
    }
}

/// Serves queued input lines one at a time and collects written responses.
///
/// Reports closed once every queued line has been read.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    inbox: VecDeque<String>,
    outbox: Vec<String>,
}

impl MemoryTransport {
    pub fn new<I, T>(lines: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            inbox: lines.into_iter().map(Into::into).collect(),
            outbox: Vec::new(),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.inbox.push_back(line.into());
    }

    pub fn written(&self) -> &[String] {
        &self.outbox
    }

    pub fn take_written(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbox)
    }
}

impl LineTransport for MemoryTransport {
    fn read_line(&mut self, max_len: usize) -> Result<Option<Line>, BoxError> {
        Ok(self.inbox.pop_front().map(|raw| Line::bounded(&raw, max_len)))
    }

    fn write_line(&mut self, text: &str) -> Result<(), BoxError> {
        self.outbox.push(text.to_string());
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inbox.is_empty()
    }
}

/// Raw counts per channel, held until moved with [`FixedTuningInput::set`].
///
/// Clones share the same dials. Unknown channels error.
#[derive(Debug, Clone)]
pub struct FixedTuningInput {
    raw: Rc<Cell<[u16; 3]>>,
}

impl FixedTuningInput {
    pub fn new(raw: [u16; 3]) -> Self {
        Self {
            raw: Rc::new(Cell::new(raw)),
        }
    }

    pub fn set(&self, raw: [u16; 3]) {
        self.raw.set(raw);
    }
}

impl TuningInput for FixedTuningInput {
    fn read_raw(&mut self, channel: u8) -> Result<u16, BoxError> {
        self.raw
            .get()
            .get(usize::from(channel))
            .copied()
            .ok_or_else(|| format!("no such tuning channel: {channel}").into())
    }
}
