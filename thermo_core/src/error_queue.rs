//! Bounded SCPI error/event queue.
//!
//! Enqueue never fails: once full, the oldest record is dropped to make room.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;

/// Standard and device-specific error codes reported by the command set.
pub mod codes {
    pub const NO_ERROR: i16 = 0;
    pub const DATA_TYPE_ERROR: i16 = -104;
    pub const MISSING_PARAMETER: i16 = -109;
    pub const UNDEFINED_HEADER: i16 = -113;
    pub const INVALID_UNIT: i16 = -200;
    pub const TOO_MUCH_DATA: i16 = -223;
    pub const BELOW_MINIMUM: i16 = -301;
    pub const ABOVE_MAXIMUM: i16 = -302;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub code: i16,
    pub description: Cow<'static, str>,
}

impl ErrorRecord {
    pub const fn new(code: i16, description: &'static str) -> Self {
        Self {
            code,
            description: Cow::Borrowed(description),
        }
    }

    pub const fn none() -> Self {
        Self::new(codes::NO_ERROR, "No error")
    }

    pub const fn data_type() -> Self {
        Self::new(codes::DATA_TYPE_ERROR, "Data type error")
    }

    pub const fn missing_parameter() -> Self {
        Self::new(codes::MISSING_PARAMETER, "Missing parameter")
    }

    pub const fn undefined_header() -> Self {
        Self::new(codes::UNDEFINED_HEADER, "Undefined header")
    }

    pub const fn invalid_unit() -> Self {
        Self::new(codes::INVALID_UNIT, "Command error: Invalid unit")
    }

    pub const fn too_much_data() -> Self {
        Self::new(codes::TOO_MUCH_DATA, "Too much data")
    }

    pub const fn below_minimum() -> Self {
        Self::new(codes::BELOW_MINIMUM, "Command error: Temperature below minimum")
    }

    pub const fn above_maximum() -> Self {
        Self::new(codes::ABOVE_MAXIMUM, "Command error: Temperature above maximum")
    }
}

/// Wire form used by `SYSTem:ERRor?`: `<code>,"<description>"`.
impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},\"{}\"", self.code, self.description)
    }
}

#[derive(Debug, Clone)]
pub struct ErrorQueue {
    records: VecDeque<ErrorRecord>,
    capacity: usize,
    evicted: u64,
}

impl ErrorQueue {
    /// Capacity is clamped to at least one record.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    pub fn enqueue(&mut self, record: ErrorRecord) {
        if self.records.len() == self.capacity {
            if let Some(dropped) = self.records.pop_front() {
                self.evicted = self.evicted.saturating_add(1);
                tracing::debug!(code = dropped.code, "error queue full, dropped oldest");
            }
        }
        tracing::trace!(code = record.code, description = %record.description, "error queued");
        self.records.push_back(record);
    }

    /// Oldest pending record, if any.
    pub fn dequeue(&mut self) -> Option<ErrorRecord> {
        self.records.pop_front()
    }

    /// Oldest pending record, or the `0,"No error"` sentinel.
    pub fn next_or_none(&mut self) -> ErrorRecord {
        self.dequeue().unwrap_or_else(ErrorRecord::none)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records dropped to overflow since startup.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.records.iter()
    }
}

impl Default for ErrorQueue {
    fn default() -> Self {
        Self::new(10)
    }
}
