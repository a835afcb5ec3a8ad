//! Line transport over any byte stream (stdio, a tty opened as a file).
//!
//! A background thread owns the reader, splits input on `\n`, and hands
//! complete lines to the control loop through a bounded channel. The loop
//! polls with `try_recv`, so a missing line never blocks a cycle.
//!
//! The reader never holds more than one line's worth of bytes: input past
//! the line limit is skipped up to the next `\n` and the line is delivered
//! truncated with `overflowed` set.
use std::io::{self, BufRead, BufReader, Read, Write};
use std::thread::JoinHandle;

use crossbeam_channel as xch;
use thermo_traits::{Line, LineTransport};

use crate::error::HwError;

/// Lines buffered ahead of the control loop before the reader thread blocks.
const LINE_BACKLOG: usize = 16;

pub struct StreamTransport<W: Write> {
    rx: xch::Receiver<Line>,
    writer: W,
    closed: bool,
    _reader: Option<JoinHandle<()>>,
}

impl<W: Write> StreamTransport<W> {
    /// Spawn a reader thread over `reader`; responses go to `writer`.
    ///
    /// Lines longer than `max_line_len` bytes (terminator excluded) arrive
    /// truncated and flagged.
    pub fn spawn<R: Read + Send + 'static>(reader: R, writer: W, max_line_len: usize) -> Self {
        let (tx, rx) = xch::bounded(LINE_BACKLOG);
        let handle = std::thread::spawn(move || {
            let mut buf = BufReader::new(reader);
            let mut raw = Vec::with_capacity(max_line_len.saturating_add(2));
            loop {
                raw.clear();
                match read_bounded_line(&mut buf, &mut raw, max_line_len) {
                    Ok(None) => {
                        tracing::debug!("line reader reached end of input");
                        break;
                    }
                    Ok(Some(line)) => {
                        if line.overflowed {
                            tracing::debug!(max_line_len, "over-long input line truncated");
                        }
                        if tx.send(line).is_err() {
                            tracing::debug!("line consumer disconnected, exiting reader");
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "line reader failed");
                        break;
                    }
                }
            }
        });
        Self {
            rx,
            writer,
            closed: false,
            _reader: Some(handle),
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl StreamTransport<std::io::Stdout> {
    pub fn stdio(max_line_len: usize) -> Self {
        Self::spawn(std::io::stdin(), std::io::stdout(), max_line_len)
    }
}

/// Read one line into `raw`, buffering at most `max_len` bytes plus a `\r\n`.
///
/// Returns `None` at end of input. The rest of an over-long line is consumed
/// and dropped.
fn read_bounded_line<B: BufRead>(
    buf: &mut B,
    raw: &mut Vec<u8>,
    max_len: usize,
) -> io::Result<Option<Line>> {
    let limit = max_len.saturating_add(2);
    let n = buf
        .by_ref()
        .take(u64::try_from(limit).unwrap_or(u64::MAX))
        .read_until(b'\n', raw)?;
    if n == 0 {
        return Ok(None);
    }
    let cut_short = n == limit && raw.last() != Some(&b'\n');
    if cut_short {
        buf.skip_until(b'\n')?;
    }
    let mut line = Line::bounded(&String::from_utf8_lossy(raw), max_len);
    line.overflowed |= cut_short;
    Ok(Some(line))
}

impl<W: Write> LineTransport for StreamTransport<W> {
    fn read_line(
        &mut self,
        max_len: usize,
    ) -> Result<Option<Line>, Box<dyn std::error::Error + Send + Sync>> {
        match self.rx.try_recv() {
            Ok(line) if line.text.len() <= max_len => Ok(Some(line)),
            Ok(line) => {
                let mut bounded = Line::bounded(&line.text, max_len);
                bounded.overflowed = true;
                Ok(Some(bounded))
            }
            Err(xch::TryRecvError::Empty) => Ok(None),
            Err(xch::TryRecvError::Disconnected) => {
                self.closed = true;
                Ok(None)
            }
        }
    }

    fn write_line(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Err(e) = writeln!(self.writer, "{text}").and_then(|()| self.writer.flush()) {
            return Err(Box::new(HwError::Io(e)));
        }
        Ok(())
    }

    /// True once the reader hit end of input and every buffered line was consumed.
    fn is_closed(&self) -> bool {
        self.closed
    }
}
