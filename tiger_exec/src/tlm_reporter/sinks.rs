//! Telemetry sink implementations

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use csv::{Writer, WriterBuilder};
use log::{debug, trace};
use serde::Serialize;
use std::{
    fs::File,
    path::Path,
    sync::{Arc, Mutex, PoisonError},
};

use tiger_if::tlm::{SinkError, TelemetrySink, TlmEvent};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of lines on the robot's display.
pub const NUM_DISPLAY_LINES: u8 = 8;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sends display lines and events to the log.
#[derive(Debug, Default)]
pub struct LogSink;

/// Writes pose samples to a CSV file. Display lines are dropped.
pub struct CsvSink {
    writer: Writer<File>,
}

/// Keeps everything in memory.
///
/// Clones share the same contents, so one can be given to the reporter and
/// another kept to inspect what was written.
#[derive(Debug, Default, Clone)]
pub struct MemSink {
    contents: Arc<Mutex<MemContents>>,
}

/// Contents of a [`MemSink`].
#[derive(Debug, Default, Clone)]
pub struct MemContents {
    /// Latest text of each display line.
    pub lines: Vec<String>,

    pub events: Vec<TlmEvent>,

    /// Every write fails while this is set.
    pub failing: bool,
}

/// Writes to several sinks.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn TelemetrySink>>,
}

#[derive(Serialize)]
struct PoseRecord {
    elapsed_ms: u64,
    x: f64,
    y: f64,
    heading_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TelemetrySink for LogSink {
    fn display(&mut self, line: u8, text: &str) -> Result<(), SinkError> {
        check_line(line)?;
        trace!("[display {}] {}", line, text);
        Ok(())
    }

    fn log(&mut self, event: &TlmEvent) -> Result<(), SinkError> {
        match event {
            TlmEvent::PoseSample { elapsed_ms, pose } => debug!(
                "Pose at {} ms: ({:.2}, {:.2}) {:.2} deg",
                elapsed_ms, pose.x, pose.y, pose.heading_deg
            ),
        }
        Ok(())
    }
}

impl CsvSink {
    /// Create the file, overwriting any existing one.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        let file = File::create(path)?;

        Ok(Self {
            writer: WriterBuilder::new().has_headers(true).from_writer(file),
        })
    }
}

impl TelemetrySink for CsvSink {
    fn display(&mut self, line: u8, _text: &str) -> Result<(), SinkError> {
        check_line(line)
    }

    fn log(&mut self, event: &TlmEvent) -> Result<(), SinkError> {
        let record = match event {
            TlmEvent::PoseSample { elapsed_ms, pose } => PoseRecord {
                elapsed_ms: *elapsed_ms,
                x: pose.x,
                y: pose.y,
                heading_deg: pose.heading_deg,
            },
        };

        self.writer
            .serialize(record)
            .map_err(|e| SinkError::BackendError(e.to_string()))?;
        self.writer.flush()?;

        Ok(())
    }
}

impl MemSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything written so far.
    pub fn contents(&self) -> MemContents {
        self.lock().clone()
    }

    /// Make every following write fail, or succeed again.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    fn lock(&self) -> std::sync::MutexGuard<MemContents> {
        self.contents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TelemetrySink for MemSink {
    fn display(&mut self, line: u8, text: &str) -> Result<(), SinkError> {
        check_line(line)?;

        let mut contents = self.lock();
        if contents.failing {
            return Err(SinkError::Closed);
        }

        let idx = line as usize;
        if contents.lines.len() <= idx {
            contents.lines.resize(idx + 1, String::new());
        }
        contents.lines[idx] = text.to_string();

        Ok(())
    }

    fn log(&mut self, event: &TlmEvent) -> Result<(), SinkError> {
        let mut contents = self.lock();
        if contents.failing {
            return Err(SinkError::Closed);
        }

        contents.events.push(event.clone());
        Ok(())
    }
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Box<dyn TelemetrySink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Apply `f` to every sink, returning the first error.
    fn for_each<F>(&mut self, mut f: F) -> Result<(), SinkError>
    where
        F: FnMut(&mut dyn TelemetrySink) -> Result<(), SinkError>
    {
        let mut first_err = None;

        for sink in self.sinks.iter_mut() {
            if let Err(e) = f(sink.as_mut()) {
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl TelemetrySink for SinkSet {
    fn display(&mut self, line: u8, text: &str) -> Result<(), SinkError> {
        self.for_each(|s| s.display(line, text))
    }

    fn log(&mut self, event: &TlmEvent) -> Result<(), SinkError> {
        self.for_each(|s| s.log(event))
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn check_line(line: u8) -> Result<(), SinkError> {
    if line < NUM_DISPLAY_LINES {
        Ok(())
    }
    else {
        Err(SinkError::InvalidLine(line))
    }
}
