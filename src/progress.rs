//! Progress and status emission on the worker's output channel.
//!
//! Every record is one complete JSON line, flushed immediately so the
//! supervising process sees progress while a backend call is still running.

use crate::error::Result;
use crate::protocol::{ProgressEvent, Status, StatusEvent};
use serde::Serialize;
use std::io::Write;

/// Sink for intermediate records emitted during initialization and jobs.
pub trait ProgressSink {
    /// Emit a progress record for the current job.
    fn progress(&mut self, stage: &str, percent: i32, message: &str) -> Result<()>;

    /// Emit a worker lifecycle status record.
    fn status(&mut self, status: Status, message: &str) -> Result<()>;
}

/// Writes one JSON record per line to the wrapped writer, flushing each line.
pub struct JsonLineSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write any serializable record as a single flushed line.
    pub fn emit<T: Serialize>(&mut self, record: &T) -> Result<()> {
        let line = serde_json::to_string(record)
            .map_err(|e| crate::error::DoblajeError::Other(format!("serialize record: {}", e)))?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Consume the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ProgressSink for JsonLineSink<W> {
    fn progress(&mut self, stage: &str, percent: i32, message: &str) -> Result<()> {
        self.emit(&ProgressEvent {
            stage: stage.to_string(),
            percent,
            message: message.to_string(),
        })
    }

    fn status(&mut self, status: Status, message: &str) -> Result<()> {
        self.emit(&StatusEvent {
            status,
            message: message.to_string(),
        })
    }
}

/// Records emitted events in memory; used by tests to assert ordering.
#[derive(Debug, Default)]
pub struct CollectorSink {
    pub progress_events: Vec<ProgressEvent>,
    pub status_events: Vec<StatusEvent>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for CollectorSink {
    fn progress(&mut self, stage: &str, percent: i32, message: &str) -> Result<()> {
        self.progress_events.push(ProgressEvent {
            stage: stage.to_string(),
            percent,
            message: message.to_string(),
        });
        Ok(())
    }

    fn status(&mut self, status: Status, message: &str) -> Result<()> {
        self.status_events.push(StatusEvent {
            status,
            message: message.to_string(),
        });
        Ok(())
    }
}
