//! The dispatch loop: one job per input line, records out as JSON lines.
//!
//! The loop is strictly serial: a single job runs at a time and its result
//! is written before the next line is read. Malformed input lines produce
//! an error result and the loop continues; only a `shutdown` job (or end of
//! input) terminates it.

use crate::error::Result;
use crate::pipeline::PipelineExecutor;
use crate::progress::JsonLineSink;
use crate::protocol::{Job, JobResult};
use log::{debug, info, warn};
use std::io::{BufRead, Write};

/// Worker lifecycle.
///
/// `Initializing` and `Loading` cover configuration and pool construction,
/// which happen before a `Worker` exists; the loop itself moves between
/// `Ready` and `Busy` until a shutdown lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Initializing,
    Loading,
    Ready,
    Busy,
    ShuttingDown,
    Terminated,
}

pub struct Worker<R: BufRead, W: Write> {
    input: R,
    sink: JsonLineSink<W>,
    executor: PipelineExecutor,
    state: WorkerState,
}

impl<R: BufRead, W: Write> Worker<R, W> {
    /// Wrap a loaded executor around an input/output channel pair.
    pub fn new(executor: PipelineExecutor, input: R, output: W) -> Self {
        Self {
            input,
            sink: JsonLineSink::new(output),
            executor,
            state: WorkerState::Ready,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Run the dispatch loop until shutdown or end of input.
    pub fn serve(&mut self) -> Result<()> {
        info!("worker ready");
        let mut line = String::new();

        loop {
            line.clear();
            let read = self.input.read_line(&mut line)?;
            if read == 0 {
                // Supervisor closed our stdin; treat like a shutdown
                info!("input channel closed, shutting down");
                self.state = WorkerState::ShuttingDown;
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let job = match Job::from_json(trimmed) {
                Ok(job) => job,
                Err(e) => {
                    warn!("malformed job line: {}", e);
                    let result = JobResult::err(format!("Invalid job record: {}", e));
                    self.sink.emit(&result)?;
                    continue;
                }
            };

            debug!("job received: {:?}", job);
            self.state = WorkerState::Busy;
            let result = self.executor.run(&job, &mut self.sink);
            self.sink.emit(&result)?;

            if matches!(job, Job::Shutdown) {
                self.state = WorkerState::ShuttingDown;
                break;
            }
            self.state = WorkerState::Ready;
        }

        self.state = WorkerState::Terminated;
        info!("worker terminated");
        Ok(())
    }

    /// Consume the worker, returning the output writer.
    pub fn into_output(self) -> W {
        self.sink.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::ResourcePool;
    use crate::stt::MockSpeechToText;
    use crate::translate::MockTranslator;
    use crate::tts::MockSynthesizer;
    use std::io::Cursor;

    fn mock_executor() -> PipelineExecutor {
        PipelineExecutor::new(ResourcePool::from_parts(
            Some(Box::new(MockSpeechToText::new("stt"))),
            Some(Box::new(MockTranslator::new())),
            Some(Box::new(MockSynthesizer::new())),
        ))
    }

    fn serve_lines(input: &str) -> (Vec<serde_json::Value>, WorkerState) {
        let mut worker = Worker::new(mock_executor(), Cursor::new(input.to_string()), Vec::new());
        worker.serve().unwrap();
        let state = worker.state();
        let output = String::from_utf8(worker.into_output()).unwrap();
        let records = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (records, state)
    }

    #[test]
    fn ping_then_shutdown() {
        let (records, state) = serve_lines("{\"type\":\"ping\"}\n{\"type\":\"shutdown\"}\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["success"], true);
        assert_eq!(records[0]["result"], "pong");
        assert_eq!(records[1]["result"], "shutting_down");
        assert_eq!(state, WorkerState::Terminated);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let (records, _) = serve_lines("\n   \n{\"type\":\"ping\"}\n\n{\"type\":\"shutdown\"}\n");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn malformed_line_keeps_the_loop_alive() {
        let (records, state) =
            serve_lines("this is not json\n{\"type\":\"ping\"}\n{\"type\":\"shutdown\"}\n");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["success"], false);
        assert!(records[0]["error"]
            .as_str()
            .unwrap()
            .contains("Invalid job record"));
        assert_eq!(records[1]["result"], "pong");
        assert_eq!(state, WorkerState::Terminated);
    }

    #[test]
    fn unknown_job_type_names_the_type() {
        let (records, _) = serve_lines("{\"type\":\"frobnicate\"}\n{\"type\":\"shutdown\"}\n");
        assert!(records[0]["error"].as_str().unwrap().contains("frobnicate"));
    }

    #[test]
    fn end_of_input_terminates_without_ack() {
        let (records, state) = serve_lines("{\"type\":\"ping\"}\n");
        assert_eq!(records.len(), 1);
        assert_eq!(state, WorkerState::Terminated);
    }

    #[test]
    fn no_jobs_run_after_shutdown() {
        let (records, _) = serve_lines("{\"type\":\"shutdown\"}\n{\"type\":\"ping\"}\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["result"], "shutting_down");
    }
}
