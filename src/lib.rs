//! doblaje - persistent speech worker
//!
//! Loads speech-to-text, translation and synthesis backends once, then
//! executes jobs received as JSON lines on stdin, one at a time, writing
//! progress and result records as JSON lines on stdout. Logging goes to
//! stderr; stdout carries only protocol records.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod chunk;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod exec;
pub mod pipeline;
pub mod pool;
pub mod progress;
pub mod protocol;
pub mod script;
pub mod stt;
pub mod textgen;
pub mod translate;
pub mod tts;
pub mod worker;

// Capability traits (one per backend kind)
pub use exec::{CommandExecutor, SystemCommandExecutor};
pub use stt::SpeechToText;
pub use textgen::TextGenerator;
pub use translate::Translator;
pub use tts::SpeechSynthesizer;

// Worker assembly
pub use pipeline::PipelineExecutor;
pub use pool::{Capability, ResourcePool};
pub use worker::{Worker, WorkerState};

// Wire protocol
pub use protocol::{Article, Job, JobResult, ProgressEvent, Status, StatusEvent};

// Error handling
pub use error::{DoblajeError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
