//! JSON line protocol between the worker and its supervising process.
//!
//! One job request per input line, one record (progress, status, or result)
//! per output line. The worker never writes partial lines.

use serde::{Deserialize, Serialize};

/// A single job request read from the input channel.
///
/// Required fields are modelled as `Option` so that a missing field is a job
/// validation error (reported per job) rather than a parse failure. Unknown
/// extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Job {
    /// Transcribe an audio file in the requested language
    Transcribe {
        input_path: Option<String>,
        #[serde(default = "default_language")]
        language: String,
    },
    /// Transcribe (English), translate to Spanish, synthesize to output_path
    Translate {
        input_path: Option<String>,
        output_path: Option<String>,
        #[serde(default)]
        voice: Option<String>,
    },
    /// Translate raw text EN→ES without audio on either end
    TranslateText { text: Option<String> },
    /// Build a podcast script from article records
    GenerateScript {
        #[serde(default)]
        articles: Vec<Article>,
    },
    /// Build a podcast script and synthesize it to output_path
    GeneratePodcast {
        #[serde(default)]
        articles: Vec<Article>,
        output_path: Option<String>,
        #[serde(default)]
        voice: Option<String>,
    },
    /// Liveness check
    Ping,
    /// Write an acknowledgement and end the dispatch loop
    Shutdown,
}

fn default_language() -> String {
    crate::defaults::DEFAULT_LANGUAGE.to_string()
}

impl Job {
    /// Deserialize a job from one input line.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Serialize the job to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One article fed to the script generator.
///
/// Feeds accept either `summary` or the RSS-style `description` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "description")]
    pub summary: String,
}

/// Terminal record for a job: exactly one of `result`/`error` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobResult {
    pub fn ok(result: serde_json::Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Intermediate progress record, always written before the job's result.
///
/// `percent` is 0..=100; -1 marks a fatal condition in one-shot pipelines
/// (the worker's per-job error path uses `JobResult.error` instead).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage: String,
    pub percent: i32,
    pub message: String,
}

/// Worker lifecycle status, emitted before the loop is ready.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: Status,
    pub message: String,
}
