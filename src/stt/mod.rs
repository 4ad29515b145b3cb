//! Speech-to-text capability.
//!
//! Two concrete engines satisfy the same trait: an in-process whisper-rs
//! engine (the `whisper` feature, faster) and a whisper.cpp CLI subprocess
//! engine (portable, no cmake required). The resource pool selects one at
//! startup; callers only ever see the trait.

pub mod engine;
#[cfg(feature = "whisper")]
pub mod whisper;
pub mod whisper_cli;

pub use engine::{MockSpeechToText, Segment, SpeechToText, TranscriptionResult};
