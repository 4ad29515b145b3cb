use crate::error::{DoblajeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A timestamped span of transcribed text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub text: String,
}

/// Full transcription of one audio file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub segments: Vec<Segment>,
    pub language: String,
}

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (whisper-rs, whisper-cli, mock).
pub trait SpeechToText: Send {
    /// Transcribe an audio file.
    ///
    /// Fails with a recoverable error on unreadable or invalid audio.
    fn transcribe(&self, path: &Path, language: &str) -> Result<TranscriptionResult>;

    /// Name of the loaded model, for status reporting.
    fn model_name(&self) -> &str;

    /// Check if the engine is ready.
    fn is_ready(&self) -> bool;
}

/// Mock speech-to-text engine for testing.
#[derive(Debug, Clone)]
pub struct MockSpeechToText {
    model_name: String,
    transcript: String,
    segments: Vec<Segment>,
    should_fail: bool,
}

impl MockSpeechToText {
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            transcript: "mock transcription".to_string(),
            segments: Vec::new(),
            should_fail: false,
        }
    }

    /// Configure the mock to return a specific transcript.
    pub fn with_transcript(mut self, transcript: &str) -> Self {
        self.transcript = transcript.to_string();
        self
    }

    /// Configure the mock's timestamped segments.
    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = segments;
        self
    }

    /// Configure the mock to fail on transcribe.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl SpeechToText for MockSpeechToText {
    fn transcribe(&self, _path: &Path, language: &str) -> Result<TranscriptionResult> {
        if self.should_fail {
            return Err(DoblajeError::Transcription {
                message: "mock transcription failure".to_string(),
            });
        }
        Ok(TranscriptionResult {
            text: self.transcript.clone(),
            segments: self.segments.clone(),
            language: language.to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn mock_returns_configured_transcript() {
        let stt = MockSpeechToText::new("test-model").with_transcript("Hello there.");
        let result = stt.transcribe(&PathBuf::from("in.wav"), "en").unwrap();
        assert_eq!(result.text, "Hello there.");
        assert_eq!(result.language, "en");
    }

    #[test]
    fn mock_returns_error_when_configured() {
        let stt = MockSpeechToText::new("test-model").with_failure();
        let result = stt.transcribe(&PathBuf::from("in.wav"), "en");
        assert!(matches!(
            result,
            Err(DoblajeError::Transcription { .. })
        ));
        assert!(!stt.is_ready());
    }

    #[test]
    fn mock_carries_segments() {
        let segments = vec![
            Segment {
                start: 0.0,
                end: 1.5,
                text: "Hello".to_string(),
            },
            Segment {
                start: 1.5,
                end: 3.0,
                text: "there".to_string(),
            },
        ];
        let stt = MockSpeechToText::new("m").with_segments(segments.clone());
        let result = stt.transcribe(&PathBuf::from("x.wav"), "en").unwrap();
        assert_eq!(result.segments, segments);
    }

    #[test]
    fn trait_is_object_safe() {
        let stt: Box<dyn SpeechToText> =
            Box::new(MockSpeechToText::new("boxed").with_transcript("ok"));
        assert_eq!(stt.model_name(), "boxed");
        assert!(stt.is_ready());
    }

    #[test]
    fn transcription_result_serializes_with_segments() {
        let result = TranscriptionResult {
            text: "Hello".to_string(),
            segments: vec![Segment {
                start: 0.0,
                end: 2.0,
                text: "Hello".to_string(),
            }],
            language: "en".to_string(),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""text":"Hello""#));
        assert!(json.contains(r#""start":0.0"#));
        assert!(json.contains(r#""language":"en""#));
    }
}
