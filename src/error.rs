//! Error types for doblaje.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DoblajeError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Speech-to-text errors
    #[error("Transcription model not found at {path}")]
    SttModelNotFound { path: String },

    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    #[error("Unreadable audio file {path}: {message}")]
    AudioInvalid { path: String, message: String },

    // Translation errors
    #[error("Translation failed: {message}")]
    Translation { message: String },

    // Speech synthesis errors
    #[error("Synthesis tool not found: {tool}")]
    SynthesisToolNotFound { tool: String },

    #[error("Speech synthesis failed: {message}")]
    Synthesis { message: String },

    #[error("No speech synthesis backend available: {message}")]
    NoSynthesisBackend { message: String },

    // Job / protocol errors
    #[error("Invalid job record: {message}")]
    Protocol { message: String },

    #[error("{message}")]
    JobValidation { message: String },

    #[error("Capability not initialized: {capability}")]
    CapabilityMissing { capability: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl DoblajeError {
    /// Shorthand for a job validation error with a descriptive message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::JobValidation {
            message: message.into(),
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DoblajeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn stt_model_not_found_display() {
        let error = DoblajeError::SttModelNotFound {
            path: "/models/ggml-tiny.bin".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Transcription model not found at /models/ggml-tiny.bin"
        );
    }

    #[test]
    fn transcription_display() {
        let error = DoblajeError::Transcription {
            message: "inference failed".to_string(),
        };
        assert_eq!(error.to_string(), "Transcription failed: inference failed");
    }

    #[test]
    fn audio_invalid_display() {
        let error = DoblajeError::AudioInvalid {
            path: "/tmp/in.wav".to_string(),
            message: "not a RIFF header".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unreadable audio file /tmp/in.wav: not a RIFF header"
        );
    }

    #[test]
    fn validation_shorthand_displays_bare_message() {
        let error = DoblajeError::validation("transcribe job requires input_path");
        assert_eq!(error.to_string(), "transcribe job requires input_path");
    }

    #[test]
    fn synthesis_tool_not_found_display() {
        let error = DoblajeError::SynthesisToolNotFound {
            tool: "piper".to_string(),
        };
        assert_eq!(error.to_string(), "Synthesis tool not found: piper");
    }

    #[test]
    fn from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: DoblajeError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("a = b = c").unwrap_err();
        let error: DoblajeError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<DoblajeError>();
        assert_sync::<DoblajeError>();
    }
}
