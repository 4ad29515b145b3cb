//! In-process Whisper engine using whisper-rs.
//!
//! Requires the `whisper` feature and cmake at build time. This is the
//! fast path on machines where whisper.cpp can be compiled in; the
//! subprocess engine in `whisper_cli` covers the rest.

use crate::error::{DoblajeError, Result};
use crate::stt::engine::{Segment, SpeechToText, TranscriptionResult};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use whisper_rs::{
    install_logging_hooks, FullParams, SamplingStrategy, WhisperContext,
    WhisperContextParameters,
};

static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Configuration for the whisper-rs engine.
#[derive(Debug, Clone)]
pub struct WhisperSttConfig {
    /// Path to the ggml model file
    pub model_path: PathBuf,
    /// Number of threads for inference (None = whisper.cpp default)
    pub threads: Option<usize>,
}

/// Whisper-based speech-to-text engine.
///
/// The WhisperContext is wrapped in a Mutex; the worker only runs one job at
/// a time, so the lock is never contended, but it keeps the type Sync.
pub struct WhisperStt {
    context: Mutex<WhisperContext>,
    config: WhisperSttConfig,
    model_name: String,
}

impl std::fmt::Debug for WhisperStt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperStt")
            .field("config", &self.config)
            .field("model_name", &self.model_name)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

impl WhisperStt {
    /// Load a Whisper model from disk.
    ///
    /// # Errors
    /// Returns `SttModelNotFound` if the model file doesn't exist and
    /// `Transcription` if whisper.cpp rejects it.
    pub fn new(config: WhisperSttConfig) -> Result<Self> {
        // Suppress whisper.cpp's own logging; stderr is ours
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        if !config.model_path.exists() {
            return Err(DoblajeError::SttModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = config
            .model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let context_params = WhisperContextParameters::default();
        let context = WhisperContext::new_with_params(
            config
                .model_path
                .to_str()
                .ok_or_else(|| DoblajeError::Transcription {
                    message: "Invalid UTF-8 in model path".to_string(),
                })?,
            context_params,
        )
        .map_err(|e| DoblajeError::Transcription {
            message: format!("Failed to load Whisper model: {}", e),
        })?;

        Ok(Self {
            context: Mutex::new(context),
            config,
            model_name,
        })
    }

    /// Convert i16 PCM to the f32 [-1.0, 1.0] range Whisper expects.
    fn convert_audio(samples: &[i16]) -> Vec<f32> {
        samples
            .iter()
            .map(|&sample| sample as f32 / 32768.0)
            .collect()
    }
}

impl SpeechToText for WhisperStt {
    fn transcribe(&self, path: &Path, language: &str) -> Result<TranscriptionResult> {
        let samples = crate::audio::read_samples(path)?;
        let audio_f32 = Self::convert_audio(&samples);

        let context = self
            .context
            .lock()
            .map_err(|e| DoblajeError::Transcription {
                message: format!("Failed to acquire context lock: {}", e),
            })?;

        let mut state = context
            .create_state()
            .map_err(|e| DoblajeError::Transcription {
                message: format!("Failed to create Whisper state: {}", e),
            })?;

        // Greedy sampling for speed; this worker targets small CPUs
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        if language == "auto" {
            params.set_language(None);
        } else {
            params.set_language(Some(language));
        }

        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }

        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &audio_f32)
            .map_err(|e| DoblajeError::Transcription {
                message: format!("Whisper inference failed: {}", e),
            })?;

        let mut text = String::new();
        let mut segments = Vec::new();
        for segment in state.as_iter() {
            let segment_text = segment.to_string();
            text.push_str(&segment_text);
            text.push(' ');
            segments.push(Segment {
                // whisper.cpp timestamps are centiseconds
                start: segment.start_timestamp() as f64 / 100.0,
                end: segment.end_timestamp() as f64 / 100.0,
                text: segment_text.trim().to_string(),
            });
        }

        let detected = if language == "auto" {
            let lang_id = state.full_lang_id_from_state();
            whisper_rs::get_lang_str(lang_id).unwrap_or(language).to_string()
        } else {
            language.to_string()
        };

        Ok(TranscriptionResult {
            text: text.trim().to_string(),
            segments,
            language: detected,
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        true
    }
}
