//! Piper synthesis engine.
//!
//! Drives the `piper` CLI as a subprocess: the chunk text goes to stdin and
//! the chunk WAV lands at `--output_file`. The ONNX voice model is resolved
//! from the voices directory at construction, falling back to the default
//! voice's model when the requested one is missing.

use crate::error::{DoblajeError, Result};
use crate::exec::CommandExecutor;
use crate::tts::voices::{self, DEFAULT_VOICE};
use crate::tts::{synthesize_chunked, SpeechSynthesizer};
use log::warn;
use std::path::{Path, PathBuf};

/// Binary name probed on PATH.
pub const PIPER_BINARY: &str = "piper";

pub struct PiperTts<E: CommandExecutor> {
    executor: E,
    voice: String,
    model_path: PathBuf,
}

impl<E: CommandExecutor> PiperTts<E> {
    /// Resolve the voice model under `voices_dir`.
    ///
    /// The requested voice is normalized first. If its model file is missing
    /// the default voice is tried; if that is missing too the engine cannot
    /// be constructed.
    pub fn detect(executor: E, voice: &str, voices_dir: &Path) -> Result<Self> {
        let voice = voices::normalize_voice(voice);
        let model_path = match resolve_model(voice, voices_dir) {
            Some(path) => path,
            None => {
                warn!("piper model for {} missing, trying {}", voice, DEFAULT_VOICE);
                resolve_model(DEFAULT_VOICE, voices_dir).ok_or_else(|| {
                    DoblajeError::Synthesis {
                        message: format!(
                            "no piper voice model found in {}",
                            voices_dir.display()
                        ),
                    }
                })?
            }
        };

        Ok(Self {
            executor,
            voice: voice.to_string(),
            model_path,
        })
    }
}

fn resolve_model(voice: &str, voices_dir: &Path) -> Option<PathBuf> {
    let file = voices::model_file(voice)?;
    let path = voices_dir.join(file);
    path.exists().then_some(path)
}

impl<E: CommandExecutor> SpeechSynthesizer for PiperTts<E> {
    fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        progress: &mut dyn FnMut(i32, &str),
    ) -> Result<()> {
        let model = self.model_path.to_string_lossy().to_string();
        synthesize_chunked(text, output_path, progress, |chunk, chunk_path| {
            let out = chunk_path.to_string_lossy().to_string();
            let args = ["--model", model.as_str(), "--output_file", out.as_str()];
            self.executor
                .execute_with_input(PIPER_BINARY, &args, chunk)
                .map_err(|e| DoblajeError::Synthesis {
                    message: format!("piper failed: {}", e),
                })?;
            Ok(())
        })
    }

    fn backend_name(&self) -> &str {
        PIPER_BINARY
    }

    fn voice(&self) -> &str {
        &self.voice
    }
}
