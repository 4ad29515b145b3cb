//! Speech synthesis capability.
//!
//! All production engines drive an external tool as a subprocess: `say` on
//! macOS, `piper` where its models are installed, `espeak-ng`/`espeak` as
//! the fallback. Long text is split into sentence-aligned chunks, each chunk
//! is synthesized to a temporary WAV, and the chunks are concatenated in
//! order into the output file.
//!
//! Engines report progress on a 0..=100 scale through the callback; the job
//! pipeline maps that into the job's overall progress range.

pub mod espeak;
pub mod piper;
pub mod say;
pub mod voices;

pub use voices::{normalize_voice, DEFAULT_VOICE};

use crate::chunk::chunk_text;
use crate::defaults::SYNTHESIS_CHUNK_CHARS;
use crate::error::{DoblajeError, Result};
use crate::exec::{CommandExecutor, SystemCommandExecutor};
use log::info;
use std::path::Path;

/// Trait for text-to-speech synthesis.
///
/// `progress` receives (percent, message) pairs with percent in 0..=100,
/// monotonically non-decreasing over one synthesize call.
pub trait SpeechSynthesizer: Send {
    /// Synthesize `text` into a WAV file at `output_path`.
    fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        progress: &mut dyn FnMut(i32, &str),
    ) -> Result<()>;

    /// Name of the backend tool ("say", "piper", "espeak-ng", ...).
    fn backend_name(&self) -> &str;

    /// Normalized voice this engine speaks with.
    fn voice(&self) -> &str;
}

/// Pick the best available synthesis backend for this machine.
///
/// Probe order: `say` on macOS, then `piper`, then `espeak-ng`/`espeak`.
pub fn select_synthesizer(
    voice: &str,
    voices_dir: &Path,
    executor: SystemCommandExecutor,
) -> Result<Box<dyn SpeechSynthesizer>> {
    if cfg!(target_os = "macos") && executor.is_available(say::SAY_BINARY) {
        let engine = say::SayTts::new(executor);
        info!("synthesis backend: {}", engine.backend_name());
        return Ok(Box::new(engine));
    }

    if executor.is_available(piper::PIPER_BINARY) {
        let engine = piper::PiperTts::detect(executor, voice, voices_dir)?;
        info!(
            "synthesis backend: {} voice {}",
            engine.backend_name(),
            engine.voice()
        );
        return Ok(Box::new(engine));
    }

    if let Some(engine) = espeak::EspeakTts::detect(executor) {
        info!("synthesis backend: {}", engine.backend_name());
        return Ok(Box::new(engine));
    }

    Err(DoblajeError::NoSynthesisBackend {
        message: "no synthesis tool found; install piper or espeak-ng".to_string(),
    })
}

/// Chunked synthesis shared by the subprocess engines.
///
/// Splits `text`, synthesizes each chunk to a temp WAV via `synth_chunk`,
/// then concatenates them in order into `output_path`.
pub(crate) fn synthesize_chunked<F>(
    text: &str,
    output_path: &Path,
    progress: &mut dyn FnMut(i32, &str),
    mut synth_chunk: F,
) -> Result<()>
where
    F: FnMut(&str, &Path) -> Result<()>,
{
    let chunks = chunk_text(text, SYNTHESIS_CHUNK_CHARS);
    if chunks.is_empty() {
        return Err(DoblajeError::Synthesis {
            message: "nothing to synthesize".to_string(),
        });
    }

    progress(0, &format!("Synthesizing {} segment(s)", chunks.len()));

    let dir = tempfile::tempdir()?;
    let mut chunk_paths = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let chunk_path = dir.path().join(format!("chunk-{:03}.wav", i));
        synth_chunk(chunk, &chunk_path)?;

        let size = std::fs::metadata(&chunk_path).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(DoblajeError::Synthesis {
                message: format!("backend produced no audio for segment {}", i + 1),
            });
        }
        chunk_paths.push(chunk_path);

        let percent = ((i + 1) * 90 / chunks.len()) as i32;
        progress(
            percent,
            &format!("Segment {}/{}", i + 1, chunks.len()),
        );
    }

    crate::audio::concat_wavs(&chunk_paths, output_path)?;
    progress(100, "Audio generated");
    Ok(())
}

/// Mock synthesizer for tests: writes a short valid WAV and records calls.
#[derive(Debug, Default)]
pub struct MockSynthesizer {
    calls: std::sync::Mutex<Vec<String>>,
    should_fail: bool,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail on synthesize.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Texts passed to synthesize, in order.
    pub fn synthesized_texts(&self) -> Vec<String> {
        self.calls.lock().expect("mock lock poisoned").clone()
    }
}

impl SpeechSynthesizer for MockSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        progress: &mut dyn FnMut(i32, &str),
    ) -> Result<()> {
        if self.should_fail {
            return Err(DoblajeError::Synthesis {
                message: "mock synthesis failure".to_string(),
            });
        }
        self.calls
            .lock()
            .expect("mock lock poisoned")
            .push(text.to_string());

        progress(0, "Synthesizing 1 segment(s)");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: crate::defaults::SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer =
            hound::WavWriter::create(output_path, spec).map_err(|e| DoblajeError::Synthesis {
                message: e.to_string(),
            })?;
        for _ in 0..160 {
            writer
                .write_sample(0i16)
                .map_err(|e| DoblajeError::Synthesis {
                    message: e.to_string(),
                })?;
        }
        writer.finalize().map_err(|e| DoblajeError::Synthesis {
            message: e.to_string(),
        })?;
        progress(100, "Audio generated");
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }

    fn voice(&self) -> &str {
        DEFAULT_VOICE
    }
}
