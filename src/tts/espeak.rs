//! eSpeak synthesis engine, the last-resort fallback on Linux.
//!
//! Robotic but dependency-free on most distributions. Prefers `espeak-ng`
//! and accepts classic `espeak` when that is all the system has.

use crate::error::{DoblajeError, Result};
use crate::exec::CommandExecutor;
use crate::tts::{synthesize_chunked, SpeechSynthesizer};
use std::path::Path;

pub const ESPEAK_NG_BINARY: &str = "espeak-ng";
pub const ESPEAK_BINARY: &str = "espeak";

/// Spanish voice, 150 words per minute.
const ESPEAK_VOICE: &str = "es";
const ESPEAK_SPEED: &str = "150";

pub struct EspeakTts<E: CommandExecutor> {
    executor: E,
    binary: &'static str,
}

impl<E: CommandExecutor> EspeakTts<E> {
    /// Probe for espeak-ng, then espeak. None when neither resolves.
    pub fn detect(executor: E) -> Option<Self> {
        let binary = if executor.is_available(ESPEAK_NG_BINARY) {
            ESPEAK_NG_BINARY
        } else if executor.is_available(ESPEAK_BINARY) {
            ESPEAK_BINARY
        } else {
            return None;
        };
        Some(Self { executor, binary })
    }
}

impl<E: CommandExecutor> SpeechSynthesizer for EspeakTts<E> {
    fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        progress: &mut dyn FnMut(i32, &str),
    ) -> Result<()> {
        synthesize_chunked(text, output_path, progress, |chunk, chunk_path| {
            let out = chunk_path.to_string_lossy().to_string();
            let args = [
                "-v",
                ESPEAK_VOICE,
                "-s",
                ESPEAK_SPEED,
                "-w",
                out.as_str(),
                chunk,
            ];
            self.executor
                .execute(self.binary, &args)
                .map_err(|e| DoblajeError::Synthesis {
                    message: format!("{} failed: {}", self.binary, e),
                })?;
            Ok(())
        })
    }

    fn backend_name(&self) -> &str {
        self.binary
    }

    fn voice(&self) -> &str {
        ESPEAK_VOICE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::MockCommandExecutor;

    #[test]
    fn detect_prefers_espeak_ng() {
        let executor = MockCommandExecutor::new()
            .with_available(ESPEAK_NG_BINARY)
            .with_available(ESPEAK_BINARY);
        let engine = EspeakTts::detect(executor).unwrap();
        assert_eq!(engine.backend_name(), ESPEAK_NG_BINARY);
    }

    #[test]
    fn detect_accepts_classic_espeak() {
        let executor = MockCommandExecutor::new().with_available(ESPEAK_BINARY);
        let engine = EspeakTts::detect(executor).unwrap();
        assert_eq!(engine.backend_name(), ESPEAK_BINARY);
    }

    #[test]
    fn detect_returns_none_without_binaries() {
        assert!(EspeakTts::detect(MockCommandExecutor::new()).is_none());
    }

    #[test]
    fn synthesize_passes_spanish_voice_and_speed() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.wav");
        let executor = MockCommandExecutor::new()
            .with_available(ESPEAK_NG_BINARY)
            .with_response("");
        let engine = EspeakTts::detect(executor).unwrap();

        // The mock never writes the chunk WAV, so synthesis reports the
        // empty-audio failure after invoking the tool
        let err = engine
            .synthesize("Hola mundo.", &out, &mut |_, _| {})
            .unwrap_err();
        assert!(err.to_string().contains("no audio"));

        let calls = engine.executor.calls();
        assert_eq!(calls.len(), 1);
        let args = &calls[0].1;
        assert_eq!(args[0], "-v");
        assert_eq!(args[1], "es");
        assert_eq!(args[2], "-s");
        assert_eq!(args[3], "150");
        assert_eq!(args[4], "-w");
        assert_eq!(args[6], "Hola mundo.");
    }
}
