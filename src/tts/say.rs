//! macOS synthesis engine using the system `say` command.
//!
//! `say` writes WAVE directly when asked for a `.wav` output with an LEI16
//! data format, which keeps the concatenation path identical to the other
//! engines.

use crate::error::{DoblajeError, Result};
use crate::exec::CommandExecutor;
use crate::tts::{synthesize_chunked, SpeechSynthesizer};
use std::path::Path;

pub const SAY_BINARY: &str = "say";

/// 16-bit little-endian PCM at 22.05kHz; all chunks share one spec so the
/// concatenator accepts them.
const SAY_DATA_FORMAT: &str = "--data-format=LEI16@22050";

pub struct SayTts<E: CommandExecutor> {
    executor: E,
}

impl<E: CommandExecutor> SayTts<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl<E: CommandExecutor> SpeechSynthesizer for SayTts<E> {
    fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        progress: &mut dyn FnMut(i32, &str),
    ) -> Result<()> {
        synthesize_chunked(text, output_path, progress, |chunk, chunk_path| {
            let out = chunk_path.to_string_lossy().to_string();
            let args = ["-o", out.as_str(), SAY_DATA_FORMAT, chunk];
            self.executor
                .execute(SAY_BINARY, &args)
                .map_err(|e| DoblajeError::Synthesis {
                    message: format!("say failed: {}", e),
                })?;
            Ok(())
        })
    }

    fn backend_name(&self) -> &str {
        SAY_BINARY
    }

    fn voice(&self) -> &str {
        // The system default voice; macOS users pick theirs in Settings
        "system"
    }
}
