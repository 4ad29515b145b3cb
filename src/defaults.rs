//! Contract constants shared across the worker.
//!
//! These values are part of the wire-level behavior of the worker and the
//! chunking policy; changing them changes what callers observe.

/// Maximum characters per chunk handed to the translation backend.
///
/// The Marian EN→ES model degrades sharply past ~512 tokens; 400 characters
/// keeps chunks comfortably inside that window.
pub const TRANSLATION_CHUNK_CHARS: usize = 400;

/// Maximum characters per chunk handed to the synthesis backend.
///
/// Subprocess TTS engines (piper, espeak, say) are invoked once per chunk;
/// 2000 characters bounds per-invocation latency and argument size.
pub const SYNTHESIS_CHUNK_CHARS: usize = 2000;

/// Default transcription language when a job omits `language`.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Source language for the `translate` pipeline (fixed EN→ES).
pub const TRANSLATE_SOURCE_LANGUAGE: &str = "en";

/// Default audio sample rate in Hz for WAV handling.
///
/// 16kHz mono is what the Whisper engines expect.
pub const SAMPLE_RATE: u32 = 16000;

/// Maximum number of articles used by `generate_script`.
pub const MAX_SCRIPT_ARTICLES: usize = 5;

/// Maximum characters kept from an article summary before truncation.
pub const SUMMARY_MAX_CHARS: usize = 300;

/// Default multilingual Whisper model name.
pub const DEFAULT_STT_MODEL: &str = "tiny";

/// Default English-only Whisper model name.
pub const DEFAULT_STT_ENGLISH_MODEL: &str = "tiny.en";

/// Default CPU thread hint exported to backend runtimes.
///
/// Tuned for a Raspberry Pi 4 (4 cores), the original deployment target.
pub const DEFAULT_BACKEND_THREADS: usize = 4;

/// Report the GPU backend compiled into this build.
///
/// Only one GPU backend can be active at a time; if none is enabled,
/// returns "CPU".
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "openblas") {
        "OpenBLAS"
    } else {
        "CPU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_chunks_are_smaller_than_synthesis_chunks() {
        assert!(TRANSLATION_CHUNK_CHARS < SYNTHESIS_CHUNK_CHARS);
    }

    #[test]
    fn gpu_backend_matches_compiled_feature() {
        let expected = if cfg!(feature = "cuda") {
            "CUDA"
        } else if cfg!(feature = "openblas") {
            "OpenBLAS"
        } else {
            "CPU"
        };
        assert_eq!(gpu_backend(), expected);
    }
}
