//! Portable Whisper engine driving the whisper.cpp CLI as a subprocess.
//!
//! Used when the crate is built without the `whisper` feature (no cmake on
//! the box). The CLI prints one line per segment:
//!
//! ```text
//! [00:00:00.000 --> 00:00:03.480]   The quick brown fox.
//! ```

use crate::error::{DoblajeError, Result};
use crate::exec::CommandExecutor;
use crate::stt::engine::{Segment, SpeechToText, TranscriptionResult};
use std::path::{Path, PathBuf};

/// Binary name probed on PATH.
pub const WHISPER_CLI_BINARY: &str = "whisper-cli";

pub struct WhisperCliStt<E: CommandExecutor> {
    executor: E,
    model_path: PathBuf,
    model_name: String,
    threads: usize,
}

impl<E: CommandExecutor> WhisperCliStt<E> {
    /// Probe for the CLI binary and the model file.
    pub fn detect(executor: E, model_path: PathBuf, threads: usize) -> Result<Self> {
        if !executor.is_available(WHISPER_CLI_BINARY) {
            return Err(DoblajeError::Transcription {
                message: format!(
                    "{} not found on PATH; build with the `whisper` feature or install whisper.cpp",
                    WHISPER_CLI_BINARY
                ),
            });
        }
        if !model_path.exists() {
            return Err(DoblajeError::SttModelNotFound {
                path: model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            executor,
            model_path,
            model_name,
            threads,
        })
    }
}

impl<E: CommandExecutor> SpeechToText for WhisperCliStt<E> {
    fn transcribe(&self, path: &Path, language: &str) -> Result<TranscriptionResult> {
        // Validate the audio ourselves so a bad file is a recoverable
        // AudioInvalid error instead of an opaque subprocess failure
        crate::audio::read_samples(path)?;

        let model = self.model_path.to_string_lossy().to_string();
        let input = path.to_string_lossy().to_string();
        let threads = self.threads.to_string();
        let args = [
            "-m",
            model.as_str(),
            "-f",
            input.as_str(),
            "-l",
            language,
            "-t",
            threads.as_str(),
        ];

        let stdout = self
            .executor
            .execute(WHISPER_CLI_BINARY, &args)
            .map_err(|e| DoblajeError::Transcription {
                message: format!("{} invocation failed: {}", WHISPER_CLI_BINARY, e),
            })?;

        let segments = parse_segments(&stdout);
        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(TranscriptionResult {
            text,
            segments,
            language: language.to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        true
    }
}

/// Parse whisper.cpp segment lines; anything else on stdout is ignored.
fn parse_segments(stdout: &str) -> Vec<Segment> {
    stdout.lines().filter_map(parse_segment_line).collect()
}

fn parse_segment_line(line: &str) -> Option<Segment> {
    let line = line.trim();
    let rest = line.strip_prefix('[')?;
    let close = rest.find(']')?;
    let (range, text) = rest.split_at(close);
    let text = text[1..].trim();

    let mut parts = range.split(" --> ");
    let start = parse_timestamp(parts.next()?)?;
    let end = parse_timestamp(parts.next()?)?;
    if parts.next().is_some() || text.is_empty() {
        return None;
    }

    Some(Segment {
        start,
        end,
        text: text.to_string(),
    })
}

/// Parse "HH:MM:SS.mmm" into seconds.
fn parse_timestamp(ts: &str) -> Option<f64> {
    let mut parts = ts.trim().split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::MockCommandExecutor;

    fn write_fixture_wav(dir: &Path) -> PathBuf {
        let path = dir.join("in.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..160 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn parse_timestamp_standard() {
        assert_eq!(parse_timestamp("00:00:00.000"), Some(0.0));
        assert_eq!(parse_timestamp("00:00:03.480"), Some(3.48));
        assert_eq!(parse_timestamp("00:01:00.000"), Some(60.0));
        assert_eq!(parse_timestamp("01:00:00.500"), Some(3600.5));
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("abc"), None);
        assert_eq!(parse_timestamp("1:2"), None);
        assert_eq!(parse_timestamp("1:2:3:4"), None);
    }

    #[test]
    fn parse_segments_from_cli_output() {
        let stdout = "\
[00:00:00.000 --> 00:00:02.000]   Hello world.
[00:00:02.000 --> 00:00:04.500]   Second segment.
";
        let segments = parse_segments(stdout);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello world.");
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[1].end, 4.5);
    }

    #[test]
    fn parse_segments_skips_noise_lines() {
        let stdout = "\
whisper_init_from_file: loading model
[00:00:00.000 --> 00:00:01.000]   Only real segment.
processing done
";
        let segments = parse_segments(stdout);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Only real segment.");
    }

    #[test]
    fn detect_fails_without_binary() {
        let executor = MockCommandExecutor::new();
        let result = WhisperCliStt::detect(executor, PathBuf::from("/m.bin"), 4);
        assert!(matches!(result, Err(DoblajeError::Transcription { .. })));
    }

    #[test]
    fn detect_fails_without_model() {
        let executor = MockCommandExecutor::new().with_available(WHISPER_CLI_BINARY);
        let result = WhisperCliStt::detect(executor, PathBuf::from("/nonexistent/m.bin"), 4);
        assert!(matches!(result, Err(DoblajeError::SttModelNotFound { .. })));
    }

    #[test]
    fn transcribe_runs_cli_and_parses_output() {
        let dir = tempfile::tempdir().unwrap();
        let wav = write_fixture_wav(dir.path());
        let model = dir.path().join("ggml-tiny.bin");
        std::fs::write(&model, b"fake").unwrap();

        let executor = MockCommandExecutor::new()
            .with_available(WHISPER_CLI_BINARY)
            .with_response("[00:00:00.000 --> 00:00:02.000]   Hola mundo.\n");
        let stt = WhisperCliStt::detect(executor, model, 2).unwrap();

        let result = stt.transcribe(&wav, "es").unwrap();
        assert_eq!(result.text, "Hola mundo.");
        assert_eq!(result.language, "es");
        assert_eq!(result.segments.len(), 1);
        assert_eq!(stt.model_name(), "ggml-tiny");
    }

    #[test]
    fn transcribe_rejects_unreadable_audio_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("ggml-tiny.bin");
        std::fs::write(&model, b"fake").unwrap();

        let executor = MockCommandExecutor::new().with_available(WHISPER_CLI_BINARY);
        let stt = WhisperCliStt::detect(executor, model, 2).unwrap();

        let err = stt
            .transcribe(Path::new("/nonexistent/audio.wav"), "en")
            .unwrap_err();
        assert!(matches!(err, DoblajeError::AudioInvalid { .. }));
        assert!(stt.executor.calls().is_empty());
    }
}
