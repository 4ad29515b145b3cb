//! WAV loading and ordered concatenation.
//!
//! Input audio is normalized to 16kHz mono for the Whisper engines. The
//! synthesis path concatenates per-chunk WAV files in order into the final
//! output file; container transcoding (MP3 etc.) is left to the caller.

use crate::defaults::SAMPLE_RATE;
use crate::error::{DoblajeError, Result};
use std::path::Path;

/// Read a WAV file into 16kHz mono i16 samples.
///
/// Stereo input is mixed down; other sample rates are linearly resampled.
/// Fails with a recoverable `AudioInvalid` error on unreadable files.
pub fn read_samples(path: &Path) -> Result<Vec<i16>> {
    let mut reader = hound::WavReader::open(path).map_err(|e| DoblajeError::AudioInvalid {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let spec = reader.spec();
    let raw: Vec<i16> = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| DoblajeError::AudioInvalid {
            path: path.display().to_string(),
            message: format!("Failed to read WAV samples: {}", e),
        })?;

    let mono = if spec.channels == 2 {
        raw.chunks_exact(2)
            .map(|pair| {
                let left = pair[0] as i32;
                let right = pair[1] as i32;
                ((left + right) / 2) as i16
            })
            .collect()
    } else {
        raw
    };

    if spec.sample_rate != SAMPLE_RATE {
        Ok(resample(&mono, spec.sample_rate, SAMPLE_RATE))
    } else {
        Ok(mono)
    }
}

/// Concatenate WAV files in order into `output`.
///
/// All inputs must share the spec of the first file; a single synthesis
/// backend produces uniform chunks, so a mismatch means a caller bug.
pub fn concat_wavs(inputs: &[std::path::PathBuf], output: &Path) -> Result<()> {
    let first = inputs.first().ok_or_else(|| {
        DoblajeError::Synthesis {
            message: "no audio chunks to concatenate".to_string(),
        }
    })?;

    let first_reader = hound::WavReader::open(first).map_err(|e| DoblajeError::AudioInvalid {
        path: first.display().to_string(),
        message: e.to_string(),
    })?;
    let spec = first_reader.spec();
    drop(first_reader);

    let mut writer =
        hound::WavWriter::create(output, spec).map_err(|e| DoblajeError::Synthesis {
            message: format!("Failed to create {}: {}", output.display(), e),
        })?;

    for input in inputs {
        let mut reader =
            hound::WavReader::open(input).map_err(|e| DoblajeError::AudioInvalid {
                path: input.display().to_string(),
                message: e.to_string(),
            })?;
        if reader.spec() != spec {
            return Err(DoblajeError::Synthesis {
                message: format!(
                    "chunk {} has mismatched WAV spec ({:?} vs {:?})",
                    input.display(),
                    reader.spec(),
                    spec
                ),
            });
        }
        for sample in reader.samples::<i16>() {
            let sample = sample.map_err(|e| DoblajeError::AudioInvalid {
                path: input.display().to_string(),
                message: e.to_string(),
            })?;
            writer
                .write_sample(sample)
                .map_err(|e| DoblajeError::Synthesis {
                    message: format!("Failed to write {}: {}", output.display(), e),
                })?;
        }
    }

    writer.finalize().map_err(|e| DoblajeError::Synthesis {
        message: format!("Failed to finalize {}: {}", output.display(), e),
    })
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn read_16khz_mono_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.wav");
        let input = vec![100i16, 200, 300, 400];
        write_wav(&path, 16000, 1, &input);

        assert_eq!(read_samples(&path).unwrap(), input);
    }

    #[test]
    fn stereo_is_mixed_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 16000, 2, &[100, 300, -100, 100]);

        assert_eq!(read_samples(&path).unwrap(), vec![200, 0]);
    }

    #[test]
    fn other_rates_are_resampled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("8k.wav");
        write_wav(&path, 8000, 1, &[0i16; 800]);

        let samples = read_samples(&path).unwrap();
        // 100ms at 8kHz becomes ~100ms at 16kHz
        assert!((samples.len() as i64 - 1600).abs() <= 2);
    }

    #[test]
    fn missing_file_is_recoverable_audio_error() {
        let err = read_samples(Path::new("/nonexistent/audio.wav")).unwrap_err();
        match err {
            DoblajeError::AudioInvalid { path, .. } => {
                assert!(path.contains("nonexistent"))
            }
            other => panic!("Expected AudioInvalid, got {:?}", other),
        }
    }

    #[test]
    fn garbage_file_is_recoverable_audio_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"not a wav file at all").unwrap();

        assert!(matches!(
            read_samples(&path),
            Err(DoblajeError::AudioInvalid { .. })
        ));
    }

    #[test]
    fn concat_preserves_chunk_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        let out = dir.path().join("out.wav");
        write_wav(&a, 16000, 1, &[1, 2, 3]);
        write_wav(&b, 16000, 1, &[4, 5]);

        concat_wavs(&[a, b], &out).unwrap();

        assert_eq!(read_samples(&out).unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn concat_with_no_inputs_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.wav");
        assert!(concat_wavs(&[], &out).is_err());
    }

    #[test]
    fn concat_rejects_mismatched_specs() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        let out = dir.path().join("out.wav");
        write_wav(&a, 16000, 1, &[1, 2]);
        write_wav(&b, 22050, 1, &[3, 4]);

        let err = concat_wavs(&[a, b], &out).unwrap_err();
        assert!(err.to_string().contains("mismatched"));
    }

    #[test]
    fn resample_identity_when_rates_match() {
        let samples = vec![1i16, 2, 3];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }
}
