use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub stt: SttConfig,
    pub translation: TranslationConfig,
    pub tts: TtsConfig,
    pub runtime: RuntimeConfig,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    /// Multilingual Whisper model name (e.g. "tiny", "base")
    pub model: String,
    /// English-optimized Whisper model name (e.g. "tiny.en")
    pub english_model: String,
    /// Directory holding ggml model files; None = default cache dir
    pub models_dir: Option<PathBuf>,
}

/// Translation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslationConfig {
    /// HuggingFace repo for the Marian EN→ES weights
    pub model_repo: String,
    /// HuggingFace repo providing the converted Marian tokenizers
    pub tokenizer_repo: String,
}

/// Speech synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TtsConfig {
    /// Default voice identifier (normalized through the voice catalogue)
    pub voice: String,
    /// Directory holding piper ONNX voice models; None = default cache dir
    pub voices_dir: Option<PathBuf>,
}

/// Runtime tunables exported to backend math runtimes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Exported as OMP_NUM_THREADS before backends are constructed
    pub omp_threads: usize,
    /// Exported as MKL_NUM_THREADS before backends are constructed
    pub mkl_threads: usize,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_STT_MODEL.to_string(),
            english_model: defaults::DEFAULT_STT_ENGLISH_MODEL.to_string(),
            models_dir: None,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model_repo: "Helsinki-NLP/opus-mt-en-es".to_string(),
            tokenizer_repo: "lmz/candle-marian".to_string(),
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            voice: crate::tts::voices::DEFAULT_VOICE.to_string(),
            voices_dir: None,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            omp_threads: defaults::DEFAULT_BACKEND_THREADS,
            mkl_threads: defaults::DEFAULT_BACKEND_THREADS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Panics on invalid TOML rather than silently ignoring a broken file.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                let not_found = e
                    .downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false);
                if not_found {
                    Self::default()
                } else {
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - DOBLAJE_STT_MODEL → stt.model
    /// - DOBLAJE_VOICE → tts.voice
    /// - DOBLAJE_MODELS_DIR → stt.models_dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("DOBLAJE_STT_MODEL") {
            if !model.is_empty() {
                self.stt.model = model;
            }
        }

        if let Ok(voice) = std::env::var("DOBLAJE_VOICE") {
            if !voice.is_empty() {
                self.tts.voice = voice;
            }
        }

        if let Ok(dir) = std::env::var("DOBLAJE_MODELS_DIR") {
            if !dir.is_empty() {
                self.stt.models_dir = Some(PathBuf::from(dir));
            }
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/doblaje/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("doblaje")
            .join("config.toml")
    }

    /// Directory holding ggml Whisper model files.
    pub fn stt_models_dir(&self) -> PathBuf {
        self.stt
            .models_dir
            .clone()
            .unwrap_or_else(|| default_cache_dir().join("models"))
    }

    /// Directory holding piper ONNX voice models.
    pub fn tts_voices_dir(&self) -> PathBuf {
        self.tts
            .voices_dir
            .clone()
            .unwrap_or_else(|| default_cache_dir().join("piper"))
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("doblaje")
}
