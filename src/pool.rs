//! One-time backend construction and lifetime ownership.
//!
//! Every model is loaded exactly once, before the dispatch loop starts, and
//! lives for the whole worker process. Both transcription models,
//! translation and synthesis are required: if one fails to construct,
//! initialization emits an `error` status and fails, and the process exits
//! without serving. Only the text generator is optional; its absence logs
//! a warning.

use crate::config::Config;
use crate::error::{DoblajeError, Result};
use crate::exec::SystemCommandExecutor;
use crate::progress::ProgressSink;
use crate::protocol::Status;
use crate::stt::SpeechToText;
use crate::textgen::TextGenerator;
use crate::translate::Translator;
use crate::tts::SpeechSynthesizer;
use log::{info, warn};
use std::path::PathBuf;

/// A loadable backend capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Transcription,
    Translation,
    Synthesis,
    TextGeneration,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Transcription => "transcription",
            Capability::Translation => "translation",
            Capability::Synthesis => "synthesis",
            Capability::TextGeneration => "text_generation",
        }
    }
}

/// The worker's loaded backends.
pub struct ResourcePool {
    stt_multilingual: Option<Box<dyn SpeechToText>>,
    stt_english: Option<Box<dyn SpeechToText>>,
    translator: Option<Box<dyn Translator>>,
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    text_generator: Option<Box<dyn TextGenerator>>,
    voice: String,
}

impl ResourcePool {
    /// Load every backend once.
    ///
    /// Emits a `loading` status per step and a `ready` status (with a
    /// backend summary) when construction finishes. A required backend
    /// that fails to construct emits an `error` status and aborts; the
    /// caller exits without ever entering the loop.
    pub fn initialize(config: &Config, sink: &mut dyn ProgressSink) -> Result<Self> {
        match Self::construct(config, sink) {
            Ok(pool) => {
                sink.status(Status::Ready, &pool.summary())?;
                Ok(pool)
            }
            Err(e) => {
                sink.status(Status::Error, &e.to_string())?;
                Err(e)
            }
        }
    }

    fn construct(config: &Config, sink: &mut dyn ProgressSink) -> Result<Self> {
        let voice = crate::tts::normalize_voice(&config.tts.voice).to_string();

        sink.status(Status::Loading, "Loading speech-to-text...")?;
        let stt_multilingual = load_stt(config, &config.stt.model)?;
        info!("stt multilingual: {}", stt_multilingual.model_name());
        let stt_english = load_stt(config, &config.stt.english_model)?;
        info!("stt english: {}", stt_english.model_name());

        sink.status(Status::Loading, "Loading translation...")?;
        let translator = load_translator(config)?;
        info!("translator: {}", translator.model_name());

        sink.status(Status::Loading, "Loading text generation...")?;
        let text_generator = match load_text_generator() {
            Ok(Some(engine)) => {
                info!("text generator: {}", engine.model_name());
                Some(engine)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("text generator unavailable: {}", e);
                None
            }
        };

        sink.status(Status::Loading, "Loading speech synthesis...")?;
        let synthesizer = crate::tts::select_synthesizer(
            &voice,
            &config.tts_voices_dir(),
            SystemCommandExecutor::new(),
        )?;
        info!("synthesizer: {}", synthesizer.backend_name());

        Ok(Self {
            stt_multilingual: Some(stt_multilingual),
            stt_english: Some(stt_english),
            translator: Some(translator),
            synthesizer: Some(synthesizer),
            text_generator,
            voice,
        })
    }

    /// Assemble a pool from pre-built backends.
    pub fn from_parts(
        stt: Option<Box<dyn SpeechToText>>,
        translator: Option<Box<dyn Translator>>,
        synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    ) -> Self {
        Self {
            stt_multilingual: stt,
            stt_english: None,
            translator,
            synthesizer,
            text_generator: None,
            voice: crate::tts::DEFAULT_VOICE.to_string(),
        }
    }

    /// Add a dedicated English transcription engine.
    pub fn with_english_stt(mut self, stt: Box<dyn SpeechToText>) -> Self {
        self.stt_english = Some(stt);
        self
    }

    /// Add a text generation backend.
    pub fn with_text_generator(mut self, generator: Box<dyn TextGenerator>) -> Self {
        self.text_generator = Some(generator);
        self
    }

    /// Pick the transcription engine for `language`.
    ///
    /// English gets the English-optimized model when one is loaded; every
    /// other language (and "auto") uses the multilingual model.
    pub fn stt(&self, language: &str) -> Result<&dyn SpeechToText> {
        if language == "en" {
            if let Some(engine) = &self.stt_english {
                return Ok(engine.as_ref());
            }
        }
        self.stt_multilingual
            .as_deref()
            .ok_or_else(|| DoblajeError::CapabilityMissing {
                capability: Capability::Transcription.name().to_string(),
            })
    }

    pub fn translator_mut(&mut self) -> Result<&mut dyn Translator> {
        match self.translator.as_deref_mut() {
            Some(engine) => Ok(engine),
            None => Err(DoblajeError::CapabilityMissing {
                capability: Capability::Translation.name().to_string(),
            }),
        }
    }

    pub fn synthesizer(&self) -> Result<&dyn SpeechSynthesizer> {
        self.synthesizer
            .as_deref()
            .ok_or_else(|| DoblajeError::CapabilityMissing {
                capability: Capability::Synthesis.name().to_string(),
            })
    }

    pub fn text_generator_mut(&mut self) -> Result<&mut dyn TextGenerator> {
        match self.text_generator.as_deref_mut() {
            Some(engine) => Ok(engine),
            None => Err(DoblajeError::CapabilityMissing {
                capability: Capability::TextGeneration.name().to_string(),
            }),
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Transcription => {
                self.stt_multilingual.is_some() || self.stt_english.is_some()
            }
            Capability::Translation => self.translator.is_some(),
            Capability::Synthesis => self.synthesizer.is_some(),
            Capability::TextGeneration => self.text_generator.is_some(),
        }
    }

    /// Normalized default voice for synthesis jobs that omit one.
    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Human-readable backend summary for the ready status line.
    fn summary(&self) -> String {
        let stt = self
            .stt_multilingual
            .as_ref()
            .map(|e| e.model_name())
            .unwrap_or("none");
        let translator = self
            .translator
            .as_ref()
            .map(|e| e.model_name())
            .unwrap_or("none");
        let synth = self
            .synthesizer
            .as_ref()
            .map(|e| e.backend_name())
            .unwrap_or("none");
        format!(
            "stt={} translation={} synthesis={} voice={}",
            stt, translator, synth, self.voice
        )
    }
}

/// Resolve a ggml model file and construct the compiled-in Whisper engine.
fn load_stt(config: &Config, model: &str) -> Result<Box<dyn SpeechToText>> {
    let model_path = stt_model_path(config, model);

    #[cfg(feature = "whisper")]
    {
        let engine = crate::stt::whisper::WhisperStt::new(crate::stt::whisper::WhisperSttConfig {
            model_path,
            threads: Some(config.runtime.omp_threads),
        })?;
        Ok(Box::new(engine))
    }

    #[cfg(not(feature = "whisper"))]
    {
        let engine = crate::stt::whisper_cli::WhisperCliStt::detect(
            SystemCommandExecutor::new(),
            model_path,
            config.runtime.omp_threads,
        )?;
        Ok(Box::new(engine))
    }
}

fn stt_model_path(config: &Config, model: &str) -> PathBuf {
    config.stt_models_dir().join(format!("ggml-{}.bin", model))
}

#[cfg(feature = "marian")]
fn load_translator(config: &Config) -> Result<Box<dyn Translator>> {
    let engine = crate::translate::marian::MarianTranslator::load(&config.translation)?;
    Ok(Box::new(engine))
}

#[cfg(not(feature = "marian"))]
fn load_translator(_config: &Config) -> Result<Box<dyn Translator>> {
    Err(DoblajeError::Translation {
        message: "translation engine not compiled in; rebuild with the `marian` feature"
            .to_string(),
    })
}

#[cfg(feature = "textgen")]
fn load_text_generator() -> Result<Option<Box<dyn TextGenerator>>> {
    let engine = crate::textgen::t5::CandleT5Generator::load()?;
    Ok(Some(Box::new(engine)))
}

#[cfg(not(feature = "textgen"))]
fn load_text_generator() -> Result<Option<Box<dyn TextGenerator>>> {
    Ok(None)
}
