//! Job execution pipelines.
//!
//! Each job validates its payload first, then drives the loaded backends.
//! All failures are per-job: the executor maps them to an error `JobResult`
//! and the dispatch loop keeps running.
//!
//! Progress percentages are monotonically non-decreasing within one job.
//! The multi-stage pipelines reserve fixed ranges per stage:
//! `translate` uses 5..=40 (stt), 45..=65 (translation), 70..=98 (tts);
//! `generate_podcast` uses 10..=30 (script) and 40..=98 (tts). Synthesis
//! engines report 0..=100 internally and are rescaled into their range.

use crate::chunk::{chunk_text, reassemble};
use crate::defaults::{TRANSLATE_SOURCE_LANGUAGE, TRANSLATION_CHUNK_CHARS};
use crate::error::{DoblajeError, Result};
use crate::pool::ResourcePool;
use crate::progress::ProgressSink;
use crate::protocol::{Article, Job, JobResult};
use crate::script;
use log::{debug, warn};
use serde_json::json;
use std::path::Path;

pub struct PipelineExecutor {
    pool: ResourcePool,
}

impl PipelineExecutor {
    pub fn new(pool: ResourcePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Execute one job; never panics, never kills the loop.
    pub fn run(&mut self, job: &Job, sink: &mut dyn ProgressSink) -> JobResult {
        match self.dispatch(job, sink) {
            Ok(value) => JobResult::ok(value),
            Err(e) => {
                warn!("job failed: {}", e);
                JobResult::err(e.to_string())
            }
        }
    }

    fn dispatch(&mut self, job: &Job, sink: &mut dyn ProgressSink) -> Result<serde_json::Value> {
        match job {
            Job::Transcribe {
                input_path,
                language,
            } => self.run_transcribe(input_path.as_deref(), language, sink),
            Job::Translate {
                input_path,
                output_path,
                voice,
            } => self.run_translate(
                input_path.as_deref(),
                output_path.as_deref(),
                voice.as_deref(),
                sink,
            ),
            Job::TranslateText { text } => self.run_translate_text(text.as_deref(), sink),
            Job::GenerateScript { articles } => self.run_generate_script(articles, sink),
            Job::GeneratePodcast {
                articles,
                output_path,
                voice,
            } => self.run_generate_podcast(
                articles,
                output_path.as_deref(),
                voice.as_deref(),
                sink,
            ),
            Job::Ping => Ok(json!("pong")),
            Job::Shutdown => Ok(json!("shutting_down")),
        }
    }

    fn run_transcribe(
        &mut self,
        input_path: Option<&str>,
        language: &str,
        sink: &mut dyn ProgressSink,
    ) -> Result<serde_json::Value> {
        let input = require_field(input_path, "transcribe", "input_path")?;

        sink.progress("stt", 5, "Transcribing audio...")?;
        let result = self.pool.stt(language)?.transcribe(Path::new(input), language)?;
        sink.progress("stt", 100, "Transcription complete")?;

        serde_json::to_value(&result)
            .map_err(|e| DoblajeError::Other(format!("serialize transcription: {}", e)))
    }

    fn run_translate(
        &mut self,
        input_path: Option<&str>,
        output_path: Option<&str>,
        voice: Option<&str>,
        sink: &mut dyn ProgressSink,
    ) -> Result<serde_json::Value> {
        let input = require_field(input_path, "translate", "input_path")?.to_string();
        let output = require_field(output_path, "translate", "output_path")?.to_string();
        self.check_requested_voice(voice);

        sink.progress("stt", 5, "Transcribing audio...")?;
        let text_en = {
            let stt = self.pool.stt(TRANSLATE_SOURCE_LANGUAGE)?;
            stt.transcribe(Path::new(&input), TRANSLATE_SOURCE_LANGUAGE)?
                .text
        };
        if text_en.trim().is_empty() {
            return Err(DoblajeError::Transcription {
                message: "transcription produced no text".to_string(),
            });
        }
        sink.progress("stt", 40, "Transcription complete")?;

        sink.progress("translation", 45, "Translating to Spanish...")?;
        let text_es = self.translate_text(&text_en)?;
        sink.progress("translation", 65, "Translation complete")?;

        sink.progress("tts", 70, "Synthesizing speech...")?;
        self.synthesize_scaled(&text_es, Path::new(&output), 70, 98, sink)?;

        Ok(json!({
            "text_en": text_en,
            "text_es": text_es,
            "output_path": output,
        }))
    }

    fn run_translate_text(
        &mut self,
        text: Option<&str>,
        sink: &mut dyn ProgressSink,
    ) -> Result<serde_json::Value> {
        let original = require_field(text, "translate_text", "text")?.to_string();

        sink.progress("translation", 10, "Translating to Spanish...")?;
        let translated = self.translate_text(&original)?;
        sink.progress("translation", 100, "Translation complete")?;

        Ok(json!({
            "original": original,
            "translated": translated,
        }))
    }

    fn run_generate_script(
        &mut self,
        articles: &[Article],
        sink: &mut dyn ProgressSink,
    ) -> Result<serde_json::Value> {
        sink.progress("script", 10, "Generating script...")?;
        let script = script::generate_script(articles)?;
        sink.progress("script", 100, "Script ready")?;

        Ok(json!({
            "script": script.text,
            "article_count": script.article_count,
        }))
    }

    fn run_generate_podcast(
        &mut self,
        articles: &[Article],
        output_path: Option<&str>,
        voice: Option<&str>,
        sink: &mut dyn ProgressSink,
    ) -> Result<serde_json::Value> {
        let output = require_field(output_path, "generate_podcast", "output_path")?.to_string();
        self.check_requested_voice(voice);

        sink.progress("script", 10, "Generating script...")?;
        let script = script::generate_script(articles)?;
        sink.progress("script", 30, "Script ready")?;

        sink.progress("tts", 40, "Synthesizing speech...")?;
        self.synthesize_scaled(&script.text, Path::new(&output), 40, 98, sink)?;

        Ok(json!({
            "script": script.text,
            "output_path": output,
            "article_count": script.article_count,
        }))
    }

    /// Chunked EN→ES translation with ordered reassembly.
    fn translate_text(&mut self, text: &str) -> Result<String> {
        let chunks = chunk_text(text, TRANSLATION_CHUNK_CHARS);
        let translated = self.pool.translator_mut()?.translate_batch(&chunks)?;
        Ok(reassemble(&translated))
    }

    /// Run synthesis, rescaling the engine's 0..=100 reports into
    /// `base..=ceiling` on the job's progress scale.
    fn synthesize_scaled(
        &mut self,
        text: &str,
        output: &Path,
        base: i32,
        ceiling: i32,
        sink: &mut dyn ProgressSink,
    ) -> Result<()> {
        let span = ceiling - base;
        let synthesizer = self.pool.synthesizer()?;
        synthesizer.synthesize(text, output, &mut |percent, message| {
            let scaled = base + percent * span / 100;
            // A broken output pipe will surface when the result is written
            if let Err(e) = sink.progress("tts", scaled, message) {
                warn!("dropping progress record: {}", e);
            }
        })
    }

    /// The synthesis engine is bound to one voice at load time; a job asking
    /// for a different one keeps the loaded voice.
    fn check_requested_voice(&self, voice: Option<&str>) {
        if let Some(requested) = voice {
            let normalized = crate::tts::normalize_voice(requested);
            if normalized != self.pool.voice() {
                warn!(
                    "requested voice {} not loaded, using {}",
                    normalized,
                    self.pool.voice()
                );
            } else {
                debug!("requested voice {}", normalized);
            }
        }
    }
}

fn require_field<'a>(value: Option<&'a str>, job: &str, field: &str) -> Result<&'a str> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(DoblajeError::validation(format!(
            "{} job requires {}",
            job, field
        ))),
    }
}
