//! Machine translation capability (English → Spanish).
//!
//! The batch contract matters: the translator receives the ordered chunk
//! list produced by the chunking policy and must return a positionally
//! aligned list, one output per input chunk.

#[cfg(feature = "marian")]
pub mod marian;

use crate::error::{DoblajeError, Result};

/// Trait for batch text translation.
pub trait Translator: Send {
    /// Translate an ordered batch of chunks.
    ///
    /// The returned vector has the same length and ordering as the input.
    fn translate_batch(&mut self, chunks: &[String]) -> Result<Vec<String>>;

    /// Name of the loaded model, for status reporting.
    fn model_name(&self) -> &str;
}

/// Mock translator for testing.
///
/// Prefixes every chunk so tests can verify ordering and coverage; can be
/// configured to fail instead.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    prefix: String,
    should_fail: bool,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            prefix: "es:".to_string(),
            should_fail: false,
        }
    }

    /// Use a custom prefix for translated chunks.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Configure the mock to fail on translate.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator for MockTranslator {
    fn translate_batch(&mut self, chunks: &[String]) -> Result<Vec<String>> {
        if self.should_fail {
            return Err(DoblajeError::Translation {
                message: "mock translation failure".to_string(),
            });
        }
        Ok(chunks
            .iter()
            .map(|c| format!("{}{}", self.prefix, c))
            .collect())
    }

    fn model_name(&self) -> &str {
        "mock-translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_preserves_batch_length_and_order() {
        let mut translator = MockTranslator::new().with_prefix("t-");
        let chunks = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let out = translator.translate_batch(&chunks).unwrap();
        assert_eq!(out, vec!["t-a", "t-b", "t-c"]);
    }

    #[test]
    fn mock_translates_empty_batch_to_empty() {
        let mut translator = MockTranslator::new();
        assert!(translator.translate_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn mock_failure_is_a_translation_error() {
        let mut translator = MockTranslator::new().with_failure();
        let err = translator
            .translate_batch(&["x".to_string()])
            .unwrap_err();
        assert!(matches!(err, DoblajeError::Translation { .. }));
    }
}
