//! Optional free-text generation capability.
//!
//! Script generation is deterministic and never calls this; the capability
//! exists for callers that want an LLM rewrite pass on top of the template
//! output. Without the `textgen` feature the worker simply reports the
//! capability as absent.

use crate::error::{DoblajeError, Result};

/// Trait for prompted text generation.
pub trait TextGenerator: Send {
    /// Generate a completion for `prompt`.
    fn generate(&mut self, prompt: &str) -> Result<String>;

    /// Name of the loaded model, for status reporting.
    fn model_name(&self) -> &str;
}

/// Mock generator for testing.
#[derive(Debug, Clone)]
pub struct MockTextGenerator {
    response: String,
    should_fail: bool,
}

impl MockTextGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
        }
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl TextGenerator for MockTextGenerator {
    fn generate(&mut self, _prompt: &str) -> Result<String> {
        if self.should_fail {
            return Err(DoblajeError::Other(
                "mock generation failure".to_string(),
            ));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-textgen"
    }
}

/// Quantized Flan-T5 generator running via candle.
#[cfg(feature = "textgen")]
pub mod t5 {
    use super::TextGenerator;
    use crate::error::{DoblajeError, Result};

    use candle_core::{Device, Tensor};
    use candle_transformers::models::quantized_t5::{
        Config as T5Config, T5ForConditionalGeneration,
    };
    use candle_transformers::quantized_var_builder::VarBuilder;
    use hf_hub::api::sync::Api;
    use tokenizers::Tokenizer;

    /// Default quantized Flan-T5 artifacts.
    pub const DEFAULT_REPO: &str = "lmz/candle-quantized-t5";
    pub const MODEL_FILENAME: &str = "model-flan-t5-small.gguf";
    pub const CONFIG_FILENAME: &str = "config-flan-t5-small.json";
    pub const TOKENIZER_FILENAME: &str = "tokenizer.json";

    /// Maximum number of tokens generated per prompt.
    const MAX_DECODE_TOKENS: usize = 512;

    pub struct CandleT5Generator {
        model: T5ForConditionalGeneration,
        tokenizer: Tokenizer,
        device: Device,
        model_name: String,
    }

    impl CandleT5Generator {
        /// Load the quantized model from the HuggingFace cache, downloading
        /// artifacts on first call.
        pub fn load() -> Result<Self> {
            let device = Device::Cpu;
            let api = Api::new()
                .map_err(|e| DoblajeError::Other(format!("HF Hub API init: {}", e)))?;
            let repo = api.model(DEFAULT_REPO.to_string());

            let model_path = repo.get(MODEL_FILENAME).map_err(|e| {
                DoblajeError::Other(format!("Download model {}: {}", MODEL_FILENAME, e))
            })?;
            let config_path = repo.get(CONFIG_FILENAME).map_err(|e| {
                DoblajeError::Other(format!("Download config {}: {}", CONFIG_FILENAME, e))
            })?;
            let tokenizer_path = repo
                .get(TOKENIZER_FILENAME)
                .map_err(|e| DoblajeError::Other(format!("Download tokenizer: {}", e)))?;

            let config_bytes = std::fs::read(&config_path).map_err(|e| {
                DoblajeError::Other(format!("Read config {}: {}", config_path.display(), e))
            })?;
            let config: T5Config = serde_json::from_slice(&config_bytes)
                .map_err(|e| DoblajeError::Other(format!("Parse T5 config: {}", e)))?;

            let vb = VarBuilder::from_gguf(&model_path, &device).map_err(|e| {
                DoblajeError::Other(format!("Load GGUF {}: {}", model_path.display(), e))
            })?;
            let model = T5ForConditionalGeneration::load(vb, &config)
                .map_err(|e| DoblajeError::Other(format!("Init T5 model: {}", e)))?;

            let tokenizer = Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| DoblajeError::Other(format!("Load tokenizer: {}", e)))?;

            Ok(Self {
                model,
                tokenizer,
                device,
                model_name: "flan-t5-small".to_string(),
            })
        }

        fn decode_greedy(&mut self, prompt: &str) -> Result<String> {
            let encoding = self
                .tokenizer
                .encode(prompt, true)
                .map_err(|e| DoblajeError::Other(format!("Tokenize: {}", e)))?;
            let input_ids: Vec<u32> = encoding.get_ids().to_vec();
            let input_tensor = Tensor::new(input_ids.as_slice(), &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(|e| DoblajeError::Other(format!("Create input tensor: {}", e)))?;

            let encoder_output = self
                .model
                .encode(&input_tensor)
                .map_err(|e| DoblajeError::Other(format!("Encoder forward: {}", e)))?;

            // First step feeds the pad token; later steps feed only the new
            // token, the KV cache carries the rest
            let mut decoded_ids: Vec<u32> = vec![0];
            let mut next_input = vec![0u32];

            for _ in 0..MAX_DECODE_TOKENS {
                let decoder_input = Tensor::new(next_input.as_slice(), &self.device)
                    .and_then(|t| t.unsqueeze(0))
                    .map_err(|e| DoblajeError::Other(format!("Create decoder input: {}", e)))?;

                let logits = self
                    .model
                    .decode(&decoder_input, &encoder_output)
                    .map_err(|e| DoblajeError::Other(format!("Decoder forward: {}", e)))?;

                let seq_len = logits
                    .dim(1)
                    .map_err(|e| DoblajeError::Other(format!("Get logits dim: {}", e)))?;
                let next_token = logits
                    .get_on_dim(1, seq_len - 1)
                    .and_then(|l| l.argmax(candle_core::D::Minus1))
                    .and_then(|t| t.reshape(()))
                    .and_then(|t| t.to_scalar::<u32>())
                    .map_err(|e| DoblajeError::Other(format!("Pick next token: {}", e)))?;

                // EOS is token 1 for T5
                if next_token == 1 {
                    break;
                }
                decoded_ids.push(next_token);
                next_input = vec![next_token];
            }

            self.tokenizer
                .decode(&decoded_ids[1..], true)
                .map_err(|e| DoblajeError::Other(format!("Detokenize: {}", e)))
        }
    }

    impl TextGenerator for CandleT5Generator {
        fn generate(&mut self, prompt: &str) -> Result<String> {
            self.model.clear_kv_cache();
            self.decode_greedy(prompt)
        }

        fn model_name(&self) -> &str {
            &self.model_name
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn candle_t5_generator_is_send() {
            fn assert_send<T: Send + 'static>() {}
            assert_send::<CandleT5Generator>();
        }
    }
}
