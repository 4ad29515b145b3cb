//! Marian EN→ES translation via candle.
//!
//! Downloads weights and converted tokenizers from HuggingFace on first use,
//! then runs greedy decoding chunk by chunk. Chunks are processed in input
//! order, which is what gives the batch contract its positional alignment.

use crate::config::TranslationConfig;
use crate::error::{DoblajeError, Result};
use crate::translate::Translator;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::marian::{Config as MarianConfig, MTModel};
use hf_hub::api::sync::Api;
use tokenizers::Tokenizer;

/// Maximum number of tokens generated per chunk.
const MAX_DECODE_TOKENS: usize = 512;

/// Marian translator running candle inference on CPU.
pub struct MarianTranslator {
    model: MTModel,
    source_tokenizer: Tokenizer,
    target_tokenizer: Tokenizer,
    config: MarianConfig,
    device: Device,
    model_name: String,
}

impl MarianTranslator {
    /// Load the opus-mt-en-es model from the HuggingFace cache.
    ///
    /// Downloads weights, and the candle-converted source/target tokenizers,
    /// on first call.
    pub fn load(translation: &TranslationConfig) -> Result<Self> {
        let device = Device::Cpu;
        let api =
            Api::new().map_err(|e| DoblajeError::Translation {
                message: format!("HF Hub API init: {}", e),
            })?;

        let weights_repo = api.model(translation.model_repo.clone());
        let weights_path = weights_repo.get("model.safetensors").map_err(|e| {
            DoblajeError::Translation {
                message: format!("Download weights from {}: {}", translation.model_repo, e),
            }
        })?;

        let tokenizer_repo = api.model(translation.tokenizer_repo.clone());
        let source_path = tokenizer_repo
            .get("tokenizer-marian-base-en.json")
            .map_err(|e| DoblajeError::Translation {
                message: format!("Download source tokenizer: {}", e),
            })?;
        let target_path = tokenizer_repo
            .get("tokenizer-marian-base-es.json")
            .map_err(|e| DoblajeError::Translation {
                message: format!("Download target tokenizer: {}", e),
            })?;

        let source_tokenizer =
            Tokenizer::from_file(&source_path).map_err(|e| DoblajeError::Translation {
                message: format!("Load source tokenizer: {}", e),
            })?;
        let target_tokenizer =
            Tokenizer::from_file(&target_path).map_err(|e| DoblajeError::Translation {
                message: format!("Load target tokenizer: {}", e),
            })?;

        let config = opus_mt_en_es_config();
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device).map_err(
                |e| DoblajeError::Translation {
                    message: format!("Load safetensors: {}", e),
                },
            )?
        };
        let model = MTModel::new(&config, vb).map_err(|e| DoblajeError::Translation {
            message: format!("Init Marian model: {}", e),
        })?;

        Ok(Self {
            model,
            source_tokenizer,
            target_tokenizer,
            config,
            device,
            model_name: translation.model_repo.clone(),
        })
    }

    /// Greedy-decode one chunk.
    fn translate_chunk(&mut self, text: &str) -> Result<String> {
        self.model.reset_kv_cache();

        let mut token_ids = self
            .source_tokenizer
            .encode(text, true)
            .map_err(|e| DoblajeError::Translation {
                message: format!("Tokenize: {}", e),
            })?
            .get_ids()
            .to_vec();
        token_ids.push(self.config.eos_token_id);

        let tokens = Tensor::new(token_ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| DoblajeError::Translation {
                message: format!("Create input tensor: {}", e),
            })?;
        let encoder_output =
            self.model
                .encoder()
                .forward(&tokens, 0)
                .map_err(|e| DoblajeError::Translation {
                    message: format!("Encoder forward: {}", e),
                })?;

        let mut decoded_ids = vec![self.config.decoder_start_token_id];
        for index in 0..MAX_DECODE_TOKENS {
            // Incremental decoding: after the first step, feed only the
            // newest token; the KV cache carries the rest
            let context_size = if index >= 1 { 1 } else { decoded_ids.len() };
            let start_pos = decoded_ids.len().saturating_sub(context_size);
            let input = Tensor::new(&decoded_ids[start_pos..], &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(|e| DoblajeError::Translation {
                    message: format!("Create decoder input: {}", e),
                })?;

            let logits = self
                .model
                .decode(&input, &encoder_output, start_pos)
                .map_err(|e| DoblajeError::Translation {
                    message: format!("Decoder forward: {}", e),
                })?;
            let logits = logits.squeeze(0).map_err(|e| DoblajeError::Translation {
                message: format!("Squeeze logits: {}", e),
            })?;
            let last = logits.dim(0).map_err(|e| DoblajeError::Translation {
                message: format!("Get logits dim: {}", e),
            })? - 1;
            let logits = logits.get(last).map_err(|e| DoblajeError::Translation {
                message: format!("Slice logits: {}", e),
            })?;

            let next_token = logits
                .argmax(candle_core::D::Minus1)
                .and_then(|t| t.to_scalar::<u32>())
                .map_err(|e| DoblajeError::Translation {
                    message: format!("Argmax: {}", e),
                })?;

            if next_token == self.config.eos_token_id
                || next_token == self.config.pad_token_id
            {
                break;
            }
            decoded_ids.push(next_token);
        }

        self.target_tokenizer
            .decode(&decoded_ids[1..], true)
            .map_err(|e| DoblajeError::Translation {
                message: format!("Detokenize: {}", e),
            })
    }
}

impl Translator for MarianTranslator {
    fn translate_batch(&mut self, chunks: &[String]) -> Result<Vec<String>> {
        let mut out = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            out.push(self.translate_chunk(chunk)?);
        }
        Ok(out)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Hyperparameters for Helsinki-NLP/opus-mt-en-es.
fn opus_mt_en_es_config() -> MarianConfig {
    MarianConfig {
        vocab_size: 65001,
        decoder_vocab_size: Some(65001),
        max_position_embeddings: 512,
        encoder_layers: 6,
        encoder_ffn_dim: 2048,
        encoder_attention_heads: 8,
        decoder_layers: 6,
        decoder_ffn_dim: 2048,
        decoder_attention_heads: 8,
        use_cache: true,
        is_encoder_decoder: true,
        activation_function: candle_nn::Activation::Swish,
        d_model: 512,
        decoder_start_token_id: 65000,
        scale_embedding: true,
        pad_token_id: 65000,
        eos_token_id: 0,
        forced_eos_token_id: 0,
        share_encoder_decoder_embeddings: true,
    }
}
