//! ONNX Runtime encoder-decoder summarization (T5, BART).
//!
//! Expects an `optimum` export without past key values: `encoder_model.onnx`,
//! `decoder_model.onnx`, `tokenizer.json`, and `config.json`. Decoding is
//! greedy, so the same chunk always yields the same summary.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::config::GenerationConfig;
use super::{SessionPoisoned, argmax, require_file, to_backend_error};
use crate::backend::{BackendError, LengthBounds, SummaryModel};

const MAX_INPUT_TOKENS: usize = 512;

/// Encoder-decoder summarizer exported to ONNX as two sessions, decoded greedily.
pub struct OnnxSummarizer {
    encoder: Mutex<Session>,
    decoder: Mutex<Session>,
    tokenizer: Tokenizer,
    generation: GenerationConfig,
}

impl OnnxSummarizer {
    /// Load both sessions, the tokenizer, and generation ids from `model_dir`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let encoder_path = require_file(model_dir, "encoder_model.onnx")?;
        let decoder_path = require_file(model_dir, "decoder_model.onnx")?;
        let tokenizer_path = require_file(model_dir, "tokenizer.json")?;
        let generation = GenerationConfig::from_file(&require_file(model_dir, "config.json")?)?;

        let encoder = Session::builder()?.commit_from_file(&encoder_path)?;
        let decoder = Session::builder()?.commit_from_file(&decoder_path)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_INPUT_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;
        tokenizer.with_padding(None);

        info!(
            encoder = %encoder_path.display(),
            prefix = %generation.prefix,
            "loaded summarization model"
        );
        Ok(Self {
            encoder: Mutex::new(encoder),
            decoder: Mutex::new(decoder),
            tokenizer,
            generation,
        })
    }

    fn run(&self, chunk: &str, bounds: LengthBounds) -> anyhow::Result<String> {
        let input = format!("{}{}", self.generation.prefix, chunk);
        let encoding = self
            .tokenizer
            .encode(input, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let seq_len = encoding.get_ids().len();
        let to_i64 = |v: &[u32]| v.iter().map(|&x| x as i64).collect::<Vec<_>>();
        let input_ids = to_i64(encoding.get_ids());
        let attention_mask = to_i64(encoding.get_attention_mask());
        let input_shape = [1i64, seq_len as i64];

        // Encode once: last_hidden_state [1, seq_len, hidden].
        let (hidden_shape, hidden) = {
            let mut encoder = self
                .encoder
                .lock()
                .map_err(|_| SessionPoisoned("encoder"))?;
            let ids_tensor = Tensor::from_array((input_shape, input_ids.into_boxed_slice()))?;
            let mask_tensor =
                Tensor::from_array((input_shape, attention_mask.clone().into_boxed_slice()))?;
            let outputs = encoder.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
            ])?;
            let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
            let dims: &[i64] = shape;
            anyhow::ensure!(
                dims.len() == 3,
                "unexpected encoder output shape: {dims:?}, expected rank 3"
            );
            (dims.to_vec(), data.to_vec())
        };

        let mut decoder = self
            .decoder
            .lock()
            .map_err(|_| SessionPoisoned("decoder"))?;
        let eos = self.generation.eos_token_id as usize;

        // Lengths count the decoder start token.
        let mut generated: Vec<i64> = vec![self.generation.decoder_start_token_id as i64];
        while generated.len() < bounds.max {
            let cur_len = generated.len();
            let ids = generated.clone().into_boxed_slice();
            let mask = attention_mask.clone().into_boxed_slice();
            let states = hidden.clone().into_boxed_slice();
            let outputs = decoder.run(ort::inputs![
                "input_ids" => Tensor::from_array(([1i64, cur_len as i64], ids))?,
                "encoder_attention_mask" => Tensor::from_array((input_shape, mask))?,
                "encoder_hidden_states" => Tensor::from_array((hidden_shape.clone(), states))?,
            ])?;

            // Logits: [1, cur_len, vocab]; only the last position matters.
            let (shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
            let dims: &[i64] = shape;
            anyhow::ensure!(
                dims.len() == 3 && dims[1] as usize == cur_len,
                "unexpected decoder output shape: {dims:?}"
            );
            let vocab = dims[2] as usize;
            let mut last = logits[(cur_len - 1) * vocab..cur_len * vocab].to_vec();
            if cur_len < bounds.min && eos < vocab {
                last[eos] = f32::NEG_INFINITY;
            }

            let next = argmax(&last);
            generated.push(next as i64);
            if next == eos {
                break;
            }
        }
        debug!(
            tokens = generated.len(),
            min = bounds.min,
            max = bounds.max,
            "decoded summary"
        );

        let ids: Vec<u32> = generated.iter().map(|&id| id as u32).collect();
        self.tokenizer
            .decode(&ids, true)
            .map(|s| s.trim().to_string())
            .map_err(|e| anyhow::anyhow!("detokenize: {e}"))
    }
}

impl SummaryModel for OnnxSummarizer {
    fn summarize(&self, chunk: &str, bounds: LengthBounds) -> Result<String, BackendError> {
        self.run(chunk, bounds).map_err(to_backend_error)
    }
}
