//! ONNX Runtime token classification (NER) for BERT-style models.
//!
//! The model directory must contain `model.onnx`, `tokenizer.json`, and a
//! `config.json` with an `id2label` table (e.g. `dslim/bert-base-NER`).
//! Like the Hugging Face `ner` pipeline without aggregation, every
//! non-special token whose best label is not `O` becomes one prediction.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

use super::config::LabelMap;
use super::{SessionPoisoned, require_file, softmax_max, to_backend_error};
use crate::backend::{BackendError, TokenClassifier, TokenPrediction};

/// Input window, in tokens, of BERT-base models.
const MAX_TOKENS: usize = 512;
const OUTSIDE_LABEL: &str = "O";

/// BERT-style token classifier exported to ONNX, with its tokenizer and label table.
pub struct OnnxTokenClassifier {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: LabelMap,
}

impl OnnxTokenClassifier {
    /// Load the model, tokenizer, and label table from `model_dir`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = require_file(model_dir, "model.onnx")?;
        let tokenizer_path = require_file(model_dir, "tokenizer.json")?;
        let labels = LabelMap::from_file(&require_file(model_dir, "config.json")?)?;

        let session = Session::builder()?.commit_from_file(&model_path)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;
        tokenizer.with_padding(None);

        info!(
            labels = labels.len(),
            model = %model_path.display(),
            "loaded token classification model"
        );
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            labels,
        })
    }

    fn run(&self, chunk: &str) -> anyhow::Result<Vec<TokenPrediction>> {
        // Character offsets, so predictions line up with the chunker's coordinates.
        let encoding = self
            .tokenizer
            .encode_char_offsets(chunk, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let seq_len = encoding.get_ids().len();
        if seq_len == 0 {
            return Ok(vec![]);
        }
        let to_i64 = |v: &[u32]| v.iter().map(|&x| x as i64).collect::<Vec<_>>().into_boxed_slice();
        let shape = [1i64, seq_len as i64];

        let ids_tensor = Tensor::from_array((shape, to_i64(encoding.get_ids())))?;
        let mask_tensor = Tensor::from_array((shape, to_i64(encoding.get_attention_mask())))?;
        let type_tensor = Tensor::from_array((shape, to_i64(encoding.get_type_ids())))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| SessionPoisoned("token classifier"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
            "token_type_ids" => type_tensor,
        ])?;

        // Logits: [1, seq_len, num_labels].
        let (output_shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        let num_labels = self.labels.len();
        anyhow::ensure!(
            dims == [1, seq_len as i64, num_labels as i64],
            "unexpected output shape: {dims:?}, expected [1, {seq_len}, {num_labels}]"
        );

        let special = encoding.get_special_tokens_mask();
        let tokens = encoding.get_tokens();
        let offsets = encoding.get_offsets();

        let mut predictions = Vec::new();
        for j in 0..seq_len {
            if special[j] == 1 {
                continue;
            }
            let row = &logits[j * num_labels..(j + 1) * num_labels];
            let (best, score) = softmax_max(row);
            let label = self.labels.get(best).unwrap_or(OUTSIDE_LABEL);
            if label == OUTSIDE_LABEL {
                continue;
            }
            let (start, end) = offsets[j];
            predictions.push(TokenPrediction {
                label: label.to_string(),
                score,
                word: tokens[j].clone(),
                start,
                end,
            });
        }
        Ok(predictions)
    }
}

impl TokenClassifier for OnnxTokenClassifier {
    fn classify(&self, chunk: &str) -> Result<Vec<TokenPrediction>, BackendError> {
        self.run(chunk).map_err(to_backend_error)
    }
}
