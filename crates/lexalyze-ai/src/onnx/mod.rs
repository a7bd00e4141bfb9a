//! ONNX Runtime backends for Hugging Face models exported with `optimum`.

mod classifier;
mod config;
mod seq2seq;

pub use classifier::OnnxTokenClassifier;
pub use seq2seq::OnnxSummarizer;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::backend::BackendError;

/// A session mutex was poisoned by a panic mid-inference. The session is
/// unusable for the rest of the process.
#[derive(Debug, Error)]
#[error("{0} session poisoned")]
struct SessionPoisoned(&'static str);

/// Classify a failed call: a poisoned session is unavailable, anything else
/// fails only the current chunk.
fn to_backend_error(e: anyhow::Error) -> BackendError {
    if e.downcast_ref::<SessionPoisoned>().is_some() {
        BackendError::Unavailable(format!("{e:#}"))
    } else {
        BackendError::Inference(format!("{e:#}"))
    }
}

/// Resolve a required file inside a model directory.
fn require_file(model_dir: &Path, name: &str) -> anyhow::Result<PathBuf> {
    let path = model_dir.join(name);
    anyhow::ensure!(path.exists(), "{name} not found in {model_dir:?}");
    Ok(path)
}

fn softmax_max(logits: &[f32]) -> (usize, f32) {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let sum: f32 = logits.iter().map(|&x| (x - max).exp()).sum();
    let (best, &best_logit) = logits
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .unwrap_or((0, &0.0));
    (best, (best_logit - max).exp() / sum)
}

fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
