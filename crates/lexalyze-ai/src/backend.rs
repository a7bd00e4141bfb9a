//! Contracts for the inference backends the pipeline runs per chunk.
//!
//! Backends are loaded once at startup and shared across requests, so both
//! traits require `Send + Sync`. An implementation whose runtime needs
//! exclusive access (ONNX Runtime sessions do) locks internally.

use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The model is not loaded or cannot be reached. Aborts the whole call.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// One inference call failed. The chunk is skipped.
    #[error("inference failed: {0}")]
    Inference(String),
}

impl BackendError {
    /// True when the whole call should abort rather than skip one chunk.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// One span as reported by a token-classification backend, before normalization.
///
/// Offsets are character offsets into the chunk text that was classified.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPrediction {
    pub label: String,
    /// Backend-native precision; widened to `f64` when normalized.
    pub score: f32,
    pub word: String,
    pub start: usize,
    pub end: usize,
}

/// Token-classification (NER) backend.
pub trait TokenClassifier: Send + Sync {
    /// Labelled spans in `chunk`, with offsets into `chunk`.
    fn classify(&self, chunk: &str) -> Result<Vec<TokenPrediction>, BackendError>;
}

/// Generated-length bounds for one summarization call, in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

impl LengthBounds {
    /// Bounds scaled to the input: roughly half the words at most, a quarter
    /// at least, clamped to `[20, 150]` and `[5, 30]` respectively.
    pub fn for_words(word_count: usize) -> Self {
        Self {
            min: (word_count / 4).clamp(5, 30),
            max: (word_count / 2).clamp(20, 150),
        }
    }
}

/// Sequence-to-sequence summarization backend.
///
/// Decoding must be deterministic (no sampling) and stay within `bounds`.
pub trait SummaryModel: Send + Sync {
    fn summarize(&self, chunk: &str, bounds: LengthBounds) -> Result<String, BackendError>;
}

impl<T: TokenClassifier + ?Sized> TokenClassifier for Arc<T> {
    fn classify(&self, chunk: &str) -> Result<Vec<TokenPrediction>, BackendError> {
        (**self).classify(chunk)
    }
}

impl<T: SummaryModel + ?Sized> SummaryModel for Arc<T> {
    fn summarize(&self, chunk: &str, bounds: LengthBounds) -> Result<String, BackendError> {
        (**self).summarize(chunk, bounds)
    }
}
