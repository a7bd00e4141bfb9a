//! Entity extraction over overlapping token windows.
//!
//! The document is split into windows of `chunk_size` whitespace tokens
//! overlapping by `overlap`, each window is classified, predictions are
//! normalized into [`Entity`] values, and exact duplicates are dropped.

use lexalyze_core::{Chunk, ChunkError, Entity, EntitySet, SkippedChunk, Stage, chunk_tokens};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::{BackendError, TokenClassifier, TokenPrediction};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid chunking: {0}")]
    Chunking(#[from] ChunkError),
    #[error("token classifier unavailable: {0}")]
    Unavailable(String),
}

/// Coordinate space for entity `start`/`end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetScope {
    /// Character offsets into the whole document.
    #[default]
    Document,
    /// Character offsets into the space-joined chunk text. The same entity
    /// seen by two overlapping windows then survives deduplication twice.
    ///
    /// Only the offsets change. Windowing is the same as for `Document`, so
    /// no trailing window lying wholly inside its predecessor is emitted
    /// (950 tokens at 512/50 give windows at 0 and 462, not also 924).
    Chunk,
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Tokens per window.
    pub chunk_size: usize,
    /// Tokens shared by consecutive windows.
    pub overlap: usize,
    pub offsets: OffsetScope,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            overlap: 50,
            offsets: OffsetScope::Document,
        }
    }
}

/// Entities plus the windows that could not be classified.
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    pub entities: EntitySet,
    pub skipped: Vec<SkippedChunk>,
}

/// Token-window entity extraction over one classifier backend.
pub struct EntityExtractor {
    backend: Box<dyn TokenClassifier>,
    config: ExtractorConfig,
}

impl EntityExtractor {
    /// Extractor over `backend` with the given windowing.
    pub fn new(backend: Box<dyn TokenClassifier>, config: ExtractorConfig) -> Self {
        Self { backend, config }
    }

    /// Windowing and offset settings.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Classify every window of `document` and collect the distinct entities.
    ///
    /// A window whose call fails is logged and skipped; an unavailable
    /// backend aborts.
    pub fn extract(&self, document: &str) -> Result<ExtractionOutcome, ExtractionError> {
        let chunks = chunk_tokens(document, self.config.chunk_size, self.config.overlap)?;
        info!(chunks = chunks.len(), "extracting entities");

        let mut outcome = ExtractionOutcome::default();
        for chunk in &chunks {
            let predictions = match self.backend.classify(&chunk.text) {
                Ok(p) => p,
                Err(BackendError::Unavailable(msg)) => {
                    return Err(ExtractionError::Unavailable(msg));
                }
                Err(e) => {
                    warn!(chunk = chunk.index, error = %e, "skipping chunk in entity extraction");
                    outcome.skipped.push(SkippedChunk {
                        stage: Stage::Extraction,
                        index: chunk.index,
                        start: chunk.range.start,
                        end: chunk.range.end,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            debug!(
                chunk = chunk.index,
                predictions = predictions.len(),
                "classified chunk"
            );
            outcome.entities.extend(
                predictions
                    .into_iter()
                    .filter_map(|p| normalize_prediction(p, chunk, self.config.offsets)),
            );
        }

        info!(
            entities = outcome.entities.len(),
            skipped = outcome.skipped.len(),
            "entity extraction complete"
        );
        Ok(outcome)
    }
}

/// Convert a backend prediction into an [`Entity`].
///
/// Widens the score to `f64` and clamps it into `[0, 1]`. Predictions with a
/// non-finite score or an inverted span are dropped.
fn normalize_prediction(p: TokenPrediction, chunk: &Chunk, scope: OffsetScope) -> Option<Entity> {
    if !p.score.is_finite() {
        warn!(chunk = chunk.index, word = %p.word, "dropping prediction with non-finite score");
        return None;
    }
    if p.start > p.end {
        warn!(
            chunk = chunk.index,
            start = p.start,
            end = p.end,
            "dropping prediction with inverted span"
        );
        return None;
    }

    let (start, end) = match scope {
        OffsetScope::Document => (
            chunk.to_document_offset(p.start),
            chunk.to_document_offset(p.end),
        ),
        OffsetScope::Chunk => (p.start, p.end),
    };

    Some(Entity {
        label: p.label,
        score: f64::from(p.score).clamp(0.0, 1.0),
        text: p.word,
        start,
        end,
    })
}
