//! Summarization of long documents over disjoint character windows.
//!
//! Each window is summarized with length bounds derived from its word count,
//! and the partial summaries are joined in order with single spaces.

use lexalyze_core::{ChunkError, SkippedChunk, Stage, chunk_chars};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::{BackendError, LengthBounds, SummaryModel};

#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error("invalid chunking: {0}")]
    Chunking(#[from] ChunkError),
    #[error("summarization model unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Characters per window.
    pub max_chunk_chars: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 1024,
        }
    }
}

/// The assembled summary and the windows left out of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryOutcome {
    pub summary: String,
    pub skipped: Vec<SkippedChunk>,
}

/// Character-window summarization over one seq2seq backend.
pub struct Summarizer {
    backend: Box<dyn SummaryModel>,
    config: SummarizerConfig,
}

impl Summarizer {
    /// Summarizer over `backend` with the given window size.
    pub fn new(backend: Box<dyn SummaryModel>, config: SummarizerConfig) -> Self {
        Self { backend, config }
    }

    /// Window settings.
    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// Summarize `document` window by window.
    ///
    /// A window whose call fails contributes nothing and is recorded in
    /// [`SummaryOutcome::skipped`]. An empty document gives an empty summary.
    pub fn summarize(&self, document: &str) -> Result<SummaryOutcome, SummarizationError> {
        let chunks = chunk_chars(document, self.config.max_chunk_chars)?;
        info!(chunks = chunks.len(), "summarizing document");

        let mut parts = Vec::with_capacity(chunks.len());
        let mut skipped = Vec::new();
        for chunk in &chunks {
            let bounds = LengthBounds::for_words(chunk.word_count());
            match self.backend.summarize(&chunk.text, bounds) {
                Ok(part) => {
                    debug!(
                        chunk = chunk.index,
                        min = bounds.min,
                        max = bounds.max,
                        "summarized chunk"
                    );
                    parts.push(part);
                }
                Err(BackendError::Unavailable(msg)) => {
                    return Err(SummarizationError::Unavailable(msg));
                }
                Err(e) => {
                    warn!(
                        chunk = chunk.index + 1,
                        total = chunks.len(),
                        error = %e,
                        "could not summarize chunk"
                    );
                    skipped.push(SkippedChunk {
                        stage: Stage::Summarization,
                        index: chunk.index,
                        start: chunk.range.start,
                        end: chunk.range.end,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let summary = parts.join(" ").trim().to_string();
        info!(
            parts = parts.len(),
            skipped = skipped.len(),
            "summary complete"
        );
        Ok(SummaryOutcome { summary, skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Echoes the first `bounds.max` words of the chunk and records each call.
    #[derive(Default)]
    struct TruncatingModel {
        calls: Mutex<Vec<(String, LengthBounds)>>,
    }

    impl SummaryModel for TruncatingModel {
        fn summarize(&self, chunk: &str, bounds: LengthBounds) -> Result<String, BackendError> {
            self.calls.lock().unwrap().push((chunk.to_string(), bounds));
            Ok(chunk
                .split_whitespace()
                .take(bounds.max)
                .collect::<Vec<_>>()
                .join(" "))
        }
    }

    struct FixedModel {
        outputs: Vec<Result<&'static str, BackendError>>,
        next: Mutex<usize>,
    }

    impl FixedModel {
        fn new(outputs: Vec<Result<&'static str, BackendError>>) -> Self {
            Self {
                outputs,
                next: Mutex::new(0),
            }
        }
    }

    impl SummaryModel for FixedModel {
        fn summarize(&self, _chunk: &str, _bounds: LengthBounds) -> Result<String, BackendError> {
            let mut next = self.next.lock().unwrap();
            let i = *next;
            *next += 1;
            match &self.outputs[i] {
                Ok(s) => Ok(s.to_string()),
                Err(BackendError::Unavailable(m)) => Err(BackendError::Unavailable(m.clone())),
                Err(BackendError::Inference(m)) => Err(BackendError::Inference(m.clone())),
            }
        }
    }

    fn summarizer(model: impl SummaryModel + 'static, max_chunk_chars: usize) -> Summarizer {
        Summarizer::new(Box::new(model), SummarizerConfig { max_chunk_chars })
    }

    #[test]
    fn empty_document_gives_empty_summary() {
        let s = summarizer(TruncatingModel::default(), 1024);
        let outcome = s.summarize("").unwrap();
        assert_eq!(outcome.summary, "");
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn parts_joined_with_single_space_and_trimmed() {
        let model = FixedModel::new(vec![Ok("First part."), Ok("Second part.  ")]);
        let s = summarizer(model, 4);
        let outcome = s.summarize("abcdefgh").unwrap();
        assert_eq!(outcome.summary, "First part. Second part.");
    }

    #[test]
    fn failed_chunk_is_omitted_and_recorded() {
        let s = summarizer(
            FixedModel::new(vec![
                Ok("One."),
                Err(BackendError::Inference("decoder error".into())),
                Ok("Three."),
            ]),
            4,
        );
        let outcome = s.summarize("aaaabbbbcc").unwrap();
        assert_eq!(outcome.summary, "One. Three.");
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].index, 1);
        assert_eq!(outcome.skipped[0].start, 4);
        assert_eq!(outcome.skipped[0].end, 8);
        assert_eq!(outcome.skipped[0].stage, Stage::Summarization);
    }

    #[test]
    fn all_chunks_failing_gives_empty_summary() {
        let s = summarizer(
            FixedModel::new(vec![Err(BackendError::Inference("x".into()))]),
            1024,
        );
        let outcome = s.summarize("Some text.").unwrap();
        assert_eq!(outcome.summary, "");
        assert_eq!(outcome.skipped.len(), 1);
    }

    #[test]
    fn unavailable_model_aborts() {
        let s = summarizer(
            FixedModel::new(vec![Err(BackendError::Unavailable("not loaded".into()))]),
            1024,
        );
        assert!(matches!(
            s.summarize("Some text."),
            Err(SummarizationError::Unavailable(_))
        ));
    }

    #[test]
    fn bounds_follow_chunk_word_count() {
        let model = Arc::new(TruncatingModel::default());
        let s = Summarizer::new(Box::new(model.clone()), SummarizerConfig::default());
        s.summarize(&vec!["word"; 120].join(" ")).unwrap();

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, LengthBounds { min: 30, max: 60 });
    }

    #[test]
    fn partial_summary_respects_max_words() {
        let text = vec!["clause"; 500].join(" ");
        let s = summarizer(TruncatingModel::default(), 1024);
        let outcome = s.summarize(&text).unwrap();
        let chunks = chunk_chars(&text, 1024).unwrap();
        let cap: usize = chunks
            .iter()
            .map(|c| LengthBounds::for_words(c.word_count()).max)
            .sum();
        assert!(outcome.summary.split_whitespace().count() <= cap);
    }
}
