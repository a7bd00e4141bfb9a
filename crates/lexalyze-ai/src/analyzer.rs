//! Document analysis: risk scoring, entity extraction, and summarization.

use std::time::Instant;

use lexalyze_core::{AnalysisReport, KeywordRiskScorer, RiskScorer};
use thiserror::Error;
use tracing::info;

use crate::backend::{SummaryModel, TokenClassifier};
use crate::extractor::{EntityExtractor, ExtractionError, ExtractorConfig};
use crate::summarizer::{SummarizationError, Summarizer, SummarizerConfig};

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Empty or whitespace-only input. Raised before any backend call.
    #[error("Document text cannot be empty.")]
    EmptyDocument,
    #[error("clause extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("summarization failed: {0}")]
    Summarization(#[from] SummarizationError),
}

impl AnalysisError {
    /// True when the caller sent unusable input, as opposed to a backend failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyDocument)
    }
}

/// Backends and their chunking settings, built once and shared read-only.
pub struct Analyzer {
    risk: Box<dyn RiskScorer>,
    extractor: EntityExtractor,
    summarizer: Summarizer,
}

impl Analyzer {
    /// Analyzer with default chunking and the keyword risk scorer.
    pub fn new(
        classifier: impl TokenClassifier + 'static,
        summary_model: impl SummaryModel + 'static,
    ) -> Self {
        Self {
            risk: Box::new(KeywordRiskScorer::default()),
            extractor: EntityExtractor::new(Box::new(classifier), ExtractorConfig::default()),
            summarizer: Summarizer::new(Box::new(summary_model), SummarizerConfig::default()),
        }
    }

    /// Analyzer from separately configured components.
    pub fn from_parts(
        risk: Box<dyn RiskScorer>,
        extractor: EntityExtractor,
        summarizer: Summarizer,
    ) -> Self {
        Self {
            risk,
            extractor,
            summarizer,
        }
    }

    /// Replace the risk scorer.
    pub fn with_risk_scorer(mut self, risk: impl RiskScorer + 'static) -> Self {
        self.risk = Box::new(risk);
        self
    }

    /// The entity extractor and its chunking settings.
    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    /// The summarizer and its chunking settings.
    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    /// Produce the full report for one document.
    ///
    /// Runs risk scoring, extraction, and summarization in that order on the
    /// calling thread. Chunks that fail are listed in
    /// [`AnalysisReport::skipped_chunks`].
    pub fn analyze(&self, text: &str) -> Result<AnalysisReport, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyDocument);
        }
        let started = Instant::now();

        let risk = self.risk.score(text);
        info!(
            level = %risk.level,
            score = risk.score(),
            matched = ?risk.matched,
            "risk assessment complete"
        );

        let extraction = self.extractor.extract(text)?;
        info!(
            entities = extraction.entities.len(),
            "clause extraction complete"
        );

        let summary = self.summarizer.summarize(text)?;
        info!(chars = summary.summary.len(), "summary generation complete");

        let mut skipped_chunks = extraction.skipped;
        skipped_chunks.extend(summary.skipped);

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            skipped = skipped_chunks.len(),
            "analysis finished"
        );
        Ok(AnalysisReport {
            summary: summary.summary,
            risk_assessment: risk.level,
            extracted_clauses: extraction.entities,
            skipped_chunks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, LengthBounds, TokenPrediction};
    use lexalyze_core::{RiskAssessment, RiskLevel, Stage};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingClassifier {
        calls: AtomicUsize,
    }

    impl TokenClassifier for CountingClassifier {
        fn classify(&self, chunk: &str) -> Result<Vec<TokenPrediction>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(chunk
                .find("Acme")
                .map(|at| TokenPrediction {
                    label: "B-ORG".into(),
                    score: 0.99,
                    word: "Acme".into(),
                    start: at,
                    end: at + 4,
                })
                .into_iter()
                .collect())
        }
    }

    #[derive(Default)]
    struct CountingSummary {
        calls: AtomicUsize,
        fail: bool,
    }

    impl SummaryModel for CountingSummary {
        fn summarize(&self, _chunk: &str, _bounds: LengthBounds) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(BackendError::Inference("generation failed".into()))
            } else {
                Ok("Acme indemnifies the client.".into())
            }
        }
    }

    struct Unreachable;

    impl TokenClassifier for Unreachable {
        fn classify(&self, _chunk: &str) -> Result<Vec<TokenPrediction>, BackendError> {
            Err(BackendError::Unavailable("connection refused".into()))
        }
    }

    struct AlwaysHigh;

    impl RiskScorer for AlwaysHigh {
        fn score(&self, _text: &str) -> RiskAssessment {
            RiskAssessment {
                level: RiskLevel::High,
                matched: vec![],
            }
        }
    }

    const SAMPLE: &str = "This Agreement is made on 1 January 2025. \
        Acme shall indemnify the Client against all liabilities. \
        Either party may terminate on breach with 30 days notice.";

    #[test]
    fn report_combines_all_three_analyses() {
        let analyzer = Analyzer::new(CountingClassifier::default(), CountingSummary::default());
        let report = analyzer.analyze(SAMPLE).unwrap();

        // indemnify, terminate, breach; "liabilities" does not contain "liability".
        assert_eq!(report.risk_assessment, RiskLevel::Medium);
        assert_eq!(report.summary, "Acme indemnifies the client.");
        assert_eq!(report.extracted_clauses.len(), 1);
        let acme = &report.extracted_clauses.as_slice()[0];
        assert_eq!(acme.start, SAMPLE.find("Acme").unwrap());
        assert!(report.is_complete());
    }

    #[test]
    fn three_keywords_is_medium_risk() {
        let analyzer = Analyzer::new(CountingClassifier::default(), CountingSummary::default());
        let report = analyzer
            .analyze("Seller shall indemnify Buyer; on any breach Buyer may terminate.")
            .unwrap();
        assert_eq!(report.risk_assessment, RiskLevel::Medium);
    }

    #[test]
    fn empty_text_rejected_before_any_backend_call() {
        let classifier = Arc::new(CountingClassifier::default());
        let summary = Arc::new(CountingSummary::default());
        let analyzer = Analyzer::new(classifier.clone(), summary.clone());

        for text in ["", "   ", "\n\t"] {
            let err = analyzer.analyze(text).unwrap_err();
            assert!(err.is_validation());
            assert_eq!(err.to_string(), "Document text cannot be empty.");
        }
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(summary.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unavailable_classifier_is_extraction_error() {
        let analyzer = Analyzer::new(Unreachable, CountingSummary::default());
        let err = analyzer.analyze(SAMPLE).unwrap_err();
        assert!(matches!(err, AnalysisError::Extraction(ExtractionError::Unavailable(_))));
        assert!(!err.is_validation());
    }

    #[test]
    fn failed_summary_chunks_are_reported_not_raised() {
        let analyzer = Analyzer::new(
            CountingClassifier::default(),
            CountingSummary {
                fail: true,
                ..Default::default()
            },
        );
        let report = analyzer.analyze(SAMPLE).unwrap();
        assert_eq!(report.summary, "");
        assert_eq!(report.skipped_chunks.len(), 1);
        assert_eq!(report.skipped_chunks[0].stage, Stage::Summarization);
    }

    #[test]
    fn risk_scorer_is_pluggable() {
        let analyzer = Analyzer::new(CountingClassifier::default(), CountingSummary::default())
            .with_risk_scorer(AlwaysHigh);
        let report = analyzer.analyze("A harmless memo.").unwrap();
        assert_eq!(report.risk_assessment, RiskLevel::High);
    }
}
