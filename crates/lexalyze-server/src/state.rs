//! Shared application state: the analyzer, loaded once at startup.

use std::sync::Arc;

use lexalyze_ai::Analyzer;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    /// State around an already built analyzer.
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }

    /// Load both ONNX models named by `cfg`. Any failure is fatal to startup.
    #[cfg(feature = "onnx")]
    pub fn load(cfg: &crate::ServerConfig) -> anyhow::Result<Self> {
        use anyhow::Context;
        use lexalyze_ai::{EntityExtractor, OnnxSummarizer, OnnxTokenClassifier, Summarizer};
        use lexalyze_core::KeywordRiskScorer;

        tracing::info!("loading models... this may take a moment");
        let ner_dir = cfg.ner_model.display();
        let classifier = OnnxTokenClassifier::load(&cfg.ner_model)
            .with_context(|| format!("loading token classifier from {ner_dir}"))?;
        let summary_dir = cfg.summary_model.display();
        let summary_model = OnnxSummarizer::load(&cfg.summary_model)
            .with_context(|| format!("loading summarizer from {summary_dir}"))?;

        let analyzer = Analyzer::from_parts(
            Box::new(KeywordRiskScorer::default()),
            EntityExtractor::new(Box::new(classifier), cfg.extractor_config()),
            Summarizer::new(Box::new(summary_model), cfg.summarizer_config()),
        );
        tracing::info!("models loaded");
        Ok(Self::new(analyzer))
    }
}
