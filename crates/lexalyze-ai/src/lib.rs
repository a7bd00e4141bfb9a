//! Inference layer: chunked entity extraction and summarization over pluggable
//! backends, composed with risk scoring into one document analysis.

mod analyzer;
mod backend;
mod extractor;
mod summarizer;

#[cfg(feature = "onnx")]
mod onnx;

pub use analyzer::{AnalysisError, Analyzer};
pub use backend::{BackendError, LengthBounds, SummaryModel, TokenClassifier, TokenPrediction};
pub use extractor::{
    EntityExtractor, ExtractionError, ExtractionOutcome, ExtractorConfig, OffsetScope,
};
pub use summarizer::{SummarizationError, Summarizer, SummarizerConfig, SummaryOutcome};

#[cfg(feature = "onnx")]
pub use onnx::{OnnxSummarizer, OnnxTokenClassifier};
