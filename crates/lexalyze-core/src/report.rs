//! Analysis report and the JSON shapes exchanged between client and server.

use serde::{Deserialize, Serialize};

use crate::entity::EntitySet;
use crate::risk::RiskLevel;

/// Pipeline stage a chunk was dropped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Summarization,
}

/// A chunk whose inference call failed and was left out of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedChunk {
    pub stage: Stage,
    pub index: usize,
    /// Document character range of the chunk.
    pub start: usize,
    pub end: usize,
    pub reason: String,
}

/// Result of analysing one document.
///
/// `skipped_chunks` is only serialized when some chunk failed, so the
/// common response carries exactly `summary`, `risk_assessment`, and
/// `extracted_clauses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: String,
    pub risk_assessment: RiskLevel,
    pub extracted_clauses: EntitySet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_chunks: Vec<SkippedChunk>,
}

impl AnalysisReport {
    /// True when every chunk contributed to the report.
    pub fn is_complete(&self) -> bool {
        self.skipped_chunks.is_empty()
    }
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    /// The fixed liveness payload.
    pub fn ok() -> Self {
        Self {
            status: "ok".into(),
            message: "Legal LLM API is running!".into(),
        }
    }
}

/// Body of every non-200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
