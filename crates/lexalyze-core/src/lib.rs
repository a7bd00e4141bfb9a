pub mod chunk;
pub mod entity;
pub mod report;
pub mod risk;

pub use chunk::{Chunk, ChunkError, chunk_chars, chunk_tokens};
pub use entity::{Entity, EntitySet};
pub use report::{AnalysisReport, AnalyzeRequest, ErrorBody, HealthResponse, SkippedChunk, Stage};
pub use risk::{KeywordRiskScorer, RISK_KEYWORDS, RiskAssessment, RiskLevel, RiskScorer};
