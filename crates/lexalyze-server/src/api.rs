//! HTTP handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use lexalyze_ai::AnalysisError;
use lexalyze_core::{AnalysisReport, AnalyzeRequest, HealthResponse};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Liveness check. Never touches the models.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Analyze one document: risk assessment, summary, and extracted entities.
///
/// Inference is CPU-bound and runs start to finish on the blocking pool.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let Json(req) = payload?;
    if req.text.trim().is_empty() {
        return Err(AnalysisError::EmptyDocument.into());
    }

    info!(
        chars = req.text.chars().count(),
        "received analysis request"
    );
    let analyzer = state.analyzer.clone();
    let report = tokio::task::spawn_blocking(move || analyzer.analyze(&req.text))
        .await
        .map_err(|e| ApiError::Internal(format!("analysis task failed: {e}")))??;

    info!(
        risk = %report.risk_assessment,
        entities = report.extracted_clauses.len(),
        skipped = report.skipped_chunks.len(),
        "analysis finished, returning results"
    );
    Ok(Json(report))
}
