//! Client against a live server on an ephemeral port.

use lexalyze_ai::{
    Analyzer, BackendError, LengthBounds, SummaryModel, TokenClassifier, TokenPrediction,
};
use lexalyze_client::{AnalysisClient, ClientError};
use lexalyze_core::RiskLevel;
use lexalyze_server::{AppState, router};

struct NoEntities;

impl TokenClassifier for NoEntities {
    fn classify(&self, _chunk: &str) -> Result<Vec<TokenPrediction>, BackendError> {
        Ok(vec![])
    }
}

struct Echo;

impl SummaryModel for Echo {
    fn summarize(&self, chunk: &str, _bounds: LengthBounds) -> Result<String, BackendError> {
        Ok(format!(" {chunk} "))
    }
}

async fn spawn_server() -> AnalysisClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(AppState::new(Analyzer::new(NoEntities, Echo)));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    AnalysisClient::new(format!("http://{addr}/"))
}

#[tokio::test]
async fn client_round_trip() {
    let client = spawn_server().await;

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");

    let lease = "Tenant is in breach; Landlord may terminate and claim damages.";
    let report = client.analyze(lease).await.unwrap();
    assert_eq!(report.risk_assessment, RiskLevel::Medium);
    assert!(report.summary.starts_with("Tenant is in breach"));
    assert!(report.extracted_clauses.is_empty());
    assert!(report.is_complete());
}

#[tokio::test]
async fn empty_document_surfaces_status_and_detail() {
    let client = spawn_server().await;

    let err = client.analyze("").await.unwrap_err();
    match &err {
        ClientError::Server { status, body } => {
            assert_eq!(*status, 400);
            assert!(body.contains("Document text cannot be empty."), "{body}");
        }
        other => panic!("expected server error, got {other:?}"),
    }
    assert_eq!(
        err.user_message(),
        "Analysis failed. The server responded with status code: 400"
    );
}
