//! HTTP client for the analysis server's `/` and `/analyze` endpoints.

use std::time::Duration;

use lexalyze_core::{AnalysisReport, AnalyzeRequest, HealthResponse};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

/// Long documents take minutes on CPU inference.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            Self::Timeout(timeout)
        } else if e.is_connect() {
            Self::Connect(e)
        } else {
            Self::Http(e)
        }
    }

    /// Message for the person who submitted the document.
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout(limit) => format!(
                "Analysis timed out. The document is too long for the server to process \
                 within the time limit ({}). Try a smaller document or a faster model.",
                describe_duration(*limit)
            ),
            Self::Connect(e) => format!("Failed to connect to the analysis server: {e}"),
            Self::Server { status, .. } => {
                format!("Analysis failed. The server responded with status code: {status}")
            }
            Self::Http(e) => format!("Failed to reach the analysis server: {e}"),
            Self::Json(e) => format!("The server sent a response that could not be read: {e}"),
        }
    }
}

fn describe_duration(d: Duration) -> String {
    let secs = d.as_secs();
    match secs {
        s if s >= 60 && s % 60 == 0 => {
            let m = s / 60;
            format!("{m} minute{}", if m == 1 { "" } else { "s" })
        }
        s => format!("{s} seconds"),
    }
}

/// Client for one analysis server.
pub struct AnalysisClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl AnalysisClient {
    /// Create a client for the given base URL, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Server root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Timeout applied to each request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Liveness check.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/", self.base_url);
        let resp = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout))?;
        self.read_json(resp).await
    }

    /// Submit a document and wait for its report.
    ///
    /// There is no retry: a timeout or connection failure ends the attempt.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisReport, ClientError> {
        let url = format!("{}/analyze", self.base_url);
        info!(url = %url, chars = text.chars().count(), "submitting document for analysis");

        let body = AnalyzeRequest {
            text: text.to_string(),
        };
        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout))?;

        let report: AnalysisReport = self.read_json(resp).await?;
        info!(
            risk = %report.risk_assessment,
            entities = report.extracted_clauses.len(),
            "analysis received"
        );
        Ok(report)
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout))?;
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client = AnalysisClient::new("http://127.0.0.1:8000/");
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn timeout_message_recommends_smaller_document() {
        let msg = ClientError::Timeout(DEFAULT_TIMEOUT).user_message();
        assert!(msg.contains("10 minutes"), "{msg}");
        assert!(msg.contains("Try a smaller document"));
    }

    #[test]
    fn server_message_shows_status() {
        let err = ClientError::Server {
            status: 500,
            body: r#"{"detail":"boom"}"#.into(),
        };
        assert_eq!(
            err.user_message(),
            "Analysis failed. The server responded with status code: 500"
        );
    }

    #[test]
    fn durations_described() {
        assert_eq!(describe_duration(Duration::from_secs(60)), "1 minute");
        assert_eq!(describe_duration(Duration::from_secs(600)), "10 minutes");
        assert_eq!(describe_duration(Duration::from_secs(90)), "90 seconds");
    }

    #[tokio::test]
    async fn refused_connection_is_connect_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = AnalysisClient::new(format!("http://{addr}"));
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ClientError::Connect(_)), "{err:?}");
        assert!(err.user_message().starts_with("Failed to connect"));
    }

    #[tokio::test]
    async fn unresponsive_server_is_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering.
        let hold = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client =
            AnalysisClient::new(format!("http://{addr}")).with_timeout(Duration::from_millis(200));
        let err = client.analyze("Seller shall pay.").await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)), "{err:?}");
        hold.abort();
    }
}
