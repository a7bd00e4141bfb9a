//! Analysis server: a stateless `POST /analyze` endpoint over shared, preloaded models.

pub mod api;
pub mod config;
pub mod error;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

/// All routes over `state`, with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::health))
        .route("/analyze", post(api::analyze))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler failed; server will run until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
