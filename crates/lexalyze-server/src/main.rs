use anyhow::Context;
use clap::Parser;
use lexalyze_server::{AppState, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!("lexalyze-server v{}", env!("CARGO_PKG_VERSION"));

    let cfg = ServerConfig::parse();
    cfg.validate()?;
    cfg.log_summary();

    let state = AppState::load(&cfg).context("failed to initialize analyzer")?;
    lexalyze_server::serve(cfg.bind, state).await
}
