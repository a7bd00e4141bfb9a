mod display;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lexalyze_client::{AnalysisClient, ClientError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lexalyze", version, about = "Analyze legal documents against a Lexalyze server")]
struct Cli {
    /// Base URL of the analysis server.
    #[arg(long, global = true, env = "LEXALYZE_SERVER", default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Seconds to wait for a response before giving up.
    #[arg(long, global = true, env = "LEXALYZE_TIMEOUT_SECS", default_value_t = 600)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a UTF-8 text document and show its risk, summary, and entities.
    Analyze {
        /// Path to a `.txt` document.
        file: PathBuf,

        /// Print the raw JSON report instead of the formatted view.
        #[arg(long)]
        json: bool,

        /// Do not echo the document before analysis.
        #[arg(long)]
        quiet: bool,
    },
    /// Check that the server is up.
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so `--json` output stays parseable.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client =
        AnalysisClient::new(cli.server).with_timeout(Duration::from_secs(cli.timeout_secs));

    match cli.command {
        Command::Analyze { file, json, quiet } => {
            cmd_analyze(&client, &file, json, quiet).await
        }
        Command::Health => cmd_health(&client).await,
    }
}

async fn cmd_analyze(
    client: &AnalysisClient,
    path: &Path,
    json: bool,
    quiet: bool,
) -> anyhow::Result<ExitCode> {
    let text = match read_document(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading or decoding the file: {e:#}");
            return Ok(ExitCode::FAILURE);
        }
    };
    let color = !json && std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();

    if !json && !quiet {
        println!("=== {} ===", path.display());
        println!("{}", display::preview(&text));
        println!();
        eprintln!("Analyzing document... this can take several minutes for large files.");
    }

    match client.analyze(&text).await {
        Ok(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Analysis complete.\n");
                print!("{}", display::render_report(&report, color));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            report_failure(&e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn cmd_health(client: &AnalysisClient) -> anyhow::Result<ExitCode> {
    match client.health().await {
        Ok(health) => {
            println!(
                "{} ({}): {}",
                client.base_url(),
                health.status,
                health.message
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            report_failure(&e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn read_document(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8 text", path.display()))
}

fn report_failure(e: &ClientError) {
    eprintln!("{}", e.user_message());
    if let ClientError::Server { body, .. } = e {
        eprintln!("{body}");
    }
}
