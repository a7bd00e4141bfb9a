//! Server configuration from command-line flags, environment, and `.env`.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use lexalyze_ai::{ExtractorConfig, OffsetScope, SummarizerConfig};
use tracing::info;

/// Coordinate space for entity offsets in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Offsets {
    /// Offsets into the submitted document.
    Document,
    /// Offsets into the whitespace-normalized chunk the entity was found in.
    Chunk,
}

impl From<Offsets> for OffsetScope {
    fn from(o: Offsets) -> Self {
        match o {
            Offsets::Document => OffsetScope::Document,
            Offsets::Chunk => OffsetScope::Chunk,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "lexalyze-server", version, about = "Legal document analysis API")]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "LEXALYZE_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Directory with the token-classification model (model.onnx, tokenizer.json, config.json).
    #[arg(long, env = "LEXALYZE_NER_MODEL", default_value = "models/bert-base-NER")]
    pub ner_model: PathBuf,

    /// Directory with the summarization model (encoder_model.onnx, decoder_model.onnx, ...).
    #[arg(long, env = "LEXALYZE_SUMMARY_MODEL", default_value = "models/t5-base")]
    pub summary_model: PathBuf,

    /// Whitespace tokens per entity-extraction window.
    #[arg(long, env = "LEXALYZE_NER_CHUNK_TOKENS", default_value_t = 512)]
    pub ner_chunk_tokens: usize,

    /// Tokens shared by consecutive entity-extraction windows.
    #[arg(long, env = "LEXALYZE_NER_OVERLAP", default_value_t = 50)]
    pub ner_overlap: usize,

    /// Characters per summarization window.
    #[arg(long, env = "LEXALYZE_SUMMARY_CHUNK_CHARS", default_value_t = 1024)]
    pub summary_chunk_chars: usize,

    #[arg(long, env = "LEXALYZE_OFFSETS", value_enum, default_value_t = Offsets::Document)]
    pub offsets: Offsets,
}

impl ServerConfig {
    /// Reject chunking settings that cannot produce windows.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.ner_chunk_tokens > 0,
            "--ner-chunk-tokens must be positive"
        );
        anyhow::ensure!(
            self.ner_overlap < self.ner_chunk_tokens,
            "--ner-overlap ({}) must be smaller than --ner-chunk-tokens ({})",
            self.ner_overlap,
            self.ner_chunk_tokens
        );
        anyhow::ensure!(
            self.summary_chunk_chars > 0,
            "--summary-chunk-chars must be positive"
        );
        Ok(())
    }

    /// Extraction windowing from the flags.
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            chunk_size: self.ner_chunk_tokens,
            overlap: self.ner_overlap,
            offsets: self.offsets.into(),
        }
    }

    /// Summarization windowing from the flags.
    pub fn summarizer_config(&self) -> SummarizerConfig {
        SummarizerConfig {
            max_chunk_chars: self.summary_chunk_chars,
        }
    }

    /// Log the effective settings at startup.
    pub fn log_summary(&self) {
        info!(
            bind = %self.bind,
            ner_model = %self.ner_model.display(),
            summary_model = %self.summary_model.display(),
            ner_chunk_tokens = self.ner_chunk_tokens,
            ner_overlap = self.ner_overlap,
            summary_chunk_chars = self.summary_chunk_chars,
            offsets = ?self.offsets,
            "server configuration"
        );
    }
}
