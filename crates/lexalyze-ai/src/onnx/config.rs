//! The subset of a Hugging Face `config.json` the ONNX backends read.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    id2label: HashMap<String, String>,
    decoder_start_token_id: Option<u32>,
    eos_token_id: Option<u32>,
    pad_token_id: Option<u32>,
    #[serde(default)]
    task_specific_params: HashMap<String, TaskParams>,
}

#[derive(Debug, Deserialize)]
struct TaskParams {
    prefix: Option<String>,
}

/// Token-classification label table, indexed by class id.
#[derive(Debug, Clone)]
pub struct LabelMap {
    labels: Vec<String>,
}

impl LabelMap {
    /// Label for class `id`.
    pub fn get(&self, id: usize) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a loaded map.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Token ids and prompt prefix for encoder-decoder generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub decoder_start_token_id: u32,
    pub eos_token_id: u32,
    /// Prepended to each input (T5 expects `"summarize: "`).
    pub prefix: String,
}

fn read_raw(path: &Path) -> anyhow::Result<RawConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}

impl LabelMap {
    /// Read `id2label` from a model `config.json`.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        Self::from_raw(read_raw(path)?)
    }

    fn from_raw(raw: RawConfig) -> anyhow::Result<Self> {
        anyhow::ensure!(!raw.id2label.is_empty(), "config has no id2label table");
        let mut pairs = raw
            .id2label
            .into_iter()
            .map(|(id, label)| {
                id.parse::<usize>()
                    .map(|id| (id, label))
                    .with_context(|| format!("non-numeric label id {id:?}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        pairs.sort_by_key(|(id, _)| *id);

        for (expected, (id, _)) in pairs.iter().enumerate() {
            anyhow::ensure!(
                *id == expected,
                "label ids are not contiguous: missing {expected}"
            );
        }
        Ok(Self {
            labels: pairs.into_iter().map(|(_, label)| label).collect(),
        })
    }
}

impl GenerationConfig {
    /// Read decoder token ids and the task prefix from a model `config.json`.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        Self::from_raw(read_raw(path)?)
    }

    fn from_raw(raw: RawConfig) -> anyhow::Result<Self> {
        let decoder_start_token_id = raw
            .decoder_start_token_id
            .or(raw.pad_token_id)
            .context("config has neither decoder_start_token_id nor pad_token_id")?;
        let eos_token_id = raw.eos_token_id.context("config has no eos_token_id")?;
        let prefix = raw
            .task_specific_params
            .get("summarization")
            .and_then(|p| p.prefix.clone())
            .unwrap_or_default();
        Ok(Self {
            decoder_start_token_id,
            eos_token_id,
            prefix,
        })
    }
}
