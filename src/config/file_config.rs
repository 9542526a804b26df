use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub catalog_db: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,

    // Look generation knobs
    pub looks: Option<LooksConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LooksConfig {
    pub cache_ttl_secs: Option<u64>,
    pub cache_capacity: Option<usize>,
    pub min_edge_score: Option<f64>,
    pub max_looks: Option<usize>,
    pub strict_aesthetics: Option<bool>,
    pub formality_spread: Option<u8>,
    pub intra_look_formality_spread: Option<u8>,
    pub empty_tags_match_all: Option<bool>,
    pub store_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub coherence_weights: Option<CoherenceWeightsConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CoherenceWeightsConfig {
    pub mean_pairwise: Option<f64>,
    pub dimension_agreement: Option<f64>,
    pub slot_coverage: Option<f64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
