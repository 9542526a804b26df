mod file_config;

pub use file_config::{CoherenceWeightsConfig, FileConfig, LooksConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that participate in config resolution. Mirrors the clap
/// struct in `main.rs`; TOML values override these where present.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub catalog_db: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_db: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub looks: LookGenSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file
    /// config. TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let catalog_db = file
            .catalog_db
            .map(PathBuf::from)
            .or_else(|| cli.catalog_db.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("catalog_db must be specified on the CLI or in the config file")
            })?;

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let looks = LookGenSettings::resolve(file.looks.unwrap_or_default())?;

        Ok(Self {
            catalog_db,
            port,
            logging_level,
            looks,
        })
    }
}

/// Knobs of the look-generation core. Defaults match the service contract;
/// a TOML `[looks]` section can override any of them.
#[derive(Debug, Clone)]
pub struct LookGenSettings {
    /// Lifetime of a cached response, in seconds.
    pub cache_ttl_secs: u64,
    /// Soft upper bound on cached responses before LRU eviction.
    pub cache_capacity: usize,
    /// Minimum edge score requested from the edge store.
    pub min_edge_score: f64,
    /// Upper bound on looks per request.
    pub max_looks: usize,
    /// Require anchor/candidate aesthetics overlap during validity filtering.
    pub strict_aesthetics: bool,
    /// Maximum anchor-vs-item formality gap.
    pub formality_spread: u8,
    /// Maximum formality gap between any two items within one look.
    pub intra_look_formality_spread: u8,
    /// Whether an empty occasion/season set matches everything (true) or
    /// nothing (false).
    pub empty_tags_match_all: bool,
    /// Deadline for each individual store call, in milliseconds.
    pub store_timeout_ms: u64,
    /// Soft deadline for a whole generate request, in milliseconds.
    pub request_timeout_ms: u64,
    pub coherence_weights: CoherenceWeights,
}

/// Weights of the reported coherence score. Informational output only;
/// they do not steer assembly beyond the dimension bonus.
#[derive(Debug, Clone, Copy)]
pub struct CoherenceWeights {
    pub mean_pairwise: f64,
    pub dimension_agreement: f64,
    pub slot_coverage: f64,
}

impl Default for CoherenceWeights {
    fn default() -> Self {
        Self {
            mean_pairwise: 0.5,
            dimension_agreement: 0.3,
            slot_coverage: 0.2,
        }
    }
}

impl CoherenceWeights {
    fn resolve(file: CoherenceWeightsConfig) -> Result<Self> {
        let defaults = Self::default();
        let weights = Self {
            mean_pairwise: file.mean_pairwise.unwrap_or(defaults.mean_pairwise),
            dimension_agreement: file
                .dimension_agreement
                .unwrap_or(defaults.dimension_agreement),
            slot_coverage: file.slot_coverage.unwrap_or(defaults.slot_coverage),
        };

        // 0.5 + 0.3 + 0.2 lands slightly above 1.0 in floating point.
        let sum = weights.mean_pairwise + weights.dimension_agreement + weights.slot_coverage;
        if weights.mean_pairwise < 0.0
            || weights.dimension_agreement < 0.0
            || weights.slot_coverage < 0.0
            || sum > 1.0 + 1e-9
        {
            bail!("coherence weights must be non-negative and sum to at most 1");
        }

        Ok(weights)
    }
}

impl Default for LookGenSettings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            cache_capacity: 2048,
            min_edge_score: 0.5,
            max_looks: 10,
            strict_aesthetics: false,
            formality_spread: 2,
            intra_look_formality_spread: 2,
            empty_tags_match_all: true,
            store_timeout_ms: 300,
            request_timeout_ms: 1000,
            coherence_weights: CoherenceWeights::default(),
        }
    }
}

impl LookGenSettings {
    fn resolve(file: LooksConfig) -> Result<Self> {
        let defaults = Self::default();
        let settings = Self {
            cache_ttl_secs: file.cache_ttl_secs.unwrap_or(defaults.cache_ttl_secs),
            cache_capacity: file.cache_capacity.unwrap_or(defaults.cache_capacity),
            min_edge_score: file.min_edge_score.unwrap_or(defaults.min_edge_score),
            max_looks: file.max_looks.unwrap_or(defaults.max_looks),
            strict_aesthetics: file.strict_aesthetics.unwrap_or(defaults.strict_aesthetics),
            formality_spread: file.formality_spread.unwrap_or(defaults.formality_spread),
            intra_look_formality_spread: file
                .intra_look_formality_spread
                .unwrap_or(defaults.intra_look_formality_spread),
            empty_tags_match_all: file
                .empty_tags_match_all
                .unwrap_or(defaults.empty_tags_match_all),
            store_timeout_ms: file.store_timeout_ms.unwrap_or(defaults.store_timeout_ms),
            request_timeout_ms: file
                .request_timeout_ms
                .unwrap_or(defaults.request_timeout_ms),
            coherence_weights: CoherenceWeights::resolve(
                file.coherence_weights.unwrap_or_default(),
            )?,
        };

        if !(0.0..=1.0).contains(&settings.min_edge_score) {
            bail!("min_edge_score must be within [0, 1]");
        }
        if settings.max_looks == 0 {
            bail!("max_looks must be at least 1");
        }

        Ok(settings)
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("PATH"),
            Some(RequestsLoggingLevel::Path)
        ));
        assert!(parse_logging_level("loud").is_none());
    }

    #[test]
    fn test_resolve_cli_only() {
        let cli = CliConfig {
            catalog_db: Some(PathBuf::from("/data/catalog.db")),
            port: 3001,
            logging_level: RequestsLoggingLevel::Headers,
        };

        let config = AppConfig::resolve(&cli, None).unwrap();
        assert_eq!(config.catalog_db, PathBuf::from("/data/catalog.db"));
        assert_eq!(config.port, 3001);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
        assert_eq!(config.looks.cache_ttl_secs, 300);
        assert_eq!(config.looks.max_looks, 10);
        assert!(config.looks.empty_tags_match_all);
        assert_eq!(config.looks.coherence_weights.mean_pairwise, 0.5);
        assert_eq!(config.looks.coherence_weights.dimension_agreement, 0.3);
        assert_eq!(config.looks.coherence_weights.slot_coverage, 0.2);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let cli = CliConfig {
            catalog_db: Some(PathBuf::from("/cli/catalog.db")),
            port: 3001,
            logging_level: RequestsLoggingLevel::Path,
        };

        let file = FileConfig {
            catalog_db: Some("/toml/catalog.db".to_string()),
            port: Some(4000),
            logging_level: Some("none".to_string()),
            looks: Some(LooksConfig {
                max_looks: Some(5),
                strict_aesthetics: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file)).unwrap();
        assert_eq!(config.catalog_db, PathBuf::from("/toml/catalog.db"));
        assert_eq!(config.port, 4000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::None);
        assert_eq!(config.looks.max_looks, 5);
        assert!(config.looks.strict_aesthetics);
        // CLI value used when TOML doesn't specify.
        assert_eq!(config.looks.formality_spread, 2);
    }

    #[test]
    fn test_resolve_coherence_weights_from_toml() {
        let cli = CliConfig {
            catalog_db: Some(PathBuf::from("/data/catalog.db")),
            ..Default::default()
        };
        let file = FileConfig {
            looks: Some(LooksConfig {
                coherence_weights: Some(CoherenceWeightsConfig {
                    mean_pairwise: Some(0.6),
                    slot_coverage: Some(0.1),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file)).unwrap();
        assert_eq!(config.looks.coherence_weights.mean_pairwise, 0.6);
        // Unspecified weight keeps its default.
        assert_eq!(config.looks.coherence_weights.dimension_agreement, 0.3);
        assert_eq!(config.looks.coherence_weights.slot_coverage, 0.1);
    }

    #[test]
    fn test_resolve_rejects_overweight_coherence() {
        let cli = CliConfig {
            catalog_db: Some(PathBuf::from("/data/catalog.db")),
            ..Default::default()
        };
        let file = FileConfig {
            looks: Some(LooksConfig {
                coherence_weights: Some(CoherenceWeightsConfig {
                    mean_pairwise: Some(0.9),
                    dimension_agreement: Some(0.9),
                    slot_coverage: Some(0.9),
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, Some(file)).is_err());

        let file = FileConfig {
            looks: Some(LooksConfig {
                coherence_weights: Some(CoherenceWeightsConfig {
                    mean_pairwise: Some(-0.1),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, Some(file)).is_err());
    }

    #[test]
    fn test_resolve_missing_catalog_db_error() {
        let cli = CliConfig::default();
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("catalog_db must be specified"));
    }

    #[test]
    fn test_resolve_rejects_bad_min_edge_score() {
        let cli = CliConfig {
            catalog_db: Some(PathBuf::from("/data/catalog.db")),
            ..Default::default()
        };
        let file = FileConfig {
            looks: Some(LooksConfig {
                min_edge_score: Some(1.5),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, Some(file)).is_err());
    }

    #[test]
    fn test_resolve_rejects_zero_max_looks() {
        let cli = CliConfig {
            catalog_db: Some(PathBuf::from("/data/catalog.db")),
            ..Default::default()
        };
        let file = FileConfig {
            looks: Some(LooksConfig {
                max_looks: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, Some(file)).is_err());
    }
}
