//! Configuration management for Thoughtline
//!
//! Configuration is read from a TOML file, then environment overrides of the
//! form `THOUGHTLINE_SECTION__KEY=value` are applied, then the result is
//! validated as a whole.

use crate::error::{Error, Result};
use crate::search::signals::{RecencyTiers, DEFAULT_CONFIDENCE};
use crate::search::{ScoringWeights, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

pub const SCHEMA_VERSION: &str = "1.0.0";
const ENV_PREFIX: &str = "THOUGHTLINE_";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
    pub timeline: TimelineConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileOverrides>,
}

/// Metadata about the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Where thoughts are read from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub thoughts_file: PathBuf,
}

/// Relevance weights as written in the file; validated into `ScoringWeights`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightsConfig {
    pub semantic: f64,
    pub keyword: f64,
    pub recency: f64,
    pub confidence: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            semantic: ScoringWeights::SEMANTIC,
            keyword: ScoringWeights::KEYWORD,
            recency: ScoringWeights::RECENCY,
            confidence: ScoringWeights::CONFIDENCE,
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub default_page_size: u32,
    /// Confidence sub-score for thoughts without entities
    pub default_confidence: f64,
    pub max_suggestions: usize,
    pub weights: WeightsConfig,
    pub recency: RecencyTiers,
}

/// Timeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub default_group_type: String,
    pub default_related_limit: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Profile-specific configuration overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thoughts_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<WeightsConfig>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| Error::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Load configuration with a specific profile applied
    pub fn load_with_profile(path: &Path, profile: &str) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_profile(profile)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Apply a profile's overrides to the configuration
    pub fn apply_profile(&mut self, profile: &str) -> Result<()> {
        let overrides = self
            .profiles
            .get(profile)
            .cloned()
            .ok_or_else(|| Error::Config(format!("Unknown profile: {}", profile)))?;

        if let Some(weights) = overrides.weights {
            self.search.weights = weights;
        }
        if let Some(page_size) = overrides.default_page_size {
            self.search.default_page_size = page_size;
        }
        if let Some(thoughts_file) = overrides.thoughts_file {
            self.storage.thoughts_file = thoughts_file;
        }

        tracing::debug!("Applied profile {}", profile);
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: THOUGHTLINE_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    /// Apply overrides from `(name, value)` pairs; names without the
    /// `THOUGHTLINE_` prefix are ignored
    pub fn apply_overrides<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "STORAGE__THOUGHTS_FILE" => {
                self.storage.thoughts_file = PathBuf::from(value);
            }
            "SEARCH__SEMANTIC_WEIGHT" => {
                self.search.weights.semantic = parse_value(path, value)?;
            }
            "SEARCH__KEYWORD_WEIGHT" => {
                self.search.weights.keyword = parse_value(path, value)?;
            }
            "SEARCH__RECENCY_WEIGHT" => {
                self.search.weights.recency = parse_value(path, value)?;
            }
            "SEARCH__CONFIDENCE_WEIGHT" => {
                self.search.weights.confidence = parse_value(path, value)?;
            }
            "SEARCH__DEFAULT_PAGE_SIZE" => {
                self.search.default_page_size = parse_value(path, value)?;
            }
            "SEARCH__DEFAULT_CONFIDENCE" => {
                self.search.default_confidence = parse_value(path, value)?;
            }
            "TIMELINE__DEFAULT_RELATED_LIMIT" => {
                self.timeline.default_related_limit = parse_value(path, value)?;
            }
            "LOGGING__LEVEL" => {
                self.logging.level = value.to_string();
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Validated scoring weights
    pub fn scoring_weights(&self) -> Result<ScoringWeights> {
        let w = self.search.weights;
        Ok(ScoringWeights::new(
            w.semantic,
            w.keyword,
            w.recency,
            w.confidence,
        )?)
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("thoughtline").join("config.toml"))
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| Error::Config("Cannot determine home directory".to_string()))?;

        Ok(home_dir.join(".thoughtline"))
    }
}

fn parse_value<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::InvalidConfigValue {
        path: path.to_string(),
        message: format!(
            "Cannot parse '{}' as {}",
            value,
            std::any::type_name::<T>()
        ),
    })
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = PathBuf::from("~/.thoughtline");

        Self {
            meta: MetaConfig {
                schema_version: SCHEMA_VERSION.to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            storage: StorageConfig {
                thoughts_file: data_dir.join("thoughts.json"),
            },
            search: SearchConfig {
                default_page_size: DEFAULT_PAGE_SIZE,
                default_confidence: DEFAULT_CONFIDENCE,
                max_suggestions: 5,
                weights: WeightsConfig::default(),
                recency: RecencyTiers::default(),
            },
            timeline: TimelineConfig {
                default_group_type: "temporal".to_string(),
                default_related_limit: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            profiles: HashMap::new(),
        }
    }
}
