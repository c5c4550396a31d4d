use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::engine_info;
use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: f64 = 10.0;
const DEFAULT_RATE_LIMIT_DELAY_SECS: f64 = 2.0;
const DEFAULT_MAX_CONCURRENT_SOURCES: usize = 4;
const DEFAULT_SOURCE_DEADLINE_SECS: f64 = 120.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level aggregation settings.
///
/// The order of `sources` is the deterministic source ordering used when no
/// explicit list is passed to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    #[serde(default)]
    pub filters: Filters,
    #[serde(default = "default_max_concurrent_sources")]
    pub max_concurrent_sources: usize,
    /// Upper bound on one source's whole fetch, across all of its requests.
    #[serde(default = "default_source_deadline_secs")]
    pub source_deadline_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    #[serde(default)]
    pub settings: SourceSettings,
}

/// Per-board settings block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Endpoint override; each adapter has its own default.
    #[serde(default)]
    pub url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: f64,
    /// Minimum delay before each request, in seconds.
    #[serde(default = "default_rate_limit_delay")]
    pub rate_limit_delay: f64,
    /// Overrides the client-side relevance keywords of boards that filter locally.
    #[serde(default)]
    pub relevance_keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    /// Keywords sent to boards that support server-side querying.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
}

fn default_timeout() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_rate_limit_delay() -> f64 {
    DEFAULT_RATE_LIMIT_DELAY_SECS
}

fn default_max_concurrent_sources() -> usize {
    DEFAULT_MAX_CONCURRENT_SOURCES
}

fn default_source_deadline_secs() -> f64 {
    DEFAULT_SOURCE_DEADLINE_SECS
}

fn default_keywords() -> Vec<String> {
    vec!["data".to_string()]
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            filters: Filters::default(),
            max_concurrent_sources: DEFAULT_MAX_CONCURRENT_SOURCES,
            source_deadline_secs: DEFAULT_SOURCE_DEADLINE_SECS,
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY_SECS,
            relevance_keywords: None,
        }
    }
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
        }
    }
}

impl SourceSettings {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        if self.timeout <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "timeout must be positive, got {}",
                self.timeout
            )));
        }
        seconds("timeout", self.timeout)
    }

    pub fn min_delay(&self) -> Result<Duration, ConfigError> {
        seconds("rate_limit_delay", self.rate_limit_delay)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.request_timeout()?;
        self.min_delay()?;
        Ok(())
    }
}

impl AggregatorConfig {
    /// Parses RON text. `Option` fields may be written without `Some(..)`.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&text)?;
        engine_info!(
            "Loaded config from {:?} with {} sources ({} enabled)",
            path,
            config.sources.len(),
            config.enabled_sources().len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_sources == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_sources must be at least 1".into(),
            ));
        }
        self.source_deadline()?;

        let mut names = HashSet::new();
        for entry in &self.sources {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::Invalid("source name must not be empty".into()));
            }
            if !names.insert(entry.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "source '{}' is configured more than once",
                    entry.name
                )));
            }
            entry.settings.validate().map_err(|err| {
                ConfigError::Invalid(format!("source '{}': {}", entry.name, err))
            })?;
        }
        Ok(())
    }

    pub fn source_deadline(&self) -> Result<Duration, ConfigError> {
        if self.source_deadline_secs <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "source_deadline_secs must be positive, got {}",
                self.source_deadline_secs
            )));
        }
        seconds("source_deadline_secs", self.source_deadline_secs)
    }

    pub fn source(&self, name: &str) -> Option<&SourceSettings> {
        self.sources
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.settings)
    }

    /// Every configured source name, in configuration order.
    pub fn available_sources(&self) -> Vec<String> {
        self.sources.iter().map(|entry| entry.name.clone()).collect()
    }

    /// Enabled source names, in configuration order.
    pub fn enabled_sources(&self) -> Vec<String> {
        self.sources
            .iter()
            .filter(|entry| entry.settings.enabled)
            .map(|entry| entry.name.clone())
            .collect()
    }

    pub fn with_source(mut self, name: impl Into<String>, settings: SourceSettings) -> Self {
        self.sources.push(SourceEntry {
            name: name.into(),
            settings,
        });
        self
    }
}

fn seconds(field: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        ConfigError::Invalid(format!(
            "{field} must be a finite, non-negative number of seconds, got {value}"
        ))
    })
}
