//! Analysis settings: built-in defaults, the JSON config file, then
//! `AGENTLENS_*` environment variables. Command-line flags are applied on
//! top by the caller.

use std::path::{Path, PathBuf};

use agentlens_core::AgentRegistry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attribution::DEFAULT_TOP_N;
use crate::intervention::{InterventionConfig, DEFAULT_WINDOW_HOURS};

pub const ENV_WINDOW_HOURS: &str = "AGENTLENS_WINDOW_HOURS";
pub const ENV_COUNT_INVERSE: &str = "AGENTLENS_COUNT_INVERSE";

/// Keys understood in the config file.
pub const KEYS: &[&str] = &[
    "intervention_window_hours",
    "count_inverse_interventions",
    "extra_agent_names",
    "extra_agent_patterns",
    "top_n",
];

/// Config keys that an environment variable can override.
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("intervention_window_hours", ENV_WINDOW_HOURS),
    ("count_inverse_interventions", ENV_COUNT_INVERSE),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("intervention window must be a finite, non-negative number of hours (got {0})")]
    InvalidWindow(f64),
    #[error("invalid agent pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub intervention_window_hours: f64,
    pub count_inverse_interventions: bool,
    pub extra_agent_names: Vec<String>,
    pub extra_agent_patterns: Vec<String>,
    pub top_n: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            intervention_window_hours: DEFAULT_WINDOW_HOURS,
            count_inverse_interventions: false,
            extra_agent_names: Vec::new(),
            extra_agent_patterns: Vec::new(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl AnalysisConfig {
    /// Read a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Defaults, then `path`, then the process environment.
    pub fn resolve(path: &Path) -> Result<Self, ConfigError> {
        Self::load(path)?.with_env(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides read through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_WINDOW_HOURS) {
            self.intervention_window_hours =
                raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    key: ENV_WINDOW_HOURS,
                    value: raw.clone(),
                })?;
        }
        if let Some(raw) = lookup(ENV_COUNT_INVERSE) {
            self.count_inverse_interventions = match raw.trim() {
                "1" | "true" => true,
                "0" | "false" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: ENV_COUNT_INVERSE,
                        value: raw,
                    })
                }
            };
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = self.intervention_window_hours;
        if !w.is_finite() || w < 0.0 {
            return Err(ConfigError::InvalidWindow(w));
        }
        Ok(())
    }

    /// Built-in registry extended with the configured names and patterns.
    pub fn registry(&self) -> Result<AgentRegistry, ConfigError> {
        Ok(AgentRegistry::with_extras(
            &self.extra_agent_names,
            &self.extra_agent_patterns,
        )?)
    }

    pub fn intervention(&self) -> InterventionConfig {
        InterventionConfig {
            window_hours: self.intervention_window_hours,
            count_inverse: self.count_inverse_interventions,
        }
    }
}
