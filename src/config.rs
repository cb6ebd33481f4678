//! Engine configuration, read from TOML.
//!
//! ```toml
//! [lexicon]
//! default_weight = 0.05
//!
//! [chart]
//! start_symbol = "S"
//! parallel = true
//! parallel_min_words = 6
//!
//! [query]
//! base_discount = 0.9
//! fallback_discount = 0.1
//! fallback_threshold = 0.1
//! ```
//!
//! Every section and field is optional.

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grammar::DEFAULT_WEIGHT;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file: {path}")]
    #[diagnostic(code(phora::config::io), help("Ensure the file exists and is readable."))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {message}")]
    #[diagnostic(
        code(phora::config::parse),
        help("Check the TOML syntax. Known sections are [lexicon], [chart] and [query].")
    )]
    Parse { message: String },

    #[error("invalid config: {message}")]
    #[diagnostic(
        code(phora::config::invalid),
        help("Weights and discounts must lie in [0, 1] and the start symbol must be non-empty.")
    )]
    Invalid { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Lexicon construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// Weight of entries that carry no bracketed weight table.
    pub default_weight: f64,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            default_weight: DEFAULT_WEIGHT,
        }
    }
}

/// Chart parser settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Atomic category a full parse must have.
    pub start_symbol: String,
    /// Fill cells of one span length on the rayon pool.
    pub parallel: bool,
    /// Sentences shorter than this are filled sequentially.
    pub parallel_min_words: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            start_symbol: "S".to_string(),
            parallel: true,
            parallel_min_words: 6,
        }
    }
}

/// Discounts used by `query_is`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Multiplier per step up a declared base.
    pub base_discount: f64,
    /// Multiplier for a hop through an undeclared (fallback) type.
    pub fallback_discount: f64,
    /// Below this score the fallback search kicks in.
    pub fallback_threshold: f64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            base_discount: 0.9,
            fallback_discount: 0.1,
            fallback_threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoraConfig {
    pub lexicon: LexiconConfig,
    pub chart: ChartConfig,
    pub query: QueryConfig,
}

impl PhoraConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml_str: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let unit = [
            ("lexicon.default_weight", self.lexicon.default_weight),
            ("query.base_discount", self.query.base_discount),
            ("query.fallback_discount", self.query.fallback_discount),
            ("query.fallback_threshold", self.query.fallback_threshold),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    message: format!("{name} = {value} is outside [0, 1]"),
                });
            }
        }
        if self.chart.start_symbol.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "chart.start_symbol is empty".to_string(),
            });
        }
        Ok(())
    }
}
