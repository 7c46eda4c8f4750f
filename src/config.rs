//! Pipeline configuration.
//!
//! Loads and validates `snapfit.toml`. Every option has a stock default;
//! user files only need to override what they care about, and unknown keys
//! are rejected to catch typos early.
//!
//! ## Configuration options
//!
//! ```toml
//! # Inputs at or below this byte length skip compression entirely.
//! no_op_threshold = 5242880
//!
//! [formats]
//! allow = ["jpeg", "jpg", "png", "webp"]
//!
//! # Ordered attempt sequence, least to most aggressive. Ceilings must be
//! # monotonically non-increasing; quality is on a 0.0-1.0 scale.
//! [[levels]]
//! label = "standard"
//! ceiling_bytes = 4500000
//! max_long_edge = 1920
//! quality = 0.8
//!
//! [[levels]]
//! label = "aggressive"
//! ceiling_bytes = 2000000
//! max_long_edge = 1280
//! quality = 0.6
//!
//! [[levels]]
//! label = "maximum"
//! ceiling_bytes = 1000000
//! max_long_edge = 1000
//! quality = 0.45
//! ```

use crate::levels::{self, CompressionLevel, Quality};
use crate::pipeline::PipelineConfig;
use crate::validate::{AllowList, DEFAULT_ALLOWED};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// On-disk pipeline configuration.
///
/// Deserializes sparsely — absent sections fall back to the stock values —
/// then converts into the runtime [`PipelineConfig`] after validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Byte length at or below which compression is skipped.
    pub no_op_threshold: u64,
    pub formats: FormatsConfig,
    /// Ordered attempt sequence.
    pub levels: Vec<LevelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FormatsConfig {
    /// Accepted media subtypes.
    pub allow: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LevelConfig {
    pub label: String,
    pub ceiling_bytes: u64,
    pub max_long_edge: u32,
    /// Encoding quality, 0.0–1.0.
    pub quality: f32,
}

impl Default for FormatsConfig {
    fn default() -> Self {
        Self {
            allow: DEFAULT_ALLOWED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            no_op_threshold: levels::DEFAULT_NO_OP_THRESHOLD,
            formats: FormatsConfig::default(),
            levels: levels::stock_levels().iter().map(LevelConfig::from).collect(),
        }
    }
}

impl From<&CompressionLevel> for LevelConfig {
    fn from(level: &CompressionLevel) -> Self {
        Self {
            label: level.label.clone(),
            ceiling_bytes: level.ceiling_bytes,
            max_long_edge: level.max_long_edge,
            quality: level.quality.value(),
        }
    }
}

impl FileConfig {
    /// Load from a TOML file and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: FileConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::Validation("levels must not be empty".into()));
        }
        if self.formats.allow.is_empty() {
            return Err(ConfigError::Validation(
                "formats.allow must not be empty".into(),
            ));
        }
        for level in &self.levels {
            if !(0.0..=1.0).contains(&level.quality) {
                return Err(ConfigError::Validation(format!(
                    "level \"{}\": quality must be 0.0-1.0",
                    level.label
                )));
            }
            if level.max_long_edge == 0 {
                return Err(ConfigError::Validation(format!(
                    "level \"{}\": max_long_edge must be non-zero",
                    level.label
                )));
            }
        }
        let runtime: Vec<CompressionLevel> =
            self.levels.iter().map(compression_level).collect();
        if !levels::ceilings_monotonic(&runtime) {
            return Err(ConfigError::Validation(
                "level ceilings must be monotonically non-increasing".into(),
            ));
        }
        Ok(())
    }

    /// Convert into the runtime pipeline configuration.
    pub fn into_pipeline_config(self) -> PipelineConfig {
        PipelineConfig {
            allow: AllowList::new(self.formats.allow),
            levels: self.levels.iter().map(compression_level).collect(),
            no_op_threshold: self.no_op_threshold,
        }
    }
}

fn compression_level(config: &LevelConfig) -> CompressionLevel {
    CompressionLevel {
        ceiling_bytes: config.ceiling_bytes,
        max_long_edge: config.max_long_edge,
        quality: Quality::new(config.quality),
        label: config.label.clone(),
    }
}

/// The stock config as documented TOML, printed by `snapfit gen-config`.
pub fn stock_config_toml() -> String {
    format!(
        "\
# snapfit configuration. All options are optional - defaults shown.

# Inputs at or below this byte length skip compression entirely.
no_op_threshold = {threshold}

[formats]
# Accepted media subtypes.
allow = [\"jpeg\", \"jpg\", \"png\", \"webp\"]

# Ordered attempt sequence, least to most aggressive. Ceilings must be
# monotonically non-increasing; quality is on a 0.0-1.0 scale.
{levels}",
        threshold = levels::DEFAULT_NO_OP_THRESHOLD,
        levels = levels::stock_levels()
            .iter()
            .map(|l| format!(
                "[[levels]]\nlabel = \"{}\"\nceiling_bytes = {}\nmax_long_edge = {}\nquality = {}\n",
                l.label,
                l.ceiling_bytes,
                l.max_long_edge,
                l.quality.value()
            ))
            .collect::<Vec<_>>()
            .join("\n")
    )
}
