//! Severity configuration.
//!
//! Four issue kinds have a configurable severity; every other kind is always
//! an error. Configuration is TOML:
//!
//! ```toml
//! unmapped_required_target = "warning"
//! cardinality_mismatch = "error"
//! ```
//!
//! Keys left out fall back to the [`ValidationConfig::deploy`] preset.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::issue::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub unmapped_required_target: Severity,
    pub cardinality_mismatch: Severity,
    pub type_mismatch: Severity,
    pub divergent_array_shape: Severity,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::deploy()
    }
}

impl ValidationConfig {
    /// Gate for deployment: unmapped required targets and cardinality
    /// mismatches block.
    pub const fn deploy() -> Self {
        Self {
            unmapped_required_target: Severity::Error,
            cardinality_mismatch: Severity::Error,
            type_mismatch: Severity::Warning,
            divergent_array_shape: Severity::Warning,
        }
    }

    /// Gate for saving drafts: every configurable kind is a warning.
    pub const fn draft() -> Self {
        Self {
            unmapped_required_target: Severity::Warning,
            cardinality_mismatch: Severity::Warning,
            type_mismatch: Severity::Warning,
            divergent_array_shape: Severity::Warning,
        }
    }

    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content, path)?;
        tracing::debug!(path = %path.display(), ?config, "validation config loaded");
        Ok(config)
    }
}

/// Named preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Deploy,
    Draft,
}

impl Profile {
    pub fn config(self) -> ValidationConfig {
        match self {
            Self::Deploy => ValidationConfig::deploy(),
            Self::Draft => ValidationConfig::draft(),
        }
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "deploy" => Ok(Self::Deploy),
            "draft" => Ok(Self::Draft),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }
}
