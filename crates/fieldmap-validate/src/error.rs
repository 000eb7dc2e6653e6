//! Error types for loading validation configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Validation itself never fails; only configuration loading does.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read validation config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid validation config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown validation profile {0:?}")]
    UnknownProfile(String),
}

impl ConfigError {
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Read { .. } => "Check that the config file exists and is readable",
            Self::Parse { .. } => {
                "Severities are \"error\" or \"warning\", e.g. type_mismatch = \"warning\""
            }
            Self::UnknownProfile(_) => "Use one of: deploy, draft",
        }
    }
}

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::UnknownProfile("strict".to_string());
        assert_eq!(err.to_string(), "unknown validation profile \"strict\"");
        assert!(!err.suggestion().is_empty());
    }
}
