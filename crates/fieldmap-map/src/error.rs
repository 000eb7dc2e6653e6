//! Error types for mapping operations.

use std::path::PathBuf;

use thiserror::Error;

use fieldmap_model::{FieldPath, MappingId, ModelError, StructureId};

/// Caller logic errors from [`MappingStore`](crate::MappingStore) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MappingError {
    /// The target leaf already has a mapping and replace was not requested.
    #[error("target {target} is already bound by mapping {mapping_id}")]
    TargetAlreadyBound {
        target: FieldPath,
        mapping_id: MappingId,
    },

    /// No mapping with this id exists in the set.
    #[error("mapping not found: {0}")]
    MappingNotFound(MappingId),

    /// A mapping needs at least one source path.
    #[error("mapping for {target} has no source paths")]
    EmptySourcePaths { target: FieldPath },

    /// A path or identifier failed validation.
    #[error(transparent)]
    InvalidPath(#[from] ModelError),
}

impl MappingError {
    /// Hint for the editor or CLI user.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::TargetAlreadyBound { .. } => {
                "Drop again to replace the existing mapping, or remove it first"
            }
            Self::MappingNotFound(_) => "The mapping may have been removed; reload the mapping set",
            Self::EmptySourcePaths { .. } => "Select at least one source leaf",
            Self::InvalidPath(_) => "Paths are absolute and '/'-delimited, e.g. /order/id",
        }
    }
}

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, MappingError>;

/// Errors from the file-backed and in-memory repositories.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RepositoryError {
    // === File System Errors ===
    #[error("failed to create repository directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    // === Lookup Errors ===
    #[error("structure not found: {0}")]
    StructureNotFound(StructureId),

    /// Persisted structures are immutable; save a clone instead.
    #[error("structure {0} already exists")]
    StructureExists(StructureId),

    // === Identifier Errors ===
    /// File-backed ids may only contain ASCII letters, digits, `-` and `_`.
    #[error("id {0:?} cannot be used as a file name")]
    InvalidId(String),
}

/// Result type for repository operations.
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MappingError::TargetAlreadyBound {
            target: FieldPath::parse("/x").unwrap(),
            mapping_id: MappingId::new("m-1").unwrap(),
        };
        assert_eq!(err.to_string(), "target /x is already bound by mapping m-1");
        assert!(!err.suggestion().is_empty());
    }

    #[test]
    fn test_error_from_model() {
        let err: MappingError = FieldPath::parse("x").unwrap_err().into();
        assert!(matches!(err, MappingError::InvalidPath(_)));
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::StructureExists(StructureId::new("orders").unwrap());
        assert_eq!(err.to_string(), "structure orders already exists");

        let err = RepositoryError::InvalidId("a/b".to_string());
        assert_eq!(err.to_string(), r#"id "a/b" cannot be used as a file name"#);
    }
}
