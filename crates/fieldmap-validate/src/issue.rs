//! Validation issue types.
//!
//! Each variant carries only the data needed to locate and explain the
//! problem. Severity is resolved against a [`ValidationConfig`].

use serde::{Deserialize, Serialize};

use fieldmap_model::{FieldKind, FieldPath, MappingId};

use crate::config::ValidationConfig;
use crate::rules::Category;

/// Issue severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks deployment
    Error,
    /// Should review; a draft may still be saved
    Warning,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which side of a mapping a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathSide {
    Source,
    Target,
}

impl PathSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

/// Validation issue - each variant carries only its needed data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Issue {
    // Reference checks
    /// Mapping reads a source path the source tree no longer has
    DanglingSourcePath {
        mapping_id: MappingId,
        path: FieldPath,
    },
    /// Mapping writes a target path the target tree no longer has
    DanglingTargetPath {
        mapping_id: MappingId,
        path: FieldPath,
    },
    /// Mapped path exists but has children
    NonLeafBinding {
        mapping_id: MappingId,
        side: PathSide,
        path: FieldPath,
    },

    // Coverage checks
    /// Required target leaf with no mapping
    UnmappedRequiredTarget { path: FieldPath },

    // Integrity checks
    /// Target bound by more than one mapping
    DuplicateTargetBinding {
        path: FieldPath,
        mapping_ids: Vec<MappingId>,
    },
    /// Persisted mapping with no sources
    EmptySourcePaths {
        mapping_id: MappingId,
        target: FieldPath,
    },
    /// Chain of mappings within one structure leads back to its start
    MappingCycle { paths: Vec<FieldPath> },

    // Cardinality checks
    /// Single-valued into multi-valued (or the reverse) without a transform
    CardinalityMismatch {
        mapping_id: MappingId,
        source: FieldPath,
        target: FieldPath,
        source_many: bool,
        target_many: bool,
    },
    /// Mapped path runs through an array whose sample elements disagreed
    DivergentArrayShape {
        mapping_id: MappingId,
        path: FieldPath,
        array: FieldPath,
    },

    // Type checks
    /// Source kind does not convert to the target kind
    TypeMismatch {
        mapping_id: MappingId,
        source: FieldPath,
        target: FieldPath,
        source_kind: FieldKind,
        target_kind: FieldKind,
    },
}

impl Issue {
    /// Stable kebab-case identifier of the issue kind.
    pub fn code(&self) -> &'static str {
        match self {
            Issue::DanglingSourcePath { .. } => "dangling-source-path",
            Issue::DanglingTargetPath { .. } => "dangling-target-path",
            Issue::NonLeafBinding { .. } => "non-leaf-binding",
            Issue::UnmappedRequiredTarget { .. } => "unmapped-required-target",
            Issue::DuplicateTargetBinding { .. } => "duplicate-target-binding",
            Issue::EmptySourcePaths { .. } => "empty-source-paths",
            Issue::MappingCycle { .. } => "mapping-cycle",
            Issue::CardinalityMismatch { .. } => "cardinality-mismatch",
            Issue::DivergentArrayShape { .. } => "divergent-array-shape",
            Issue::TypeMismatch { .. } => "type-mismatch",
        }
    }

    /// Mapping the issue belongs to, if it is about one mapping.
    pub fn mapping_id(&self) -> Option<&MappingId> {
        match self {
            Issue::DanglingSourcePath { mapping_id, .. }
            | Issue::DanglingTargetPath { mapping_id, .. }
            | Issue::NonLeafBinding { mapping_id, .. }
            | Issue::EmptySourcePaths { mapping_id, .. }
            | Issue::CardinalityMismatch { mapping_id, .. }
            | Issue::DivergentArrayShape { mapping_id, .. }
            | Issue::TypeMismatch { mapping_id, .. } => Some(mapping_id),
            Issue::UnmappedRequiredTarget { .. }
            | Issue::DuplicateTargetBinding { .. }
            | Issue::MappingCycle { .. } => None,
        }
    }

    /// Path the issue is anchored on.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            Issue::DanglingSourcePath { path, .. }
            | Issue::DanglingTargetPath { path, .. }
            | Issue::NonLeafBinding { path, .. }
            | Issue::UnmappedRequiredTarget { path }
            | Issue::DuplicateTargetBinding { path, .. }
            | Issue::DivergentArrayShape { path, .. } => Some(path),
            Issue::EmptySourcePaths { target, .. }
            | Issue::CardinalityMismatch { target, .. }
            | Issue::TypeMismatch { target, .. } => Some(target),
            Issue::MappingCycle { paths } => paths.first(),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Issue::DanglingSourcePath { .. }
            | Issue::DanglingTargetPath { .. }
            | Issue::NonLeafBinding { .. } => Category::Reference,
            Issue::UnmappedRequiredTarget { .. } => Category::Coverage,
            Issue::DuplicateTargetBinding { .. }
            | Issue::EmptySourcePaths { .. }
            | Issue::MappingCycle { .. } => Category::Integrity,
            Issue::CardinalityMismatch { .. } | Issue::DivergentArrayShape { .. } => {
                Category::Cardinality
            }
            Issue::TypeMismatch { .. } => Category::Type,
        }
    }

    /// Severity under `config`; structural problems are always errors.
    pub fn severity(&self, config: &ValidationConfig) -> Severity {
        match self {
            Issue::UnmappedRequiredTarget { .. } => config.unmapped_required_target,
            Issue::CardinalityMismatch { .. } => config.cardinality_mismatch,
            Issue::TypeMismatch { .. } => config.type_mismatch,
            Issue::DivergentArrayShape { .. } => config.divergent_array_shape,
            _ => Severity::Error,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Issue::DanglingSourcePath { path, .. } => {
                format!("Source path {path} no longer exists in the source structure")
            }
            Issue::DanglingTargetPath { path, .. } => {
                format!("Target path {path} no longer exists in the target structure")
            }
            Issue::NonLeafBinding { side, path, .. } => {
                format!("Mapped {} path {path} is not a leaf", side.as_str())
            }
            Issue::UnmappedRequiredTarget { path } => {
                format!("Required target field {path} has no mapping")
            }
            Issue::DuplicateTargetBinding { path, mapping_ids } => {
                format!("Target {path} is bound by {} mappings", mapping_ids.len())
            }
            Issue::EmptySourcePaths { target, .. } => {
                format!("Mapping for {target} has no source paths")
            }
            Issue::MappingCycle { paths } => {
                let chain = paths
                    .iter()
                    .chain(paths.first())
                    .map(FieldPath::as_str)
                    .collect::<Vec<_>>()
                    .join(" -> ");
                format!("Mappings form a cycle: {chain}")
            }
            Issue::CardinalityMismatch {
                source,
                target,
                source_many,
                target_many,
                ..
            } => format!(
                "{} source {source} mapped to {} target {target} without a transform",
                many_label(*source_many),
                many_label(*target_many)
            ),
            Issue::DivergentArrayShape { path, array, .. } => format!(
                "Mapped path {path} runs through array {array} whose sample elements differ in shape"
            ),
            Issue::TypeMismatch {
                source,
                target,
                source_kind,
                target_kind,
                ..
            } => format!(
                "Source {source} ({source_kind}) does not convert to target {target} ({target_kind})"
            ),
        }
    }
}

fn many_label(many: bool) -> &'static str {
    if many { "Multi-valued" } else { "Single-valued" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> FieldPath {
        FieldPath::parse(p).unwrap()
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse(" Warning "), Some(Severity::Warning));
        assert_eq!(Severity::parse("error"), Some(Severity::Error));
        assert_eq!(Severity::parse("fatal"), None);
    }

    #[test]
    fn test_configurable_severity() {
        let issue = Issue::UnmappedRequiredTarget { path: path("/lines") };
        assert_eq!(issue.severity(&ValidationConfig::deploy()), Severity::Error);
        assert_eq!(issue.severity(&ValidationConfig::draft()), Severity::Warning);

        let dangling = Issue::DanglingSourcePath {
            mapping_id: MappingId::new("m").unwrap(),
            path: path("/gone"),
        };
        assert_eq!(dangling.severity(&ValidationConfig::draft()), Severity::Error);
    }

    #[test]
    fn test_cycle_message_closes_loop() {
        let issue = Issue::MappingCycle {
            paths: vec![path("/a"), path("/b")],
        };
        assert_eq!(issue.message(), "Mappings form a cycle: /a -> /b -> /a");
        assert_eq!(issue.code(), "mapping-cycle");
    }

    #[test]
    fn test_wire_form_is_tagged() {
        let issue = Issue::UnmappedRequiredTarget { path: path("/lines") };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "unmappedRequiredTarget");
        assert_eq!(json["path"], "/lines");
    }
}
