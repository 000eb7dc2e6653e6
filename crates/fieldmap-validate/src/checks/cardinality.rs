//! Single-valued vs multi-valued bindings.

use fieldmap_model::FieldTree;

use super::ResolvedMapping;
use crate::issue::Issue;

/// A custom transform marks an explicit aggregation or split.
pub(crate) fn check(
    resolved: &[ResolvedMapping<'_>],
    source: &FieldTree,
    target: &FieldTree,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    for entry in resolved {
        if entry.mapping.has_custom_transform() {
            continue;
        }
        let target_many = target.is_repeated(entry.target.id());
        for (node, path) in entry.sources.iter().zip(&entry.mapping.source_paths) {
            let source_many = source.is_repeated(node.id());
            if source_many != target_many {
                issues.push(Issue::CardinalityMismatch {
                    mapping_id: entry.mapping.id.clone(),
                    source: path.clone(),
                    target: entry.mapping.target_path.clone(),
                    source_many,
                    target_many,
                });
            }
        }
    }
    issues
}
