//! Kind compatibility.

use super::ResolvedMapping;
use crate::issue::Issue;

pub(crate) fn check(resolved: &[ResolvedMapping<'_>]) -> Vec<Issue> {
    let mut issues = Vec::new();
    for entry in resolved {
        if entry.mapping.has_custom_transform() {
            continue;
        }
        for (node, path) in entry.sources.iter().zip(&entry.mapping.source_paths) {
            if !node.kind.converts_to(entry.target.kind) {
                issues.push(Issue::TypeMismatch {
                    mapping_id: entry.mapping.id.clone(),
                    source: path.clone(),
                    target: entry.mapping.target_path.clone(),
                    source_kind: node.kind,
                    target_kind: entry.target.kind,
                });
            }
        }
    }
    issues
}
