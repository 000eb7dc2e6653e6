//! Required target coverage.

use std::collections::BTreeSet;

use fieldmap_model::{FieldTree, MappingSet};

use crate::issue::Issue;

/// Every effectively required target leaf must be bound.
///
/// A leaf under an optional container is only required when the container
/// is present, so it is not reported.
pub(crate) fn check(set: &MappingSet, target: &FieldTree) -> Vec<Issue> {
    let bound: BTreeSet<_> = set.mappings.iter().map(|m| &m.target_path).collect();

    target
        .leaves()
        .filter(|leaf| leaf.parent().is_some())
        .filter(|leaf| target.is_effectively_required(leaf.id()))
        .filter_map(|leaf| target.path(leaf.id()))
        .filter(|path| !bound.contains(path))
        .map(|path| Issue::UnmappedRequiredTarget { path: path.clone() })
        .collect()
}
