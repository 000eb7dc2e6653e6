//! Validation check modules.
//!
//! Each module performs one kind of check. All of them run on every call.

mod cardinality;
mod coverage;
mod cycles;
mod divergence;
mod duplicates;
mod references;
mod types;

use fieldmap_model::{FieldMapping, FieldNode, FieldTree, MappingSet};

use crate::issue::Issue;

/// A mapping whose every path resolved to a leaf.
pub(crate) struct ResolvedMapping<'a> {
    pub mapping: &'a FieldMapping,
    pub sources: Vec<&'a FieldNode>,
    pub target: &'a FieldNode,
}

/// Run all validation checks on a mapping set.
pub(crate) fn run_all(set: &MappingSet, source: &FieldTree, target: &FieldTree) -> Vec<Issue> {
    let mut issues = Vec::new();

    // 1. Reference checks (dangling, non-leaf, empty sources)
    let resolved = references::check(set, source, target, &mut issues);

    // 2. Required target coverage
    issues.extend(coverage::check(set, target));

    // 3. Duplicate target bindings
    issues.extend(duplicates::check(set));

    // 4. Cardinality, kind and divergence checks on fully resolved mappings
    issues.extend(cardinality::check(&resolved, source, target));
    issues.extend(types::check(&resolved));
    issues.extend(divergence::check(&resolved, source, target));

    // 5. Cycles (same structure on both sides only)
    if set.is_self_mapping() {
        issues.extend(cycles::check(set));
    }

    issues
}
