//! Paths through arrays whose sample elements disagreed in shape.

use std::collections::BTreeSet;

use fieldmap_model::{FieldNode, FieldPath, FieldTree, MappingId};

use super::ResolvedMapping;
use crate::issue::Issue;

pub(crate) fn check(
    resolved: &[ResolvedMapping<'_>],
    source: &FieldTree,
    target: &FieldTree,
) -> Vec<Issue> {
    let mut seen: BTreeSet<(MappingId, bool, FieldPath)> = BTreeSet::new();
    let mut issues = Vec::new();

    for entry in resolved {
        let sides = entry
            .sources
            .iter()
            .map(|node| (false, source, *node))
            .chain(std::iter::once((true, target, entry.target)));
        for (is_target, tree, node) in sides {
            let Some(array) = divergent_array(tree, node) else {
                continue;
            };
            let (Some(path), Some(array_path)) = (tree.path(node.id()), tree.path(array.id())) else {
                continue;
            };
            if seen.insert((entry.mapping.id.clone(), is_target, path.clone())) {
                issues.push(Issue::DivergentArrayShape {
                    mapping_id: entry.mapping.id.clone(),
                    path: path.clone(),
                    array: array_path.clone(),
                });
            }
        }
    }
    issues
}

/// Nearest divergent node among `node` and its ancestors.
fn divergent_array<'a>(tree: &'a FieldTree, node: &'a FieldNode) -> Option<&'a FieldNode> {
    std::iter::once(node)
        .chain(tree.ancestors(node.id()))
        .find(|n| n.divergent)
}
