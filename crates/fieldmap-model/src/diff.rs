//! Path-keyed comparison of two field trees.
//!
//! Used to explain which mappings a structure edit invalidated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::{FieldKind, FieldNode, MaxOccurs};
use crate::ids::FieldPath;
use crate::tree::FieldTree;

/// Schema-relevant attributes of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSignature {
    pub kind: FieldKind,
    pub required: bool,
    pub min_occurs: u32,
    pub max_occurs: MaxOccurs,
    pub leaf: bool,
}

impl From<&FieldNode> for FieldSignature {
    fn from(node: &FieldNode) -> Self {
        Self {
            kind: node.kind,
            required: node.required,
            min_occurs: node.min_occurs,
            max_occurs: node.max_occurs,
            leaf: node.is_leaf(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub path: FieldPath,
    pub before: FieldSignature,
    pub after: FieldSignature,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDiff {
    pub added: Vec<FieldPath>,
    pub removed: Vec<FieldPath>,
    pub changed: Vec<FieldChange>,
}

impl TreeDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Compare two trees by path. Output vectors are sorted by path.
pub fn diff(old: &FieldTree, new: &FieldTree) -> TreeDiff {
    let before = signatures(old);
    let after = signatures(new);

    let mut diff = TreeDiff::default();
    for (path, sig) in &before {
        match after.get(path) {
            None => diff.removed.push(path.clone()),
            Some(other) if other != sig => diff.changed.push(FieldChange {
                path: path.clone(),
                before: *sig,
                after: *other,
            }),
            Some(_) => {}
        }
    }
    diff.added = after
        .keys()
        .filter(|path| !before.contains_key(*path))
        .cloned()
        .collect();
    diff
}

fn signatures(tree: &FieldTree) -> BTreeMap<FieldPath, FieldSignature> {
    tree.nodes()
        .filter(|node| node.parent().is_some())
        .filter_map(|node| Some((tree.path(node.id())?.clone(), FieldSignature::from(node))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;

    #[test]
    fn reports_added_removed_and_changed() {
        let old = FieldTree::from_specs(
            "root",
            vec![
                FieldSpec::new("a", FieldKind::String),
                FieldSpec::new("b", FieldKind::Number),
            ],
        )
        .unwrap();
        let new = FieldTree::from_specs(
            "root",
            vec![
                FieldSpec::new("a", FieldKind::Number),
                FieldSpec::new("c", FieldKind::Boolean),
            ],
        )
        .unwrap();

        let diff = diff(&old, &new);
        assert_eq!(diff.added, vec![FieldPath::parse("/c").unwrap()]);
        assert_eq!(diff.removed, vec![FieldPath::parse("/b").unwrap()]);
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed[0].before.kind, FieldKind::String);
        assert_eq!(diff.changed[0].after.kind, FieldKind::Number);
    }

    #[test]
    fn identical_trees_have_empty_diff() {
        let tree =
            FieldTree::from_specs("root", vec![FieldSpec::new("a", FieldKind::String)]).unwrap();
        assert!(diff(&tree, &tree).is_empty());
    }
}
