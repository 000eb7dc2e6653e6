//! Property tests for path derivation and the leaf invariant.

use fieldmap_model::{FieldKind, FieldPath, FieldSpec, FieldTree};
use proptest::prelude::*;

fn scalar_kind() -> impl Strategy<Value = FieldKind> {
    prop_oneof![
        Just(FieldKind::String),
        Just(FieldKind::Number),
        Just(FieldKind::Boolean),
        Just(FieldKind::Date),
        Just(FieldKind::Datetime),
    ]
}

/// Suffix sibling names with their position so they stay unique.
fn unique_names(children: Vec<FieldSpec>) -> Vec<FieldSpec> {
    children
        .into_iter()
        .enumerate()
        .map(|(idx, mut child)| {
            child.name = format!("{}_{idx}", child.name);
            child
        })
        .collect()
}

fn field_spec() -> impl Strategy<Value = FieldSpec> {
    let leaf = (scalar_kind(), "[a-z]{1,6}").prop_map(|(kind, name)| FieldSpec::new(name, kind));
    leaf.prop_recursive(4, 48, 5, |inner| {
        (
            "[a-z]{1,6}",
            prop::collection::vec(inner, 1..5),
            any::<bool>(),
        )
            .prop_map(|(name, children, is_array)| {
                let children = unique_names(children);
                if is_array {
                    FieldSpec::array(name, children)
                } else {
                    FieldSpec::object(name, children)
                }
            })
    })
}

fn field_tree() -> impl Strategy<Value = FieldTree> {
    prop::collection::vec(field_spec(), 1..6)
        .prop_map(|fields| FieldTree::from_specs("root", unique_names(fields)).unwrap())
}

proptest! {
    #[test]
    fn rebuild_paths_is_idempotent(tree in field_tree()) {
        let once = tree.rebuild_paths();
        let twice = once.rebuild_paths();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(&once, &tree);
    }

    #[test]
    fn every_path_joins_ancestor_names(tree in field_tree()) {
        for node in tree.nodes() {
            let mut names: Vec<&str> = tree
                .ancestors(node.id())
                .filter(|a| a.parent().is_some())
                .map(|a| a.name.as_str())
                .collect();
            names.reverse();
            let expected = if node.parent().is_none() {
                FieldPath::root()
            } else {
                names.push(node.name.as_str());
                FieldPath::parse(format!("/{}", names.join("/"))).unwrap()
            };
            prop_assert_eq!(tree.path(node.id()).unwrap(), &expected);
        }
    }

    #[test]
    fn leaves_are_exactly_the_childless_nodes(tree in field_tree()) {
        let leaf_ids: Vec<_> = tree.leaves().map(|n| n.id()).collect();
        let childless: Vec<_> = tree
            .nodes()
            .filter(|n| n.child_ids().is_empty())
            .map(|n| n.id())
            .collect();
        prop_assert_eq!(leaf_ids, childless);
    }

    #[test]
    fn toggling_twice_restores_the_tree(tree in field_tree(), pick in any::<prop::sample::Index>()) {
        let ids: Vec<_> = tree.nodes().map(|n| n.id()).collect();
        let id = ids[pick.index(ids.len())];
        let toggled = tree.toggle_expanded(id).unwrap();
        prop_assert!(toggled.same_shape(&tree));
        prop_assert_eq!(toggled.toggle_expanded(id).unwrap(), tree);
    }

    #[test]
    fn serde_round_trip_preserves_paths(tree in field_tree()) {
        let json = serde_json::to_string(&tree).unwrap();
        let back: FieldTree = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.leaf_paths(), tree.leaf_paths());
    }
}
