//! Drag-connect scenarios over normalized structures.

use fieldmap_map::{
    BindMode, EditorEvent, EditorOutcome, EditorState, MappingEditor, MappingStore, NodeHit,
};
use fieldmap_model::{FieldPath, FieldTree, MappingSet, NodeId, StructureId};
use fieldmap_schema::{RawSchemaInput, normalize};
use proptest::prelude::*;

fn json_tree(sample: &str) -> FieldTree {
    normalize(&RawSchemaInput::Json(sample.to_string())).unwrap()
}

fn node(tree: &FieldTree, path: &str) -> NodeId {
    tree.find_by_path_str(path).unwrap().id()
}

fn path(p: &str) -> FieldPath {
    FieldPath::parse(p).unwrap()
}

fn empty_set() -> MappingSet {
    MappingSet::new(
        "orders",
        StructureId::new("source").unwrap(),
        StructureId::new("target").unwrap(),
    )
}

/// Pointer-down on `from`, release over `to`.
fn drag(
    editor: &MappingEditor<'_>,
    set: &MappingSet,
    from: NodeHit,
    to: Option<NodeHit>,
) -> (EditorState, MappingSet, EditorOutcome) {
    let down = editor
        .handle(&EditorState::Idle, set, EditorEvent::PointerDown(from))
        .unwrap();
    assert!(down.state.is_dragging());
    let up = editor
        .handle(
            &down.state,
            &down.set,
            EditorEvent::PointerUp {
                over: to,
                append: false,
            },
        )
        .unwrap();
    (up.state, up.set, up.outcome)
}

#[test]
fn same_side_drop_leaves_set_unchanged() {
    let source = json_tree(r#"{"a":"1","b":"2"}"#);
    let target = json_tree(r#"{"x":""}"#);
    let editor = MappingEditor::new(&source, &target);
    let set = empty_set();

    let (state, after, outcome) = drag(
        &editor,
        &set,
        NodeHit::source(node(&source, "/a")),
        Some(NodeHit::source(node(&source, "/b"))),
    );

    assert_eq!(state, EditorState::Idle);
    assert_eq!(outcome, EditorOutcome::RejectedSameSide);
    assert_eq!(after, set);
}

#[test]
fn newest_drop_wins() {
    let source = json_tree(r#"{"a":"1","b":"2"}"#);
    let target = json_tree(r#"{"x":""}"#);
    let editor = MappingEditor::new(&source, &target);
    let x = NodeHit::target(node(&target, "/x"));

    let (_, set, first) = drag(&editor, &empty_set(), NodeHit::source(node(&source, "/a")), Some(x));
    assert!(matches!(first, EditorOutcome::Connected { replaced: false, .. }));
    let id = set.mappings[0].id.clone();
    let set = set.attach_transform(&id, "return a.trim();").unwrap();

    let (state, set, second) = drag(&editor, &set, NodeHit::source(node(&source, "/b")), Some(x));
    assert_eq!(state, EditorState::Idle);
    assert!(matches!(second, EditorOutcome::Connected { replaced: true, .. }));
    assert_eq!(set.len(), 1);
    let mapping = set.mapping_for_target(&path("/x")).unwrap();
    assert_eq!(mapping.source_paths, vec![path("/b")]);
    assert!(mapping.transform.is_none());
}

#[test]
fn container_never_starts_a_drag() {
    let source = json_tree(r#"{"customer":{"name":"n"}}"#);
    let target = json_tree(r#"{"name":""}"#);
    let editor = MappingEditor::new(&source, &target);
    let hit = NodeHit::source(node(&source, "/customer"));

    let t = editor
        .handle(&EditorState::Idle, &empty_set(), EditorEvent::PointerDown(hit))
        .unwrap();
    assert_eq!(t.state, EditorState::Idle);
    assert_eq!(t.outcome, EditorOutcome::ToggleExpanded(hit));

    // The host applies the toggle; schema state is untouched.
    let toggled = source.toggle_expanded(hit.node).unwrap();
    assert!(toggled.same_shape(&source));
}

#[test]
fn cancel_returns_to_idle() {
    let source = json_tree(r#"{"a":"1"}"#);
    let target = json_tree(r#"{"x":""}"#);
    let editor = MappingEditor::new(&source, &target);
    let down = editor
        .handle(
            &EditorState::Idle,
            &empty_set(),
            EditorEvent::PointerDown(NodeHit::source(node(&source, "/a"))),
        )
        .unwrap();
    let t = editor.handle(&down.state, &down.set, EditorEvent::Cancel).unwrap();
    assert_eq!(t.state, EditorState::Idle);
    assert_eq!(t.outcome, EditorOutcome::Cancelled);
    assert!(t.set.is_empty());
}

proptest! {
    #[test]
    fn at_most_one_mapping_per_target(
        ops in prop::collection::vec((0usize..4, 0usize..3), 0..40)
    ) {
        let sources = ["/a", "/b", "/c", "/d"];
        let targets = ["/x", "/y", "/z"];
        let mut set = empty_set();
        for (s, t) in ops {
            set = set
                .add_mapping(vec![path(sources[s])], path(targets[t]), BindMode::Replace)
                .unwrap();
        }
        let mut bound: Vec<_> = set.mappings.iter().map(|m| m.target_path.clone()).collect();
        let total = bound.len();
        bound.sort();
        bound.dedup();
        prop_assert_eq!(bound.len(), total);
    }
}
