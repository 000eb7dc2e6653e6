//! Drag-connect interaction state machine.
//!
//! The editor is a value: the host passes the current [`EditorState`] and
//! [`MappingSet`] with each [`EditorEvent`] and gets back the next state, the
//! (possibly new) set and an [`EditorOutcome`] describing what happened.
//! Trees are only read; expansion toggles are returned as an outcome for
//! the host to apply to its own tree.

use serde::{Deserialize, Serialize};

use fieldmap_model::{FieldNode, FieldPath, FieldTree, MappingSet, NodeId};

use crate::error::Result;
use crate::store::{BindMode, MappingStore};

/// Which tree a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Target,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Self::Source => Self::Target,
            Self::Target => Self::Source,
        }
    }
}

/// A node under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHit {
    pub side: Side,
    pub node: NodeId,
}

impl NodeHit {
    pub fn source(node: NodeId) -> Self {
        Self {
            side: Side::Source,
            node,
        }
    }

    pub fn target(node: NodeId) -> Self {
        Self {
            side: Side::Target,
            node,
        }
    }
}

/// A leaf picked up by a drag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeafRef {
    pub side: Side,
    pub path: FieldPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Idle,
    Dragging { origin: LeafRef },
}

impl EditorState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    PointerDown(NodeHit),
    /// Release over a node, or over empty space (`None`). With `append` the
    /// dragged source joins the target's existing mapping instead of
    /// replacing it.
    PointerUp { over: Option<NodeHit>, append: bool },
    /// Escape key or pointer left the editor.
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    /// Event had no effect in the current state.
    Ignored,
    /// Pointer-down on a container: the host should toggle this node.
    ToggleExpanded(NodeHit),
    DragStarted(LeafRef),
    /// Drop on an opposite-side leaf bound the target.
    Connected {
        sources: Vec<FieldPath>,
        target: FieldPath,
        replaced: bool,
    },
    /// Drop on a same-side leaf; nothing changed.
    RejectedSameSide,
    /// Drop over empty space or a container; nothing changed.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: EditorState,
    pub set: MappingSet,
    pub outcome: EditorOutcome,
}

impl Transition {
    fn unchanged(set: &MappingSet, state: EditorState, outcome: EditorOutcome) -> Self {
        Self {
            state,
            set: set.clone(),
            outcome,
        }
    }
}

/// Reads leaf identity from the two trees of a mapping screen.
#[derive(Debug, Clone, Copy)]
pub struct MappingEditor<'a> {
    source: &'a FieldTree,
    target: &'a FieldTree,
}

impl<'a> MappingEditor<'a> {
    pub fn new(source: &'a FieldTree, target: &'a FieldTree) -> Self {
        Self { source, target }
    }

    fn tree(&self, side: Side) -> &'a FieldTree {
        match side {
            Side::Source => self.source,
            Side::Target => self.target,
        }
    }

    fn resolve(&self, hit: NodeHit) -> Option<(&'a FieldNode, &'a FieldPath)> {
        let tree = self.tree(hit.side);
        Some((tree.node(hit.node)?, tree.path(hit.node)?))
    }

    /// Apply one event.
    pub fn handle(&self, state: &EditorState, set: &MappingSet, event: EditorEvent) -> Result<Transition> {
        match (state, event) {
            (EditorState::Idle, EditorEvent::PointerDown(hit)) => Ok(self.pointer_down(set, hit)),
            (EditorState::Dragging { origin }, EditorEvent::PointerUp { over, append }) => {
                self.drop_on(set, origin, over, append)
            }
            (EditorState::Dragging { .. }, EditorEvent::Cancel) => Ok(Transition::unchanged(
                set,
                EditorState::Idle,
                EditorOutcome::Cancelled,
            )),
            (state, _) => Ok(Transition::unchanged(set, state.clone(), EditorOutcome::Ignored)),
        }
    }

    fn pointer_down(&self, set: &MappingSet, hit: NodeHit) -> Transition {
        match self.resolve(hit) {
            Some((node, path)) if node.is_leaf() => {
                let origin = LeafRef {
                    side: hit.side,
                    path: path.clone(),
                };
                Transition::unchanged(
                    set,
                    EditorState::Dragging {
                        origin: origin.clone(),
                    },
                    EditorOutcome::DragStarted(origin),
                )
            }
            Some(_) => Transition::unchanged(set, EditorState::Idle, EditorOutcome::ToggleExpanded(hit)),
            None => Transition::unchanged(set, EditorState::Idle, EditorOutcome::Ignored),
        }
    }

    fn drop_on(
        &self,
        set: &MappingSet,
        origin: &LeafRef,
        over: Option<NodeHit>,
        append: bool,
    ) -> Result<Transition> {
        let Some((hit, (node, path))) = over.and_then(|hit| Some((hit, self.resolve(hit)?))) else {
            return Ok(Transition::unchanged(set, EditorState::Idle, EditorOutcome::Cancelled));
        };
        if !node.is_leaf() {
            return Ok(Transition::unchanged(set, EditorState::Idle, EditorOutcome::Cancelled));
        }
        if hit.side == origin.side {
            tracing::debug!(path = %path, "drop on same side rejected");
            return Ok(Transition::unchanged(
                set,
                EditorState::Idle,
                EditorOutcome::RejectedSameSide,
            ));
        }

        let (source, target) = match origin.side {
            Side::Source => (origin.path.clone(), path.clone()),
            Side::Target => (path.clone(), origin.path.clone()),
        };

        let existing = set.mapping_for_target(&target).map(|m| m.id.clone());
        let next = match (&existing, append) {
            (Some(id), true) => set.add_source_path(id, source)?,
            _ => set.add_mapping(vec![source], target.clone(), BindMode::Replace)?,
        };
        let sources = next
            .mapping_for_target(&target)
            .map(|m| m.source_paths.clone())
            .unwrap_or_default();

        Ok(Transition {
            state: EditorState::Idle,
            set: next,
            outcome: EditorOutcome::Connected {
                sources,
                target,
                replaced: existing.is_some() && !append,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmap_model::{FieldKind, FieldSpec, StructureId};

    fn trees() -> (FieldTree, FieldTree) {
        let source = FieldTree::from_specs(
            "root",
            vec![
                FieldSpec::new("a", FieldKind::String),
                FieldSpec::new("b", FieldKind::String),
                FieldSpec::object("grp", vec![FieldSpec::new("c", FieldKind::Number)]),
            ],
        )
        .unwrap();
        let target = FieldTree::from_specs("root", vec![FieldSpec::new("x", FieldKind::String)])
            .unwrap();
        (source, target)
    }

    fn id_of(tree: &FieldTree, path: &str) -> NodeId {
        tree.find_by_path_str(path).unwrap().id()
    }

    fn set() -> MappingSet {
        MappingSet::new(
            "s",
            StructureId::new("src").unwrap(),
            StructureId::new("dst").unwrap(),
        )
    }

    #[test]
    fn container_pointer_down_toggles() {
        let (source, target) = trees();
        let editor = MappingEditor::new(&source, &target);
        let hit = NodeHit::source(id_of(&source, "/grp"));
        let t = editor
            .handle(&EditorState::Idle, &set(), EditorEvent::PointerDown(hit))
            .unwrap();
        assert_eq!(t.state, EditorState::Idle);
        assert_eq!(t.outcome, EditorOutcome::ToggleExpanded(hit));
    }

    #[test]
    fn target_to_source_drag_binds_in_reverse() {
        let (source, target) = trees();
        let editor = MappingEditor::new(&source, &target);
        let down = editor
            .handle(
                &EditorState::Idle,
                &set(),
                EditorEvent::PointerDown(NodeHit::target(id_of(&target, "/x"))),
            )
            .unwrap();
        let up = editor
            .handle(
                &down.state,
                &down.set,
                EditorEvent::PointerUp {
                    over: Some(NodeHit::source(id_of(&source, "/a"))),
                    append: false,
                },
            )
            .unwrap();
        let mapping = up.set.mapping_for_target(&FieldPath::parse("/x").unwrap()).unwrap();
        assert_eq!(mapping.source_paths, vec![FieldPath::parse("/a").unwrap()]);
    }

    #[test]
    fn drop_on_container_or_space_cancels() {
        let (source, target) = trees();
        let editor = MappingEditor::new(&source, &target);
        let dragging = EditorState::Dragging {
            origin: LeafRef {
                side: Side::Target,
                path: FieldPath::parse("/x").unwrap(),
            },
        };
        for over in [None, Some(NodeHit::source(id_of(&source, "/grp")))] {
            let t = editor
                .handle(&dragging, &set(), EditorEvent::PointerUp { over, append: false })
                .unwrap();
            assert_eq!(t.outcome, EditorOutcome::Cancelled);
            assert_eq!(t.state, EditorState::Idle);
            assert!(t.set.is_empty());
        }
    }

    #[test]
    fn append_aggregates_sources() {
        let (source, target) = trees();
        let editor = MappingEditor::new(&source, &target);
        let x = NodeHit::target(id_of(&target, "/x"));
        let mut set = set();
        for (leaf, append) in [("/a", false), ("/b", true)] {
            let state = EditorState::Dragging {
                origin: LeafRef {
                    side: Side::Source,
                    path: FieldPath::parse(leaf).unwrap(),
                },
            };
            set = editor
                .handle(&state, &set, EditorEvent::PointerUp { over: Some(x), append })
                .unwrap()
                .set;
        }
        assert_eq!(set.len(), 1);
        assert!(set.mappings[0].is_aggregation());
    }

    #[test]
    fn idle_ignores_pointer_up_and_cancel() {
        let (source, target) = trees();
        let editor = MappingEditor::new(&source, &target);
        for event in [
            EditorEvent::Cancel,
            EditorEvent::PointerUp {
                over: None,
                append: false,
            },
        ] {
            let t = editor.handle(&EditorState::Idle, &set(), event).unwrap();
            assert_eq!(t.outcome, EditorOutcome::Ignored);
        }
    }
}
