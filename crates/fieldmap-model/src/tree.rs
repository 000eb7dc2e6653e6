//! Canonical field tree.
//!
//! Nodes are stored in an arena in declaration pre-order, so iterating the
//! arena is a depth-first pre-order traversal. Paths and presentation state
//! (`expanded`, one flag per node) live in side tables indexed by [`NodeId`].
//! The node arena and the path tables are shared between a tree and any tree
//! derived from it by a presentation toggle, so toggling never copies the
//! schema.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::field::{FieldKind, FieldNode, FieldSpec, MaxOccurs};
use crate::ids::{FieldPath, NodeId, validate_field_name};

/// Default name of the synthetic root node.
pub const DEFAULT_ROOT_NAME: &str = "root";

#[derive(Debug, Clone)]
pub struct FieldTree {
    nodes: Arc<Vec<FieldNode>>,
    paths: Arc<Vec<FieldPath>>,
    index: Arc<HashMap<FieldPath, NodeId>>,
    expanded: Arc<Vec<bool>>,
}

impl FieldTree {
    /// Build a tree whose root (`/`) holds the given top-level fields.
    pub fn from_specs(root_name: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self> {
        let root = FieldSpec::object(root_name, fields);
        Self::from_root_spec(root)
    }

    /// Build a tree from a root spec. The root's own name does not appear in
    /// any path.
    pub fn from_root_spec(root: FieldSpec) -> Result<Self> {
        let mut nodes = Vec::new();
        push_spec(&mut nodes, None, root)?;
        let expanded = Arc::new(vec![false; nodes.len()]);
        Ok(Self::from_arena(nodes, expanded))
    }

    /// `expanded` must hold one flag per node.
    fn from_arena(nodes: Vec<FieldNode>, expanded: Arc<Vec<bool>>) -> Self {
        let paths = derive_paths(&nodes);
        let index = paths
            .iter()
            .enumerate()
            .map(|(idx, path)| (path.clone(), NodeId::from_index(idx)))
            .collect();
        Self {
            nodes: Arc::new(nodes),
            paths: Arc::new(paths),
            index: Arc::new(index),
            expanded,
        }
    }

    pub fn root(&self) -> &FieldNode {
        &self.nodes[0]
    }

    pub fn root_id(&self) -> NodeId {
        NodeId::from_index(0)
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no fields below it.
    pub fn is_empty(&self) -> bool {
        self.root().is_leaf()
    }

    pub fn node(&self, id: NodeId) -> Option<&FieldNode> {
        self.nodes.get(id.index())
    }

    fn require(&self, id: NodeId) -> Result<&FieldNode> {
        self.node(id).ok_or(ModelError::NodeNotFound(id))
    }

    pub fn path(&self, id: NodeId) -> Option<&FieldPath> {
        self.paths.get(id.index())
    }

    /// Exact path match.
    pub fn find_by_path(&self, path: &FieldPath) -> Option<&FieldNode> {
        self.index.get(path).and_then(|id| self.node(*id))
    }

    /// Exact path match on an unparsed path string.
    pub fn find_by_path_str(&self, path: &str) -> Option<&FieldNode> {
        FieldPath::parse(path)
            .ok()
            .and_then(|p| self.find_by_path(&p))
    }

    /// Every node, depth-first pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = &FieldNode> {
        self.nodes.iter()
    }

    /// Childless nodes in declaration order, depth-first pre-order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            inner: self.nodes.iter(),
        }
    }

    pub fn leaf_paths(&self) -> Vec<FieldPath> {
        self.leaves()
            .map(|leaf| self.paths[leaf.id.index()].clone())
            .collect()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &FieldNode> {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.node(*child))
    }

    pub fn parent(&self, id: NodeId) -> Option<&FieldNode> {
        self.node(id)
            .and_then(|n| n.parent)
            .and_then(|p| self.node(p))
    }

    /// Ancestors from the direct parent up to and including the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &FieldNode> {
        std::iter::successors(self.parent(id), |n| self.parent(n.id))
    }

    /// True when the node or any non-root ancestor may occur more than once.
    pub fn is_repeated(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        node.is_many()
            || self
                .ancestors(id)
                .filter(|a| a.parent.is_some())
                .any(FieldNode::is_many)
    }

    /// True when the node and every non-root ancestor are required.
    pub fn is_effectively_required(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        node.is_required()
            && self
                .ancestors(id)
                .filter(|a| a.parent.is_some())
                .all(FieldNode::is_required)
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.get(id.index()).copied().unwrap_or(false)
    }

    /// Flip one node's presentation flag in place and return the new state.
    ///
    /// Constant time while this tree is the only holder of its flag table.
    /// The first toggle after a clone copies the flags (one byte per node);
    /// the schema is never copied.
    pub fn toggle_expanded_mut(&mut self, id: NodeId) -> Result<bool> {
        self.require(id)?;
        let flag = &mut Arc::make_mut(&mut self.expanded)[id.index()];
        *flag = !*flag;
        Ok(*flag)
    }

    /// Flip one node's presentation flag, leaving `self` as it was.
    ///
    /// Schema state is shared with the result. The flag table is copied, so
    /// hosts toggling in a loop should own the tree and use
    /// [`toggle_expanded_mut`](Self::toggle_expanded_mut).
    pub fn toggle_expanded(&self, id: NodeId) -> Result<Self> {
        let mut toggled = self.clone();
        toggled.toggle_expanded_mut(id)?;
        Ok(toggled)
    }

    /// Recompute every path from current names and nesting.
    pub fn rebuild_paths(&self) -> Self {
        Self::from_arena(self.nodes.as_ref().clone(), Arc::clone(&self.expanded))
    }

    /// Rename a field; descendant paths are rebuilt.
    pub fn rename(&self, id: NodeId, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_field_name(&name)?;
        let node = self.require(id)?;
        if let Some(parent) = node.parent {
            let clash = self
                .children(parent)
                .any(|sibling| sibling.id != id && sibling.name == name);
            if clash {
                return Err(ModelError::DuplicateSibling { parent, name });
            }
        }
        let mut nodes = self.nodes.as_ref().clone();
        nodes[id.index()].name = name;
        Ok(Self::from_arena(nodes, Arc::clone(&self.expanded)))
    }

    /// Replace a field's cardinality constraints.
    pub fn with_cardinality(
        &self,
        id: NodeId,
        required: bool,
        min_occurs: u32,
        max_occurs: MaxOccurs,
    ) -> Result<Self> {
        self.require(id)?;
        let mut nodes = self.nodes.as_ref().clone();
        let node = &mut nodes[id.index()];
        node.required = required;
        node.min_occurs = min_occurs;
        node.max_occurs = max_occurs;
        Ok(Self {
            nodes: Arc::new(nodes),
            paths: Arc::clone(&self.paths),
            index: Arc::clone(&self.index),
            expanded: Arc::clone(&self.expanded),
        })
    }

    /// Convert back into a construction spec (root included).
    pub fn to_spec(&self) -> FieldSpec {
        self.spec_of(self.root_id())
    }

    fn spec_of(&self, id: NodeId) -> FieldSpec {
        let node = &self.nodes[id.index()];
        FieldSpec {
            name: node.name.clone(),
            kind: node.kind,
            required: node.required,
            min_occurs: node.min_occurs,
            max_occurs: node.max_occurs,
            item_kind: node.item_kind,
            unparsed: node.unparsed,
            divergent: node.divergent,
            description: node.description.clone(),
            children: node.children.iter().map(|c| self.spec_of(*c)).collect(),
        }
    }

    /// Same schema shape, ignoring presentation state.
    pub fn same_shape(&self, other: &FieldTree) -> bool {
        self.nodes == other.nodes
    }
}

impl PartialEq for FieldTree {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.paths == other.paths && self.expanded == other.expanded
    }
}

/// Lazy pre-order iterator over leaves.
pub struct Leaves<'a> {
    inner: std::slice::Iter<'a, FieldNode>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a FieldNode;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find(|node| node.is_leaf())
    }
}

fn push_spec(nodes: &mut Vec<FieldNode>, parent: Option<NodeId>, spec: FieldSpec) -> Result<NodeId> {
    let id = NodeId::from_index(nodes.len());
    if parent.is_some() {
        validate_field_name(&spec.name)?;
    }
    if !spec.children.is_empty() && !spec.kind.is_container() {
        return Err(ModelError::NotAContainer {
            parent: id,
            kind: spec.kind.to_string(),
        });
    }
    nodes.push(FieldNode {
        id,
        parent,
        children: Vec::with_capacity(spec.children.len()),
        name: spec.name,
        kind: spec.kind,
        required: spec.required,
        min_occurs: spec.min_occurs,
        max_occurs: spec.max_occurs,
        item_kind: spec.item_kind,
        unparsed: spec.unparsed,
        divergent: spec.divergent,
        description: spec.description,
    });

    let mut seen = BTreeSet::new();
    for child in spec.children {
        if !seen.insert(child.name.clone()) {
            return Err(ModelError::DuplicateSibling {
                parent: id,
                name: child.name,
            });
        }
        let child_id = push_spec(nodes, Some(id), child)?;
        nodes[id.index()].children.push(child_id);
    }
    Ok(id)
}

/// Paths follow arena order; parents always precede their children.
fn derive_paths(nodes: &[FieldNode]) -> Vec<FieldPath> {
    let mut paths: Vec<FieldPath> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let path = match node.parent {
            None => FieldPath::root(),
            Some(parent) => paths[parent.index()].child(&node.name),
        };
        paths.push(path);
    }
    paths
}

// =============================================================================
// Serialized form
// =============================================================================

/// Nested wire form of a tree node (`rootNode` in a serialized structure).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldNodeRecord {
    #[serde(default, skip_deserializing)]
    id: Option<NodeId>,
    name: String,
    #[serde(default, skip_deserializing)]
    path: Option<FieldPath>,
    kind: FieldKind,
    #[serde(default = "default_true")]
    required: bool,
    #[serde(default = "default_one")]
    min_occurs: u32,
    #[serde(default)]
    max_occurs: MaxOccurs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    item_kind: Option<FieldKind>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    unparsed: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    divergent: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    expanded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<FieldNodeRecord>,
}

fn default_true() -> bool {
    true
}

fn default_one() -> u32 {
    1
}

impl FieldTree {
    fn record_of(&self, id: NodeId) -> FieldNodeRecord {
        let node = &self.nodes[id.index()];
        FieldNodeRecord {
            id: Some(id),
            name: node.name.clone(),
            path: Some(self.paths[id.index()].clone()),
            kind: node.kind,
            required: node.required,
            min_occurs: node.min_occurs,
            max_occurs: node.max_occurs,
            item_kind: node.item_kind,
            unparsed: node.unparsed,
            divergent: node.divergent,
            expanded: self.is_expanded(id),
            description: node.description.clone(),
            children: node.children.iter().map(|c| self.record_of(*c)).collect(),
        }
    }
}

fn record_to_spec(record: FieldNodeRecord, expanded: &mut Vec<bool>) -> FieldSpec {
    expanded.push(record.expanded);
    let children = record
        .children
        .into_iter()
        .map(|child| record_to_spec(child, expanded))
        .collect();
    FieldSpec {
        name: record.name,
        kind: record.kind,
        required: record.required,
        min_occurs: record.min_occurs,
        max_occurs: record.max_occurs,
        item_kind: record.item_kind,
        unparsed: record.unparsed,
        divergent: record.divergent,
        description: record.description,
        children,
    }
}

impl Serialize for FieldTree {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.record_of(self.root_id()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldTree {
    /// Paths in the input are ignored and re-derived from names.
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let record = FieldNodeRecord::deserialize(deserializer)?;
        // Pre-order flags line up with pre-order arena ids.
        let mut flags = Vec::new();
        let spec = record_to_spec(record, &mut flags);
        let tree = FieldTree::from_root_spec(spec).map_err(serde::de::Error::custom)?;
        Ok(Self {
            expanded: Arc::new(flags),
            ..tree
        })
    }
}
