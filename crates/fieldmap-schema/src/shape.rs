//! Sample documents generated from a field tree.

use serde_json::{Map, Value};

use fieldmap_model::{FieldKind, FieldNode, FieldTree, NodeId};

/// Build a JSON sample with the tree's shape.
///
/// Normalizing the sample again yields the same leaf paths. Repeated fields
/// are emitted as one-element arrays; scalars get a placeholder of their kind.
pub fn to_json_sample(tree: &FieldTree) -> Value {
    Value::Object(fields_of(tree, tree.root_id()))
}

fn fields_of(tree: &FieldTree, id: NodeId) -> Map<String, Value> {
    tree.children(id)
        .map(|child| (child.name.clone(), node_value(tree, child)))
        .collect()
}

fn node_value(tree: &FieldTree, node: &FieldNode) -> Value {
    match node.kind {
        FieldKind::Array if node.is_leaf() => match node.item_kind {
            Some(kind) => Value::Array(vec![placeholder(kind)]),
            None => Value::Array(Vec::new()),
        },
        FieldKind::Array => Value::Array(vec![Value::Object(fields_of(tree, node.id()))]),
        FieldKind::Object if node.is_many() => {
            Value::Array(vec![Value::Object(fields_of(tree, node.id()))])
        }
        FieldKind::Object => Value::Object(fields_of(tree, node.id())),
        kind if node.is_many() => Value::Array(vec![placeholder(kind)]),
        kind => placeholder(kind),
    }
}

fn placeholder(kind: FieldKind) -> Value {
    match kind {
        FieldKind::Number => Value::from(0),
        FieldKind::Boolean => Value::Bool(false),
        FieldKind::Date => Value::from("1970-01-01"),
        FieldKind::Datetime => Value::from("1970-01-01T00:00:00Z"),
        FieldKind::Object => Value::Object(Map::new()),
        FieldKind::Array => Value::Array(Vec::new()),
        FieldKind::String => Value::from(""),
    }
}
