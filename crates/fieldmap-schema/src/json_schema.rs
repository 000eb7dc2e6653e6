//! JSON Schema normalization.
//!
//! Supports the structural subset needed for field mapping: `properties`,
//! `required`, `items`, `minItems`/`maxItems`, `format` for dates, local
//! `$ref` pointers and single-variant `anyOf`/`oneOf`/`allOf` wrappers.
//! Anything else becomes an opaque leaf.

use std::collections::HashSet;

use serde_json::Value;

use fieldmap_model::{FieldKind, FieldSpec, FieldTree, MaxOccurs};

use crate::error::{Result, SchemaParseError};
use crate::input::NormalizeOptions;
use crate::json::{ITEM_FIELD, ITEMS_FIELD};

/// A document is read as a schema when it declares `$schema`, or is an
/// object schema with a `properties` map.
pub(crate) fn is_json_schema(value: &Value) -> bool {
    let Value::Object(map) = value else {
        return false;
    };
    map.contains_key("$schema")
        || (map.get("type").and_then(Value::as_str) == Some("object")
            && map.get("properties").is_some_and(Value::is_object))
}

pub(crate) fn normalize(schema: &Value, options: &NormalizeOptions) -> Result<FieldTree> {
    let mut walker = SchemaWalker {
        root: schema,
        max_depth: options.max_depth,
        active: vec!["#"],
    };
    let root = walker
        .resolve(schema)
        .map_err(|reference| SchemaParseError::empty(format!("unresolved root reference {reference}")))?;

    let fields = match schema_type(root).as_deref() {
        Some("array") => vec![walker.array(ITEMS_FIELD, root, 0)],
        _ if root.get("properties").is_some() => walker.object_fields(root, 0),
        _ => Vec::new(),
    };
    if fields.is_empty() {
        return Err(SchemaParseError::empty("JSON Schema declares no properties"));
    }
    Ok(FieldTree::from_specs(options.root_name.clone(), fields)?)
}

struct SchemaWalker<'a> {
    root: &'a Value,
    max_depth: usize,
    /// `$ref` targets currently being expanded.
    active: Vec<&'a str>,
}

impl<'a> SchemaWalker<'a> {
    /// Follow local `$ref` pointers. Returns the unresolvable reference on failure.
    fn resolve(&self, mut schema: &'a Value) -> std::result::Result<&'a Value, String> {
        for _ in 0..=self.max_depth {
            let Some(reference) = schema.get("$ref").and_then(Value::as_str) else {
                return Ok(schema);
            };
            schema = match reference.strip_prefix('#') {
                Some("") => self.root,
                Some(pointer) => self
                    .root
                    .pointer(pointer)
                    .ok_or_else(|| reference.to_string())?,
                None => return Err(reference.to_string()),
            };
        }
        Err("reference chain too long".to_string())
    }

    fn object_fields(&mut self, schema: &'a Value, depth: usize) -> Vec<FieldSpec> {
        let required: HashSet<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            return Vec::new();
        };
        properties
            .iter()
            .map(|(name, property)| {
                let spec = self.field(name, property, depth + 1);
                if required.contains(name.as_str()) {
                    spec
                } else {
                    spec.optional()
                }
            })
            .collect()
    }

    fn field(&mut self, name: &str, schema: &'a Value, depth: usize) -> FieldSpec {
        if depth > self.max_depth {
            return FieldSpec::opaque(name, "schema nesting exceeds depth limit");
        }
        let Some(reference) = schema.get("$ref").and_then(Value::as_str) else {
            return self.resolved_field(name, schema, depth);
        };
        if self.active.contains(&reference) {
            tracing::debug!(field = name, reference, "recursive JSON Schema reference");
            return FieldSpec::opaque(name, format!("recursive reference {reference}"));
        }
        self.active.push(reference);
        let spec = self.resolved_field(name, schema, depth);
        self.active.pop();
        spec
    }

    fn resolved_field(&mut self, name: &str, schema: &'a Value, depth: usize) -> FieldSpec {
        let schema = match self.resolve(schema) {
            Ok(schema) => schema,
            Err(reference) => {
                tracing::warn!(field = name, reference = %reference, "unresolved JSON Schema reference");
                return FieldSpec::opaque(name, format!("unresolved reference {reference}"));
            }
        };

        let spec = match schema_type(schema).as_deref() {
            Some("object") => FieldSpec::object(name, self.object_fields(schema, depth)),
            Some("array") => self.array(name, schema, depth),
            Some("string") => FieldSpec::new(name, string_kind(schema)),
            Some("integer" | "number") => FieldSpec::new(name, FieldKind::Number),
            Some("boolean") => FieldSpec::new(name, FieldKind::Boolean),
            Some("null") => FieldSpec::new(name, FieldKind::String),
            Some(other) => FieldSpec::opaque(name, format!("unsupported type {other}")),
            None => self.untyped(name, schema, depth),
        };
        match schema.get("description").and_then(Value::as_str) {
            Some(description) if spec.description.is_none() => spec.with_description(description),
            _ => spec,
        }
    }

    /// Schemas without `type`: infer from keywords, unwrap single variants.
    fn untyped(&mut self, name: &str, schema: &'a Value, depth: usize) -> FieldSpec {
        if schema.get("properties").is_some() {
            return FieldSpec::object(name, self.object_fields(schema, depth));
        }
        if schema.get("items").is_some() {
            return self.array(name, schema, depth);
        }
        if let Some(value) = schema
            .get("const")
            .or_else(|| schema.get("enum").and_then(|e| e.get(0)))
        {
            return FieldSpec::new(name, value_kind(value));
        }
        for keyword in ["anyOf", "oneOf", "allOf"] {
            let Some(variants) = schema.get(keyword).and_then(Value::as_array) else {
                continue;
            };
            let mut concrete = variants
                .iter()
                .filter(|v| v.get("type").and_then(Value::as_str) != Some("null"));
            return match (concrete.next(), concrete.next()) {
                (Some(only), None) => self.field(name, only, depth),
                _ => FieldSpec::opaque(name, format!("{keyword} with several variants")),
            };
        }
        FieldSpec::opaque(name, "untyped schema")
    }

    fn array(&mut self, name: &str, schema: &'a Value, depth: usize) -> FieldSpec {
        let element = schema
            .get("items")
            .map(|items| self.field(ITEM_FIELD, items, depth + 1));
        let mut spec = match element {
            None => FieldSpec::array(name, Vec::new()),
            Some(element) if element.kind == FieldKind::Object => {
                FieldSpec::array(name, element.children)
            }
            Some(element) if element.kind.is_scalar() && !element.unparsed => {
                FieldSpec::array(name, Vec::new()).with_item_kind(element.kind)
            }
            Some(element) => FieldSpec::array(name, vec![element]),
        };
        if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
            spec.min_occurs = clamp(min);
        }
        if let Some(max) = schema.get("maxItems").and_then(Value::as_u64) {
            spec.max_occurs = MaxOccurs::Bounded(clamp(max));
        }
        spec
    }
}

/// First non-null entry of `type`, which may be a string or a list.
fn schema_type(schema: &Value) -> Option<String> {
    match schema.get("type")? {
        Value::String(ty) => Some(ty.clone()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|ty| *ty != "null")
            .map(str::to_string),
        _ => None,
    }
}

fn string_kind(schema: &Value) -> FieldKind {
    match schema.get("format").and_then(Value::as_str) {
        Some("date") => FieldKind::Date,
        Some("date-time") => FieldKind::Datetime,
        _ => FieldKind::String,
    }
}

fn value_kind(value: &Value) -> FieldKind {
    match value {
        Value::Bool(_) => FieldKind::Boolean,
        Value::Number(_) => FieldKind::Number,
        _ => FieldKind::String,
    }
}

fn clamp(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize_json(value: &Value) -> FieldTree {
        normalize(value, &NormalizeOptions::default()).unwrap()
    }

    #[test]
    fn detects_schemas() {
        assert!(is_json_schema(&json!({"$schema": "x"})));
        assert!(is_json_schema(&json!({"type": "object", "properties": {}})));
        assert!(!is_json_schema(&json!({"type": "object"})));
        assert!(!is_json_schema(&json!([1])));
    }

    #[test]
    fn required_and_optional_properties() {
        let tree = normalize_json(&json!({
            "type": "object",
            "required": ["orderId"],
            "properties": {
                "orderId": {"type": "string"},
                "placed": {"type": "string", "format": "date-time"},
                "lines": {
                    "type": "array",
                    "minItems": 1,
                    "items": {"type": "object", "properties": {"sku": {"type": "string"}}}
                }
            }
        }));
        let order_id = tree.find_by_path_str("/orderId").unwrap();
        assert!(order_id.required);
        let placed = tree.find_by_path_str("/placed").unwrap();
        assert!(!placed.required);
        assert_eq!(placed.kind, FieldKind::Datetime);
        let lines = tree.find_by_path_str("/lines").unwrap();
        assert_eq!(lines.max_occurs, MaxOccurs::Unbounded);
        assert!(tree.find_by_path_str("/lines/sku").is_some());
    }

    #[test]
    fn local_refs_resolve_and_missing_refs_are_opaque() {
        let tree = normalize_json(&json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": {
                "billing": {"$ref": "#/$defs/address"},
                "other": {"$ref": "#/$defs/missing"},
                "tags": {"type": "array", "items": {"type": "string"}, "maxItems": 5}
            },
            "$defs": {
                "address": {"type": "object", "properties": {"city": {"type": "string"}}}
            }
        }));
        assert!(tree.find_by_path_str("/billing/city").is_some());
        assert!(tree.find_by_path_str("/other").unwrap().unparsed);
        let tags = tree.find_by_path_str("/tags").unwrap();
        assert_eq!(tags.item_kind, Some(FieldKind::String));
        assert_eq!(tags.max_occurs, MaxOccurs::Bounded(5));
    }

    #[test]
    fn recursive_refs_become_opaque() {
        let tree = normalize_json(&json!({
            "$schema": "x",
            "type": "object",
            "properties": {"node": {"$ref": "#/$defs/node"}},
            "$defs": {"node": {"type": "object", "properties": {"next": {"$ref": "#/$defs/node"}}}}
        }));
        assert!(tree.find_by_path_str("/node/next").unwrap().unparsed);
    }

    #[test]
    fn branching_ref_cycles_stay_small() {
        let tree = normalize_json(&json!({
            "$schema": "x",
            "type": "object",
            "properties": {"expr": {"$ref": "#/$defs/and"}},
            "$defs": {
                "and": {"type": "object", "properties": {
                    "and": {"$ref": "#/$defs/and"},
                    "or": {"$ref": "#/$defs/or"}
                }},
                "or": {"type": "object", "properties": {
                    "and": {"$ref": "#/$defs/and"},
                    "or": {"$ref": "#/$defs/or"}
                }}
            }
        }));
        assert!(tree.find_by_path_str("/expr/and").unwrap().unparsed);
        assert!(tree.find_by_path_str("/expr/or/and").unwrap().unparsed);
        assert!(tree.find_by_path_str("/expr/or/or").unwrap().unparsed);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn self_reference_to_root_is_opaque() {
        let tree = normalize_json(&json!({
            "$schema": "x",
            "type": "object",
            "properties": {"id": {"type": "string"}, "parent": {"$ref": "#"}}
        }));
        assert!(tree.find_by_path_str("/parent").unwrap().unparsed);
    }

    #[test]
    fn schema_without_properties_is_empty() {
        let err = normalize(&json!({"$schema": "x", "type": "string"}), &NormalizeOptions::default())
            .unwrap_err();
        assert_eq!(err.reason, crate::error::ParseReason::EmptyStructure);
    }
}
