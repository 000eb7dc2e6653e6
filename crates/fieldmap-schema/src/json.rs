//! JSON sample normalization.
//!
//! A sample document is read structurally: objects become object nodes in
//! key order, arrays take the shape of their first non-null element, and
//! scalars get a kind from their JSON type. Every field inferred from a
//! sample is required with `(1,1)` cardinality, except array nodes which
//! are unbounded.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use fieldmap_model::{FieldKind, FieldSpec, FieldTree};

use crate::error::{Result, SchemaParseError};
use crate::input::NormalizeOptions;
use crate::json_schema;

/// Field holding a scalar top-level sample.
pub const VALUE_FIELD: &str = "value";
/// Field holding a top-level array sample.
pub const ITEMS_FIELD: &str = "items";
/// Element field of a nested array (`[[...]]`).
pub const ITEM_FIELD: &str = "item";

pub(crate) fn normalize_text(text: &str, options: &NormalizeOptions) -> Result<FieldTree> {
    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Err(SchemaParseError::empty("JSON input is empty"));
    }
    let value: Value = serde_json::from_str(text)?;
    normalize_value(&value, options)
}

pub(crate) fn normalize_value(value: &Value, options: &NormalizeOptions) -> Result<FieldTree> {
    if json_schema::is_json_schema(value) {
        tracing::debug!("input recognized as JSON Schema");
        return json_schema::normalize(value, options);
    }

    let sampler = Sampler {
        detect_dates: options.detect_dates,
    };
    let fields = match value {
        Value::Object(map) => sampler.fields(map),
        Value::Array(items) if items.iter().all(Value::is_null) => Vec::new(),
        Value::Array(items) => vec![sampler.array(ITEMS_FIELD, items)],
        scalar => vec![FieldSpec::new(VALUE_FIELD, sampler.scalar_kind(scalar))],
    };
    if fields.is_empty() {
        return Err(SchemaParseError::empty("JSON sample declares no fields"));
    }
    Ok(FieldTree::from_specs(options.root_name.clone(), fields)?)
}

struct Sampler {
    detect_dates: bool,
}

impl Sampler {
    fn fields(&self, map: &Map<String, Value>) -> Vec<FieldSpec> {
        map.iter().map(|(name, value)| self.field(name, value)).collect()
    }

    fn field(&self, name: &str, value: &Value) -> FieldSpec {
        match value {
            Value::Object(map) => FieldSpec::object(name, self.fields(map)),
            Value::Array(items) => self.array(name, items),
            scalar => FieldSpec::new(name, self.scalar_kind(scalar)),
        }
    }

    fn array(&self, name: &str, items: &[Value]) -> FieldSpec {
        let mut elements = items.iter().filter(|item| !item.is_null());
        let Some(first) = elements.next() else {
            return FieldSpec::array(name, Vec::new());
        };

        let spec = match first {
            Value::Object(map) => FieldSpec::array(name, self.fields(map)),
            Value::Array(inner) => FieldSpec::array(name, vec![self.array(ITEM_FIELD, inner)]),
            scalar => FieldSpec::array(name, Vec::new()).with_item_kind(self.scalar_kind(scalar)),
        };

        let shape = self.field(ITEM_FIELD, first);
        if elements.any(|element| self.field(ITEM_FIELD, element) != shape) {
            tracing::warn!(
                field = name,
                elements = items.len(),
                "array elements do not share one shape; using the first element"
            );
            return spec.mark_divergent();
        }
        spec
    }

    fn scalar_kind(&self, value: &Value) -> FieldKind {
        match value {
            Value::Bool(_) => FieldKind::Boolean,
            Value::Number(_) => FieldKind::Number,
            Value::String(s) if self.detect_dates => temporal_kind(s).unwrap_or(FieldKind::String),
            _ => FieldKind::String,
        }
    }
}

/// `date` for `YYYY-MM-DD`, `datetime` for RFC 3339 or ISO local timestamps.
pub fn temporal_kind(value: &str) -> Option<FieldKind> {
    let value = value.trim();
    if value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        return Some(FieldKind::Date);
    }
    if DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
    {
        return Some(FieldKind::Datetime);
    }
    None
}
