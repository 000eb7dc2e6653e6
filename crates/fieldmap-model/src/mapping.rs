//! Field mapping types.
//!
//! A [`MappingSet`] binds leaves of a source tree to leaves of a target tree.
//! It holds paths only; the trees are owned by their structures, and stale
//! paths are reported at validation time.

use serde::{Deserialize, Serialize};

use crate::ids::{FieldPath, MappingId, StructureId};

/// Transformation applied when a mapping is executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Transform {
    Identity,
    Custom { code: String },
}

impl Transform {
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Identity => None,
            Self::Custom { code } => Some(code),
        }
    }

    /// A custom transform doubles as an explicit aggregation/split marker.
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }
}

/// One binding of source leaves to exactly one target leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub id: MappingId,
    pub source_paths: Vec<FieldPath>,
    pub target_path: FieldPath,
    #[serde(default)]
    pub transform: Option<Transform>,
}

impl FieldMapping {
    pub fn new(source_paths: Vec<FieldPath>, target_path: FieldPath) -> Self {
        Self {
            id: MappingId::generate(),
            source_paths,
            target_path,
            transform: None,
        }
    }

    /// More than one source feeds the target.
    pub fn is_aggregation(&self) -> bool {
        self.source_paths.len() > 1
    }

    pub fn has_custom_transform(&self) -> bool {
        self.transform.as_ref().is_some_and(Transform::is_custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSet {
    pub id: String,
    pub name: String,
    pub source_structure_id: StructureId,
    pub target_structure_id: StructureId,
    #[serde(default)]
    pub mappings: Vec<FieldMapping>,
}

impl MappingSet {
    pub fn new(
        name: impl Into<String>,
        source_structure_id: StructureId,
        target_structure_id: StructureId,
    ) -> Self {
        Self {
            id: MappingId::generate().to_string(),
            name: name.into(),
            source_structure_id,
            target_structure_id,
            mappings: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn get(&self, id: &MappingId) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| &m.id == id)
    }

    /// The mapping bound to `target`, if any.
    pub fn for_target(&self, target: &FieldPath) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| &m.target_path == target)
    }

    /// Mappings that read `source`.
    pub fn for_source<'a, 'b>(&'a self, source: &'b FieldPath) -> impl Iterator<Item = &'a FieldMapping> + use<'a, 'b> {
        self.mappings
            .iter()
            .filter(move |m| m.source_paths.contains(source))
    }

    /// Both sides come from the same structure.
    pub fn is_self_mapping(&self) -> bool {
        self.source_structure_id == self.target_structure_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_wire_form() {
        let custom = Transform::Custom {
            code: "return a + b;".to_string(),
        };
        let json = serde_json::to_value(&custom).unwrap();
        assert_eq!(json["kind"], "custom");
        assert_eq!(json["code"], "return a + b;");

        let identity: Transform = serde_json::from_str(r#"{"kind":"identity"}"#).unwrap();
        assert_eq!(identity, Transform::Identity);
        assert!(identity.code().is_none());
    }

    #[test]
    fn lookups_by_target_and_source() {
        let mut set = MappingSet::new(
            "orders",
            StructureId::new("src").unwrap(),
            StructureId::new("dst").unwrap(),
        );
        let a = FieldPath::parse("/a").unwrap();
        let x = FieldPath::parse("/x").unwrap();
        set.mappings.push(FieldMapping::new(vec![a.clone()], x.clone()));

        assert!(set.for_target(&x).is_some());
        assert_eq!(set.for_source(&a).count(), 1);
        assert!(!set.is_self_mapping());
    }
}
