//! Data structure definitions.
//!
//! A [`DataStructure`] is the persisted result of normalizing one schema
//! source. It owns its [`FieldTree`] exclusively and is immutable once saved;
//! edits go through [`DataStructure::clone_as`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::StructureId;
use crate::tree::FieldTree;

/// Origin format of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureFormat {
    Json,
    Xsd,
    Wsdl,
    Custom,
}

impl StructureFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xsd => "xsd",
            Self::Wsdl => "wsdl",
            Self::Custom => "custom",
        }
    }

    /// True for XML-based formats, which carry namespace information.
    pub fn is_xml(self) -> bool {
        matches!(self, Self::Xsd | Self::Wsdl)
    }
}

impl std::fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a mapping a structure may appear on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureUsage {
    Source,
    Target,
    #[default]
    Both,
}

impl StructureUsage {
    pub fn allows_source(self) -> bool {
        matches!(self, Self::Source | Self::Both)
    }

    pub fn allows_target(self) -> bool {
        matches!(self, Self::Target | Self::Both)
    }
}

/// Namespace prefix/URI pair declared by an XML schema.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespaceBinding {
    /// Empty for the default namespace.
    pub prefix: String,
    pub uri: String,
}

/// Namespace information captured once per structure, never per node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XmlNamespace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,
    #[serde(default)]
    pub bindings: Vec<NamespaceBinding>,
}

impl XmlNamespace {
    pub fn uri_for(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.target_namespace.is_none() && self.bindings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStructure {
    pub id: StructureId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub format: StructureFormat,
    #[serde(default)]
    pub usage: StructureUsage,
    #[serde(rename = "rootNode")]
    pub tree: FieldTree,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<XmlNamespace>,
    pub created_at: DateTime<Utc>,
    /// Customer scope; `None` means shared by all customers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_component: Option<String>,
}

impl DataStructure {
    pub fn new(name: impl Into<String>, format: StructureFormat, tree: FieldTree) -> Self {
        Self {
            id: StructureId::generate(),
            name: name.into(),
            description: String::new(),
            format,
            usage: StructureUsage::default(),
            tree,
            namespace: None,
            created_at: Utc::now(),
            customer_id: None,
            business_component: None,
        }
    }

    #[must_use]
    pub fn with_usage(mut self, usage: StructureUsage) -> Self {
        self.usage = usage;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: XmlNamespace) -> Self {
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    #[must_use]
    pub fn with_scope(
        mut self,
        customer_id: Option<String>,
        business_component: Option<String>,
    ) -> Self {
        self.customer_id = customer_id;
        self.business_component = business_component;
        self
    }

    /// Copy-on-write clone: same shape, new identity and creation time.
    pub fn clone_as(&self, name: impl Into<String>) -> Self {
        Self {
            id: StructureId::generate(),
            name: name.into(),
            created_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Clone with a replacement tree (e.g. after a custom-builder edit).
    pub fn clone_with_tree(&self, tree: FieldTree) -> Self {
        Self {
            tree,
            ..self.clone_as(self.name.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldKind, FieldSpec};

    fn sample() -> DataStructure {
        let tree = FieldTree::from_specs("Order", vec![FieldSpec::new("id", FieldKind::String)])
            .unwrap();
        DataStructure::new("Order", StructureFormat::Json, tree)
    }

    #[test]
    fn clone_as_gets_new_identity() {
        let original = sample();
        let copy = original.clone_as("Order v2");
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "Order v2");
        assert!(copy.tree.same_shape(&original.tree));
    }

    #[test]
    fn serializes_tree_as_root_node() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["rootNode"]["children"][0]["path"], "/id");
        assert_eq!(json["format"], "json");
        assert_eq!(json["usage"], "both");
        assert!(json.get("namespace").is_none());
    }

    #[test]
    fn empty_namespace_is_dropped() {
        let structure = sample().with_namespace(XmlNamespace::default());
        assert!(structure.namespace.is_none());
    }
}
