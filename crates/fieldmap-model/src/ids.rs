use std::fmt;

use crate::ModelError;

/// Identifier of a persisted [`DataStructure`](crate::DataStructure).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct StructureId(String);

impl StructureId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StructureId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StructureId> for String {
    fn from(id: StructureId) -> Self {
        id.0
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a [`FieldMapping`](crate::FieldMapping) within a mapping set.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct MappingId(String);

impl MappingId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MappingId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MappingId> for String {
    fn from(id: MappingId) -> Self {
        id.0
    }
}

impl fmt::Display for MappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Arena index of a node inside one [`FieldTree`](crate::FieldTree).
///
/// Ids are assigned in declaration pre-order when the tree is built, so they
/// are stable for a given tree but carry no meaning across trees.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Absolute `/`-delimited path of a field from the tree root.
///
/// The root itself is `/`; its children are `/name`, and so on. Paths are
/// always derived from names, never edited by hand.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(String);

impl FieldPath {
    pub const SEPARATOR: char = '/';

    /// Path of the tree root.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn parse(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed == "/" {
            return Ok(Self::root());
        }
        let Some(rest) = trimmed.strip_prefix(Self::SEPARATOR) else {
            return Err(ModelError::InvalidPath(value));
        };
        let rest = rest.strip_suffix(Self::SEPARATOR).unwrap_or(rest);
        if rest.split(Self::SEPARATOR).any(|s| s.trim().is_empty()) {
            return Err(ModelError::InvalidPath(value));
        }
        Ok(Self(format!("/{rest}")))
    }

    /// Path of a child named `name` below this path.
    pub fn child(&self, name: &str) -> Self {
        if self.is_root() {
            Self(format!("/{name}"))
        } else {
            Self(format!("{}/{name}", self.0))
        }
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(Self::SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Last segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments().last()
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind(Self::SEPARATOR) {
            Some(0) | None => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
        }
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// True when `other` lies strictly below this path.
    pub fn is_ancestor_of(&self, other: &FieldPath) -> bool {
        if self.is_root() {
            return !other.is_root();
        }
        other
            .0
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.starts_with(Self::SEPARATOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FieldPath {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for FieldPath {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check a local field name: non-empty, no path separator.
pub fn validate_field_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() || name.contains(FieldPath::SEPARATOR) {
        return Err(ModelError::InvalidFieldName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_paths() {
        assert_eq!(FieldPath::parse("/a/b/").unwrap().as_str(), "/a/b");
        assert_eq!(FieldPath::parse(" /a ").unwrap().as_str(), "/a");
        assert!(FieldPath::parse("/").unwrap().is_root());
        assert!(FieldPath::parse("a/b").is_err());
        assert!(FieldPath::parse("/a//b").is_err());
    }

    #[test]
    fn child_and_parent_are_inverse() {
        let root = FieldPath::root();
        let a = root.child("a");
        let ab = a.child("b");
        assert_eq!(ab.as_str(), "/a/b");
        assert_eq!(ab.parent(), Some(a.clone()));
        assert_eq!(a.parent(), Some(root.clone()));
        assert_eq!(root.parent(), None);
        assert_eq!(ab.name(), Some("b"));
        assert_eq!(ab.depth(), 2);
    }

    #[test]
    fn ancestry_respects_segment_boundaries() {
        let a = FieldPath::parse("/a").unwrap();
        assert!(a.is_ancestor_of(&FieldPath::parse("/a/b").unwrap()));
        assert!(!a.is_ancestor_of(&FieldPath::parse("/ab").unwrap()));
        assert!(!a.is_ancestor_of(&a));
        assert!(FieldPath::root().is_ancestor_of(&a));
    }

    #[test]
    fn rejects_blank_ids_and_names() {
        assert!(StructureId::new("  ").is_err());
        assert!(MappingId::new("").is_err());
        assert!(validate_field_name("a/b").is_err());
        assert!(validate_field_name("@id").is_ok());
    }
}
