//! Field node definitions.
//!
//! A [`FieldNode`] is one element of the canonical hierarchical field model
//! produced by schema normalization. Nodes live inside a
//! [`FieldTree`](crate::FieldTree) arena; their path and expansion state are
//! kept by the tree, not by the node.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// Data kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Date,
    Datetime,
    Object,
    Array,
}

impl FieldKind {
    /// True for kinds that may hold child fields.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }

    pub fn is_scalar(self) -> bool {
        !self.is_container()
    }

    /// Whether a value of this kind can be written into a `target` field
    /// without a custom transform: identical kinds, any scalar into a
    /// string, and a date into a datetime.
    pub fn converts_to(self, target: FieldKind) -> bool {
        self == target
            || (self.is_scalar() && target == Self::String)
            || (self == Self::Date && target == Self::Datetime)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Parse a kind name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "string" | "text" => Some(Self::String),
            "number" | "integer" | "decimal" => Some(Self::Number),
            "boolean" | "bool" => Some(Self::Boolean),
            "date" => Some(Self::Date),
            "datetime" | "date-time" => Some(Self::Datetime),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper cardinality bound. `Unbounded` is the "many" sentinel for
/// `maxOccurs="unbounded"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MaxOccursRepr", into = "MaxOccursRepr")]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

impl MaxOccurs {
    pub const ONE: MaxOccurs = MaxOccurs::Bounded(1);

    /// Parse an XML-style `maxOccurs` value.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unbounded") || s == "*" {
            return Some(Self::Unbounded);
        }
        s.parse().ok().map(Self::Bounded)
    }

    /// True when more than one value may occur.
    pub fn is_many(self) -> bool {
        match self {
            Self::Bounded(n) => n > 1,
            Self::Unbounded => true,
        }
    }
}

impl Default for MaxOccurs {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for MaxOccurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(n) => write!(f, "{n}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MaxOccursRepr {
    Count(u32),
    Word(String),
}

impl TryFrom<MaxOccursRepr> for MaxOccurs {
    type Error = String;

    fn try_from(value: MaxOccursRepr) -> Result<Self, Self::Error> {
        match value {
            MaxOccursRepr::Count(n) => Ok(Self::Bounded(n)),
            MaxOccursRepr::Word(w) => {
                Self::parse(&w).ok_or_else(|| format!("invalid maxOccurs value {w:?}"))
            }
        }
    }
}

impl From<MaxOccurs> for MaxOccursRepr {
    fn from(value: MaxOccurs) -> Self {
        match value {
            MaxOccurs::Bounded(n) => Self::Count(n),
            MaxOccurs::Unbounded => Self::Word("unbounded".to_string()),
        }
    }
}

/// One node of a field tree.
///
/// Schema attributes are public; identity and structure (`id`, `parent`,
/// `children`) are owned by the tree and read through accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Local field name (not a path).
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub min_occurs: u32,
    pub max_occurs: MaxOccurs,
    /// Element kind of a scalar array leaf, when known.
    pub item_kind: Option<FieldKind>,
    /// Schema construct the normalizer could not interpret.
    pub unparsed: bool,
    /// Array whose sample elements did not share the first element's shape.
    pub divergent: bool,
    pub description: Option<String>,
}

impl FieldNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn child_ids(&self) -> &[NodeId] {
        &self.children
    }

    /// A node is a leaf iff it has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Required flag or a positive lower bound.
    pub fn is_required(&self) -> bool {
        self.required || self.min_occurs >= 1
    }

    /// Multi-valued on its own (ignores ancestors).
    pub fn is_many(&self) -> bool {
        self.max_occurs.is_many()
    }
}

/// Construction-time description of a field and its subtree.
///
/// Used by the interactive field builder (custom structures) and by the
/// schema normalizers to assemble a [`FieldTree`](crate::FieldTree).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default = "default_one")]
    pub min_occurs: u32,
    #[serde(default)]
    pub max_occurs: MaxOccurs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_kind: Option<FieldKind>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unparsed: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub divergent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldSpec>,
}

fn default_true() -> bool {
    true
}

fn default_one() -> u32 {
    1
}

impl FieldSpec {
    /// A required, single-valued field with default `(1,1)` cardinality.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            min_occurs: 1,
            max_occurs: MaxOccurs::ONE,
            item_kind: None,
            unparsed: false,
            divergent: false,
            description: None,
            children: Vec::new(),
        }
    }

    pub fn object(name: impl Into<String>, children: Vec<FieldSpec>) -> Self {
        Self::new(name, FieldKind::Object).with_children(children)
    }

    /// An array node; `children` describe the element shape (empty for scalars).
    pub fn array(name: impl Into<String>, children: Vec<FieldSpec>) -> Self {
        Self::new(name, FieldKind::Array)
            .with_max(MaxOccurs::Unbounded)
            .with_children(children)
    }

    /// Opaque leaf standing in for a schema construct that was not understood.
    pub fn opaque(name: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut spec = Self::new(name, FieldKind::String);
        spec.unparsed = true;
        spec.description = Some(reason.into());
        spec
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<FieldSpec>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self.min_occurs = 0;
        self
    }

    #[must_use]
    pub fn with_occurs(mut self, min: u32, max: MaxOccurs) -> Self {
        self.min_occurs = min;
        self.max_occurs = max;
        self.required = min >= 1;
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: MaxOccurs) -> Self {
        self.max_occurs = max;
        self
    }

    #[must_use]
    pub fn with_item_kind(mut self, kind: FieldKind) -> Self {
        self.item_kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn mark_divergent(mut self) -> Self {
        self.divergent = true;
        self
    }
}
