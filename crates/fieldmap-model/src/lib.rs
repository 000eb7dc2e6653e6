//! Canonical data model for the structure and field-mapping engine.
//!
//! - [`FieldTree`]: arena-backed hierarchical field model with path and
//!   presentation side tables
//! - [`DataStructure`]: a normalized schema with its tree and scoping tags
//! - [`MappingSet`] / [`FieldMapping`]: source-leaf to target-leaf bindings
//! - [`AdapterConfig`]: opaque adapter configuration records
//!
//! Every operation here is synchronous and free of I/O.

pub mod adapter;
pub mod diff;
pub mod error;
pub mod field;
pub mod ids;
pub mod mapping;
pub mod structure;
pub mod tree;

pub use adapter::{
    AdapterConfig, AdapterConfigSchema, ConfigError, ConfigKey, ConfigValue, ConfigValueType,
};
pub use diff::{FieldChange, FieldSignature, TreeDiff, diff};
pub use error::{ModelError, Result};
pub use field::{FieldKind, FieldNode, FieldSpec, MaxOccurs};
pub use ids::{FieldPath, MappingId, NodeId, StructureId, validate_field_name};
pub use mapping::{FieldMapping, MappingSet, Transform};
pub use structure::{
    DataStructure, NamespaceBinding, StructureFormat, StructureUsage, XmlNamespace,
};
pub use tree::{DEFAULT_ROOT_NAME, FieldTree, Leaves};
