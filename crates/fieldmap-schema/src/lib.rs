//! Schema normalization for the field-mapping engine.
//!
//! Turns heterogeneous schema sources into the canonical
//! [`FieldTree`](fieldmap_model::FieldTree):
//!
//! - JSON sample documents and JSON Schema
//! - XSD (elements, complex/simple types, compositors, attributes, references)
//! - WSDL (messages and parts over embedded schemas)
//! - Custom field-builder definitions
//!
//! Normalization is pure: it either yields a complete tree or a
//! [`SchemaParseError`] with a machine-readable reason.

pub mod error;
pub mod input;
mod custom;
mod json;
mod json_schema;
pub mod normalizer;
pub mod shape;
mod wsdl;
mod xml;
mod xsd;

pub use error::{ParseReason, Result, SchemaParseError};
pub use input::{NormalizeOptions, RawSchemaInput, StructureRequest};
pub use json::{ITEM_FIELD, ITEMS_FIELD, VALUE_FIELD, temporal_kind};
pub use normalizer::{NormalizedSchema, Normalizer, normalize};
pub use shape::to_json_sample;
pub use xsd::TEXT_FIELD;
