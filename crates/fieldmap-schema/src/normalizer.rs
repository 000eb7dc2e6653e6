//! Format dispatch and structure creation.

use fieldmap_model::{DataStructure, FieldTree, XmlNamespace};

use crate::custom;
use crate::error::Result;
use crate::input::{NormalizeOptions, RawSchemaInput, StructureRequest};
use crate::json;
use crate::wsdl;
use crate::xsd;

/// Result of normalizing one schema source.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSchema {
    pub tree: FieldTree,
    /// Namespace information of XML sources.
    pub namespace: Option<XmlNamespace>,
    /// Number of opaque leaves standing in for constructs that were not understood.
    pub unparsed: usize,
}

impl NormalizedSchema {
    fn plain(tree: FieldTree) -> Self {
        Self {
            tree,
            namespace: None,
            unparsed: 0,
        }
    }
}

/// Converts raw schema sources into field trees.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize one input. Fails with a [`SchemaParseError`](crate::SchemaParseError)
    /// and produces nothing when the input cannot be read.
    pub fn normalize(&self, input: &RawSchemaInput) -> Result<NormalizedSchema> {
        let format = input.format();
        let result = match input {
            RawSchemaInput::Json(text) => {
                json::normalize_text(text, &self.options).map(NormalizedSchema::plain)
            }
            RawSchemaInput::JsonValue(value) => {
                json::normalize_value(value, &self.options).map(NormalizedSchema::plain)
            }
            RawSchemaInput::Xsd(text) => xsd::normalize_text(text, &self.options),
            RawSchemaInput::Wsdl(text) => wsdl::normalize_text(text, &self.options),
            RawSchemaInput::Custom(fields) => {
                custom::normalize_fields(fields, &self.options).map(NormalizedSchema::plain)
            }
        };

        match &result {
            Ok(schema) => tracing::debug!(
                format = %format,
                nodes = schema.tree.len(),
                leaves = schema.tree.leaves().count(),
                unparsed = schema.unparsed,
                "schema normalized"
            ),
            Err(err) => tracing::warn!(
                format = %format,
                reason = %err.reason,
                detail = %err.detail,
                "schema normalization failed"
            ),
        }
        result
    }

    /// Normalize an input and wrap it in a new [`DataStructure`].
    pub fn normalize_structure(
        &self,
        input: &RawSchemaInput,
        request: &StructureRequest,
    ) -> Result<DataStructure> {
        let schema = self.normalize(input)?;
        let mut structure = DataStructure::new(request.name.clone(), input.format(), schema.tree)
            .with_usage(request.usage)
            .with_description(request.description.clone())
            .with_scope(request.customer_id.clone(), request.business_component.clone());
        if let Some(namespace) = schema.namespace {
            structure = structure.with_namespace(namespace);
        }
        tracing::info!(
            structure = %structure.id,
            name = %structure.name,
            format = %structure.format,
            "structure created"
        );
        Ok(structure)
    }
}

/// Normalize with default options and return the tree only.
pub fn normalize(input: &RawSchemaInput) -> Result<FieldTree> {
    Normalizer::default().normalize(input).map(|schema| schema.tree)
}
