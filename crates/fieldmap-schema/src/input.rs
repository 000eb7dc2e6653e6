//! Normalizer inputs and options.

use serde::{Deserialize, Serialize};

use fieldmap_model::{DEFAULT_ROOT_NAME, FieldSpec, StructureFormat, StructureUsage};

use crate::error::{Result, SchemaParseError};

/// Raw schema source handed to the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSchemaInput {
    /// JSON text: either a sample document or a JSON Schema.
    Json(String),
    /// Already-parsed JSON value.
    JsonValue(serde_json::Value),
    Xsd(String),
    Wsdl(String),
    /// Field definitions from the interactive field builder.
    Custom(Vec<FieldSpec>),
}

impl RawSchemaInput {
    /// Wrap text of a known format. `Custom` text is read as a JSON array of
    /// field definitions.
    pub fn from_text(format: StructureFormat, text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        Ok(match format {
            StructureFormat::Json => Self::Json(text),
            StructureFormat::Xsd => Self::Xsd(text),
            StructureFormat::Wsdl => Self::Wsdl(text),
            StructureFormat::Custom => Self::Custom(custom_fields(&text)?),
        })
    }

    /// Guess the format of a text input.
    ///
    /// JSON is recognized by its first significant character; XML is WSDL
    /// when the root element is `definitions` or `description`, XSD otherwise.
    pub fn detect(text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim_start_matches('\u{feff}').trim_start();
        if !trimmed.starts_with('<') {
            return Self::Json(text);
        }
        if root_local_name(trimmed).is_some_and(|name| name == "definitions" || name == "description") {
            Self::Wsdl(text)
        } else {
            Self::Xsd(text)
        }
    }

    pub fn format(&self) -> StructureFormat {
        match self {
            Self::Json(_) | Self::JsonValue(_) => StructureFormat::Json,
            Self::Xsd(_) => StructureFormat::Xsd,
            Self::Wsdl(_) => StructureFormat::Wsdl,
            Self::Custom(_) => StructureFormat::Custom,
        }
    }
}

/// Well-formed JSON of the wrong shape is a field error, not a JSON error.
fn custom_fields(text: &str) -> Result<Vec<FieldSpec>> {
    serde_json::from_str(text).map_err(|err| match err.classify() {
        serde_json::error::Category::Data => SchemaParseError::invalid_field(err.to_string()),
        _ => SchemaParseError::invalid_json(err.to_string()),
    })
}

/// Local name of the first element tag, skipping declarations and comments.
fn root_local_name(text: &str) -> Option<&str> {
    let mut rest = text;
    loop {
        let start = rest.find('<')?;
        rest = &rest[start + 1..];
        if rest.starts_with('?') || rest.starts_with('!') {
            continue;
        }
        let end = rest.find(|c: char| c.is_whitespace() || c == '>' || c == '/')?;
        let qname = &rest[..end];
        return Some(qname.rsplit(':').next().unwrap_or(qname));
    }
}

/// Options controlling how schemas are turned into trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Name of the synthetic root node.
    pub root_name: String,
    /// Recognize ISO dates and RFC 3339 timestamps in JSON samples.
    pub detect_dates: bool,
    /// Nesting limit for recursive XSD types before an opaque leaf is emitted.
    pub max_depth: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.to_string(),
            detect_dates: true,
            max_depth: 32,
        }
    }
}

/// Metadata for a structure created from a normalized schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureRequest {
    pub name: String,
    pub description: String,
    pub usage: StructureUsage,
    pub customer_id: Option<String>,
    pub business_component: Option<String>,
}

impl StructureRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_usage(mut self, usage: StructureUsage) -> Self {
        self.usage = usage;
        self
    }
}
