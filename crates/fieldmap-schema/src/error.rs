//! Error types for schema normalization.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fieldmap_model::ModelError;

/// Machine-readable reason attached to every [`SchemaParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseReason {
    /// Input is not well-formed JSON.
    InvalidJson,
    /// Input is not well-formed XML, or not the expected XML vocabulary.
    InvalidXml,
    /// Input parsed but declares no fields.
    EmptyStructure,
    /// A custom field definition is malformed.
    InvalidField,
}

impl ParseReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidJson => "invalid-json",
            Self::InvalidXml => "invalid-xml",
            Self::EmptyStructure => "empty-structure",
            Self::InvalidField => "invalid-field",
        }
    }
}

impl std::fmt::Display for ParseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalization failure. Nothing is persisted when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{reason}: {detail}")]
pub struct SchemaParseError {
    pub reason: ParseReason,
    pub detail: String,
}

impl SchemaParseError {
    pub fn new(reason: ParseReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }

    pub fn invalid_json(detail: impl Into<String>) -> Self {
        Self::new(ParseReason::InvalidJson, detail)
    }

    pub fn invalid_xml(detail: impl Into<String>) -> Self {
        Self::new(ParseReason::InvalidXml, detail)
    }

    pub fn empty(detail: impl Into<String>) -> Self {
        Self::new(ParseReason::EmptyStructure, detail)
    }

    pub fn invalid_field(detail: impl Into<String>) -> Self {
        Self::new(ParseReason::InvalidField, detail)
    }

    /// Hint shown next to the error in user-facing output.
    pub fn suggestion(&self) -> &'static str {
        match self.reason {
            ParseReason::InvalidJson => "Check the sample for trailing commas or unquoted keys",
            ParseReason::InvalidXml => {
                "Check that the document is well-formed and rooted at xs:schema or wsdl:definitions"
            }
            ParseReason::EmptyStructure => "Provide a sample or schema that declares at least one field",
            ParseReason::InvalidField => "Field names must be non-empty, unique per parent and contain no '/'",
        }
    }
}

impl From<serde_json::Error> for SchemaParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_json(err.to_string())
    }
}

impl From<quick_xml::Error> for SchemaParseError {
    fn from(err: quick_xml::Error) -> Self {
        Self::invalid_xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for SchemaParseError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::invalid_xml(err.to_string())
    }
}

impl From<ModelError> for SchemaParseError {
    fn from(err: ModelError) -> Self {
        Self::invalid_field(err.to_string())
    }
}

/// Result type for normalization.
pub type Result<T> = std::result::Result<T, SchemaParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SchemaParseError::empty("no fields");
        assert_eq!(err.to_string(), "empty-structure: no fields");
    }

    #[test]
    fn test_reason_wire_form() {
        let json = serde_json::to_value(SchemaParseError::invalid_xml("bad")).unwrap();
        assert_eq!(json["reason"], "invalid-xml");
        assert_eq!(json["detail"], "bad");
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: SchemaParseError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.reason, ParseReason::InvalidJson);
    }
}
