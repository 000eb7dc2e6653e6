//! Adapter configuration records.
//!
//! Adapter configurations are owned by the adapter catalog. Where the mapping
//! engine has to carry one, it is treated as a closed record of named scalar
//! values checked against the schema the catalog publishes for that adapter
//! type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl ConfigValue {
    pub fn value_type(&self) -> ConfigValueType {
        match self {
            Self::Boolean(_) => ConfigValueType::Boolean,
            Self::Number(_) => ConfigValueType::Number,
            Self::String(_) => ConfigValueType::String,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigValueType {
    String,
    Number,
    Boolean,
}

/// Opaque configuration of one adapter instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterConfig {
    pub adapter_type: String,
    #[serde(default)]
    pub values: BTreeMap<String, ConfigValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigKey {
    pub value_type: ConfigValueType,
    #[serde(default)]
    pub required: bool,
}

/// Per-adapter-type schema supplied by the adapter catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterConfigSchema {
    pub adapter_type: String,
    pub keys: BTreeMap<String, ConfigKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("configuration is for adapter type {found:?}, schema is for {expected:?}")]
    WrongAdapterType { expected: String, found: String },
    #[error("unknown configuration key {0:?}")]
    UnknownKey(String),
    #[error("missing required configuration key {0:?}")]
    MissingKey(String),
    #[error("configuration key {key:?} expects {expected:?}, found {found:?}")]
    WrongType {
        key: String,
        expected: ConfigValueType,
        found: ConfigValueType,
    },
}

impl AdapterConfigSchema {
    /// Check a configuration record; every problem is reported.
    pub fn validate(&self, config: &AdapterConfig) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if config.adapter_type != self.adapter_type {
            errors.push(ConfigError::WrongAdapterType {
                expected: self.adapter_type.clone(),
                found: config.adapter_type.clone(),
            });
        }
        for (key, value) in &config.values {
            match self.keys.get(key) {
                None => errors.push(ConfigError::UnknownKey(key.clone())),
                Some(spec) if spec.value_type != value.value_type() => {
                    errors.push(ConfigError::WrongType {
                        key: key.clone(),
                        expected: spec.value_type,
                        found: value.value_type(),
                    });
                }
                Some(_) => {}
            }
        }
        for (key, spec) in &self.keys {
            if spec.required && !config.values.contains_key(key) {
                errors.push(ConfigError::MissingKey(key.clone()));
            }
        }
        errors
    }
}
