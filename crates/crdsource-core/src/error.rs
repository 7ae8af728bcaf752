//! Core error types

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration for {type_name}: {}", summarize(errors))]
    InvalidConfig {
        type_name: String,
        errors: Vec<ValidationErrorInfo>,
    },

    #[error("Missing required attribute: {attribute}")]
    MissingAttribute { attribute: String },

    #[error("Failed to decode {kind} at {path}: expected {expected}, found {found}")]
    Decode {
        kind: String,
        path: String,
        expected: String,
        found: String,
    },

    #[error("Failed to encode manifest at {path}: {message}")]
    Encode { path: String, message: String },

    #[error("Unknown data source type: {type_name}")]
    UnknownDataSource { type_name: String },

    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("Invalid catalog: {message}")]
    InvalidCatalog { message: String },

    #[error("Values merge error: {message}")]
    ValuesMerge { message: String },
}

impl CoreError {
    /// Validation errors carried by this error, if any
    pub fn validation_errors(&self) -> &[ValidationErrorInfo] {
        match self {
            CoreError::InvalidConfig { errors, .. } => errors,
            _ => &[],
        }
    }
}

fn summarize(errors: &[ValidationErrorInfo]) -> String {
    match errors {
        [] => "no details".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

/// A single validation failure with the attribute path it applies to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationErrorInfo {
    /// Attribute path (e.g. `/spec/issuer_ref/name`)
    pub path: String,
    /// Human readable message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl ValidationErrorInfo {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }
}

impl std::fmt::Display for ValidationErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
