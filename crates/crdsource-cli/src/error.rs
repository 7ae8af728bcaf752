//! CLI error types with exit code handling
//!
//! Every library error is funnelled into [`CliError`], which knows the exit
//! code the process should end with.

use crdsource_core::CoreError;
use crdsource_kube::KubeError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Configuration rejected (schema, identity or --set syntax)
    #[error("Validation failed: {message}")]
    #[diagnostic(code(crdsource::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Manifest encoding or object transcription failed
    #[error("Render error: {message}")]
    #[diagnostic(code(crdsource::cli::render))]
    Render {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Unknown type name, unreadable catalog or invalid CRD
    #[error("Catalog error: {message}")]
    #[diagnostic(code(crdsource::cli::catalog))]
    Catalog {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, unparsable input)
    #[error("IO error: {message}")]
    #[diagnostic(code(crdsource::cli::io))]
    Io { message: String },

    /// Kubeconfig, transport, API or not found
    #[error("Cluster error: {message}")]
    #[diagnostic(code(crdsource::cli::cluster))]
    Cluster {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(crdsource::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Render { .. } => exit_codes::RENDER_ERROR,
            CliError::Catalog { .. } => exit_codes::CATALOG_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Cluster { .. } => exit_codes::CLUSTER_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: None,
        }
    }

    pub fn catalog_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::InvalidConfig { .. }
            | CoreError::MissingAttribute { .. }
            | CoreError::ValuesMerge { .. } => CliError::Validation {
                message,
                help: Some("run `crdsource validate` for the full list of errors".to_string()),
            },
            CoreError::Decode { .. } | CoreError::Encode { .. } => CliError::Render {
                message,
                help: None,
            },
            CoreError::UnknownDataSource { .. } => CliError::Catalog {
                message,
                help: Some("run `crdsource list` to see the available types".to_string()),
            },
            CoreError::InvalidCatalog { .. } | CoreError::InvalidSchema { .. } => {
                CliError::Catalog {
                    message,
                    help: None,
                }
            }
            CoreError::Io(_) | CoreError::YamlParse(_) | CoreError::JsonParse(_) => {
                CliError::Io { message }
            }
        }
    }
}

impl From<KubeError> for CliError {
    fn from(err: KubeError) -> Self {
        let message = err.to_string();
        match err {
            KubeError::Core(core) => core.into(),
            KubeError::InvalidCrd(_) => CliError::Catalog {
                message,
                help: None,
            },
            KubeError::Serialization(_) => CliError::Render {
                message,
                help: None,
            },
            KubeError::Io(_) => CliError::Io { message },
            KubeError::Kubeconfig(_) => CliError::Cluster {
                message,
                help: Some("check --kubeconfig, --context or the KUBECONFIG variable".to_string()),
            },
            _ => CliError::Cluster {
                message,
                help: None,
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Render {
            message: err.to_string(),
            help: None,
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
