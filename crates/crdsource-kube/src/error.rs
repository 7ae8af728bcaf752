//! Error types for crdsource-kube

use crdsource_core::CoreError;
use thiserror::Error;

/// Result type for crdsource-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur while generating descriptors or reading from a cluster
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Kubernetes API or transport error, passed through unchanged
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// The requested object does not exist
    #[error("{kind} '{}' not found", display_id(namespace.as_deref(), name))]
    NotFound {
        kind: String,
        name: String,
        namespace: Option<String>,
    },

    /// Kubeconfig could not be loaded or has no usable context
    #[error("kubeconfig error: {0}")]
    Kubeconfig(String),

    /// A document is not a usable CustomResourceDefinition
    #[error("invalid CRD: {0}")]
    InvalidCrd(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema, validation, decode and render errors from crdsource-core
    #[error(transparent)]
    Core(#[from] CoreError),
}

fn display_id(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{}/{}", ns, name),
        None => name.to_string(),
    }
}

impl From<serde_json::Error> for KubeError {
    fn from(e: serde_json::Error) -> Self {
        KubeError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for KubeError {
    fn from(e: serde_yaml::Error) -> Self {
        KubeError::Serialization(e.to_string())
    }
}

impl KubeError {
    /// Check if this is a Kubernetes 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        match self {
            KubeError::NotFound { .. } => true,
            KubeError::Api(kube::Error::Api(resp)) => resp.code == 404,
            _ => false,
        }
    }

    /// Check if the configuration was rejected before any network call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            KubeError::Core(CoreError::InvalidConfig { .. } | CoreError::MissingAttribute { .. })
        )
    }
}
