//! Mock cluster reader for testing
//!
//! Objects are held in memory, useful for unit tests and for hosts that want
//! to exercise the read path without a Kubernetes cluster.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::client::{ClusterReader, ResourceRef};
use crate::error::{KubeError, Result};

/// Object key: api version, plural, namespace (empty when cluster scoped), name
type ObjectKey = (String, String, String, String);

/// In-memory cluster reader for testing
#[derive(Clone, Default)]
pub struct MockClusterReader {
    objects: Arc<RwLock<HashMap<ObjectKey, JsonValue>>>,
    /// Track calls for assertions
    gets: Arc<RwLock<usize>>,
    /// Error returned by every `get` when set
    failure: Arc<RwLock<Option<String>>>,
}

impl MockClusterReader {
    /// Create a new empty reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object under the reference it would be read with
    pub fn insert(&self, resource: &ResourceRef, object: JsonValue) {
        let mut objects = self.objects.write().unwrap_or_else(|e| e.into_inner());
        objects.insert(key(resource), object);
    }

    /// Make every subsequent `get` fail with an API error
    pub fn fail_with(&self, message: impl Into<String>) {
        let mut failure = self.failure.write().unwrap_or_else(|e| e.into_inner());
        *failure = Some(message.into());
    }

    /// Number of `get` calls made so far
    pub fn get_count(&self) -> usize {
        *self.gets.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Reset call counts
    pub fn reset_counts(&self) {
        *self.gets.write().unwrap_or_else(|e| e.into_inner()) = 0;
    }
}

fn key(resource: &ResourceRef) -> ObjectKey {
    (
        resource.api_version(),
        resource.plural.clone(),
        resource.namespace.clone().unwrap_or_default(),
        resource.name.clone(),
    )
}

#[async_trait]
impl ClusterReader for MockClusterReader {
    async fn get(&self, resource: &ResourceRef) -> Result<JsonValue> {
        {
            let mut gets = self.gets.write().unwrap_or_else(|e| e.into_inner());
            *gets += 1;
        }

        if let Some(message) = self
            .failure
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(KubeError::Api(kube::Error::Api(
                kube::core::ErrorResponse {
                    status: "Failure".to_string(),
                    message,
                    reason: "InternalError".to_string(),
                    code: 500,
                },
            )));
        }

        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        objects
            .get(&key(resource))
            .cloned()
            .ok_or_else(|| resource.not_found())
    }
}
