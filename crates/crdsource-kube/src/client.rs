//! Cluster API boundary
//!
//! [`ClusterReader`] is the only seam between the data source and a live
//! cluster: one `get` by group/version/kind/plural, namespace and name.
//! [`KubeReader`] implements it with kube-rs dynamic objects.

use async_trait::async_trait;
use kube::{
    Client, Config,
    api::{Api, DynamicObject},
    config::{KubeConfigOptions, Kubeconfig},
    core::GroupVersionKind,
    discovery::ApiResource,
};
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::time::Duration;

use crdsource_core::SchemaDescriptor;

use crate::error::{KubeError, Result};

/// Default connect and read timeout for cluster requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fully qualified reference to one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
    /// `None` for cluster scoped kinds
    pub namespace: Option<String>,
    pub name: String,
}

impl ResourceRef {
    pub fn new(descriptor: &SchemaDescriptor, name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            group: descriptor.group.clone(),
            version: descriptor.version.clone(),
            kind: descriptor.kind.clone(),
            plural: descriptor.plural.clone(),
            namespace: if descriptor.is_namespaced() {
                namespace
            } else {
                None
            },
            name: name.into(),
        }
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&self.group, &self.version, &self.kind);
        ApiResource::from_gvk_with_plural(&gvk, &self.plural)
    }

    pub(crate) fn not_found(&self) -> KubeError {
        KubeError::NotFound {
            kind: self.kind.clone(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{} {}/{}", self.kind, ns, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

/// Read access to a cluster
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait ClusterReader: Send + Sync {
    /// Fetch one object as JSON
    ///
    /// A missing object is [`KubeError::NotFound`], never an empty value.
    async fn get(&self, resource: &ResourceRef) -> Result<JsonValue>;
}

/// Which cluster to talk to and how long to wait
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Kubeconfig file; the default lookup (`KUBECONFIG`, `~/.kube/config`,
    /// in-cluster) applies when unset
    pub kubeconfig: Option<PathBuf>,
    /// Context to use instead of the current one
    pub context: Option<String>,
    /// Connect and read timeout
    pub timeout: Duration,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClusterConfig {
    async fn client_config(&self) -> Result<Config> {
        let options = KubeConfigOptions {
            context: self.context.clone(),
            ..Default::default()
        };

        let mut config = match (&self.kubeconfig, &self.context) {
            (Some(path), _) => {
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    KubeError::Kubeconfig(format!("{}: {}", path.display(), e))
                })?;
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| KubeError::Kubeconfig(e.to_string()))?
            }
            (None, Some(_)) => Config::from_kubeconfig(&options)
                .await
                .map_err(|e| KubeError::Kubeconfig(e.to_string()))?,
            (None, None) => Config::infer()
                .await
                .map_err(|e| KubeError::Kubeconfig(e.to_string()))?,
        };

        config.connect_timeout = Some(self.timeout);
        config.read_timeout = Some(self.timeout);
        Ok(config)
    }
}

/// [`ClusterReader`] backed by a kube-rs client
#[derive(Clone)]
pub struct KubeReader {
    client: Client,
}

impl KubeReader {
    /// Connect using the given cluster configuration
    pub async fn connect(config: &ClusterConfig) -> Result<Self> {
        let client_config = config.client_config().await?;
        tracing::debug!(
            cluster = %client_config.cluster_url,
            namespace = %client_config.default_namespace,
            "connecting to cluster"
        );
        let client = Client::try_from(client_config)?;
        Ok(Self { client })
    }

    /// Create with an existing Kubernetes client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn api_for(&self, resource: &ResourceRef) -> Api<DynamicObject> {
        let api_resource = resource.api_resource();
        match &resource.namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &api_resource),
            None => Api::all_with(self.client.clone(), &api_resource),
        }
    }
}

#[async_trait]
impl ClusterReader for KubeReader {
    async fn get(&self, resource: &ResourceRef) -> Result<JsonValue> {
        tracing::debug!(resource = %resource, api_version = %resource.api_version(), "get");
        let object = self
            .api_for(resource)
            .get_opt(&resource.name)
            .await?
            .ok_or_else(|| resource.not_found())?;
        Ok(serde_json::to_value(&object)?)
    }
}
