//! crdsource Kube - CRD data sources backed by a Kubernetes cluster
//!
//! This crate provides:
//! - **CRD handling**: parse CustomResourceDefinitions and generate schema
//!   descriptors for every served version
//! - **Catalog building**: load CRDs from files and directories
//! - **Cluster reads**: the `ClusterReader` seam, a kube-rs implementation
//!   and an in-memory mock
//! - **Provider**: type-name dispatch between manifest rendering and
//!   cluster reads

pub mod catalog;
pub mod client;
pub mod crd;
pub mod datasource;
pub mod error;
pub mod mock;
pub mod provider;

pub use catalog::{CatalogBuilder, catalog_from_paths};
pub use client::{ClusterConfig, ClusterReader, DEFAULT_TIMEOUT, KubeReader, ResourceRef};
pub use crd::{CrdParser, CrdSchema, DEFAULT_PREFIX, DescriptorGenerator, GeneratorOptions};
pub use datasource::{ReadPhase, read_data_source};
pub use error::{KubeError, Result};
pub use mock::MockClusterReader;
pub use provider::{DataSourceSchema, ID_ATTRIBUTE, Provider, YAML_ATTRIBUTE};
