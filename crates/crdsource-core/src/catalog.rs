//! Catalog of data source descriptors
//!
//! Stored on disk as YAML:
//!
//! ```yaml
//! apiVersion: crdsource.io/v1
//! descriptors:
//!   - typeName: k8s_cert_manager_io_certificate_v1
//!     group: cert-manager.io
//!     ...
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::descriptor::{MANIFEST_SUFFIX, SchemaDescriptor, Variant};
use crate::error::{CoreError, Result};

pub const CATALOG_API_VERSION: &str = "crdsource.io/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    #[serde(default = "default_api_version")]
    api_version: String,
    #[serde(default)]
    descriptors: Vec<SchemaDescriptor>,
}

fn default_api_version() -> String {
    CATALOG_API_VERSION.to_string()
}

/// Descriptors indexed by data source type name, sorted by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    descriptors: IndexMap<String, SchemaDescriptor>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from descriptors; a repeated type name is an error
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = SchemaDescriptor>) -> Result<Self> {
        let mut catalog = Self::new();
        for descriptor in descriptors {
            catalog.insert(descriptor)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, descriptor: SchemaDescriptor) -> Result<()> {
        if descriptor.type_name.ends_with(MANIFEST_SUFFIX) {
            return Err(CoreError::InvalidCatalog {
                message: format!(
                    "type name '{}' must not end with '{}'",
                    descriptor.type_name, MANIFEST_SUFFIX
                ),
            });
        }
        if let Some(existing) = self.descriptors.get(&descriptor.type_name) {
            return Err(CoreError::InvalidCatalog {
                message: format!(
                    "duplicate type name '{}' ({} and {})",
                    descriptor.type_name,
                    existing.api_version(),
                    descriptor.api_version()
                ),
            });
        }
        // Keys stay sorted by type name
        self.descriptors
            .insert_sorted(descriptor.type_name.clone(), descriptor);
        Ok(())
    }

    /// Merge another catalog into this one
    pub fn extend(&mut self, other: Catalog) -> Result<()> {
        for descriptor in other.descriptors.into_values() {
            self.insert(descriptor)?;
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        if file.api_version != CATALOG_API_VERSION {
            return Err(CoreError::InvalidCatalog {
                message: format!(
                    "unsupported apiVersion '{}', expected '{}'",
                    file.api_version, CATALOG_API_VERSION
                ),
            });
        }
        Self::from_descriptors(file.descriptors)
    }

    pub fn to_yaml(&self) -> Result<String> {
        let file = CatalogFile {
            api_version: CATALOG_API_VERSION.to_string(),
            descriptors: self.descriptors.values().cloned().collect(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Resolve a data source type name to its descriptor and variant
    pub fn lookup(&self, type_name: &str) -> Result<(&SchemaDescriptor, Variant)> {
        if let Some(descriptor) = self.descriptors.get(type_name) {
            return Ok((descriptor, Variant::DataSource));
        }

        type_name
            .strip_suffix(MANIFEST_SUFFIX)
            .and_then(|base| self.descriptors.get(base))
            .map(|descriptor| (descriptor, Variant::Manifest))
            .ok_or_else(|| CoreError::UnknownDataSource {
                type_name: type_name.to_string(),
            })
    }

    pub fn get(&self, type_name: &str) -> Option<&SchemaDescriptor> {
        self.descriptors.get(type_name)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &SchemaDescriptor> {
        self.descriptors.values()
    }

    /// Every data source type name, both variants
    pub fn data_source_types(&self) -> Vec<String> {
        self.descriptors
            .values()
            .flat_map(|d| [d.type_name.clone(), d.manifest_type_name()])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
