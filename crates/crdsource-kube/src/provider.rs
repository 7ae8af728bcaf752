//! Data source host dispatch
//!
//! [`Provider`] is what a host (the CLI, or a framework adapter) talks to:
//! it resolves a type name against the catalog and runs either the manifest
//! render or the cluster read.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crdsource_core::schema::config_json_schema;
use crdsource_core::{
    Catalog, ConfigValidator, SchemaDescriptor, ValidationResult, Variant, render_config,
};

use crate::client::ClusterReader;
use crate::datasource::read_data_source;
use crate::error::{KubeError, Result};

/// Attributes computed by the data source rather than configured
pub const ID_ATTRIBUTE: &str = "id";
pub const YAML_ATTRIBUTE: &str = "yaml";

/// Everything a host needs to declare one data source type
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceSchema<'a> {
    pub type_name: String,
    #[serde(serialize_with = "serialize_variant")]
    pub variant: Variant,
    pub descriptor: &'a SchemaDescriptor,
    /// Attributes only present in the result
    pub computed: Vec<&'static str>,
    /// JSON Schema of the accepted configuration
    pub config_schema: JsonValue,
}

fn serialize_variant<S: serde::Serializer>(variant: &Variant, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(match variant {
        Variant::DataSource => "dataSource",
        Variant::Manifest => "manifest",
    })
}

/// Catalog-backed data source provider
pub struct Provider<R> {
    catalog: Catalog,
    reader: Option<R>,
}

impl<R: ClusterReader> Provider<R> {
    /// Provider without cluster access; only manifest reads succeed
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            reader: None,
        }
    }

    pub fn with_reader(catalog: Catalog, reader: R) -> Self {
        Self {
            catalog,
            reader: Some(reader),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn reader(&self) -> Option<&R> {
        self.reader.as_ref()
    }

    /// Every type name this provider serves, both variants
    pub fn data_source_types(&self) -> Vec<String> {
        self.catalog.data_source_types()
    }

    pub fn schema(&self, type_name: &str) -> Result<DataSourceSchema<'_>> {
        let (descriptor, variant) = self.catalog.lookup(type_name)?;
        let computed = match variant {
            Variant::DataSource => vec![ID_ATTRIBUTE],
            Variant::Manifest => vec![ID_ATTRIBUTE, YAML_ATTRIBUTE],
        };

        Ok(DataSourceSchema {
            type_name: type_name.to_string(),
            variant,
            descriptor,
            computed,
            config_schema: config_json_schema(descriptor, variant),
        })
    }

    /// Check a configuration without reading or rendering anything
    pub fn validate(&self, type_name: &str, config: &JsonValue) -> Result<ValidationResult> {
        let (descriptor, variant) = self.catalog.lookup(type_name)?;
        let validator = ConfigValidator::new(descriptor, variant)?;
        Ok(validator.validate(config))
    }

    /// Produce the state for a configuration
    ///
    /// The manifest variant renders locally and never needs a reader. The
    /// data-source variant reads from the cluster.
    pub async fn read(&self, type_name: &str, config: &JsonValue) -> Result<JsonValue> {
        let (descriptor, variant) = self.catalog.lookup(type_name)?;
        tracing::debug!(type_name, %variant, "read");

        match variant {
            Variant::Manifest => Ok(render_config(descriptor, config)?.state),
            Variant::DataSource => {
                let reader = self.reader.as_ref().ok_or_else(|| {
                    KubeError::InvalidConfig(format!(
                        "{} reads from a cluster but no cluster is configured",
                        type_name
                    ))
                })?;
                read_data_source(reader, descriptor, config).await
            }
        }
    }
}
