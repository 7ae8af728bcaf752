//! crdsource core - schema descriptors and manifest rendering
//!
//! This crate provides the pieces of a CRD data source that never touch a
//! cluster:
//! - `SchemaDescriptor`: declarative attribute tree for one CRD version
//! - `Catalog`: descriptors indexed by data source type name
//! - `ConfigValidator`: configuration checks compiled from a descriptor
//! - `ResourceData`: typed data holder with attribute/JSON dual naming
//! - `render_config`: the manifest variant, configuration to YAML
//! - `Values`: configuration assembly with deep merge

pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod holder;
pub mod manifest;
pub mod schema;
pub mod validation;
pub mod values;

pub use catalog::{CATALOG_API_VERSION, Catalog};
pub use descriptor::{
    Attribute, AttributeKind, MANIFEST_SUFFIX, ResourceScope, SchemaDescriptor, Validator, Variant,
};
pub use error::{CoreError, Result, ValidationErrorInfo};
pub use holder::{AttrValue, Naming, ObjectValue, ResourceData, ResourceMetadata};
pub use manifest::{RenderedManifest, render_config, render_manifest};
pub use schema::{ConfigValidator, ValidationResult};
pub use values::{Values, parse_set_string_values, parse_set_values};
