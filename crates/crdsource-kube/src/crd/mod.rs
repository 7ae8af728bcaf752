//! CRD (CustomResourceDefinition) handling
//!
//! - **Schema representation** (`schema`): structured types for CRD schemas
//! - **Parsing** (`parser`): parse CRD YAML into schema structures
//! - **Generation** (`generator`): turn each served version into a
//!   [`SchemaDescriptor`](crdsource_core::SchemaDescriptor)
//!
//! ```text
//!   CRD YAML ──► CrdParser ──► CrdSchema ──► DescriptorGenerator ──► Catalog
//! ```

mod generator;
mod parser;
mod schema;

pub use generator::{DEFAULT_PREFIX, DescriptorGenerator, GeneratorOptions};
pub use parser::CrdParser;
pub use schema::{
    AdditionalProperties, CrdNames, CrdSchema, CrdVersionSchema, PropertyType, SchemaProperty,
};

#[cfg(test)]
pub(crate) mod tests {
    pub(crate) const CERTIFICATE_CRD: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../fixtures/crds/certificate.yaml"
    ));

    pub(crate) const CLUSTER_ISSUER_CRD: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../fixtures/crds/clusterissuer.yaml"
    ));
}
