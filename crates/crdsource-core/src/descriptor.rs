//! Schema descriptors
//!
//! A [`SchemaDescriptor`] is the declarative description of one data source:
//! which CRD version it reads, and the full attribute tree a user may set or
//! will get back. Descriptors are plain data so they can be produced by the
//! CRD generator, saved to a catalog file and loaded back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Suffix that selects the manifest variant of a data source
pub const MANIFEST_SUFFIX: &str = "_manifest";

/// Whether resources of a kind live in a namespace or at cluster level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ResourceScope {
    #[default]
    Namespaced,
    Cluster,
}

impl std::fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Namespaced => write!(f, "Namespaced"),
            Self::Cluster => write!(f, "Cluster"),
        }
    }
}

/// Which of the two data-source flavours a type name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Reads the object from a live cluster
    DataSource,
    /// Renders configuration to YAML without network access
    Manifest,
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataSource => write!(f, "data source"),
            Self::Manifest => write!(f, "manifest"),
        }
    }
}

/// Declarative description of one CRD version exposed as data sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescriptor {
    /// Data source type name (e.g. `k8s_cert_manager_io_certificate_v1`)
    pub type_name: String,

    /// API group, empty for the core group
    pub group: String,

    /// API version within the group
    pub version: String,

    /// Resource kind (e.g. `Certificate`)
    pub kind: String,

    /// Plural resource name used in API paths (e.g. `certificates`)
    pub plural: String,

    #[serde(default)]
    pub scope: ResourceScope,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,

    /// Top-level fields besides `apiVersion`, `kind`, `metadata` and `status`
    #[serde(default)]
    pub fields: Vec<Attribute>,
}

impl SchemaDescriptor {
    /// `group/version`, or just `version` for the core group
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn manifest_type_name(&self) -> String {
        format!("{}{}", self.type_name, MANIFEST_SUFFIX)
    }

    pub fn is_namespaced(&self) -> bool {
        self.scope == ResourceScope::Namespaced
    }

    /// Look up a top-level field by attribute name
    pub fn field(&self, name: &str) -> Option<&Attribute> {
        self.fields.iter().find(|a| a.name == name)
    }

    /// Resolve an attribute path such as `["spec", "issuer_ref", "name"]`
    pub fn find_attribute(&self, path: &[&str]) -> Option<&Attribute> {
        let (first, rest) = path.split_first()?;
        let mut current = self.field(first)?;
        for segment in rest {
            current = current.kind.child(segment)?;
        }
        Some(current)
    }

    /// The `metadata` block shared by every descriptor
    pub fn metadata_attributes(&self) -> Vec<Attribute> {
        let mut namespace = Attribute::new("namespace", "namespace", AttributeKind::String)
            .with_description("Namespace defines the space within which each name must be unique.")
            .with_validator(Validator::Namespace);
        if self.is_namespaced() {
            namespace = namespace.required();
        }

        vec![
            Attribute::new("name", "name", AttributeKind::String)
                .required()
                .with_description("Unique name of this object within its namespace.")
                .with_validator(Validator::ResourceName),
            namespace,
            Attribute::new("labels", "labels", AttributeKind::string_map())
                .with_description(
                    "Map of string keys and values that can be used to organize and categorize objects.",
                )
                .with_validator(Validator::Labels),
            Attribute::new("annotations", "annotations", AttributeKind::string_map())
                .with_description(
                    "Unstructured key value map stored with a resource that may be set by external tools.",
                )
                .with_validator(Validator::Annotations),
        ]
    }

    /// Number of attributes in the whole tree, metadata excluded
    pub fn attribute_count(&self) -> usize {
        fn count(attrs: &[Attribute]) -> usize {
            attrs
                .iter()
                .map(|a| 1 + a.kind.nested_attributes().map_or(0, count))
                .sum()
        }
        count(&self.fields)
    }
}

/// A single user-facing attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Framework-facing name (snake_case)
    pub name: String,

    /// Key in the Kubernetes JSON representation
    pub json_name: String,

    pub kind: AttributeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, json_name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            json_name: json_name.into(),
            kind,
            description: None,
            required: false,
            validators: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }
}

/// Type of an attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AttributeKind {
    String,
    Integer,
    Number,
    Bool,
    /// `x-kubernetes-int-or-string`
    IntOrString,
    /// Arbitrary JSON (preserved unknown fields or untyped schema)
    Dynamic,
    Map { values: Box<AttributeKind> },
    List { items: Box<AttributeKind> },
    Object { attributes: Vec<Attribute> },
}

impl AttributeKind {
    pub fn string_map() -> Self {
        Self::Map {
            values: Box::new(Self::String),
        }
    }

    pub fn list_of(items: AttributeKind) -> Self {
        Self::List {
            items: Box::new(items),
        }
    }

    pub fn object(attributes: Vec<Attribute>) -> Self {
        Self::Object { attributes }
    }

    /// Nested attributes when this is an object (or a collection of objects)
    pub fn nested_attributes(&self) -> Option<&[Attribute]> {
        match self {
            Self::Object { attributes } => Some(attributes),
            Self::List { items } => items.nested_attributes(),
            Self::Map { values } => values.nested_attributes(),
            _ => None,
        }
    }

    /// Child attribute by name, looking through lists and maps
    pub fn child(&self, name: &str) -> Option<&Attribute> {
        self.nested_attributes()?.iter().find(|a| a.name == name)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::String | Self::Integer | Self::Number | Self::Bool | Self::IntOrString
        )
    }
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Number => write!(f, "number"),
            Self::Bool => write!(f, "bool"),
            Self::IntOrString => write!(f, "int-or-string"),
            Self::Dynamic => write!(f, "dynamic"),
            Self::Map { values } => write!(f, "map({})", values),
            Self::List { items } => write!(f, "list({})", items),
            Self::Object { .. } => write!(f, "object"),
        }
    }
}

/// Constraint attached to an attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "value", rename_all = "camelCase")]
pub enum Validator {
    /// Value must be one of the listed values
    OneOf(Vec<JsonValue>),
    /// String must match the regex
    Pattern(String),
    MinLength(u64),
    MaxLength(u64),
    AtLeast(f64),
    AtMost(f64),
    MinItems(u64),
    MaxItems(u64),
    /// DNS-1123 subdomain
    ResourceName,
    /// DNS-1123 label
    Namespace,
    /// Label keys and values
    Labels,
    /// Annotation keys and total size
    Annotations,
}

impl std::fmt::Display for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneOf(values) => {
                let values: Vec<String> = values.iter().map(JsonValue::to_string).collect();
                write!(f, "one of [{}]", values.join(", "))
            }
            Self::Pattern(p) => write!(f, "matches {}", p),
            Self::MinLength(n) => write!(f, "length >= {}", n),
            Self::MaxLength(n) => write!(f, "length <= {}", n),
            Self::AtLeast(n) => write!(f, ">= {}", n),
            Self::AtMost(n) => write!(f, "<= {}", n),
            Self::MinItems(n) => write!(f, "items >= {}", n),
            Self::MaxItems(n) => write!(f, "items <= {}", n),
            Self::ResourceName => write!(f, "resource name"),
            Self::Namespace => write!(f, "namespace name"),
            Self::Labels => write!(f, "label syntax"),
            Self::Annotations => write!(f, "annotation syntax"),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Certificate-like descriptor shared by the crate's tests
    pub(crate) fn certificate_descriptor() -> SchemaDescriptor {
        let issuer_ref = AttributeKind::object(vec![
            Attribute::new("name", "name", AttributeKind::String).required(),
            Attribute::new("kind", "kind", AttributeKind::String).with_validator(
                Validator::OneOf(vec!["Issuer".into(), "ClusterIssuer".into()]),
            ),
        ]);

        let spec = AttributeKind::object(vec![
            Attribute::new("secret_name", "secretName", AttributeKind::String)
                .required()
                .with_validator(Validator::MaxLength(253)),
            Attribute::new("issuer_ref", "issuerRef", issuer_ref).required(),
            Attribute::new("duration", "duration", AttributeKind::String)
                .with_validator(Validator::Pattern("^[0-9]+(h|m|s)$".into())),
            Attribute::new("dns_names", "dnsNames", AttributeKind::list_of(AttributeKind::String)),
            Attribute::new("revision_history_limit", "revisionHistoryLimit", AttributeKind::Integer)
                .with_validator(Validator::AtLeast(1.0)),
            Attribute::new("is_ca", "isCA", AttributeKind::Bool),
            Attribute::new("port", "port", AttributeKind::IntOrString),
            Attribute::new("ratio", "ratio", AttributeKind::Number),
            Attribute::new("extra", "extra", AttributeKind::Dynamic),
            Attribute::new("secret_labels", "secretLabels", AttributeKind::string_map()),
        ]);

        SchemaDescriptor {
            type_name: "k8s_cert_manager_io_certificate_v1".into(),
            group: "cert-manager.io".into(),
            version: "v1".into(),
            kind: "Certificate".into(),
            plural: "certificates".into(),
            scope: ResourceScope::Namespaced,
            description: Some("A Certificate resource".into()),
            deprecated: false,
            fields: vec![Attribute::new("spec", "spec", spec)],
        }
    }

    #[test]
    fn test_api_version() {
        let mut descriptor = certificate_descriptor();
        assert_eq!(descriptor.api_version(), "cert-manager.io/v1");

        descriptor.group = String::new();
        assert_eq!(descriptor.api_version(), "v1");
    }

    #[test]
    fn test_manifest_type_name() {
        let descriptor = certificate_descriptor();
        assert_eq!(
            descriptor.manifest_type_name(),
            "k8s_cert_manager_io_certificate_v1_manifest"
        );
    }

    #[test]
    fn test_find_attribute() {
        let descriptor = certificate_descriptor();
        let attr = descriptor
            .find_attribute(&["spec", "issuer_ref", "name"])
            .unwrap();
        assert_eq!(attr.json_name, "name");
        assert!(attr.required);

        assert!(descriptor.find_attribute(&["spec", "missing"]).is_none());
        assert!(descriptor.find_attribute(&[]).is_none());
    }

    #[test]
    fn test_namespace_required_only_when_namespaced() {
        let mut descriptor = certificate_descriptor();
        let meta = descriptor.metadata_attributes();
        assert!(meta.iter().find(|a| a.name == "namespace").unwrap().required);

        descriptor.scope = ResourceScope::Cluster;
        let meta = descriptor.metadata_attributes();
        assert!(!meta.iter().find(|a| a.name == "namespace").unwrap().required);
    }

    #[test]
    fn test_attribute_count() {
        // spec + 10 spec fields + 2 issuer_ref fields
        assert_eq!(certificate_descriptor().attribute_count(), 13);
    }

    #[test]
    fn test_descriptor_yaml_roundtrip_keeps_kinds() {
        let descriptor = certificate_descriptor();
        let yaml = serde_yaml::to_string(&descriptor).unwrap();
        assert!(yaml.contains("jsonName: secretName"));
        assert!(yaml.contains("type: intOrString"));

        let parsed: SchemaDescriptor = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, descriptor);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(AttributeKind::string_map().to_string(), "map(string)");
        assert_eq!(
            AttributeKind::list_of(AttributeKind::object(vec![])).to_string(),
            "list(object)"
        );
    }
}
