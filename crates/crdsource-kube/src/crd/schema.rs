//! CRD schema representation
//!
//! Structured view of a CustomResourceDefinition, reduced to what the
//! descriptor generator needs: names, scope, versions and each version's
//! OpenAPI v3 schema.

use std::collections::BTreeMap;

use crdsource_core::ResourceScope;

/// A parsed CustomResourceDefinition
#[derive(Debug, Clone, PartialEq)]
pub struct CrdSchema {
    /// Full CRD name (e.g., "certificates.cert-manager.io")
    pub name: String,
    /// API group (e.g., "cert-manager.io")
    pub group: String,
    pub scope: ResourceScope,
    pub names: CrdNames,
    /// API versions with their schemas
    pub versions: Vec<CrdVersionSchema>,
}

impl CrdSchema {
    /// Versions the API server serves, in declaration order
    pub fn served_versions(&self) -> impl Iterator<Item = &CrdVersionSchema> {
        self.versions.iter().filter(|v| v.served)
    }
}

/// CRD naming information
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrdNames {
    /// Kind (e.g., "Certificate")
    pub kind: String,
    /// Plural name used in API paths (e.g., "certificates")
    pub plural: String,
}

/// A single API version of a CRD
#[derive(Debug, Clone, PartialEq)]
pub struct CrdVersionSchema {
    /// Version name (e.g., "v1", "v1beta1")
    pub name: String,
    pub served: bool,
    pub deprecated: bool,
    /// `deprecationWarning`, logged when a deprecated version is generated
    pub deprecation_warning: Option<String>,
    pub schema: Option<SchemaProperty>,
}

/// Schema for a single property (or the root `openAPIV3Schema`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaProperty {
    /// Declared type, `None` when the schema leaves it open
    pub type_: Option<PropertyType>,
    pub description: Option<String>,
    /// Regex pattern for strings
    pub pattern: Option<String>,
    /// Allowed values (enum)
    pub enum_values: Option<Vec<serde_json::Value>>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    /// Nested object properties
    pub properties: Option<BTreeMap<String, SchemaProperty>>,
    /// Required nested properties
    pub required: Option<Vec<String>>,
    /// Array item schema
    pub items: Option<Box<SchemaProperty>>,
    pub additional_properties: Option<AdditionalProperties>,
    /// `x-kubernetes-preserve-unknown-fields`
    pub x_preserve_unknown: bool,
    /// `x-kubernetes-int-or-string`
    pub x_int_or_string: bool,
}

impl SchemaProperty {
    pub fn string() -> Self {
        Self {
            type_: Some(PropertyType::String),
            ..Default::default()
        }
    }

    pub fn integer() -> Self {
        Self {
            type_: Some(PropertyType::Integer),
            ..Default::default()
        }
    }

    pub fn object(properties: BTreeMap<String, SchemaProperty>) -> Self {
        Self {
            type_: Some(PropertyType::Object),
            properties: Some(properties),
            ..Default::default()
        }
    }

    /// Check if this property has nested properties
    pub fn has_nested_properties(&self) -> bool {
        self.properties.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Get a nested property by path (dot-separated)
    pub fn get_nested(&self, path: &str) -> Option<&SchemaProperty> {
        let mut current = self;
        for part in path.split('.') {
            current = current.properties.as_ref()?.get(part)?;
        }
        Some(current)
    }

    /// Check if a nested property is required
    pub fn is_required(&self, name: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|r| r.iter().any(|n| n == name))
    }
}

/// Property type in OpenAPI schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    /// Anything else the schema declares
    Unknown(String),
}

impl PropertyType {
    /// Parse from string representation
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "string" => Self::String,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Array => write!(f, "array"),
            Self::Object => write!(f, "object"),
            Self::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// Additional properties configuration for objects
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AdditionalProperties {
    /// Additional properties are allowed (any type)
    #[default]
    Allowed,
    /// Additional properties are not allowed
    Denied,
    /// Additional properties must match a schema
    Schema(Box<SchemaProperty>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_property_nested() {
        let mut nested = BTreeMap::new();
        nested.insert("secretName".to_string(), SchemaProperty::string());
        nested.insert("revisionHistoryLimit".to_string(), SchemaProperty::integer());

        let spec = SchemaProperty {
            required: Some(vec!["secretName".to_string()]),
            ..SchemaProperty::object(nested)
        };

        assert!(spec.has_nested_properties());
        assert!(spec.is_required("secretName"));
        assert!(!spec.is_required("revisionHistoryLimit"));
        assert!(spec.get_nested("secretName").is_some());
        assert!(spec.get_nested("nonexistent").is_none());
    }

    #[test]
    fn test_property_type_parse() {
        assert_eq!(PropertyType::parse("Boolean"), PropertyType::Boolean);
        assert_eq!(
            PropertyType::parse("null"),
            PropertyType::Unknown("null".into())
        );
        assert_eq!(PropertyType::Array.to_string(), "array");
    }

    #[test]
    fn test_served_versions() {
        let version = |name: &str, served: bool| CrdVersionSchema {
            name: name.to_string(),
            served,
            deprecated: false,
            deprecation_warning: None,
            schema: None,
        };

        let crd = CrdSchema {
            name: "tests.example.com".to_string(),
            group: "example.com".to_string(),
            scope: ResourceScope::Namespaced,
            names: CrdNames {
                kind: "Test".to_string(),
                plural: "tests".to_string(),
            },
            versions: vec![
                version("v1alpha1", false),
                version("v1", true),
                version("v1beta1", true),
            ],
        };

        let served: Vec<_> = crd.served_versions().map(|v| v.name.as_str()).collect();
        assert_eq!(served, vec!["v1", "v1beta1"]);
    }
}
