//! CRD YAML parser
//!
//! Parses CustomResourceDefinition manifests (`apiextensions.k8s.io/v1`)
//! into a structured [`CrdSchema`].

use serde_json::Value;

use super::schema::{
    AdditionalProperties, CrdNames, CrdSchema, CrdVersionSchema, PropertyType, SchemaProperty,
};
use crate::error::{KubeError, Result};
use crdsource_core::ResourceScope;

/// Parser for CRD YAML manifests
pub struct CrdParser;

impl CrdParser {
    /// Parse a CRD YAML manifest into a structured schema
    pub fn parse(yaml: &str) -> Result<CrdSchema> {
        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| KubeError::Serialization(format!("Invalid CRD YAML: {}", e)))?;

        Self::parse_value(&value)
    }

    /// Whether a document declares itself a CustomResourceDefinition
    pub fn is_crd(value: &Value) -> bool {
        value.get("kind").and_then(Value::as_str) == Some("CustomResourceDefinition")
    }

    /// Parse from a serde_json::Value
    pub fn parse_value(value: &Value) -> Result<CrdSchema> {
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| KubeError::InvalidCrd("Missing 'kind' field".to_string()))?;

        if kind != "CustomResourceDefinition" {
            return Err(KubeError::InvalidCrd(format!(
                "Expected CustomResourceDefinition, got {}",
                kind
            )));
        }

        let name = value
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .ok_or_else(|| KubeError::InvalidCrd("Missing 'metadata.name' field".to_string()))?
            .to_string();

        let spec = value
            .get("spec")
            .ok_or_else(|| KubeError::InvalidCrd(format!("{}: missing 'spec' field", name)))?;

        let group = spec
            .get("group")
            .and_then(Value::as_str)
            .ok_or_else(|| KubeError::InvalidCrd(format!("{}: missing 'spec.group' field", name)))?
            .to_string();

        let scope = match spec.get("scope").and_then(Value::as_str) {
            Some("Cluster") => ResourceScope::Cluster,
            _ => ResourceScope::Namespaced,
        };

        let names = Self::parse_names(&name, spec.get("names"))?;
        let versions = Self::parse_versions(&name, spec.get("versions"))?;

        Ok(CrdSchema {
            name,
            group,
            scope,
            names,
            versions,
        })
    }

    fn parse_names(crd_name: &str, names_value: Option<&Value>) -> Result<CrdNames> {
        let names = names_value.ok_or_else(|| {
            KubeError::InvalidCrd(format!("{}: missing 'spec.names' field", crd_name))
        })?;

        let required = |field: &str| {
            names
                .get(field)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .ok_or_else(|| {
                    KubeError::InvalidCrd(format!("{}: missing 'spec.names.{}'", crd_name, field))
                })
        };

        Ok(CrdNames {
            kind: required("kind")?,
            plural: required("plural")?,
        })
    }

    fn parse_versions(crd_name: &str, versions_value: Option<&Value>) -> Result<Vec<CrdVersionSchema>> {
        let versions = versions_value.and_then(Value::as_array).ok_or_else(|| {
            KubeError::InvalidCrd(format!("{}: missing 'spec.versions' array", crd_name))
        })?;

        versions
            .iter()
            .map(|v| Self::parse_version(crd_name, v))
            .collect()
    }

    fn parse_version(crd_name: &str, version: &Value) -> Result<CrdVersionSchema> {
        let name = version
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                KubeError::InvalidCrd(format!("{}: version missing 'name' field", crd_name))
            })?
            .to_string();

        let flag = |field: &str, default: bool| {
            version
                .get(field)
                .and_then(Value::as_bool)
                .unwrap_or(default)
        };

        let schema = version
            .get("schema")
            .and_then(|s| s.get("openAPIV3Schema"))
            .map(Self::parse_schema_property);

        Ok(CrdVersionSchema {
            served: flag("served", true),
            deprecated: flag("deprecated", false),
            deprecation_warning: version
                .get("deprecationWarning")
                .and_then(Value::as_str)
                .map(String::from),
            schema,
            name,
        })
    }

    /// Parse a single schema property (recursive)
    fn parse_schema_property(prop: &Value) -> SchemaProperty {
        let str_field = |field: &str| prop.get(field).and_then(Value::as_str).map(String::from);
        let bool_field = |field: &str| prop.get(field).and_then(Value::as_bool).unwrap_or(false);

        let properties = prop
            .get("properties")
            .and_then(Value::as_object)
            .map(|obj| {
                obj.iter()
                    .map(|(k, v)| (k.clone(), Self::parse_schema_property(v)))
                    .collect()
            });

        let required = prop.get("required").and_then(Value::as_array).map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        });

        let additional_properties = prop.get("additionalProperties").map(|v| match v {
            Value::Bool(true) => AdditionalProperties::Allowed,
            Value::Bool(false) => AdditionalProperties::Denied,
            schema => AdditionalProperties::Schema(Box::new(Self::parse_schema_property(schema))),
        });

        SchemaProperty {
            type_: prop.get("type").and_then(Value::as_str).map(PropertyType::parse),
            description: str_field("description"),
            pattern: str_field("pattern"),
            enum_values: prop.get("enum").and_then(Value::as_array).cloned(),
            minimum: prop.get("minimum").and_then(Value::as_f64),
            maximum: prop.get("maximum").and_then(Value::as_f64),
            min_length: prop.get("minLength").and_then(Value::as_u64),
            max_length: prop.get("maxLength").and_then(Value::as_u64),
            min_items: prop.get("minItems").and_then(Value::as_u64),
            max_items: prop.get("maxItems").and_then(Value::as_u64),
            properties,
            required,
            items: prop
                .get("items")
                .map(|v| Box::new(Self::parse_schema_property(v))),
            additional_properties,
            x_preserve_unknown: bool_field("x-kubernetes-preserve-unknown-fields"),
            x_int_or_string: bool_field("x-kubernetes-int-or-string"),
        }
    }
}
