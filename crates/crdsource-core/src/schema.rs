//! Configuration validation against a schema descriptor
//!
//! The descriptor is compiled into a JSON Schema once and every configuration
//! is checked against it, the same way values files are checked against a
//! values schema. Kubernetes metadata syntax (names, labels, annotations) is
//! checked on top, since JSON Schema cannot express those rules precisely.

use serde_json::{Map, Value as JsonValue, json};
use std::collections::BTreeMap;

use crate::descriptor::{Attribute, AttributeKind, SchemaDescriptor, Validator, Variant};
use crate::error::{CoreError, Result, ValidationErrorInfo};
use crate::validation;

/// Result of configuration validation
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationErrorInfo>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    pub fn failure(errors: Vec<ValidationErrorInfo>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }

    /// Turn a failed result into [`CoreError::InvalidConfig`]
    pub fn into_result(self, type_name: &str) -> Result<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(CoreError::InvalidConfig {
                type_name: type_name.to_string(),
                errors: self.errors,
            })
        }
    }
}

/// Validator compiled from a descriptor for one variant
pub struct ConfigValidator {
    type_name: String,
    compiled: jsonschema::Validator,
}

impl ConfigValidator {
    pub fn new(descriptor: &SchemaDescriptor, variant: Variant) -> Result<Self> {
        let json_schema = config_json_schema(descriptor, variant);

        let compiled =
            jsonschema::validator_for(&json_schema).map_err(|e| CoreError::InvalidSchema {
                message: format!("{}: {}", descriptor.type_name, e),
            })?;

        let type_name = match variant {
            Variant::DataSource => descriptor.type_name.clone(),
            Variant::Manifest => descriptor.manifest_type_name(),
        };

        Ok(Self {
            type_name,
            compiled,
        })
    }

    /// Validate a configuration keyed by attribute names
    ///
    /// `null` values are treated as unset.
    pub fn validate(&self, config: &JsonValue) -> ValidationResult {
        let config = strip_nulls(config);

        let mut errors: Vec<ValidationErrorInfo> = self
            .compiled
            .iter_errors(&config)
            .map(|e| {
                let path = e.instance_path.to_string();
                ValidationErrorInfo::new(
                    if path.is_empty() {
                        "(root)".to_string()
                    } else {
                        path
                    },
                    format_validation_error(&e),
                )
            })
            .collect();

        errors.extend(metadata_errors(&config));

        if errors.is_empty() {
            ValidationResult::success()
        } else {
            ValidationResult::failure(errors)
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

fn format_validation_error(error: &jsonschema::ValidationError) -> String {
    error.to_string().replace('"', "'")
}

/// Build the JSON Schema a configuration must satisfy
///
/// The data-source variant only takes the identifying metadata; everything
/// else is read back from the cluster.
pub fn config_json_schema(descriptor: &SchemaDescriptor, variant: Variant) -> JsonValue {
    let metadata_attrs: Vec<Attribute> = match variant {
        Variant::DataSource => descriptor
            .metadata_attributes()
            .into_iter()
            .filter(|a| a.name == "name" || a.name == "namespace")
            .collect(),
        Variant::Manifest => descriptor.metadata_attributes(),
    };

    let mut root_attrs = vec![Attribute::new(
        "metadata",
        "metadata",
        AttributeKind::object(metadata_attrs),
    )
    .required()];

    if variant == Variant::Manifest {
        root_attrs.extend(descriptor.fields.iter().cloned());
    }

    let mut schema = object_schema(&root_attrs);
    if let JsonValue::Object(map) = &mut schema {
        map.insert(
            "$schema".into(),
            JsonValue::String("http://json-schema.org/draft-07/schema#".into()),
        );
        map.insert("title".into(), JsonValue::String(descriptor.type_name.clone()));
    }
    schema
}

fn object_schema(attributes: &[Attribute]) -> JsonValue {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for attr in attributes {
        properties.insert(attr.name.clone(), attribute_schema(attr));
        if attr.required {
            required.push(JsonValue::String(attr.name.clone()));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".into(), JsonValue::String("object".into()));
    schema.insert("properties".into(), JsonValue::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), JsonValue::Array(required));
    }
    schema.insert("additionalProperties".into(), JsonValue::Bool(false));
    JsonValue::Object(schema)
}

fn attribute_schema(attr: &Attribute) -> JsonValue {
    let mut schema = kind_schema(&attr.kind);

    if let JsonValue::Object(map) = &mut schema {
        if let Some(desc) = &attr.description {
            map.insert("description".into(), JsonValue::String(desc.clone()));
        }

        for validator in &attr.validators {
            match validator {
                Validator::OneOf(values) => {
                    map.insert("enum".into(), JsonValue::Array(values.clone()));
                }
                Validator::Pattern(pattern) => {
                    map.insert("pattern".into(), JsonValue::String(pattern.clone()));
                }
                Validator::MinLength(n) => {
                    map.insert("minLength".into(), JsonValue::from(*n));
                }
                Validator::MaxLength(n) => {
                    map.insert("maxLength".into(), JsonValue::from(*n));
                }
                Validator::AtLeast(n) => {
                    map.insert("minimum".into(), JsonValue::from(*n));
                }
                Validator::AtMost(n) => {
                    map.insert("maximum".into(), JsonValue::from(*n));
                }
                Validator::MinItems(n) => {
                    map.insert("minItems".into(), JsonValue::from(*n));
                }
                Validator::MaxItems(n) => {
                    map.insert("maxItems".into(), JsonValue::from(*n));
                }
                // Checked in code, see `metadata_errors`
                Validator::ResourceName
                | Validator::Namespace
                | Validator::Labels
                | Validator::Annotations => {}
            }
        }
    }

    schema
}

fn kind_schema(kind: &AttributeKind) -> JsonValue {
    match kind {
        AttributeKind::String => json!({ "type": "string" }),
        AttributeKind::Integer => json!({ "type": "integer" }),
        AttributeKind::Number => json!({ "type": "number" }),
        AttributeKind::Bool => json!({ "type": "boolean" }),
        AttributeKind::IntOrString => json!({ "type": ["integer", "string"] }),
        AttributeKind::Dynamic => json!({}),
        AttributeKind::Map { values } => json!({
            "type": "object",
            "additionalProperties": kind_schema(values),
        }),
        AttributeKind::List { items } => json!({
            "type": "array",
            "items": kind_schema(items),
        }),
        AttributeKind::Object { attributes } => object_schema(attributes),
    }
}

/// Kubernetes syntax checks on `metadata`
fn metadata_errors(config: &JsonValue) -> Vec<ValidationErrorInfo> {
    let mut errors = Vec::new();
    let Some(metadata) = config.get("metadata") else {
        return errors;
    };

    if let Some(name) = metadata.get("name").and_then(JsonValue::as_str) {
        if let Err(e) = validation::validate_resource_name(name) {
            errors.push(ValidationErrorInfo::new("/metadata/name", e));
        }
    }

    if let Some(namespace) = metadata.get("namespace").and_then(JsonValue::as_str) {
        if let Err(e) = validation::validate_namespace(namespace) {
            errors.push(ValidationErrorInfo::new("/metadata/namespace", e));
        }
    }

    if let Some(labels) = string_map(metadata.get("labels")) {
        for (key, message) in validation::validate_labels(&labels) {
            errors.push(ValidationErrorInfo::new(
                format!("/metadata/labels/{}", key),
                message,
            ));
        }
    }

    if let Some(annotations) = string_map(metadata.get("annotations")) {
        for (key, message) in validation::validate_annotations(&annotations) {
            let path = if key.is_empty() {
                "/metadata/annotations".to_string()
            } else {
                format!("/metadata/annotations/{}", key)
            };
            errors.push(ValidationErrorInfo::new(path, message));
        }
    }

    errors
}

fn string_map(value: Option<&JsonValue>) -> Option<BTreeMap<String, String>> {
    let obj = value?.as_object()?;
    Some(
        obj.iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect(),
    )
}

/// Drop `null` entries from objects, recursively
pub fn strip_nulls(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), strip_nulls(v)))
                .collect(),
        ),
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(strip_nulls).collect()),
        other => other.clone(),
    }
}
