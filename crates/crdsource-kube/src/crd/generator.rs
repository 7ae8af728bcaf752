//! Descriptor generation from CRD schemas
//!
//! Each served version of a CRD becomes one [`SchemaDescriptor`]. Property
//! names are converted to snake_case attribute names while the original
//! JSON names are kept alongside, so configuration and cluster objects can
//! both be transcribed through the same tree.

use heck::ToSnakeCase;
use std::collections::HashSet;

use crdsource_core::{Attribute, AttributeKind, SchemaDescriptor, Validator};

use super::schema::{AdditionalProperties, CrdSchema, CrdVersionSchema, PropertyType, SchemaProperty};

/// Root properties handled outside the attribute tree
const RESERVED_ROOT_PROPERTIES: &[&str] = &["apiVersion", "kind", "metadata", "status"];

pub const DEFAULT_PREFIX: &str = "k8s";

/// Options controlling descriptor generation
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Leading segment of every type name
    pub prefix: String,
    /// Generate descriptors for versions marked deprecated
    pub include_deprecated: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            include_deprecated: false,
        }
    }
}

/// Converts parsed CRDs into schema descriptors
#[derive(Debug, Clone, Default)]
pub struct DescriptorGenerator {
    options: GeneratorOptions,
}

impl DescriptorGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    /// Type name for one version of a kind
    ///
    /// `cert-manager.io` / `ClusterIssuer` / `v1` with prefix `k8s` gives
    /// `k8s_cert_manager_io_cluster_issuer_v1`. The core group has no segment.
    pub fn type_name(&self, group: &str, kind: &str, version: &str) -> String {
        let mut segments = vec![self.options.prefix.to_snake_case()];
        if !group.is_empty() {
            segments.push(group.to_snake_case());
        }
        segments.push(kind.to_snake_case());
        segments.push(version.to_lowercase().replace(['-', '.'], "_"));
        segments.retain(|s| !s.is_empty());
        segments.join("_")
    }

    /// One descriptor per served version
    pub fn generate(&self, crd: &CrdSchema) -> Vec<SchemaDescriptor> {
        crd.served_versions()
            .filter(|v| {
                if !v.deprecated {
                    return true;
                }
                if !self.options.include_deprecated {
                    tracing::debug!(crd = %crd.name, version = %v.name, "skipping deprecated version");
                    return false;
                }
                tracing::warn!(
                    crd = %crd.name,
                    version = %v.name,
                    warning = v.deprecation_warning.as_deref().unwrap_or("deprecated"),
                    "generating deprecated version"
                );
                true
            })
            .map(|v| self.generate_version(crd, v))
            .collect()
    }

    fn generate_version(&self, crd: &CrdSchema, version: &CrdVersionSchema) -> SchemaDescriptor {
        let type_name = self.type_name(&crd.group, &crd.names.kind, &version.name);

        let (fields, description) = match &version.schema {
            Some(root) => {
                // Top-level blocks stay optional so an identity-only
                // configuration is always accepted
                let fields = root
                    .properties
                    .iter()
                    .flatten()
                    .filter(|(name, _)| !RESERVED_ROOT_PROPERTIES.contains(&name.as_str()))
                    .map(|(name, prop)| (name, prop, false));
                (
                    self.convert_attributes(&type_name, fields),
                    root.description.clone(),
                )
            }
            None => {
                tracing::warn!(crd = %crd.name, version = %version.name, "version has no schema");
                (Vec::new(), None)
            }
        };

        let descriptor = SchemaDescriptor {
            type_name,
            group: crd.group.clone(),
            version: version.name.clone(),
            kind: crd.names.kind.clone(),
            plural: crd.names.plural.clone(),
            scope: crd.scope,
            description,
            deprecated: version.deprecated,
            fields,
        };

        tracing::debug!(
            type_name = %descriptor.type_name,
            attributes = descriptor.attribute_count(),
            "generated descriptor"
        );
        descriptor
    }

    fn convert_attributes<'a>(
        &self,
        path: &str,
        properties: impl Iterator<Item = (&'a String, &'a SchemaProperty, bool)>,
    ) -> Vec<Attribute> {
        let mut seen = HashSet::new();
        let mut attributes = Vec::new();

        for (json_name, prop, required) in properties {
            let name = json_name.to_snake_case();
            if name.is_empty() {
                tracing::warn!(path, property = %json_name, "property has no usable attribute name");
                continue;
            }
            if !seen.insert(name.clone()) {
                tracing::warn!(path, property = %json_name, attribute = %name, "attribute name collides, skipping");
                continue;
            }

            let child_path = format!("{}.{}", path, name);
            let mut attr = Attribute::new(name, json_name.clone(), self.convert_kind(&child_path, prop));
            attr.required = required;
            attr.description = prop.description.clone();
            attr.validators = validators(prop);
            attributes.push(attr);
        }

        attributes
    }

    fn convert_kind(&self, path: &str, prop: &SchemaProperty) -> AttributeKind {
        if prop.x_int_or_string {
            return AttributeKind::IntOrString;
        }
        if prop.x_preserve_unknown {
            return AttributeKind::Dynamic;
        }

        match &prop.type_ {
            Some(PropertyType::String) => AttributeKind::String,
            Some(PropertyType::Integer) => AttributeKind::Integer,
            Some(PropertyType::Number) => AttributeKind::Number,
            Some(PropertyType::Boolean) => AttributeKind::Bool,
            Some(PropertyType::Array) => match &prop.items {
                Some(items) => AttributeKind::list_of(self.convert_kind(path, items)),
                None => AttributeKind::list_of(AttributeKind::Dynamic),
            },
            Some(PropertyType::Object) | None => self.convert_object(path, prop),
            Some(PropertyType::Unknown(other)) => {
                tracing::debug!(path, property_type = %other, "unknown property type, treating as dynamic");
                AttributeKind::Dynamic
            }
        }
    }

    fn convert_object(&self, path: &str, prop: &SchemaProperty) -> AttributeKind {
        if prop.has_nested_properties() {
            let nested = prop
                .properties
                .iter()
                .flatten()
                .map(|(name, child)| (name, child, prop.is_required(name)));
            return AttributeKind::object(self.convert_attributes(path, nested));
        }

        match &prop.additional_properties {
            Some(AdditionalProperties::Schema(values)) => AttributeKind::Map {
                values: Box::new(self.convert_kind(path, values)),
            },
            _ => AttributeKind::Dynamic,
        }
    }
}

/// Constraints carried over from the property schema
fn validators(prop: &SchemaProperty) -> Vec<Validator> {
    let mut out = Vec::new();
    if let Some(values) = &prop.enum_values {
        out.push(Validator::OneOf(values.clone()));
    }
    if let Some(pattern) = &prop.pattern {
        out.push(Validator::Pattern(pattern.clone()));
    }
    out.extend(prop.min_length.map(Validator::MinLength));
    out.extend(prop.max_length.map(Validator::MaxLength));
    out.extend(prop.minimum.map(Validator::AtLeast));
    out.extend(prop.maximum.map(Validator::AtMost));
    out.extend(prop.min_items.map(Validator::MinItems));
    out.extend(prop.max_items.map(Validator::MaxItems));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::CrdParser;
    use crate::crd::tests::CERTIFICATE_CRD;
    use crdsource_core::ResourceScope;

    fn generate(options: GeneratorOptions) -> Vec<SchemaDescriptor> {
        let crd = CrdParser::parse(CERTIFICATE_CRD).unwrap();
        DescriptorGenerator::new(options).generate(&crd)
    }

    #[test]
    fn test_type_names() {
        let generator = DescriptorGenerator::default();
        assert_eq!(
            generator.type_name("cert-manager.io", "ClusterIssuer", "v1"),
            "k8s_cert_manager_io_cluster_issuer_v1"
        );
        assert_eq!(
            generator.type_name("acme.cert-manager.io", "Order", "v1beta1"),
            "k8s_acme_cert_manager_io_order_v1beta1"
        );
        assert_eq!(generator.type_name("", "ConfigMap", "v1"), "k8s_config_map_v1");

        let generator = DescriptorGenerator::new(GeneratorOptions {
            prefix: "kubernetes".into(),
            ..Default::default()
        });
        assert_eq!(
            generator.type_name("example.com", "Widget", "v1"),
            "kubernetes_example_com_widget_v1"
        );
    }

    #[test]
    fn test_deprecated_versions_skipped_by_default() {
        let descriptors = generate(GeneratorOptions::default());
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].type_name, "k8s_cert_manager_io_certificate_v1");

        let descriptors = generate(GeneratorOptions {
            include_deprecated: true,
            ..Default::default()
        });
        let names: Vec<_> = descriptors.iter().map(|d| d.type_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "k8s_cert_manager_io_certificate_v1",
                "k8s_cert_manager_io_certificate_v1beta1"
            ]
        );
        assert!(descriptors[1].deprecated);
    }

    #[test]
    fn test_descriptor_identity() {
        let descriptor = &generate(GeneratorOptions::default())[0];
        assert_eq!(descriptor.group, "cert-manager.io");
        assert_eq!(descriptor.version, "v1");
        assert_eq!(descriptor.kind, "Certificate");
        assert_eq!(descriptor.plural, "certificates");
        assert_eq!(descriptor.scope, ResourceScope::Namespaced);
        assert!(descriptor.description.as_deref().unwrap().contains("X.509"));

        let roots: Vec<_> = descriptor.fields.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(roots, vec!["spec"], "reserved root properties are skipped");
        assert!(!descriptor.fields[0].required);
    }

    #[test]
    fn test_attribute_conversion() {
        let descriptor = &generate(GeneratorOptions::default())[0];

        let secret_name = descriptor.find_attribute(&["spec", "secret_name"]).unwrap();
        assert_eq!(secret_name.json_name, "secretName");
        assert_eq!(secret_name.kind, AttributeKind::String);
        assert!(secret_name.required);
        assert_eq!(secret_name.validators, vec![Validator::MaxLength(253)]);

        let is_ca = descriptor.find_attribute(&["spec", "is_ca"]).unwrap();
        assert_eq!(is_ca.json_name, "isCA");
        assert_eq!(is_ca.kind, AttributeKind::Bool);

        let kind = descriptor
            .find_attribute(&["spec", "issuer_ref", "kind"])
            .unwrap();
        assert_eq!(
            kind.validators,
            vec![Validator::OneOf(vec!["Issuer".into(), "ClusterIssuer".into()])]
        );

        let limit = descriptor
            .find_attribute(&["spec", "revision_history_limit"])
            .unwrap();
        assert_eq!(limit.kind, AttributeKind::Integer);
        assert_eq!(limit.validators, vec![Validator::AtLeast(1.0)]);

        let dns_names = descriptor.find_attribute(&["spec", "dns_names"]).unwrap();
        assert_eq!(dns_names.kind, AttributeKind::list_of(AttributeKind::String));

        let labels = descriptor
            .find_attribute(&["spec", "secret_template", "labels"])
            .unwrap();
        assert_eq!(labels.kind, AttributeKind::string_map());

        let keystores = descriptor.find_attribute(&["spec", "keystores"]).unwrap();
        assert_eq!(keystores.kind, AttributeKind::Dynamic);
    }

    #[test]
    fn test_int_or_string_and_untyped() {
        let crd = CrdParser::parse(
            r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: widgets.example.com
spec:
  group: example.com
  names:
    kind: Widget
    plural: widgets
  versions:
    - name: v1alpha1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
          properties:
            spec:
              type: object
              properties:
                port:
                  x-kubernetes-int-or-string: true
                  anyOf:
                    - type: integer
                    - type: string
                payload: {}
                targets:
                  type: array
                  items:
                    type: object
                    required: [host]
                    properties:
                      host:
                        type: string
                      weight:
                        type: number
                        maximum: 1
"#,
        )
        .unwrap();

        let descriptor = &DescriptorGenerator::default().generate(&crd)[0];
        assert_eq!(descriptor.type_name, "k8s_example_com_widget_v1alpha1");

        let port = descriptor.find_attribute(&["spec", "port"]).unwrap();
        assert_eq!(port.kind, AttributeKind::IntOrString);

        let payload = descriptor.find_attribute(&["spec", "payload"]).unwrap();
        assert_eq!(payload.kind, AttributeKind::Dynamic);

        let host = descriptor
            .find_attribute(&["spec", "targets", "host"])
            .unwrap();
        assert!(host.required);
        let weight = descriptor
            .find_attribute(&["spec", "targets", "weight"])
            .unwrap();
        assert_eq!(weight.kind, AttributeKind::Number);
        assert_eq!(weight.validators, vec![Validator::AtMost(1.0)]);
    }

    #[test]
    fn test_colliding_attribute_names_keep_first() {
        let mut props = std::collections::BTreeMap::new();
        props.insert("dnsName".to_string(), SchemaProperty::string());
        props.insert("dns_name".to_string(), SchemaProperty::integer());
        let spec = SchemaProperty::object(props);

        let kind = DescriptorGenerator::default().convert_kind("t.spec", &spec);
        let attrs = kind.nested_attributes().unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].json_name, "dnsName");
    }
}
