//! Manifest rendering
//!
//! The manifest variant never talks to a cluster: configuration is validated,
//! transcribed into a [`ResourceData`] and serialized to YAML with
//! `apiVersion` and `kind` filled in from the descriptor.

use serde_json::Value as JsonValue;

use crate::descriptor::{SchemaDescriptor, Variant};
use crate::error::{CoreError, Result};
use crate::holder::ResourceData;
use crate::schema::{ConfigValidator, strip_nulls};

/// Result of rendering a manifest data source
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedManifest {
    /// Configuration state plus the computed `id` and `yaml` attributes
    pub state: JsonValue,
    /// The rendered YAML document
    pub yaml: String,
}

/// Serialize a resource to a YAML document
pub fn render_manifest(descriptor: &SchemaDescriptor, data: &ResourceData) -> Result<String> {
    let object = data.to_object(descriptor)?;
    serde_yaml::to_string(&object).map_err(|e| CoreError::Encode {
        path: "(root)".to_string(),
        message: e.to_string(),
    })
}

/// Validate configuration and render it
pub fn render_config(descriptor: &SchemaDescriptor, config: &JsonValue) -> Result<RenderedManifest> {
    let validator = ConfigValidator::new(descriptor, Variant::Manifest)?;
    validator
        .validate(config)
        .into_result(validator.type_name())?;

    let data = ResourceData::from_config(descriptor, &strip_nulls(config))?;
    let yaml = render_manifest(descriptor, &data)?;
    tracing::debug!(
        type_name = %validator.type_name(),
        id = %data.id(),
        bytes = yaml.len(),
        "rendered manifest"
    );

    let mut state = data.to_state(descriptor)?;
    if let JsonValue::Object(map) = &mut state {
        map.insert("yaml".into(), JsonValue::String(yaml.clone()));
    }

    Ok(RenderedManifest { state, yaml })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ResourceScope;
    use crate::descriptor::tests::certificate_descriptor;
    use serde_json::json;

    #[test]
    fn test_identity_only_manifest() {
        let config = json!({ "metadata": { "name": "foo", "namespace": "bar" } });
        let rendered = render_config(&certificate_descriptor(), &config).unwrap();

        insta::assert_snapshot!(rendered.yaml, @r"
        apiVersion: cert-manager.io/v1
        kind: Certificate
        metadata:
          name: foo
          namespace: bar
        ");
        assert!(!rendered.yaml.contains("spec"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let descriptor = certificate_descriptor();
        let config = json!({
            "metadata": {
                "name": "foo",
                "namespace": "bar",
                "labels": { "zeta": "1", "alpha": "2", "app.kubernetes.io/name": "web" },
                "annotations": { "example.com/owner": "team-a" }
            },
            "spec": {
                "secret_name": "foo-tls",
                "issuer_ref": { "name": "ca", "kind": "Issuer" },
                "dns_names": ["b.example.com", "a.example.com"],
                "secret_labels": { "y": "1", "x": "2" },
                "extra": { "z": 1, "a": [true, null] }
            }
        });

        let first = render_config(&descriptor, &config).unwrap();
        let second = render_config(&descriptor, &config).unwrap();
        assert_eq!(first.yaml, second.yaml);
        assert_eq!(first.state, second.state);
    }

    #[test]
    fn test_rendered_yaml_parses_back_to_object() {
        let descriptor = certificate_descriptor();
        let config = json!({
            "metadata": { "name": "foo", "namespace": "bar" },
            "spec": {
                "secret_name": "foo-tls",
                "issuer_ref": { "name": "ca" },
                "dns_names": ["foo.example.com"],
                "revision_history_limit": 3,
                "port": 443
            }
        });

        let rendered = render_config(&descriptor, &config).unwrap();
        let parsed: JsonValue = serde_yaml::from_str(&rendered.yaml).unwrap();
        assert_eq!(
            parsed,
            json!({
                "apiVersion": "cert-manager.io/v1",
                "kind": "Certificate",
                "metadata": { "name": "foo", "namespace": "bar" },
                "spec": {
                    "secretName": "foo-tls",
                    "issuerRef": { "name": "ca" },
                    "dnsNames": ["foo.example.com"],
                    "revisionHistoryLimit": 3,
                    "port": 443
                }
            })
        );
    }

    #[test]
    fn test_state_carries_yaml_and_id() {
        let config = json!({ "metadata": { "name": "foo", "namespace": "bar" } });
        let rendered = render_config(&certificate_descriptor(), &config).unwrap();

        assert_eq!(rendered.state["id"], "bar/foo");
        assert_eq!(rendered.state["yaml"], rendered.yaml.as_str());
        assert_eq!(rendered.state["metadata"]["namespace"], "bar");
    }

    #[test]
    fn test_invalid_config_is_rejected_before_rendering() {
        let config = json!({ "metadata": { "name": "foo" } });
        let err = render_config(&certificate_descriptor(), &config).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_cluster_scoped_manifest_has_no_namespace() {
        let mut descriptor = certificate_descriptor();
        descriptor.kind = "ClusterIssuer".into();
        descriptor.scope = ResourceScope::Cluster;
        let config = json!({ "metadata": { "name": "letsencrypt", "namespace": "ignored" } });

        let rendered = render_config(&descriptor, &config).unwrap();
        insta::assert_snapshot!(rendered.yaml, @r"
        apiVersion: cert-manager.io/v1
        kind: ClusterIssuer
        metadata:
          name: letsencrypt
        ");
        assert_eq!(rendered.state["id"], "letsencrypt");
        assert!(rendered.state["metadata"].get("namespace").is_none());
    }

    #[test]
    fn test_integral_number_renders_without_fraction() {
        let config = json!({
            "metadata": { "name": "foo", "namespace": "bar" },
            "spec": { "secret_name": "foo-tls", "issuer_ref": { "name": "ca" }, "ratio": 1 }
        });

        let rendered = render_config(&certificate_descriptor(), &config).unwrap();
        assert!(rendered.yaml.contains("ratio: 1\n"), "{}", rendered.yaml);
        assert_eq!(rendered.state["spec"]["ratio"], json!(1));
    }
}
