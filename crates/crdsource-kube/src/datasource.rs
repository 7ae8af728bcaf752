//! Cluster read operation
//!
//! Reads one object and transcribes it into state keyed by attribute names.
//! Every read walks the same phases:
//!
//! ```text
//! Unconfigured ──► Validated ──► Fetched ──► Serialized ──► Returned
//! ```
//!
//! Any failure ends the read; nothing is retried and no partial state is
//! returned.

use serde_json::Value as JsonValue;

use crdsource_core::schema::strip_nulls;
use crdsource_core::{ConfigValidator, CoreError, ResourceData, SchemaDescriptor, Variant};

use crate::client::{ClusterReader, ResourceRef};
use crate::error::Result;

/// Progress of a single read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPhase {
    Unconfigured,
    /// Identity checked, no request made yet
    Validated,
    /// Object returned by the cluster
    Fetched,
    /// Object decoded and encoded as state
    Serialized,
    Returned,
}

impl std::fmt::Display for ReadPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unconfigured => write!(f, "unconfigured"),
            Self::Validated => write!(f, "validated"),
            Self::Fetched => write!(f, "fetched"),
            Self::Serialized => write!(f, "serialized"),
            Self::Returned => write!(f, "returned"),
        }
    }
}

/// Identity taken from a data source configuration
fn resource_ref(descriptor: &SchemaDescriptor, config: &JsonValue) -> Result<ResourceRef> {
    let identity = |field: &str| {
        config
            .pointer(&format!("/metadata/{}", field))
            .and_then(JsonValue::as_str)
            .map(String::from)
    };

    let name = identity("name").ok_or_else(|| CoreError::MissingAttribute {
        attribute: "metadata.name".to_string(),
    })?;

    let namespace = if descriptor.is_namespaced() {
        Some(
            identity("namespace").ok_or_else(|| CoreError::MissingAttribute {
                attribute: "metadata.namespace".to_string(),
            })?,
        )
    } else {
        None
    };

    Ok(ResourceRef::new(descriptor, name, namespace))
}

/// Read the object a configuration names and return its state
///
/// The configuration only carries `metadata.name` and, for namespaced
/// kinds, `metadata.namespace`. They are validated before any request is
/// made. The returned state has the computed `id` attribute plus every
/// attribute the descriptor knows about, keyed by attribute name.
pub async fn read_data_source<R>(
    reader: &R,
    descriptor: &SchemaDescriptor,
    config: &JsonValue,
) -> Result<JsonValue>
where
    R: ClusterReader + ?Sized,
{
    let mut phase = ReadPhase::Unconfigured;
    let mut advance = |next: ReadPhase| {
        tracing::debug!(type_name = %descriptor.type_name, from = %phase, to = %next, "read phase");
        phase = next;
    };

    let validator = ConfigValidator::new(descriptor, Variant::DataSource)?;
    validator
        .validate(config)
        .into_result(validator.type_name())?;
    let resource = resource_ref(descriptor, &strip_nulls(config))?;
    advance(ReadPhase::Validated);

    let object = reader.get(&resource).await?;
    advance(ReadPhase::Fetched);

    let data = ResourceData::from_object(descriptor, &object)?;
    let state = data.to_state(descriptor)?;
    advance(ReadPhase::Serialized);

    advance(ReadPhase::Returned);
    tracing::debug!(resource = %resource, id = %data.id(), "read data source");
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::tests::{CERTIFICATE_CRD, CLUSTER_ISSUER_CRD};
    use crate::crd::{CrdParser, DescriptorGenerator};
    use crate::error::KubeError;
    use crate::mock::MockClusterReader;
    use serde_json::json;

    fn descriptor(crd: &str) -> SchemaDescriptor {
        let crd = CrdParser::parse(crd).unwrap();
        DescriptorGenerator::default().generate(&crd).remove(0)
    }

    fn certificate_object() -> JsonValue {
        json!({
            "apiVersion": "cert-manager.io/v1",
            "kind": "Certificate",
            "metadata": {
                "name": "web",
                "namespace": "prod",
                "uid": "4f1c2b1e-7d0e-4c55-9d4e-0e8b3f6f2a10",
                "resourceVersion": "52013",
                "labels": { "app.kubernetes.io/name": "web" },
                "annotations": { "cert-manager.io/issue-temporary-certificate": "true" }
            },
            "spec": {
                "secretName": "web-tls",
                "issuerRef": { "name": "letsencrypt", "kind": "ClusterIssuer" },
                "dnsNames": ["web.example.com"],
                "isCA": false,
                "revisionHistoryLimit": 2,
                "privateKey": { "algorithm": "ECDSA", "size": 256 },
                "secretTemplate": { "labels": {} },
                "keystores": { "pkcs12": { "create": true } }
            },
            "status": { "conditions": [{ "type": "Ready", "status": "True" }] }
        })
    }

    #[tokio::test]
    async fn test_read_transcribes_object() {
        let descriptor = descriptor(CERTIFICATE_CRD);
        let reader = MockClusterReader::new();
        reader.insert(
            &ResourceRef::new(&descriptor, "web", Some("prod".into())),
            certificate_object(),
        );

        let config = json!({ "metadata": { "name": "web", "namespace": "prod" } });
        let state = read_data_source(&reader, &descriptor, &config)
            .await
            .unwrap();

        assert_eq!(
            state,
            json!({
                "id": "prod/web",
                "metadata": {
                    "name": "web",
                    "namespace": "prod",
                    "labels": { "app.kubernetes.io/name": "web" },
                    "annotations": { "cert-manager.io/issue-temporary-certificate": "true" }
                },
                "spec": {
                    "dns_names": ["web.example.com"],
                    "is_ca": false,
                    "issuer_ref": { "kind": "ClusterIssuer", "name": "letsencrypt" },
                    "keystores": { "pkcs12": { "create": true } },
                    "private_key": { "algorithm": "ECDSA", "size": 256 },
                    "revision_history_limit": 2,
                    "secret_name": "web-tls",
                    "secret_template": { "labels": {} }
                }
            })
        );
        assert_eq!(reader.get_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_identity_makes_no_request() {
        let descriptor = descriptor(CERTIFICATE_CRD);
        let reader = MockClusterReader::new();

        for config in [
            json!({}),
            json!({ "metadata": { "name": "web" } }),
            json!({ "metadata": { "namespace": "prod" } }),
            json!({ "metadata": { "name": null, "namespace": "prod" } }),
        ] {
            let err = read_data_source(&reader, &descriptor, &config)
                .await
                .unwrap_err();
            assert!(err.is_validation(), "{config}: {err}");
        }
        assert_eq!(reader.get_count(), 0);
    }

    #[tokio::test]
    async fn test_spec_is_not_accepted_as_input() {
        let descriptor = descriptor(CERTIFICATE_CRD);
        let reader = MockClusterReader::new();
        let config = json!({
            "metadata": { "name": "web", "namespace": "prod" },
            "spec": { "secret_name": "web-tls" }
        });

        let err = read_data_source(&reader, &descriptor, &config)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(reader.get_count(), 0);
    }

    #[tokio::test]
    async fn test_not_found_is_an_error() {
        let descriptor = descriptor(CERTIFICATE_CRD);
        let reader = MockClusterReader::new();
        let config = json!({ "metadata": { "name": "missing", "namespace": "prod" } });

        let err = read_data_source(&reader, &descriptor, &config)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, KubeError::NotFound { ref name, .. } if name == "missing"));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let descriptor = descriptor(CERTIFICATE_CRD);
        let reader = MockClusterReader::new();
        reader.fail_with("connection refused");
        let config = json!({ "metadata": { "name": "web", "namespace": "prod" } });

        let err = read_data_source(&reader, &descriptor, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, KubeError::Api(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_decode_error_carries_path() {
        let descriptor = descriptor(CERTIFICATE_CRD);
        let reader = MockClusterReader::new();
        let mut object = certificate_object();
        object["spec"]["dnsNames"] = json!("web.example.com");
        reader.insert(&ResourceRef::new(&descriptor, "web", Some("prod".into())), object);

        let config = json!({ "metadata": { "name": "web", "namespace": "prod" } });
        let err = read_data_source(&reader, &descriptor, &config)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("spec.dnsNames"), "{err}");
    }

    #[tokio::test]
    async fn test_cluster_scoped_read() {
        let descriptor = descriptor(CLUSTER_ISSUER_CRD);
        let reader = MockClusterReader::new();
        reader.insert(
            &ResourceRef::new(&descriptor, "letsencrypt", None),
            json!({
                "metadata": { "name": "letsencrypt" },
                "spec": { "acme": { "server": "https://acme-v02.api.letsencrypt.org/directory" } }
            }),
        );

        let config = json!({ "metadata": { "name": "letsencrypt" } });
        let state = read_data_source(&reader, &descriptor, &config)
            .await
            .unwrap();
        assert_eq!(state["id"], "letsencrypt");
        assert_eq!(
            state["spec"]["acme"]["server"],
            "https://acme-v02.api.letsencrypt.org/directory"
        );
    }
}
