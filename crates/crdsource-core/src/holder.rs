//! Typed data holder
//!
//! [`ResourceData`] mirrors a descriptor's attribute tree with typed values.
//! It is built either from user configuration (keyed by attribute names) or
//! from an object returned by the cluster (keyed by JSON names), and encoded
//! back in either naming. A value is never modified once built.

use indexmap::IndexMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

use crate::descriptor::{Attribute, AttributeKind, SchemaDescriptor};
use crate::error::{CoreError, Result};

/// Object fields keyed by attribute name, in descriptor order
pub type ObjectValue = IndexMap<String, AttrValue>;

/// A typed attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    String(String),
    Integer(i64),
    /// Kept as read so integral values stay integral
    Number(serde_json::Number),
    Bool(bool),
    IntOrString(IntOrString),
    Dynamic(JsonValue),
    List(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
    Object(ObjectValue),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Collections with no entries
    fn is_empty_collection(&self) -> bool {
        match self {
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Object(obj) => obj.is_empty(),
            _ => false,
        }
    }
}

/// Which key an attribute is stored under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    /// Framework-facing snake_case names
    Attribute,
    /// Kubernetes JSON names
    Json,
}

impl Naming {
    fn key<'a>(&self, attr: &'a Attribute) -> &'a str {
        match self {
            Naming::Attribute => &attr.name,
            Naming::Json => &attr.json_name,
        }
    }
}

/// Identifying metadata of a resource
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceMetadata {
    pub name: String,
    pub namespace: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

/// A resource transcribed into a descriptor's schema
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceData {
    pub metadata: ResourceMetadata,
    pub fields: ObjectValue,
}

impl ResourceData {
    /// Build from user configuration keyed by attribute names
    ///
    /// The configuration is expected to have passed
    /// [`ConfigValidator`](crate::schema::ConfigValidator) already.
    pub fn from_config(descriptor: &SchemaDescriptor, config: &JsonValue) -> Result<Self> {
        let metadata_value = config.get("metadata").unwrap_or(&JsonValue::Null);

        let name = metadata_value
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| CoreError::MissingAttribute {
                attribute: "metadata.name".to_string(),
            })?
            .to_string();

        // Cluster-scoped kinds have no namespace, whatever the config says
        let namespace = metadata_value
            .get("namespace")
            .and_then(JsonValue::as_str)
            .filter(|_| descriptor.is_namespaced())
            .map(String::from);

        if descriptor.is_namespaced() && namespace.is_none() {
            return Err(CoreError::MissingAttribute {
                attribute: "metadata.namespace".to_string(),
            });
        }

        let metadata = ResourceMetadata {
            name,
            namespace,
            labels: string_map(metadata_value.get("labels")),
            annotations: string_map(metadata_value.get("annotations")),
        };

        let decoder = Decoder {
            resource_kind: &descriptor.kind,
            naming: Naming::Attribute,
        };
        let fields = decoder.decode_fields(&descriptor.fields, config, "")?;

        Ok(Self { metadata, fields })
    }

    /// Build from an object returned by the API server
    ///
    /// Unknown keys are ignored; a value of the wrong type is a decode error.
    pub fn from_object(descriptor: &SchemaDescriptor, object: &JsonValue) -> Result<Self> {
        let decode_error = |path: &str, expected: &str, found: &JsonValue| CoreError::Decode {
            kind: descriptor.kind.clone(),
            path: path.to_string(),
            expected: expected.to_string(),
            found: json_type_name(found).to_string(),
        };

        if !object.is_object() {
            return Err(decode_error("(root)", "object", object));
        }

        let meta: ObjectMeta = match object.get("metadata") {
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| CoreError::Decode {
                kind: descriptor.kind.clone(),
                path: "metadata".to_string(),
                expected: "ObjectMeta".to_string(),
                found: e.to_string(),
            })?,
            None => return Err(decode_error("metadata", "object", &JsonValue::Null)),
        };

        let name = meta
            .name
            .ok_or_else(|| decode_error("metadata.name", "string", &JsonValue::Null))?;

        let metadata = ResourceMetadata {
            name,
            namespace: meta.namespace,
            labels: meta.labels.unwrap_or_default(),
            annotations: meta.annotations.unwrap_or_default(),
        };

        let decoder = Decoder {
            resource_kind: &descriptor.kind,
            naming: Naming::Json,
        };
        let fields = decoder.decode_fields(&descriptor.fields, object, "")?;

        Ok(Self { metadata, fields })
    }

    /// Data source identifier: `namespace/name`, or `name` when cluster scoped
    pub fn id(&self) -> String {
        match &self.metadata.namespace {
            Some(ns) => format!("{}/{}", ns, self.metadata.name),
            None => self.metadata.name.clone(),
        }
    }

    /// Encode as framework state keyed by attribute names
    ///
    /// Empty collections are kept so the state matches what was read.
    pub fn to_state(&self, descriptor: &SchemaDescriptor) -> Result<JsonValue> {
        let encoder = Encoder {
            naming: Naming::Attribute,
            prune_empty: false,
        };

        let mut state = Map::new();
        state.insert("id".into(), JsonValue::String(self.id()));
        state.insert("metadata".into(), self.metadata_json(false));
        state.extend(encoder.encode_fields(&descriptor.fields, &self.fields, "")?);
        Ok(JsonValue::Object(state))
    }

    /// Encode as a Kubernetes object with `apiVersion` and `kind` injected
    ///
    /// Empty objects, maps and lists are dropped.
    pub fn to_object(&self, descriptor: &SchemaDescriptor) -> Result<JsonValue> {
        let encoder = Encoder {
            naming: Naming::Json,
            prune_empty: true,
        };

        let mut object = Map::new();
        object.insert(
            "apiVersion".into(),
            JsonValue::String(descriptor.api_version()),
        );
        object.insert("kind".into(), JsonValue::String(descriptor.kind.clone()));
        object.insert("metadata".into(), self.metadata_json(true));
        object.extend(encoder.encode_fields(&descriptor.fields, &self.fields, "")?);
        Ok(JsonValue::Object(object))
    }

    fn metadata_json(&self, prune_empty: bool) -> JsonValue {
        let mut meta = Map::new();
        meta.insert("name".into(), JsonValue::String(self.metadata.name.clone()));
        if let Some(ns) = &self.metadata.namespace {
            meta.insert("namespace".into(), JsonValue::String(ns.clone()));
        }
        for (key, map) in [
            ("labels", &self.metadata.labels),
            ("annotations", &self.metadata.annotations),
        ] {
            if prune_empty && map.is_empty() {
                continue;
            }
            let map: Map<String, JsonValue> = map
                .iter()
                .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
                .collect();
            meta.insert(key.into(), JsonValue::Object(map));
        }
        JsonValue::Object(meta)
    }
}

fn string_map(value: Option<&JsonValue>) -> BTreeMap<String, String> {
    value
        .and_then(JsonValue::as_object)
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(n) if n.is_f64() => "number",
        JsonValue::Number(_) => "integer",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

struct Decoder<'a> {
    resource_kind: &'a str,
    naming: Naming,
}

impl Decoder<'_> {
    fn mismatch(&self, path: &str, kind: &AttributeKind, found: &JsonValue) -> CoreError {
        CoreError::Decode {
            kind: self.resource_kind.to_string(),
            path: path.to_string(),
            expected: kind.to_string(),
            found: json_type_name(found).to_string(),
        }
    }

    fn decode_fields(
        &self,
        attributes: &[Attribute],
        source: &JsonValue,
        path: &str,
    ) -> Result<ObjectValue> {
        let mut fields = ObjectValue::new();
        for attr in attributes {
            let key = self.naming.key(attr);
            let Some(raw) = source.get(key) else {
                continue;
            };
            if let Some(value) = self.decode_value(&attr.kind, raw, &child_path(path, key))? {
                fields.insert(attr.name.clone(), value);
            }
        }
        Ok(fields)
    }

    fn decode_value(
        &self,
        kind: &AttributeKind,
        raw: &JsonValue,
        path: &str,
    ) -> Result<Option<AttrValue>> {
        if raw.is_null() {
            return Ok(None);
        }

        let value = match kind {
            AttributeKind::String => raw
                .as_str()
                .map(|s| AttrValue::String(s.to_string()))
                .ok_or_else(|| self.mismatch(path, kind, raw))?,
            AttributeKind::Integer => raw
                .as_i64()
                .map(AttrValue::Integer)
                .ok_or_else(|| self.mismatch(path, kind, raw))?,
            AttributeKind::Number => match raw {
                JsonValue::Number(n) => AttrValue::Number(n.clone()),
                _ => return Err(self.mismatch(path, kind, raw)),
            },
            AttributeKind::Bool => raw
                .as_bool()
                .map(AttrValue::Bool)
                .ok_or_else(|| self.mismatch(path, kind, raw))?,
            AttributeKind::IntOrString => match raw {
                JsonValue::String(s) => AttrValue::IntOrString(IntOrString::String(s.clone())),
                JsonValue::Number(n) => n
                    .as_i64()
                    .and_then(|i| i32::try_from(i).ok())
                    .map(|i| AttrValue::IntOrString(IntOrString::Int(i)))
                    .ok_or_else(|| self.mismatch(path, kind, raw))?,
                _ => return Err(self.mismatch(path, kind, raw)),
            },
            AttributeKind::Dynamic => AttrValue::Dynamic(raw.clone()),
            AttributeKind::List { items } => {
                let array = raw.as_array().ok_or_else(|| self.mismatch(path, kind, raw))?;
                let mut values = Vec::with_capacity(array.len());
                for (i, item) in array.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, i);
                    let value = self
                        .decode_value(items, item, &item_path)?
                        .ok_or_else(|| self.mismatch(&item_path, items, item))?;
                    values.push(value);
                }
                AttrValue::List(values)
            }
            AttributeKind::Map { values } => {
                let obj = raw.as_object().ok_or_else(|| self.mismatch(path, kind, raw))?;
                let mut map = BTreeMap::new();
                for (k, v) in obj {
                    if let Some(value) = self.decode_value(values, v, &child_path(path, k))? {
                        map.insert(k.clone(), value);
                    }
                }
                AttrValue::Map(map)
            }
            AttributeKind::Object { attributes } => {
                if !raw.is_object() {
                    return Err(self.mismatch(path, kind, raw));
                }
                AttrValue::Object(self.decode_fields(attributes, raw, path)?)
            }
        };

        Ok(Some(value))
    }
}

struct Encoder {
    naming: Naming,
    prune_empty: bool,
}

impl Encoder {
    fn encode_fields(
        &self,
        attributes: &[Attribute],
        fields: &ObjectValue,
        path: &str,
    ) -> Result<Map<String, JsonValue>> {
        let mut out = Map::new();
        for attr in attributes {
            let Some(value) = fields.get(&attr.name) else {
                continue;
            };
            let key = self.naming.key(attr);
            if let Some(json) = self.encode_value(&attr.kind, value, &child_path(path, key))? {
                out.insert(key.to_string(), json);
            }
        }
        Ok(out)
    }

    fn encode_value(
        &self,
        kind: &AttributeKind,
        value: &AttrValue,
        path: &str,
    ) -> Result<Option<JsonValue>> {
        if self.prune_empty && value.is_empty_collection() {
            return Ok(None);
        }

        let json = match (kind, value) {
            (_, AttrValue::String(s)) => JsonValue::String(s.clone()),
            (_, AttrValue::Integer(i)) => JsonValue::from(*i),
            (_, AttrValue::Bool(b)) => JsonValue::Bool(*b),
            (_, AttrValue::Number(n)) => JsonValue::Number(n.clone()),
            (_, AttrValue::IntOrString(IntOrString::Int(i))) => JsonValue::from(*i),
            (_, AttrValue::IntOrString(IntOrString::String(s))) => JsonValue::String(s.clone()),
            (_, AttrValue::Dynamic(v)) => v.clone(),
            (AttributeKind::List { items }, AttrValue::List(values)) => {
                let mut out = Vec::with_capacity(values.len());
                for (i, item) in values.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, i);
                    // Pruned items keep their slot so indices stay stable
                    let json = self
                        .encode_value(items, item, &item_path)?
                        .unwrap_or_else(|| JsonValue::Object(Map::new()));
                    out.push(json);
                }
                JsonValue::Array(out)
            }
            (AttributeKind::Map { values }, AttrValue::Map(map)) => {
                let mut out = Map::new();
                for (k, v) in map {
                    if let Some(json) = self.encode_value(values, v, &child_path(path, k))? {
                        out.insert(k.clone(), json);
                    }
                }
                JsonValue::Object(out)
            }
            (AttributeKind::Object { attributes }, AttrValue::Object(fields)) => {
                let out = self.encode_fields(attributes, fields, path)?;
                if self.prune_empty && out.is_empty() {
                    return Ok(None);
                }
                JsonValue::Object(out)
            }
            (kind, _) => {
                return Err(CoreError::Encode {
                    path: path.to_string(),
                    message: format!("value does not match attribute type {}", kind),
                });
            }
        };

        Ok(Some(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ResourceScope;
    use crate::descriptor::tests::certificate_descriptor;
    use serde_json::json;

    fn cluster_object() -> JsonValue {
        json!({
            "apiVersion": "cert-manager.io/v1",
            "kind": "Certificate",
            "metadata": {
                "name": "web",
                "namespace": "prod",
                "uid": "0b9a3c1e",
                "resourceVersion": "812",
                "labels": { "app": "web" }
            },
            "spec": {
                "secretName": "web-tls",
                "issuerRef": { "name": "letsencrypt", "kind": "ClusterIssuer", "group": "cert-manager.io" },
                "dnsNames": ["web.example.com", "www.example.com"],
                "isCA": false,
                "port": 8443,
                "ratio": 0.5,
                "extra": { "anything": [1, "two"] },
                "unknownField": "ignored"
            },
            "status": { "conditions": [] }
        })
    }

    #[test]
    fn test_from_object_transcribes_fields() {
        let descriptor = certificate_descriptor();
        let data = ResourceData::from_object(&descriptor, &cluster_object()).unwrap();

        assert_eq!(data.metadata.name, "web");
        assert_eq!(data.metadata.namespace.as_deref(), Some("prod"));
        assert_eq!(data.metadata.labels.get("app").map(String::as_str), Some("web"));

        let spec = data.fields["spec"].as_object().unwrap();
        assert_eq!(spec["secret_name"], AttrValue::String("web-tls".into()));
        assert_eq!(spec["is_ca"], AttrValue::Bool(false));
        assert_eq!(spec["port"], AttrValue::IntOrString(IntOrString::Int(8443)));
        let half = serde_json::Number::from_f64(0.5).unwrap();
        assert_eq!(spec["ratio"], AttrValue::Number(half));
        assert_eq!(
            spec["dns_names"],
            AttrValue::List(vec![
                AttrValue::String("web.example.com".into()),
                AttrValue::String("www.example.com".into()),
            ])
        );

        let issuer = spec["issuer_ref"].as_object().unwrap();
        assert_eq!(issuer.len(), 2, "unknown 'group' key must be ignored");
        assert!(!spec.contains_key("unknownField"));
    }

    #[test]
    fn test_state_uses_attribute_names() {
        let descriptor = certificate_descriptor();
        let data = ResourceData::from_object(&descriptor, &cluster_object()).unwrap();
        let state = data.to_state(&descriptor).unwrap();

        assert_eq!(state["id"], "prod/web");
        assert_eq!(state["metadata"]["name"], "web");
        assert_eq!(state["metadata"]["annotations"], json!({}));
        assert_eq!(state["spec"]["secret_name"], "web-tls");
        assert_eq!(state["spec"]["issuer_ref"]["kind"], "ClusterIssuer");
        assert_eq!(state["spec"]["extra"], json!({ "anything": [1, "two"] }));
        assert!(state.get("status").is_none());
    }

    #[test]
    fn test_decode_type_mismatch() {
        let descriptor = certificate_descriptor();
        let mut object = cluster_object();
        object["spec"]["issuerRef"]["name"] = json!(7);

        let err = ResourceData::from_object(&descriptor, &object).unwrap_err();
        match err {
            CoreError::Decode {
                kind,
                path,
                expected,
                found,
            } => {
                assert_eq!(kind, "Certificate");
                assert_eq!(path, "spec.issuerRef.name");
                assert_eq!(expected, "string");
                assert_eq!(found, "integer");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_fractional_integer_fails() {
        let descriptor = certificate_descriptor();
        let mut object = cluster_object();
        object["spec"]["revisionHistoryLimit"] = json!(1.5);

        let err = ResourceData::from_object(&descriptor, &object).unwrap_err();
        assert!(err.to_string().contains("spec.revisionHistoryLimit"));
    }

    #[test]
    fn test_decode_requires_metadata_name() {
        let descriptor = certificate_descriptor();
        let object = json!({ "metadata": { "namespace": "prod" } });
        let err = ResourceData::from_object(&descriptor, &object).unwrap_err();
        assert!(err.to_string().contains("metadata.name"));

        let err = ResourceData::from_object(&descriptor, &json!("nope")).unwrap_err();
        assert!(err.to_string().contains("(root)"));
    }

    #[test]
    fn test_from_config_requires_identity() {
        let descriptor = certificate_descriptor();
        let err = ResourceData::from_config(&descriptor, &json!({ "metadata": { "name": "a" } }))
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingAttribute { ref attribute } if attribute == "metadata.namespace"));

        let mut cluster = descriptor.clone();
        cluster.scope = ResourceScope::Cluster;
        let data =
            ResourceData::from_config(&cluster, &json!({ "metadata": { "name": "a" } })).unwrap();
        assert_eq!(data.id(), "a");
    }

    #[test]
    fn test_to_object_prunes_empty_collections() {
        let descriptor = certificate_descriptor();
        let config = json!({
            "metadata": { "name": "foo", "namespace": "bar", "labels": {} },
            "spec": { "dns_names": [], "secret_labels": {} }
        });

        let data = ResourceData::from_config(&descriptor, &config).unwrap();
        let object = data.to_object(&descriptor).unwrap();

        assert_eq!(
            object,
            json!({
                "apiVersion": "cert-manager.io/v1",
                "kind": "Certificate",
                "metadata": { "name": "foo", "namespace": "bar" }
            })
        );
    }

    #[test]
    fn test_to_object_uses_json_names() {
        let descriptor = certificate_descriptor();
        let config = json!({
            "metadata": { "name": "foo", "namespace": "bar" },
            "spec": {
                "secret_name": "foo-tls",
                "issuer_ref": { "name": "ca" },
                "is_ca": true,
                "port": "https"
            }
        });

        let data = ResourceData::from_config(&descriptor, &config).unwrap();
        let object = data.to_object(&descriptor).unwrap();

        assert_eq!(
            object["spec"],
            json!({
                "secretName": "foo-tls",
                "issuerRef": { "name": "ca" },
                "isCA": true,
                "port": "https"
            })
        );
    }

    #[test]
    fn test_integral_number_round_trips() {
        let descriptor = certificate_descriptor();
        let mut object = cluster_object();
        object["spec"]["ratio"] = json!(1);

        let data = ResourceData::from_object(&descriptor, &object).unwrap();
        let state = data.to_state(&descriptor).unwrap();
        assert_eq!(state["spec"]["ratio"], object["spec"]["ratio"]);
        assert!(state["spec"]["ratio"].is_u64());

        let rendered = data.to_object(&descriptor).unwrap();
        assert_eq!(rendered["spec"]["ratio"], json!(1));
        let yaml = serde_yaml::to_string(&rendered).unwrap();
        assert!(yaml.contains("ratio: 1\n"), "{yaml}");
    }

    #[test]
    fn test_number_rejects_string() {
        let descriptor = certificate_descriptor();
        let mut object = cluster_object();
        object["spec"]["ratio"] = json!("0.5");

        let err = ResourceData::from_object(&descriptor, &object).unwrap_err();
        assert!(matches!(err, CoreError::Decode { ref path, .. } if path == "spec.ratio"));
    }

    #[test]
    fn test_cluster_scoped_config_drops_namespace() {
        let mut descriptor = certificate_descriptor();
        descriptor.scope = ResourceScope::Cluster;
        let config = json!({ "metadata": { "name": "a", "namespace": "b" } });

        let data = ResourceData::from_config(&descriptor, &config).unwrap();
        assert_eq!(data.metadata.namespace, None);
        assert_eq!(data.id(), "a");

        let object = data.to_object(&descriptor).unwrap();
        assert_eq!(object["metadata"], json!({ "name": "a" }));
    }

    #[test]
    fn test_mismatched_value_is_encode_error() {
        let descriptor = certificate_descriptor();
        let mut spec = ObjectValue::new();
        spec.insert("dns_names".into(), AttrValue::Map(BTreeMap::new()));
        let mut fields = ObjectValue::new();
        fields.insert("spec".into(), AttrValue::Object(spec));

        let data = ResourceData {
            metadata: ResourceMetadata {
                name: "foo".into(),
                namespace: Some("bar".into()),
                ..Default::default()
            },
            fields,
        };

        let err = data.to_state(&descriptor).unwrap_err();
        assert!(matches!(err, CoreError::Encode { ref path, .. } if path == "spec.dns_names"));
    }
}
