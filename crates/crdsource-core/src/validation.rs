//! Kubernetes metadata syntax checks
//!
//! These mirror the API server's own rules so that a bad name or label is
//! reported while validating configuration, before any request is sent.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Maximum length of a DNS-1123 subdomain
pub const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;

/// Maximum length of a DNS-1123 label
pub const DNS1123_LABEL_MAX_LENGTH: usize = 63;

/// Maximum length of the name part of a qualified name and of label values
pub const QUALIFIED_NAME_MAX_LENGTH: usize = 63;

/// Maximum combined size of all annotation keys and values
pub const TOTAL_ANNOTATION_SIZE_LIMIT: usize = 256 * 1024;

static DNS1123_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

static DNS1123_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("valid regex")
});

static QUALIFIED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$").expect("valid regex")
});

/// Validate an object name (DNS-1123 subdomain)
pub fn validate_resource_name(name: &str) -> Result<(), String> {
    validate_dns1123_subdomain(name)
}

/// Validate a namespace name (DNS-1123 label)
pub fn validate_namespace(namespace: &str) -> Result<(), String> {
    if namespace.is_empty() {
        return Err("must not be empty".to_string());
    }
    if namespace.len() > DNS1123_LABEL_MAX_LENGTH {
        return Err(format!(
            "must be no more than {} characters",
            DNS1123_LABEL_MAX_LENGTH
        ));
    }
    if !DNS1123_LABEL.is_match(namespace) {
        return Err(format!(
            "'{}' must consist of lower case alphanumeric characters or '-', and must start and end with an alphanumeric character",
            namespace
        ));
    }
    Ok(())
}

fn validate_dns1123_subdomain(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    if value.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        return Err(format!(
            "must be no more than {} characters",
            DNS1123_SUBDOMAIN_MAX_LENGTH
        ));
    }
    if !DNS1123_SUBDOMAIN.is_match(value) {
        return Err(format!(
            "'{}' must consist of lower case alphanumeric characters, '-' or '.', and must start and end with an alphanumeric character",
            value
        ));
    }
    Ok(())
}

/// Validate a qualified name such as `app.kubernetes.io/name`
fn validate_qualified_name(key: &str) -> Result<(), String> {
    let name = match key.split_once('/') {
        Some((prefix, name)) => {
            if prefix.is_empty() {
                return Err(format!("'{}' has an empty prefix", key));
            }
            validate_dns1123_subdomain(prefix)
                .map_err(|e| format!("prefix of '{}' is invalid: {}", key, e))?;
            name
        }
        None => key,
    };

    if name.is_empty() {
        return Err(format!("'{}' has an empty name part", key));
    }
    if name.len() > QUALIFIED_NAME_MAX_LENGTH {
        return Err(format!(
            "name part of '{}' must be no more than {} characters",
            key, QUALIFIED_NAME_MAX_LENGTH
        ));
    }
    if !QUALIFIED_NAME.is_match(name) {
        return Err(format!(
            "name part of '{}' must consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character",
            key
        ));
    }
    Ok(())
}

pub fn validate_label_key(key: &str) -> Result<(), String> {
    validate_qualified_name(key)
}

/// Label values may be empty
pub fn validate_label_value(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }
    if value.len() > QUALIFIED_NAME_MAX_LENGTH {
        return Err(format!(
            "value '{}' must be no more than {} characters",
            value, QUALIFIED_NAME_MAX_LENGTH
        ));
    }
    if !QUALIFIED_NAME.is_match(value) {
        return Err(format!(
            "value '{}' must consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character",
            value
        ));
    }
    Ok(())
}

pub fn validate_annotation_key(key: &str) -> Result<(), String> {
    validate_qualified_name(&key.to_lowercase())
}

/// Validate every label, returning `(key, message)` pairs
pub fn validate_labels(labels: &BTreeMap<String, String>) -> Vec<(String, String)> {
    let mut errors = Vec::new();
    for (key, value) in labels {
        if let Err(e) = validate_label_key(key) {
            errors.push((key.clone(), e));
        }
        if let Err(e) = validate_label_value(value) {
            errors.push((key.clone(), e));
        }
    }
    errors
}

/// Validate annotation keys and their combined size
pub fn validate_annotations(annotations: &BTreeMap<String, String>) -> Vec<(String, String)> {
    let mut errors: Vec<(String, String)> = annotations
        .keys()
        .filter_map(|key| validate_annotation_key(key).err().map(|e| (key.clone(), e)))
        .collect();

    let total: usize = annotations.iter().map(|(k, v)| k.len() + v.len()).sum();
    if total > TOTAL_ANNOTATION_SIZE_LIMIT {
        errors.push((
            String::new(),
            format!(
                "annotations may not exceed {} bytes in total (got {})",
                TOTAL_ANNOTATION_SIZE_LIMIT, total
            ),
        ));
    }
    errors
}
