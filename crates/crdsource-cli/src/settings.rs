//! User settings
//!
//! Stored in `~/.config/crdsource/config.yaml`. Every field is optional and
//! command-line flags win over anything set here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

/// Settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Catalog file produced by `crdsource generate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    /// CRD files or directories loaded on every invocation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crds: Vec<PathBuf>,

    /// Type-name prefix used when generating from CRDs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Connect and read timeout for cluster requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

fn default_api_version() -> String {
    "crdsource.io/v1".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            catalog: None,
            crds: Vec::new(),
            prefix: None,
            kubeconfig: None,
            context: None,
            timeout_seconds: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load settings from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::Io {
            message: format!("{}: {}", path.display(), e),
        })?;
        let settings: Self = serde_yaml::from_str(&content).map_err(|e| CliError::Io {
            message: format!("{}: {}", path.display(), e),
        })?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Default settings path, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("crdsource").join("config.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
apiVersion: crdsource.io/v1
catalog: /etc/crdsource/catalog.yaml
crds:
  - ./crds
prefix: kubernetes
context: staging
timeoutSeconds: 10
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(
            settings.catalog,
            Some(PathBuf::from("/etc/crdsource/catalog.yaml"))
        );
        assert_eq!(settings.crds, vec![PathBuf::from("./crds")]);
        assert_eq!(settings.prefix.as_deref(), Some("kubernetes"));
        assert_eq!(settings.context.as_deref(), Some("staging"));
        assert_eq!(settings.timeout_seconds, Some(10));
        assert!(settings.kubeconfig.is_none());
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "{}\n").unwrap();

        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = TempDir::new().unwrap();
        let err = Settings::load(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[test]
    fn test_unknown_yaml_shape_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "crds: not-a-list\n").unwrap();

        assert!(Settings::load_from(&path).is_err());
    }
}
