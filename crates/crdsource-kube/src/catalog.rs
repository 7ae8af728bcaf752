//! Catalog construction from CRD manifests on disk

use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crdsource_core::Catalog;

use crate::crd::{CrdParser, DescriptorGenerator, GeneratorOptions};
use crate::error::{KubeError, Result};

/// Collects CRDs from files and directories into a [`Catalog`]
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    generator: DescriptorGenerator,
    catalog: Catalog,
}

impl CatalogBuilder {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            generator: DescriptorGenerator::new(options),
            catalog: Catalog::new(),
        }
    }

    /// Add a CRD file, or every YAML/JSON file below a directory
    ///
    /// Returns the number of descriptors added.
    pub fn add_path(&mut self, path: &Path) -> Result<usize> {
        let mut added = 0;
        for file in manifest_files(path)? {
            let content = std::fs::read_to_string(&file)?;
            added += self.add_yaml(&content, &file.display().to_string())?;
        }
        Ok(added)
    }

    /// Add every CRD in a (multi-document) YAML string
    ///
    /// Documents that are not CustomResourceDefinitions are skipped.
    pub fn add_yaml(&mut self, yaml: &str, source: &str) -> Result<usize> {
        let mut added = 0;

        for (index, document) in serde_yaml::Deserializer::from_str(yaml).enumerate() {
            let value = Value::deserialize(document)
                .map_err(|e| KubeError::InvalidCrd(format!("{} (document {}): {}", source, index, e)))?;

            if value.is_null() {
                continue;
            }
            if !CrdParser::is_crd(&value) {
                tracing::warn!(
                    source,
                    document = index,
                    kind = value.get("kind").and_then(serde_json::Value::as_str).unwrap_or("<none>"),
                    "skipping non-CRD document"
                );
                continue;
            }

            let crd = CrdParser::parse_value(&value).map_err(|e| match e {
                KubeError::InvalidCrd(message) => {
                    KubeError::InvalidCrd(format!("{} (document {}): {}", source, index, message))
                }
                other => other,
            })?;
            for descriptor in self.generator.generate(&crd) {
                self.catalog.insert(descriptor)?;
                added += 1;
            }
        }

        tracing::debug!(source, descriptors = added, "loaded CRDs");
        Ok(added)
    }

    pub fn build(self) -> Catalog {
        self.catalog
    }
}

/// Build a catalog from a list of files and directories
pub fn catalog_from_paths(paths: &[PathBuf], options: GeneratorOptions) -> Result<Catalog> {
    let mut builder = CatalogBuilder::new(options);
    for path in paths {
        builder.add_path(path)?;
    }
    Ok(builder.build())
}

/// Manifest files under a path, sorted for deterministic ordering
fn manifest_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.exists() {
        return Err(KubeError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() {
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if matches!(ext.as_str(), "yaml" | "yml" | "json") {
                    files.push(path.to_path_buf());
                }
            }
        }
    }

    files.sort();
    Ok(files)
}
