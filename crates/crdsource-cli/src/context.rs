//! Invocation context shared by every command
//!
//! Resolves the catalog source and cluster connection from command-line
//! flags, falling back to [`Settings`] and then to built-in defaults.

use crdsource_core::{Catalog, Values, parse_set_string_values, parse_set_values};
use crdsource_kube::{
    ClusterConfig, DEFAULT_PREFIX, DEFAULT_TIMEOUT, GeneratorOptions, catalog_from_paths,
};
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::time::Duration;

use crate::GlobalArgs;
use crate::error::{CliError, Result};
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct Context {
    pub catalog: Option<PathBuf>,
    pub crds: Vec<PathBuf>,
    pub prefix: String,
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub timeout: Duration,
}

impl Context {
    pub fn resolve(args: &GlobalArgs) -> Result<Self> {
        let settings = Settings::load(args.config.as_deref())?;
        Ok(Self::from_parts(args, settings))
    }

    fn from_parts(args: &GlobalArgs, settings: Settings) -> Self {
        let crds = if args.crds.is_empty() {
            settings.crds
        } else {
            args.crds.clone()
        };

        Self {
            catalog: args.catalog.clone().or(settings.catalog),
            crds,
            prefix: args
                .prefix
                .clone()
                .or(settings.prefix)
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            kubeconfig: args.kubeconfig.clone().or(settings.kubeconfig),
            context: args.context.clone().or(settings.context),
            timeout: args
                .timeout
                .or(settings.timeout_seconds)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        }
    }

    pub fn generator_options(&self, include_deprecated: bool) -> GeneratorOptions {
        GeneratorOptions {
            prefix: self.prefix.clone(),
            include_deprecated,
        }
    }

    /// Catalog from `--catalog` and `--crds`, merged
    pub fn load_catalog(&self) -> Result<Catalog> {
        if self.catalog.is_none() && self.crds.is_empty() {
            return Err(CliError::catalog_with_help(
                "no catalog configured",
                "pass --catalog <file> or --crds <path>, or set them in the settings file",
            ));
        }

        let mut catalog = match &self.catalog {
            Some(path) => Catalog::load(path).map_err(|e| {
                CliError::catalog_with_help(
                    format!("{}: {}", path.display(), e),
                    "generate one with `crdsource generate <crds> -o <file>`",
                )
            })?,
            None => Catalog::new(),
        };

        if !self.crds.is_empty() {
            let generated = catalog_from_paths(&self.crds, self.generator_options(false))?;
            catalog.extend(generated)?;
        }

        tracing::debug!(types = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn cluster_config(&self) -> ClusterConfig {
        ClusterConfig {
            kubeconfig: self.kubeconfig.clone(),
            context: self.context.clone(),
            timeout: self.timeout,
        }
    }
}

/// Configuration from `-f` files and `--set`/`--set-string` overrides
///
/// Files merge in order, then `--set`, then `--set-string`.
pub fn load_config(files: &[PathBuf], set: &[String], set_string: &[String]) -> Result<JsonValue> {
    let mut values = Values::new();

    for file in files {
        let file_values = Values::from_file(file).map_err(|e| CliError::Io {
            message: format!("{}: {}", file.display(), e),
        })?;
        values.merge(&file_values);
    }

    if !set.is_empty() {
        values.merge(&parse_set_values(set)?);
    }
    if !set_string.is_empty() {
        values.merge(&parse_set_string_values(set_string)?);
    }

    let config = values.into_inner();
    if !config.is_object() {
        return Err(CliError::validation(
            "configuration must be a mapping of attribute names",
        ));
    }
    Ok(config)
}
