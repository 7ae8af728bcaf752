//! Render command - manifest variant, no cluster access

use console::style;
use crdsource_core::Variant;
use crdsource_kube::{KubeReader, Provider, YAML_ATTRIBUTE};
use std::path::Path;

use crate::ConfigArgs;
use crate::context::{Context, load_config};
use crate::error::{CliError, Result};

pub async fn run(
    ctx: &Context,
    type_name: &str,
    config_args: &ConfigArgs,
    output: Option<&Path>,
) -> Result<()> {
    let provider = Provider::<KubeReader>::new(ctx.load_catalog()?);

    // Either variant names the same descriptor; rendering is always local
    let (descriptor, variant) = provider.catalog().lookup(type_name)?;
    let manifest_type = match variant {
        Variant::Manifest => type_name.to_string(),
        Variant::DataSource => descriptor.manifest_type_name(),
    };

    let config = load_config(&config_args.files, &config_args.set, &config_args.set_string)?;
    let state = provider.read(&manifest_type, &config).await?;
    let yaml = state
        .get(YAML_ATTRIBUTE)
        .and_then(|v| v.as_str())
        .ok_or_else(|| CliError::internal("rendered state has no yaml attribute"))?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, yaml)?;
            eprintln!("{} Wrote {}", style("✓").green().bold(), path.display());
        }
        None => print!("{}", yaml),
    }

    Ok(())
}
