//! Read command - data source variant against a live cluster

use crdsource_core::Variant;
use crdsource_kube::{KubeReader, Provider};

use crate::context::{Context, load_config};
use crate::error::{CliError, Result};
use crate::{ConfigArgs, OutputFormat};

pub async fn run(
    ctx: &Context,
    type_name: &str,
    config_args: &ConfigArgs,
    output: OutputFormat,
) -> Result<()> {
    let catalog = ctx.load_catalog()?;
    let (_, variant) = catalog.lookup(type_name)?;
    let config = load_config(&config_args.files, &config_args.set, &config_args.set_string)?;

    let provider = match variant {
        Variant::Manifest => Provider::new(catalog),
        Variant::DataSource => {
            // Reject bad identities before building a client
            Provider::<KubeReader>::new(catalog.clone())
                .validate(type_name, &config)?
                .into_result(type_name)?;

            let reader = KubeReader::connect(&ctx.cluster_config()).await?;
            Provider::with_reader(catalog, reader)
        }
    };

    let state = provider.read(type_name, &config).await?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&state)?),
        OutputFormat::Yaml => print!(
            "{}",
            serde_yaml::to_string(&state).map_err(|e| CliError::Render {
                message: e.to_string(),
                help: None,
            })?
        ),
    }

    Ok(())
}
