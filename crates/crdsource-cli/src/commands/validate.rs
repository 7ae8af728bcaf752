//! Validate command - check a configuration against a data source schema

use console::style;
use crdsource_kube::{KubeReader, Provider};

use crate::ConfigArgs;
use crate::context::{Context, load_config};
use crate::display::ValidationReport;
use crate::error::Result;
use crate::exit_codes;

pub fn run(ctx: &Context, type_name: &str, config_args: &ConfigArgs, json_output: bool) -> Result<()> {
    let provider = Provider::<KubeReader>::new(ctx.load_catalog()?);
    let schema = provider.schema(type_name)?;
    let config = load_config(&config_args.files, &config_args.set, &config_args.set_string)?;

    if !json_output {
        println!(
            "{} Validating configuration for {} ({})",
            style("→").blue(),
            type_name,
            schema.variant
        );
    }

    let result = provider.validate(type_name, &config)?;

    if json_output {
        let output = serde_json::json!({
            "valid": result.is_valid,
            "typeName": type_name,
            "errors": result.errors.iter().map(|e| {
                serde_json::json!({
                    "path": e.path,
                    "message": e.message,
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);

        if !result.is_valid {
            std::process::exit(exit_codes::VALIDATION_ERROR);
        }
        return Ok(());
    }

    let mut report = ValidationReport::new();
    for error in &result.errors {
        report.add_error(type_name, error);
    }
    if schema.descriptor.deprecated {
        report.add_warning(
            type_name,
            "",
            &format!("{} is deprecated", schema.descriptor.api_version()),
        );
    }

    report.display();
    println!();
    report.print_summary();

    if report.has_errors() {
        std::process::exit(exit_codes::VALIDATION_ERROR);
    }

    Ok(())
}
