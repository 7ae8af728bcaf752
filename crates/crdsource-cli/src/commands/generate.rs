//! Generate command - build a catalog from CRDs

use console::style;
use crdsource_kube::CatalogBuilder;
use std::path::{Path, PathBuf};

use crate::context::Context;
use crate::error::Result;

pub fn run(
    ctx: &Context,
    paths: &[PathBuf],
    output: Option<&Path>,
    include_deprecated: bool,
) -> Result<()> {
    let mut builder = CatalogBuilder::new(ctx.generator_options(include_deprecated));

    for path in paths {
        let added = builder.add_path(path)?;
        eprintln!(
            "{} {} {}",
            style("→").blue(),
            path.display(),
            style(format!("({} version(s))", added)).dim()
        );
    }

    let catalog = builder.build();

    match output {
        Some(output) => {
            catalog.save(output)?;
            eprintln!(
                "{} Wrote {} descriptor(s) to {}",
                style("✓").green().bold(),
                catalog.len(),
                output.display()
            );
        }
        None => print!("{}", catalog.to_yaml()?),
    }

    Ok(())
}
