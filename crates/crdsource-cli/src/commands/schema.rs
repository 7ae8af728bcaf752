//! Schema command - show the attributes of a data source type

use crdsource_kube::{KubeReader, Provider};

use crate::context::Context;
use crate::display;
use crate::error::Result;

pub fn run(ctx: &Context, type_name: &str, json: bool) -> Result<()> {
    let provider = Provider::<KubeReader>::new(ctx.load_catalog()?);
    let schema = provider.schema(type_name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
    } else {
        display::print_descriptor(&schema.type_name, schema.variant, schema.descriptor);
    }

    Ok(())
}
