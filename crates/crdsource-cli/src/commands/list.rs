//! List command - print the data source types a catalog serves

use crdsource_kube::{KubeReader, Provider};

use crate::context::Context;
use crate::error::Result;

pub fn run(ctx: &Context, json: bool) -> Result<()> {
    let provider = Provider::<KubeReader>::new(ctx.load_catalog()?);
    let types = provider.data_source_types();

    if json {
        println!("{}", serde_json::to_string_pretty(&types)?);
    } else {
        for type_name in types {
            println!("{}", type_name);
        }
    }

    Ok(())
}
