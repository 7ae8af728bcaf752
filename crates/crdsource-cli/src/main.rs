//! crdsource CLI - Kubernetes CRDs as read-only data sources

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod display;
mod error;
mod exit_codes;
mod settings;

use context::Context;
use error::Result;

#[derive(Parser)]
#[command(name = "crdsource")]
#[command(author = "crdsource Contributors")]
#[command(version)]
#[command(about = "Kubernetes CRDs as read-only data sources", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Catalog file produced by `crdsource generate`
    #[arg(long, global = true, env = "CRDSOURCE_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// CRD file or directory to load (repeatable)
    #[arg(long = "crds", global = true)]
    pub crds: Vec<PathBuf>,

    /// Type-name prefix for data sources generated from CRDs
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Kubeconfig file (defaults to KUBECONFIG, then ~/.kube/config)
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Cluster connect and read timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Settings file (default: ~/.config/crdsource/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Configuration input for a single data source
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Configuration file(s) to merge, keyed by attribute names
    #[arg(short = 'f', long = "values")]
    pub files: Vec<PathBuf>,

    /// Set attributes on command line (path=value, `\.` for a dot inside a key)
    #[arg(long = "set")]
    pub set: Vec<String>,

    /// Set attributes on command line, always as strings
    #[arg(long = "set-string")]
    pub set_string: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a catalog from CRD files or directories
    Generate {
        /// CRD files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Catalog file to write (if not set, outputs to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also generate data sources for deprecated versions
        #[arg(long)]
        include_deprecated: bool,
    },

    /// List data source type names
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the schema of a data source type
    Schema {
        /// Data source type name
        type_name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a configuration without rendering or reading
    Validate {
        /// Data source type name
        type_name: String,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output validation results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a configuration to a YAML manifest
    Render {
        /// Data source type name (either variant)
        type_name: String,

        #[command(flatten)]
        config: ConfigArgs,

        /// File to write (if not set, outputs to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Read an object from the cluster
    Read {
        /// Data source type name
        type_name: String,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        output: OutputFormat,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("crdsource=debug,crdsource_core=debug,crdsource_kube=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::resolve(&cli.global)?;

    match cli.command {
        Commands::Generate {
            paths,
            output,
            include_deprecated,
        } => commands::generate::run(&ctx, &paths, output.as_deref(), include_deprecated),

        Commands::List { json } => commands::list::run(&ctx, json),

        Commands::Schema { type_name, json } => commands::schema::run(&ctx, &type_name, json),

        Commands::Validate {
            type_name,
            config,
            json,
        } => commands::validate::run(&ctx, &type_name, &config, json),

        Commands::Render {
            type_name,
            config,
            output,
        } => commands::render::run(&ctx, &type_name, &config, output.as_deref()).await,

        Commands::Read {
            type_name,
            config,
            output,
        } => commands::read::run(&ctx, &type_name, &config, output).await,
    }
}

#[tokio::main]
async fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
