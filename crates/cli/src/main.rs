use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use resource_factory_core::manager::{ResourceFactoryManager, ResourceFactoryManagerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;

/// Resource Factory - generate plugin and mod manifests
#[derive(Parser)]
#[command(name = "resource-factory")]
#[command(about = "Generate plugin and mod manifests from a build description")]
#[command(version)]
struct Cli {
    /// Path to the build description
    #[arg(short, long, default_value = "resource-factory.yml")]
    config: PathBuf,

    /// Output root (defaults to the description's outputRoot)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log progress
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the files of one or more source sets
    Generate {
        /// Source sets to generate (all when omitted)
        #[arg(short, long = "source-set")]
        source_set: Vec<String>,
    },
    /// List the factories of every source set without running them
    Plan,
    /// Print the JSON schema of the build description
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Schema = cli.command {
        return commands::schema::execute();
    }

    let manager = ResourceFactoryManager::new(ResourceFactoryManagerConfig {
        config_path: cli.config.clone(),
        output_root: cli.output,
    })
    .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", cli.config.display(), e))?;
    info!(
        "Loaded {} with source sets {:?}",
        cli.config.display(),
        manager.source_sets()
    );

    match cli.command {
        Commands::Generate { source_set } => commands::generate::execute(&manager, &source_set),
        Commands::Plan => commands::plan::execute(&manager),
        Commands::Schema => commands::schema::execute(),
    }
}
