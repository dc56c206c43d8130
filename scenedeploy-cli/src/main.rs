//! scenedeploy CLI - Command-line interface
//!
//! Migrates builder documents, packages scenes and publishes them to land
//! parcels, worlds or the public scene pool.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use scenedeploy::config::{config_file_path, ConfigFile};
use scenedeploy::logging::{self, LoggingGuard, LoggingOptions};
use tracing::debug;

use commands::config::ConfigCommands;
use commands::deploy::DeployArgs;
use commands::deployments::DeploymentsCommands;
use commands::migrate::MigrateArgs;
use commands::package::PackageArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "scenedeploy", version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ~/.config/scenedeploy/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of configuration
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage configuration settings
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Migrate a project or scene document to the current schema
    Migrate(MigrateArgs),

    /// Build a scene package on disk
    Package(PackageArgs),

    /// Publish the workspace project
    Deploy(DeployArgs),

    /// Inspect and clear existing deployments
    #[command(subcommand)]
    Deployments(DeploymentsCommands),
}

fn init_logging(config: &ConfigFile, verbose: bool) -> Result<LoggingGuard, CliError> {
    let mut options = LoggingOptions::from(&config.logging);
    if verbose {
        options.level = "debug".to_string();
    }
    logging::init(&options).map_err(|e| CliError::Logging(e.to_string()))
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.clone().unwrap_or_else(config_file_path);

    let command = match cli.command {
        // Config commands operate on the file itself and skip the runtime setup.
        Commands::Config(command) => return commands::config::run(command, &config_path),
        command => command,
    };

    let config = ConfigFile::load_from(&config_path)?;
    let _guard = init_logging(&config, cli.verbose)?;
    debug!(path = %config_path.display(), "Loaded configuration");

    match command {
        Commands::Config(_) => Ok(()),
        Commands::Migrate(args) => commands::migrate::run(args),
        Commands::Package(args) => commands::package::run(args, &config).await,
        Commands::Deploy(args) => commands::deploy::run(args, &config).await,
        Commands::Deployments(command) => commands::deployments::run(command, &config).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
