//! cmdpal - searchable command reference kept in sync with a remote catalog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use cmdpal_core::{CommandLibrary, Deployment, PaletteConfig};

mod commands;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "cmdpal",
    about = "Searchable command reference with remote catalog sync",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[clap(long, global = true)]
    log_json: bool,

    /// Override configuration file path
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Override database location
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    /// Keep the database in the working directory
    #[clap(long, global = true)]
    dev: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pull the remote catalog if it is newer than the local copy
    Sync,

    /// List stored commands
    List {
        /// Output as JSON
        #[clap(long)]
        json: bool,

        /// Only user-added commands
        #[clap(long, conflicts_with = "catalog")]
        custom: bool,

        /// Only catalog commands
        #[clap(long)]
        catalog: bool,

        /// Sync before listing
        #[clap(long)]
        refresh: bool,
    },

    /// Add a custom command
    Add {
        /// Display name
        #[clap(long, required_unless_present = "from_file")]
        name: Option<String>,

        /// Command syntax, e.g. "docker ps -a"
        #[clap(long, required_unless_present = "from_file")]
        syntax: Option<String>,

        /// What the command does
        #[clap(long)]
        description: Option<String>,

        /// Comma-separated tags
        #[clap(long)]
        tags: Option<String>,

        /// Read the full entry from a JSON file
        #[clap(long, conflicts_with_all = ["name", "syntax", "description", "tags"])]
        from_file: Option<PathBuf>,
    },

    /// Remove a custom command
    Remove {
        /// Custom command id
        id: String,
    },

    /// Show the local catalog version
    Version,

    /// Show the resolved configuration
    Config {
        /// Write the resolved configuration to the config file
        #[clap(long)]
        save: bool,
    },
}

/// Initialize tracing with CLI flags
fn initialize_tracing(log_level: &LogLevel, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Config path, loaded config and deployment for this invocation
fn resolve_config(cli: &Cli) -> Result<(PathBuf, PaletteConfig, Deployment)> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => PaletteConfig::default_config_path()?,
    };
    let mut config = PaletteConfig::load_with_env(&path)?;
    if let Some(db) = &cli.db {
        config.database_path = Some(db.clone());
    }

    let deployment = if cli.dev {
        Deployment::Development
    } else {
        Deployment::detect()
    };
    Ok((path, config, deployment))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level, cli.log_json);

    let (config_path, config, deployment) = resolve_config(&cli)?;

    if let Command::Config { save } = &cli.command {
        return commands::show_config(&config_path, &config, deployment, *save);
    }

    let library = CommandLibrary::from_config(&config, deployment)?;
    library
        .initialize()
        .await
        .context("Failed to open the command store")?;

    let result = match cli.command {
        Command::Sync => commands::sync(&library).await,
        Command::List {
            json,
            custom,
            catalog,
            refresh,
        } => {
            let filter = commands::ListFilter::from_flags(custom, catalog);
            commands::list(&library, filter, json, refresh).await
        }
        Command::Add {
            name,
            syntax,
            description,
            tags,
            from_file,
        } => {
            let entry = match from_file {
                Some(path) => commands::read_entry_file(&path)?,
                None => commands::entry_from_args(
                    name.as_deref().unwrap_or_default(),
                    syntax.as_deref().unwrap_or_default(),
                    description.as_deref(),
                    tags.as_deref(),
                ),
            };
            commands::add(&library, entry).await
        }
        Command::Remove { id } => commands::remove(&library, &id).await,
        Command::Version => {
            println!("{}", library.local_version());
            Ok(())
        }
        Command::Config { .. } => Ok(()),
    };

    library.store().close().await;
    result
}
