//! DPCMS CLI
//!
//! Command-line interface for DPCMS - medical reference content management.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dpcms_core::{Config, ExportFormat, Repository, TracingMeter};

mod commands;
mod output;
mod prompt;

use commands::record::{ListArgs, RecordFields};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "dpcms")]
#[command(about = "DPCMS - Medical reference content management")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List content, with optional search, filters and sorting
    #[command(alias = "ls")]
    List(ListArgs),
    /// Show one record
    Show {
        /// Record ID (full ID or prefix)
        id: String,
    },
    /// Create a record
    #[command(alias = "create")]
    Add(RecordFields),
    /// Change fields of an existing record
    #[command(alias = "edit")]
    Update {
        /// Record ID (full ID or prefix)
        id: String,
        #[command(flatten)]
        fields: RecordFields,
    },
    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Record ID (full ID or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Copy a record as a new draft
    Duplicate {
        /// Record ID (full ID or prefix)
        id: String,
    },
    /// Show counts by type, urgency and status
    Stats,
    /// Check a draft JSON file without saving it
    Validate {
        /// Draft file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Export all content to a JSON artifact
    Export {
        /// Artifact format (only json is supported)
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,
        /// Directory to write the artifact into (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Append records from an exported artifact
    Import {
        /// Artifact file (.json)
        file: PathBuf,
    },
    /// Replace content with the last backup
    Restore {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Discard all content and restore the default records
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show storage status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, exported_by, log_file)
        key: String,
        /// Configuration value ("none" clears log_file)
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_deref();

    // Config commands don't need the repository
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let mut repo = Repository::open(&config, Arc::new(TracingMeter))
        .context("Failed to open content repository")?;
    report_store_error(&mut repo, &output);

    let result = match cli.command {
        Commands::List(args) => commands::record::list(&mut repo, args, &output),
        Commands::Show { id } => commands::record::show(&repo, id, &output),
        Commands::Add(fields) => commands::record::add(&mut repo, fields, &output),
        Commands::Update { id, fields } => commands::record::update(&mut repo, id, fields, &output),
        Commands::Delete { id, yes } => commands::record::delete(&mut repo, id, yes, &output),
        Commands::Duplicate { id } => commands::record::duplicate(&mut repo, id, &output),
        Commands::Stats => commands::stats::show(&repo, &output),
        Commands::Validate { file } => commands::record::validate(&repo, &file, &output),
        Commands::Export {
            format,
            output: dir,
        } => commands::transfer::export(&repo, format, dir, &output).await,
        Commands::Import { file } => commands::transfer::import(&mut repo, &file, &output).await,
        Commands::Restore { yes } => commands::backup::restore(&mut repo, yes, &output),
        Commands::Reset { yes } => commands::backup::reset(&mut repo, yes, &output),
        Commands::Status => commands::status::show(&repo, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    };

    // Saves that failed during the command
    report_store_error(&mut repo, &output);

    result
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&Path>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Print and clear the repository's load/save error, if any
fn report_store_error(repo: &mut Repository, output: &Output) {
    if let Some(error) = repo.error() {
        if !output.is_quiet() {
            eprintln!("⚠ {}", error);
            if let Some(hint) = repo.recovery_hint() {
                eprintln!("  {}", hint);
            }
        }
        repo.clear_error();
    }
}

/// Install file or stderr logging when DPCMS_LOG is set
fn init_logging(config: &Config) {
    // Only log if DPCMS_LOG is set
    let Ok(log_level) = std::env::var("DPCMS_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!("dpcms_core={},dpcms_cli={}", log_level, log_level));

    match config.log_file {
        Some(ref log_path) => {
            let log_file = match File::create(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
                    return;
                }
            };

            // Ignore error if already initialized
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(log_file)
                .try_init();

            info!("Logging initialized to {:?}", log_path);
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
