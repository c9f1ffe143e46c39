//! CLI argument parsing and command dispatch

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::commands;
use repo_mirror::output::OutputConfig;

/// Repository mirror - Keep local copies of package repositories up to date
#[derive(Parser, Debug)]
#[command(name = "repo-mirror")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mirror every repository, or a single one with --name
    Sync(commands::sync::SyncArgs),

    /// Check the repository store without running any tools
    Validate(commands::validate::ValidateArgs),

    /// List the repositories in the store
    Ls(commands::ls::LsArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let out = OutputConfig::from_env_and_flag(&self.color);
        init_logging(&self.log_level, &out)?;

        match self.command {
            Commands::Sync(args) => commands::sync::execute(args, &out),
            Commands::Validate(args) => commands::validate::execute(args, &out),
            Commands::Ls(args) => commands::ls::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: &str, out: &OutputConfig) -> Result<()> {
    let filter: log::LevelFilter = level
        .parse()
        .with_context(|| format!("Invalid log level '{}'", level))?;

    env_logger::Builder::new()
        .filter_level(filter)
        .parse_env("REPO_MIRROR_LOG")
        .write_style(out.log_style())
        .format_timestamp(None)
        .format_target(false)
        .try_init()
        .context("Failed to initialize logging")
}
