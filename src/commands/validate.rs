//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which loads the
//! repository store and checks every repository the way a sync would,
//! without running anything.
//!
//! ## Functionality
//!
//! - **Store parsing**: YAML syntax, field types and unique names.
//! - **Repository checks**: known breed, options the breed supports, RHN
//!   channel naming, apt mirror URLs.
//! - **Tool checks**: with `--check-tools`, the external programs each
//!   repository needs must be installed.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use repo_mirror::breeds;
use repo_mirror::config::{Repository, Settings};
use repo_mirror::defaults::DEFAULT_CONFIG_PATH;
use repo_mirror::output::{emoji, status_line, Mark, OutputConfig};
use repo_mirror::runner::{CommandRunner, SystemRunner};

/// Check the repository store without running any tools
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the repository store.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "REPO_MIRROR_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Also check that the tools each repository needs are installed.
    #[arg(long)]
    pub check_tools: bool,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, out: &OutputConfig) -> Result<()> {
    println!(
        "{} Validating repository store: {}",
        emoji(out, "🔍", "[SCAN]"),
        args.config.display()
    );

    let catalog = match super::load_catalog(&args.config) {
        Ok(catalog) => catalog,
        Err(e) => {
            println!("{}", status_line(out, Mark::Fail, format!("{:#}", e)));
            return Err(e);
        }
    };
    println!("   Repositories: {}", catalog.repos.len());

    let mut invalid = Vec::new();
    for repo in &catalog.repos {
        match check_repo(repo, &catalog.settings, args.check_tools) {
            Ok(()) => println!(
                "   {}",
                status_line(out, Mark::Ok, format!("{} ({})", repo.name, repo.breed))
            ),
            Err(message) => {
                println!(
                    "   {}",
                    status_line(out, Mark::Fail, format!("{}: {}", repo.name, message))
                );
                invalid.push(repo.name.as_str());
            }
        }
    }

    if !invalid.is_empty() {
        anyhow::bail!("Invalid repositories: {}", invalid.join(", "));
    }
    println!("\n{} Repository store is valid", emoji(out, "✅", "[OK]"));
    Ok(())
}

fn check_repo(
    repo: &Repository,
    settings: &Settings,
    check_tools: bool,
) -> std::result::Result<(), String> {
    breeds::check(repo).map_err(|e| e.to_string())?;
    if !check_tools {
        return Ok(());
    }

    let strategy = breeds::strategy_for(repo.breed().map_err(|e| e.to_string())?);
    let missing: Vec<String> = strategy
        .required_tools(settings)
        .into_iter()
        .filter(|tool| !SystemRunner.tool_exists(tool.path))
        .map(|tool| format!("{} (from {})", tool.path, tool.package))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("missing tools: {}", missing.join(", ")))
    }
}
