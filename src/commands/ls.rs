//! # Ls Command Implementation
//!
//! This module implements the `ls` subcommand, which lists the repositories
//! of the store with their breed, update flag and mirror. `--json` prints
//! the full definitions instead.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use repo_mirror::defaults::DEFAULT_CONFIG_PATH;

/// List the repositories in the store
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Path to the repository store.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "REPO_MIRROR_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Print the repositories as JSON.
    #[arg(long)]
    pub json: bool,

    /// Only list repositories of this breed.
    #[arg(short, long, value_name = "BREED")]
    pub breed: Option<String>,
}

/// Execute the `ls` command.
pub fn execute(args: LsArgs) -> Result<()> {
    let catalog = super::load_catalog(&args.config)?;
    let repos: Vec<_> = catalog
        .repos
        .iter()
        .filter(|repo| args.breed.as_ref().is_none_or(|breed| &repo.breed == breed))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&repos)?);
        return Ok(());
    }

    if repos.is_empty() {
        println!("No repositories configured.");
        return Ok(());
    }

    let width = repos.iter().map(|repo| repo.name.len()).max().unwrap_or(0);
    for repo in &repos {
        let flag = if repo.keep_updated { "updated" } else { "frozen" };
        println!(
            "{:<width$}  {:<5}  {:<7}  {}",
            repo.name,
            repo.breed,
            flag,
            repo.mirror,
            width = width
        );
    }
    println!();
    println!("{} repositor{}", repos.len(), if repos.len() == 1 { "y" } else { "ies" });
    Ok(())
}
