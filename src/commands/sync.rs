//! # Sync Command Implementation
//!
//! This module implements the `sync` subcommand, which mirrors the
//! repositories of the store.
//!
//! ## Functionality
//!
//! - **Whole-fleet runs**: without `--name`, every repository with
//!   `keep_updated` set is mirrored in store order.
//! - **Single repository**: `--name` mirrors one repository regardless of
//!   `keep_updated`.
//! - **Retries**: `--tries` sets how many times a failing repository is
//!   retried; `--no-fail` keeps going after a repository runs out of tries.
//! - **Dry runs**: `--dry-run` logs every command instead of running it.
//!   Directories and descriptor files are still written.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use repo_mirror::defaults::DEFAULT_CONFIG_PATH;
use repo_mirror::output::{emoji, status_line, Mark, OutputConfig};
use repo_mirror::permissions::SelinuxStatus;
use repo_mirror::runner::{CommandRunner, DryRunRunner, SystemRunner};
use repo_mirror::sync::{RepoOutcome, RetryPolicy, SyncDriver, SyncSummary};

/// Mirror every repository, or a single one with --name
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Path to the repository store.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "REPO_MIRROR_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Only sync the repository with this name.
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// How many times to retry a failing repository.
    #[arg(long, value_name = "N", default_value = "1", allow_hyphen_values = true)]
    pub tries: String,

    /// Continue with the next repository when one runs out of tries.
    #[arg(long)]
    pub no_fail: bool,

    /// Log the commands that would run without running them.
    #[arg(long)]
    pub dry_run: bool,

    /// Log external commands at debug level only.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `sync` command.
pub fn execute(args: SyncArgs, out: &OutputConfig) -> Result<()> {
    let policy = RetryPolicy::parse(&args.tries)?;
    let catalog = super::load_catalog(&args.config)?;

    if let Some(name) = &args.name {
        if catalog.get(name).is_none() {
            anyhow::bail!(
                "No repository named '{}' in {}",
                name,
                args.config.display()
            );
        }
    }

    let runner: Box<dyn CommandRunner> = if args.dry_run {
        Box::new(DryRunRunner)
    } else {
        Box::new(SystemRunner)
    };
    let access = SelinuxStatus::new();

    let summary = SyncDriver::new(&catalog, runner.as_ref(), &access)
        .with_policy(policy)
        .nofail(args.no_fail)
        .run(args.name.as_deref(), !args.quiet)?;

    print_summary(&summary, out);
    Ok(())
}

fn print_summary(summary: &SyncSummary, out: &OutputConfig) {
    println!("\n{} Sync summary:", emoji(out, "📊", "[INFO]"));
    for report in &summary.reports {
        let line = match &report.outcome {
            RepoOutcome::Synced { attempts } => status_line(
                out,
                Mark::Ok,
                format!("{} ({} attempt(s))", report.name, attempts),
            ),
            RepoOutcome::SoftFailed { last_error, .. } => {
                status_line(out, Mark::Fail, format!("{}: {}", report.name, last_error))
            }
            RepoOutcome::Skipped => status_line(out, Mark::Skip, &report.name),
        };
        println!("   {}", line);
    }

    for (name, advisory) in summary.failed_advisories() {
        println!(
            "   {}",
            status_line(out, Mark::Warn, format!("{}: {} did not complete", name, advisory.step))
        );
    }
}
