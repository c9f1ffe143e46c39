//! # Breed Strategies
//!
//! Each repository breed has its own way of being mirrored: rsync copies a
//! tree, reposync/yumdownloader pull from a yum repository or an RHN
//! channel, debmirror builds a Debian pool. They all implement [`Strategy`]
//! and are driven the same way by [`sync`]:
//!
//! 1. every tool from [`Strategy::required_tools`] must be installed,
//! 2. [`Strategy::validate`] rejects option combinations the breed cannot
//!    honor,
//! 3. the command from [`Strategy::build_command`] is run, if there is one;
//!    a non-zero exit is `SyncFailed`,
//! 4. [`Strategy::post_process`] rebuilds indexes and writes descriptors.

mod apt;
mod rhn;
mod rsync;
mod yum;

pub use apt::{AptMirror, AptStrategy};
pub use rhn::RhnStrategy;
pub use rsync::RsyncStrategy;
pub use yum::YumStrategy;

use crate::config::{Breed, Repository, Settings};
use crate::context::SyncContext;
use crate::error::{Error, Result};
use crate::runner::{Advisory, CommandSpec};

/// A required external tool and the package that provides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredTool<'s> {
    pub path: &'s str,
    pub package: &'static str,
}

/// Breed-specific mirroring behavior.
pub trait Strategy {
    fn breed(&self) -> Breed;

    /// Tools that must exist before anything else happens.
    fn required_tools<'s>(&self, settings: &'s Settings) -> Vec<RequiredTool<'s>>;

    /// Checks the repository definition without touching disk or running
    /// anything. Unsupported-but-harmless options only produce warnings.
    fn validate(&self, repo: &Repository) -> Result<()>;

    /// Prepares the destination and assembles the mirror command. `None`
    /// means there is nothing to download for this repository.
    fn build_command(&self, repo: &Repository, ctx: &SyncContext<'_>) -> Result<Option<CommandSpec>>;

    /// Work that follows a successful mirror command.
    fn post_process(&self, repo: &Repository, ctx: &SyncContext<'_>) -> Result<Vec<Advisory>>;
}

/// Returns the strategy responsible for `breed`.
pub fn strategy_for(breed: Breed) -> &'static dyn Strategy {
    match breed {
        Breed::Rhn => &RhnStrategy,
        Breed::Yum => &YumStrategy,
        Breed::Apt => &AptStrategy,
        Breed::Rsync => &RsyncStrategy,
    }
}

/// Mirrors one repository with the strategy of its breed.
///
/// Returns the advisories of the best-effort steps that ran.
pub fn sync(repo: &Repository, ctx: &SyncContext<'_>) -> Result<Vec<Advisory>> {
    let strategy = strategy_for(repo.breed()?);

    for tool in strategy.required_tools(ctx.settings) {
        ensure_tool(ctx, tool)?;
    }
    strategy.validate(repo)?;

    if let Some(command) = strategy.build_command(repo, ctx)? {
        run_mirror(repo, &command, ctx)?;
    }
    strategy.post_process(repo, ctx)
}

/// Checks a repository definition the way [`sync`] would, without running
/// anything.
pub fn check(repo: &Repository) -> Result<()> {
    strategy_for(repo.breed()?).validate(repo)
}

pub(crate) fn ensure_tool(ctx: &SyncContext<'_>, tool: RequiredTool<'_>) -> Result<()> {
    if ctx.runner.tool_exists(tool.path) {
        Ok(())
    } else {
        Err(Error::MissingTool {
            tool: tool.path.to_string(),
            package: tool.package.to_string(),
        })
    }
}

/// Runs a mirror command, turning a non-zero exit into `SyncFailed`.
pub(crate) fn run_mirror(repo: &Repository, command: &CommandSpec, ctx: &SyncContext<'_>) -> Result<()> {
    ctx.log_command(command);
    let status = ctx.runner.run(command)?;
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::SyncFailed {
            repo: repo.name.clone(),
            command: command.to_string(),
            status: status.to_string(),
        })
    }
}

/// Arch spelling used by reposync for yum repositories. `i386` is widened to
/// `i686` so newer kernels are mirrored too.
pub(crate) fn yum_arch(arch: &str) -> Option<&str> {
    match arch {
        "" => None,
        "x86" | "i386" => Some("i686"),
        other => Some(other),
    }
}

/// Arch spelling used by reposync for RHN channels.
pub(crate) fn rhn_arch(arch: &str) -> Option<&str> {
    match arch {
        "" => None,
        "i386" => Some("i686"),
        other => Some(other),
    }
}

/// Arch spelling used by debmirror.
pub(crate) fn debian_arch(arch: &str) -> &str {
    match arch {
        "x86" => "i386",
        "x86_64" => "amd64",
        other => other,
    }
}
