//! Mirroring of plain trees with rsync.

use super::{RequiredTool, Strategy};
use crate::config::{Breed, Repository, Settings};
use crate::context::SyncContext;
use crate::descriptor::{self, DescriptorMode};
use crate::error::{Error, Result};
use crate::index;
use crate::runner::{Advisory, CommandSpec};
use log::warn;

pub struct RsyncStrategy;

/// Remote shell transport is used unless the mirror is served by an rsync
/// daemon or is a local path.
fn needs_ssh(mirror: &str) -> bool {
    !mirror.starts_with("rsync://") && !mirror.starts_with('/')
}

impl Strategy for RsyncStrategy {
    fn breed(&self) -> Breed {
        Breed::Rsync
    }

    fn required_tools<'s>(&self, _settings: &'s Settings) -> Vec<RequiredTool<'s>> {
        Vec::new()
    }

    fn validate(&self, repo: &Repository) -> Result<()> {
        if !repo.mirror_locally {
            return Err(Error::UnsupportedOption {
                repo: repo.name.clone(),
                message: "rsync:// urls must be mirrored locally, yum cannot access them directly"
                    .to_string(),
            });
        }
        if repo.has_rpm_list() {
            warn!("--rpm-list is not supported for rsync'd repositories");
        }
        Ok(())
    }

    fn build_command(&self, repo: &Repository, ctx: &SyncContext<'_>) -> Result<Option<CommandSpec>> {
        let settings = ctx.settings;
        let dest = settings.repo_path(&repo.name);

        // trailing slash copies the contents, not the directory itself
        let mut source = repo.mirror.clone();
        if !source.ends_with('/') {
            source.push('/');
        }

        let mut command = ctx.command(&settings.tools.rsync).arg("-rltDv");
        if needs_ssh(&repo.mirror) {
            command = command.args(["-e", "ssh"]);
        }
        let command = command
            .args(["--delete", "--delete-excluded"])
            .arg(format!("--exclude-from={}", settings.rsync_exclude.display()))
            .arg(source)
            .arg(dest.display().to_string());
        Ok(Some(command))
    }

    fn post_process(&self, repo: &Repository, ctx: &SyncContext<'_>) -> Result<Vec<Advisory>> {
        let dest = ctx.settings.repo_path(&repo.name);
        let advisories = index::rebuild(&dest, repo, ctx);
        descriptor::write(&dest, repo, ctx.settings, DescriptorMode::Client)?;
        Ok(advisories)
    }
}
