//! Mirroring of RHN channels with reposync.
//!
//! The mirror of an RHN repository is a channel reference, `rhn://<channel>`,
//! and reposync names its download directory after the channel. The
//! repository therefore has to carry the channel's name.

use super::{rhn_arch, RequiredTool, Strategy};
use crate::config::{Breed, Repository, Settings};
use crate::context::SyncContext;
use crate::defaults;
use crate::descriptor::{self, DescriptorMode};
use crate::error::{Error, Result};
use crate::index;
use crate::runner::{Advisory, CommandSpec};
use log::warn;
use std::fs;

pub struct RhnStrategy;

const RHN_SCHEME: &str = "rhn://";

/// Channel name of an `rhn://<channel>` reference.
pub fn channel_name(mirror: &str) -> Option<&str> {
    let scheme = mirror.get(..RHN_SCHEME.len())?;
    if scheme.eq_ignore_ascii_case(RHN_SCHEME) {
        mirror.get(RHN_SCHEME.len()..)
    } else {
        None
    }
}

fn channel_of(repo: &Repository) -> Result<&str> {
    channel_name(&repo.mirror).ok_or_else(|| Error::MirrorUrl {
        mirror: repo.mirror.clone(),
        message: "RHN mirrors are written as rhn://<channel>".to_string(),
    })
}

impl Strategy for RhnStrategy {
    fn breed(&self) -> Breed {
        Breed::Rhn
    }

    fn required_tools<'s>(&self, settings: &'s Settings) -> Vec<RequiredTool<'s>> {
        vec![RequiredTool {
            path: &settings.tools.reposync,
            package: "yum-utils",
        }]
    }

    fn validate(&self, repo: &Repository) -> Result<()> {
        if !repo.mirror_locally {
            return Err(Error::UnsupportedOption {
                repo: repo.name.clone(),
                message: "rhn:// repos do not work with --mirror-locally=0".to_string(),
            });
        }
        if repo.has_rpm_list() {
            warn!("--rpm-list is not supported for RHN content");
        }

        let channel = channel_of(repo)?;
        if repo.name != channel {
            return Err(Error::NameMismatch {
                name: repo.name.clone(),
                channel: channel.to_string(),
            });
        }
        Ok(())
    }

    fn build_command(&self, repo: &Repository, ctx: &SyncContext<'_>) -> Result<Option<CommandSpec>> {
        let settings = ctx.settings;
        let origin = settings.repo_path(&repo.name).join(defaults::ORIGIN_DIR_NAME);
        fs::create_dir_all(&origin)?;

        let mut command = ctx
            .command(&settings.tools.reposync)
            .flags(&settings.reposync_flags)?
            .args(["-r", channel_of(repo)?])
            .arg(format!("--download_path={}", settings.mirror_root().display()));
        if let Some(arch) = rhn_arch(&repo.arch) {
            command = command.args(["-a", arch]);
        }
        Ok(Some(command))
    }

    fn post_process(&self, repo: &Repository, ctx: &SyncContext<'_>) -> Result<Vec<Advisory>> {
        let settings = ctx.settings;
        let dest = settings.repo_path(&repo.name);

        descriptor::write(
            &dest.join(defaults::ORIGIN_DIR_NAME),
            repo,
            settings,
            DescriptorMode::Source,
        )?;
        let advisories = index::rebuild(&dest, repo, ctx);
        descriptor::write(&dest, repo, settings, DescriptorMode::Client)?;
        Ok(advisories)
    }
}
