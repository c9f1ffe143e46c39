//! Mirroring of yum repositories.
//!
//! A full mirror runs reposync against a source descriptor written into the
//! hidden `.origin` directory. When the repository lists packages, only
//! those (and, with the default flags, their dependencies) are fetched with
//! yumdownloader. Either way the comps group file is copied when upstream
//! has one.

use super::{ensure_tool, yum_arch, RequiredTool, Strategy};
use crate::config::{Breed, Repository, Settings};
use crate::context::SyncContext;
use crate::defaults;
use crate::descriptor::{self, DescriptorMode};
use crate::error::{Error, Result};
use crate::index;
use crate::runner::{Advisory, CommandSpec};
use log::{debug, info};
use std::fs;
use std::path::Path;

pub struct YumStrategy;

impl Strategy for YumStrategy {
    fn breed(&self) -> Breed {
        Breed::Yum
    }

    fn required_tools<'s>(&self, settings: &'s Settings) -> Vec<RequiredTool<'s>> {
        vec![RequiredTool {
            path: &settings.tools.reposync,
            package: "yum-utils",
        }]
    }

    fn validate(&self, _repo: &Repository) -> Result<()> {
        Ok(())
    }

    fn build_command(&self, repo: &Repository, ctx: &SyncContext<'_>) -> Result<Option<CommandSpec>> {
        if !repo.mirror_locally {
            return Ok(None);
        }

        let settings = ctx.settings;
        let dest = settings.repo_path(&repo.name);
        let source = descriptor::write(
            &dest.join(defaults::ORIGIN_DIR_NAME),
            repo,
            settings,
            DescriptorMode::Source,
        )?;

        let command = if repo.has_rpm_list() {
            fs::create_dir_all(&dest)?;
            let mut command = ctx
                .command(&settings.tools.yumdownloader)
                .flags(&settings.yumdownloader_flags)?;
            if repo.arch == "src" {
                command = command.arg("--source");
            }
            command
                .arg("--disablerepo=*")
                .arg(format!("--enablerepo={}", repo.name))
                .arg("-c")
                .arg(source.display().to_string())
                .arg(format!("--destdir={}", dest.display()))
                .args(repo.rpm_list.iter().cloned())
        } else {
            let mut command = ctx
                .command(&settings.tools.reposync)
                .flags(&settings.reposync_flags)?
                .arg(format!("--config={}", source.display()))
                .arg(format!("--repoid={}", repo.name))
                .arg(format!("--download_path={}", settings.mirror_root().display()));
            if let Some(arch) = yum_arch(&repo.arch) {
                command = command.args(["-a", arch]);
            }
            command
        };
        Ok(Some(command))
    }

    fn post_process(&self, repo: &Repository, ctx: &SyncContext<'_>) -> Result<Vec<Advisory>> {
        let dest = ctx.settings.repo_path(&repo.name);

        fetch_comps(repo, &dest, ctx)?;

        let advisories = if repo.mirror_locally {
            index::rebuild(&dest, repo, ctx)
        } else {
            Vec::new()
        };
        descriptor::write(&dest, repo, ctx.settings, DescriptorMode::Client)?;
        Ok(advisories)
    }
}

/// Copies `repodata/comps.xml` from the mirror when it has one.
///
/// A failed probe means the file is absent. A failed download after a
/// successful probe is an error.
fn fetch_comps(repo: &Repository, dest: &Path, ctx: &SyncContext<'_>) -> Result<()> {
    let wget = &ctx.settings.tools.wget;
    ensure_tool(
        ctx,
        RequiredTool {
            path: wget,
            package: "wget",
        },
    )?;

    let url = format!("{}/repodata/comps.xml", repo.mirror.trim_end_matches('/'));
    let probe = ctx.command(wget).args(["-q", url.as_str(), "-O", "/dev/null"]);
    ctx.log_command(&probe);
    match ctx.runner.run(&probe) {
        Ok(status) if status.is_success() => {}
        Ok(status) => {
            debug!("- no comps file at {} ({})", url, status);
            return Ok(());
        }
        Err(e) => {
            debug!("- comps probe failed: {}", e);
            return Ok(());
        }
    }

    let repodata = dest.join("repodata");
    fs::create_dir_all(&repodata)?;
    let target = repodata.join("comps.xml");
    let fetch = ctx
        .command(wget)
        .args(["-q", url.as_str(), "-O"])
        .arg(target.display().to_string());
    info!("- fetching {}", url);
    ctx.log_command(&fetch);

    let fetched = matches!(ctx.runner.run(&fetch), Ok(status) if status.is_success());
    if fetched {
        Ok(())
    } else {
        Err(Error::ResourceFetchFailed {
            url,
            dest: target.display().to_string(),
        })
    }
}
