//! Mirroring of Debian-style repositories with debmirror.

use super::{debian_arch, RequiredTool, Strategy};
use crate::config::{Breed, Repository, Settings};
use crate::context::SyncContext;
use crate::error::{Error, Result};
use crate::runner::{Advisory, CommandSpec};

pub struct AptStrategy;

/// A mirror URL split the way debmirror takes it.
///
/// `http://ftp.debian.org/debian/dists/etch` becomes method `http`, host
/// `ftp.debian.org`, root `debian` and suite `etch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AptMirror {
    pub method: String,
    pub host: String,
    pub root: String,
    pub suite: String,
}

impl AptMirror {
    pub fn parse(mirror: &str) -> Result<Self> {
        let invalid = |message: &str| Error::MirrorUrl {
            mirror: mirror.to_string(),
            message: message.to_string(),
        };

        let (method, rest) = mirror
            .split_once("://")
            .ok_or_else(|| invalid("missing '://' after the access method"))?;
        if method.is_empty() {
            return Err(invalid("missing access method"));
        }
        let (host, path) = rest
            .split_once('/')
            .ok_or_else(|| invalid("missing path after the host"))?;
        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        // the root may be empty, so search with the leading slash restored
        let path = format!("/{}", path);
        let marker = path
            .rfind("/dists/")
            .ok_or_else(|| invalid("missing '/dists/' before the suite"))?;
        let root = path[..marker].trim_start_matches('/');
        let suite = &path[marker + "/dists/".len()..];
        if suite.is_empty() {
            return Err(invalid("missing suite after '/dists/'"));
        }

        Ok(Self {
            method: method.to_string(),
            host: host.to_string(),
            root: root.to_string(),
            suite: suite.to_string(),
        })
    }
}

impl Strategy for AptStrategy {
    fn breed(&self) -> Breed {
        Breed::Apt
    }

    fn required_tools<'s>(&self, settings: &'s Settings) -> Vec<RequiredTool<'s>> {
        vec![RequiredTool {
            path: &settings.tools.debmirror,
            package: "debmirror",
        }]
    }

    fn validate(&self, repo: &Repository) -> Result<()> {
        if repo.has_rpm_list() {
            return Err(Error::UnsupportedOption {
                repo: repo.name.clone(),
                message: "has_rpm_list not yet supported on apt repos".to_string(),
            });
        }
        if repo.arch.is_empty() {
            return Err(Error::UnsupportedOption {
                repo: repo.name.clone(),
                message: "Architecture is required for apt repositories".to_string(),
            });
        }
        if repo.mirror_locally {
            AptMirror::parse(&repo.mirror)?;
        }
        Ok(())
    }

    fn build_command(&self, repo: &Repository, ctx: &SyncContext<'_>) -> Result<Option<CommandSpec>> {
        if !repo.mirror_locally {
            return Ok(None);
        }

        let settings = ctx.settings;
        let mirror = AptMirror::parse(&repo.mirror)?;
        let dest = settings.repo_path(&repo.name);

        let command = ctx
            .command(&settings.tools.debmirror)
            .args(["--passive", "--nocleanup", "--ignore-release-gpg", "--verbose"])
            .arg(format!("--method={}", mirror.method))
            .arg(format!("--host={}", mirror.host))
            .arg(format!("--root={}", mirror.root))
            .arg(format!("--dist={}", mirror.suite))
            .arg(dest.display().to_string());
        let command = if repo.arch == "src" {
            command.arg("--source")
        } else {
            command.args(["--nosource", "-a", debian_arch(&repo.arch)])
        };
        Ok(Some(command))
    }

    fn post_process(&self, _repo: &Repository, _ctx: &SyncContext<'_>) -> Result<Vec<Advisory>> {
        Ok(Vec::new())
    }
}
