//! # Repository Descriptor Files
//!
//! Writes the INI-style `.repo` files that describe a mirror:
//!
//! - **Client mode** produces `config.repo` at the repository root. It is
//!   served to provisioned systems and points them at the local mirror
//!   through the `${server}` placeholder, which is rendered per system later.
//! - **Source mode** produces `<name>.repo`, consumed by reposync and
//!   yumdownloader to find the upstream repository.
//!
//! Files are always rewritten from scratch, so identical repository state
//! yields byte-identical files.

use crate::config::{Repository, Settings};
use crate::defaults;
use crate::error::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Which consumer a descriptor is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorMode {
    Client,
    Source,
}

impl DescriptorMode {
    /// File name of the descriptor, relative to its directory.
    pub fn file_name(self, repo: &Repository) -> String {
        match self {
            DescriptorMode::Client => defaults::CLIENT_DESCRIPTOR_NAME.to_string(),
            DescriptorMode::Source => format!("{}.repo", repo.name),
        }
    }
}

/// Rewrites an absolute local path into a `file://` URL.
fn as_url(mirror: &str) -> String {
    if mirror.starts_with('/') {
        format!("file://{}", mirror)
    } else {
        mirror.to_string()
    }
}

fn baseurl(repo: &Repository, settings: &Settings, mode: DescriptorMode) -> String {
    match mode {
        DescriptorMode::Client if repo.mirror_locally => format!(
            "http://{}/cobbler/{}/{}",
            defaults::SERVER_PLACEHOLDER,
            defaults::MIRROR_DIR_NAME,
            repo.name
        ),
        DescriptorMode::Client => as_url(&repo.mirror),
        DescriptorMode::Source => {
            as_url(&repo.mirror).replace(defaults::SERVER_TOKEN, &settings.http_server())
        }
    }
}

/// Renders a descriptor without touching the filesystem.
pub fn render(repo: &Repository, settings: &Settings, mode: DescriptorMode) -> String {
    let mut lines = vec![
        format!("[{}]", repo.name),
        format!("name={}", repo.name),
        format!("baseurl={}", baseurl(repo, settings, mode)),
    ];

    let mut has_enabled = false;
    let mut has_gpgcheck = false;
    if mode == DescriptorMode::Client {
        // options for yum plugins ride along unchanged
        for (key, value) in &repo.yumopts {
            lines.push(format!("{}={}", key, value));
            has_enabled |= key == "enabled";
            has_gpgcheck |= key == "gpgcheck";
        }
    }

    if !has_enabled {
        lines.push("enabled=1".to_string());
    }
    lines.push(format!("priority={}", repo.priority));
    if !has_gpgcheck {
        lines.push("gpgcheck=0".to_string());
    }

    let mut content = lines.join("\n");
    content.push('\n');
    content
}

/// Writes the descriptor for `repo` into `dir`, creating `dir` if needed,
/// and returns the path of the written file.
pub fn write(dir: &Path, repo: &Repository, settings: &Settings, mode: DescriptorMode) -> Result<PathBuf> {
    let path = dir.join(mode.file_name(repo));
    info!("- creating: {}", path.display());

    fs::create_dir_all(dir)?;
    fs::write(&path, render(repo, settings, mode))?;
    Ok(path)
}
