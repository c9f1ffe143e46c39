//! # Index Rebuilding
//!
//! After a mirror update the package metadata has to be regenerated so
//! clients see the new packages. This module walks a mirrored tree and runs
//! `createrepo` once per indexed directory.
//!
//! An indexed directory covers everything beneath it, so the walk does not
//! descend past a directory it has handed to createrepo. Every step here is
//! best-effort: failures become [`Advisory`] entries, never errors.

use crate::config::Repository;
use crate::context::SyncContext;
use crate::defaults::STALE_INDEX_PATHS;
use crate::error::Error;
use crate::runner::Advisory;
use log::{info, warn};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Rebuilds the index of the tree rooted at `root`.
pub fn rebuild(root: &Path, repo: &Repository, ctx: &SyncContext<'_>) -> Vec<Advisory> {
    let mut advisories = Vec::new();
    if !root.is_dir() {
        info!("- nothing to index at {}", root.display());
        return advisories;
    }

    info!("- walking: {}", root.display());
    let rsync = repo.breed == "rsync";
    let mut walker = WalkDir::new(root).into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                advisories.push(Advisory::failed(
                    format!("walk {}", root.display()),
                    Error::from(e).to_string(),
                ));
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let dir = entry.path();
        if dir.exists() || rsync {
            advisories.extend(purge_stale(dir));
            advisories.push(createrepo(dir, repo, ctx));
            walker.skip_current_dir();
        }
    }
    advisories
}

/// Removes metadata left over from interrupted createrepo runs.
fn purge_stale(dir: &Path) -> Vec<Advisory> {
    STALE_INDEX_PATHS
        .iter()
        .map(|rel| dir.join(rel))
        .filter(|path| path.exists())
        .map(|path| {
            let step = format!("purge {}", path.display());
            match fs::remove_dir_all(&path) {
                Ok(()) => Advisory::done(step),
                Err(e) => {
                    warn!("- could not remove {}: {}", path.display(), e);
                    Advisory::failed(step, e.to_string())
                }
            }
        })
        .collect()
}

fn createrepo(dir: &Path, repo: &Repository, ctx: &SyncContext<'_>) -> Advisory {
    let command = match ctx
        .command(&ctx.settings.tools.createrepo)
        .flags(&repo.createrepo_flags)
    {
        Ok(command) => command.arg(dir.display().to_string()),
        Err(e) => return Advisory::failed(format!("createrepo {}", dir.display()), e.to_string()),
    };
    ctx.log_command(&command);

    let advisory = Advisory::run(ctx.runner, &command);
    if !advisory.is_done() {
        warn!("- createrepo failed.  Is it installed?");
    }
    advisory
}
