//! # CLI Command Implementations
//!
//! Each subcommand of `repo-mirror` lives in its own file with an `Args`
//! struct derived with `clap` and an `execute` function that calls into the
//! `repo_mirror` library.

pub mod completions;
pub mod ls;
pub mod sync;
pub mod validate;

use anyhow::{Context, Result};
use std::path::Path;

use repo_mirror::config::{self, Catalog};

/// Loads the repository store, failing with a readable message.
pub(crate) fn load_catalog(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        anyhow::bail!(
            "Repository store not found: {}\n  hint: pass --config or set REPO_MIRROR_CONFIG",
            path.display()
        );
    }
    config::from_file(path).with_context(|| format!("Failed to load config from {}", path.display()))
}
