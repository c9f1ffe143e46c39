//! # Repository Mirror Library
//!
//! This library keeps local on-disk mirrors of remote package repositories
//! for a provisioning server, so installed systems can fetch packages without
//! reaching external networks. It is used by the `repo-mirror` command-line
//! tool but the sync driver can be embedded anywhere a [`config::RepoStore`]
//! is available.
//!
//! ## Quick Example
//!
//! ```
//! use repo_mirror::config;
//! use repo_mirror::descriptor::{self, DescriptorMode};
//!
//! let catalog = config::parse(r#"
//! repos:
//!   - name: f12-updates
//!     breed: yum
//!     mirror: http://download.example.org/pub/fedora/updates/12/x86_64
//!     priority: 10
//! "#).unwrap();
//!
//! let repo = catalog.get("f12-updates").unwrap();
//! let content = descriptor::render(repo, &catalog.settings, DescriptorMode::Client);
//! assert!(content.starts_with("[f12-updates]\n"));
//! assert!(content.contains("priority=10\n"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: repositories, server settings and the
//!   YAML-backed store.
//! - **Commands (`runner`)**: structured external commands, executed through
//!   the `CommandRunner` seam.
//! - **Strategies (`breeds`)**: one mirroring strategy per repository breed
//!   (yum, rhn, apt, rsync).
//! - **Maintenance (`descriptor`, `index`, `permissions`)**: client and
//!   source `.repo` files, metadata rebuilds and ownership fixes.
//! - **Driver (`sync`)**: retries, soft failures and the overall run.
//!
//! ## Execution Flow
//!
//! For every eligible repository, [`sync::SyncDriver`]:
//!
//! 1.  Creates the destination under `<webdir>/repo_mirror/<name>`.
//! 2.  Dispatches to the breed strategy, retrying failed attempts.
//! 3.  Lets the strategy rebuild the index and write descriptors.
//! 4.  Normalizes ownership, modes and security context of the mirror.

pub mod breeds;
pub mod config;
pub mod context;
pub mod defaults;
pub mod descriptor;
pub mod error;
pub mod index;
pub mod output;
pub mod permissions;
pub mod runner;
pub mod sync;

#[cfg(test)]
mod test_support;
