//! # Sync Driver
//!
//! Walks the repository store, mirrors each eligible repository with its
//! breed strategy under a retry policy, and normalizes permissions after
//! every processed repository.
//!
//! ## Failure Handling
//!
//! Every failed attempt is logged with the number of tries left. When all
//! attempts of a repository fail:
//!
//! - by default the run aborts at once with [`Error::RetryLimit`], and later
//!   repositories are not touched;
//! - with `nofail` the repository is recorded as a soft failure and the run
//!   goes on. A run that finishes with soft failures returns
//!   [`Error::OverallFailure`] naming them.

use crate::breeds;
use crate::config::{RepoStore, Repository};
use crate::context::SyncContext;
use crate::error::{Error, Result};
use crate::permissions::{self, AccessControl};
use crate::runner::{Advisory, CommandRunner};
use log::{debug, error, info, warn};
use std::fs;

/// How often a failing repository is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    tries: u32,
}

impl RetryPolicy {
    pub fn new(tries: u32) -> Self {
        Self { tries }
    }

    /// Parses a retry count given as text, e.g. from the command line.
    pub fn parse(raw: &str) -> Result<Self> {
        raw.trim()
            .parse::<u32>()
            .map(Self::new)
            .map_err(|_| Error::Config {
                message: format!("retry value must be a non-negative integer, got {:?}", raw),
            })
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    /// Total attempts per repository: the first one plus every retry.
    pub fn attempts(&self) -> u32 {
        self.tries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Mirrors a single repository; the seam between the driver and the breed
/// strategies.
pub trait RepoSyncer {
    fn sync(&self, repo: &Repository, ctx: &SyncContext<'_>) -> Result<Vec<Advisory>>;
}

/// Dispatches to the strategy of the repository's breed.
#[derive(Debug, Default, Clone, Copy)]
pub struct BreedDispatcher;

impl RepoSyncer for BreedDispatcher {
    fn sync(&self, repo: &Repository, ctx: &SyncContext<'_>) -> Result<Vec<Advisory>> {
        breeds::sync(repo, ctx)
    }
}

/// What happened to one repository during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    Skipped,
    Synced { attempts: u32 },
    SoftFailed { attempts: u32, last_error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReport {
    pub name: String,
    pub outcome: RepoOutcome,
    /// Best-effort steps run for this repository, in order.
    pub advisories: Vec<Advisory>,
}

/// Per-repository results of a run that completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub reports: Vec<RepoReport>,
}

impl SyncSummary {
    /// Names of the repositories that were synced.
    pub fn synced(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, RepoOutcome::Synced { .. }))
            .map(|r| r.name.as_str())
            .collect()
    }

    /// Names of the repositories that were skipped.
    pub fn skipped(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|r| r.outcome == RepoOutcome::Skipped)
            .map(|r| r.name.as_str())
            .collect()
    }

    /// Maintenance steps that did not succeed, across all repositories.
    pub fn failed_advisories(&self) -> impl Iterator<Item = (&str, &Advisory)> {
        self.reports.iter().flat_map(|r| {
            r.advisories
                .iter()
                .filter(|a| !a.is_done())
                .map(move |a| (r.name.as_str(), a))
        })
    }
}

/// Runs a sync over every repository of a store.
pub struct SyncDriver<'a> {
    store: &'a dyn RepoStore,
    runner: &'a dyn CommandRunner,
    access: &'a dyn AccessControl,
    syncer: &'a dyn RepoSyncer,
    policy: RetryPolicy,
    nofail: bool,
}

impl<'a> SyncDriver<'a> {
    pub fn new(
        store: &'a dyn RepoStore,
        runner: &'a dyn CommandRunner,
        access: &'a dyn AccessControl,
    ) -> Self {
        Self {
            store,
            runner,
            access,
            syncer: &BreedDispatcher,
            policy: RetryPolicy::default(),
            nofail: false,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Keeps going after a repository exhausts its attempts.
    pub fn nofail(mut self, nofail: bool) -> Self {
        self.nofail = nofail;
        self
    }

    pub fn with_syncer(mut self, syncer: &'a dyn RepoSyncer) -> Self {
        self.syncer = syncer;
        self
    }

    /// Syncs every repository, or only `name_filter` when given.
    ///
    /// Without a filter, repositories with `keep_updated` off are skipped.
    /// `verbose` logs every external command at `info` level.
    pub fn run(&self, name_filter: Option<&str>, verbose: bool) -> Result<SyncSummary> {
        let settings = self.store.settings();
        let mut summary = SyncSummary::default();
        let mut failed = Vec::new();

        for repo in self.store.repos() {
            let env = repo.env_overlay();
            for (key, value) in &env {
                debug!("environment: {}={}", key, value);
            }

            let selected = match name_filter {
                Some(name) => repo.name == name,
                None if !repo.keep_updated => {
                    info!("- {} is set to not be updated", repo.name);
                    false
                }
                None => true,
            };
            if !selected {
                summary.reports.push(RepoReport {
                    name: repo.name.clone(),
                    outcome: RepoOutcome::Skipped,
                    advisories: Vec::new(),
                });
                continue;
            }

            let repo_path = settings.repo_path(&repo.name);
            if !repo_path.is_dir() && !repo.is_rhn_reference() {
                fs::create_dir_all(&repo_path)?;
            }

            let ctx = SyncContext::new(settings, self.runner, self.access)
                .with_env(env)
                .verbose(verbose);
            let (outcome, mut advisories) = self.sync_with_retries(repo, &ctx)?;
            if let RepoOutcome::SoftFailed { .. } = outcome {
                failed.push(repo.name.clone());
            }

            advisories.extend(permissions::apply(&repo_path, &ctx));
            summary.reports.push(RepoReport {
                name: repo.name.clone(),
                outcome,
                advisories,
            });
        }

        if failed.is_empty() {
            Ok(summary)
        } else {
            Err(Error::OverallFailure { failed })
        }
    }

    fn sync_with_retries(
        &self,
        repo: &Repository,
        ctx: &SyncContext<'_>,
    ) -> Result<(RepoOutcome, Vec<Advisory>)> {
        let attempts = self.policy.attempts();
        let mut last_error = None;

        for attempt in 1..=attempts {
            info!("- syncing {} (attempt {} of {})", repo.name, attempt, attempts);
            match self.syncer.sync(repo, ctx) {
                Ok(advisories) => {
                    return Ok((RepoOutcome::Synced { attempts: attempt }, advisories));
                }
                Err(e) => {
                    error!("- reposync failed for {}: {}", repo.name, e);
                    warn!("- reposync failed, tries left: {}", attempts - attempt);
                    last_error = Some(e);
                }
            }
        }

        let last = last_error.unwrap_or_else(|| Error::Config {
            message: "no sync attempt was made".to_string(),
        });
        if self.nofail {
            warn!("- reposync failed, retry limit reached, skipping {}", repo.name);
            Ok((
                RepoOutcome::SoftFailed {
                    attempts,
                    last_error: last.to_string(),
                },
                Vec::new(),
            ))
        } else {
            Err(Error::RetryLimit {
                repo: repo.name.clone(),
                attempts,
                last: Box::new(last),
            })
        }
    }
}
