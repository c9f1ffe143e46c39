//! Per-repository execution context handed to strategies and maintenance
//! steps.

use crate::config::Settings;
use crate::permissions::AccessControl;
use crate::runner::{CommandRunner, CommandSpec};
use log::{debug, info};
use std::collections::BTreeMap;

/// Everything a strategy needs to act on one repository.
pub struct SyncContext<'a> {
    pub settings: &'a Settings,
    pub runner: &'a dyn CommandRunner,
    pub access: &'a dyn AccessControl,
    /// Log every command line at `info` instead of `debug`.
    pub verbose: bool,
    /// Environment overlay of the repository being synced.
    pub env: BTreeMap<String, String>,
}

impl<'a> SyncContext<'a> {
    pub fn new(
        settings: &'a Settings,
        runner: &'a dyn CommandRunner,
        access: &'a dyn AccessControl,
    ) -> Self {
        Self {
            settings,
            runner,
            access,
            verbose: false,
            env: BTreeMap::new(),
        }
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Starts a command carrying this repository's environment overlay.
    pub fn command(&self, program: &str) -> CommandSpec {
        CommandSpec::new(program).envs(&self.env)
    }

    pub fn log_command(&self, command: &CommandSpec) {
        if self.verbose {
            info!("- {}", command);
        } else {
            debug!("- {}", command);
        }
    }
}
