//! # External Command Execution
//!
//! Every external program a sync touches (reposync, rsync, createrepo, chown,
//! ...) is described by a [`CommandSpec`]: a program, a structured argument
//! list and an explicit environment overlay. Nothing is ever passed through a
//! shell, and the overlay is applied to the child process only, so one
//! repository's proxy settings cannot leak into the next repository's
//! commands.
//!
//! Specs are executed through the [`CommandRunner`] trait. The sync driver
//! uses [`SystemRunner`] in production; [`DryRunRunner`] logs what would run;
//! tests provide recording mocks.

use crate::error::{Error, Result};
use log::info;
use std::collections::BTreeMap;
use std::fmt;
use std::process::{Command, Stdio};

/// A fully assembled external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Variables set on the child process in addition to the inherited
    /// environment.
    pub env: BTreeMap<String, String>,
    /// Discard the child's stdout and stderr.
    pub quiet: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            quiet: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends a user-supplied flag string such as `"-l -m -d"`, split with
    /// shell quoting rules.
    pub fn flags(self, raw: &str) -> Result<Self> {
        let words = shell_words::split(raw).map_err(|e| Error::Config {
            message: format!("cannot split flags {:?}: {}", raw, e),
        })?;
        Ok(self.args(words))
    }

    pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
        self.env
            .extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// True when `arg` appears verbatim in the argument list.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        f.write_str(&shell_words::join(words))
    }
}

/// Exit status of a finished command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl CommandStatus {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn failure(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status: {}", code),
            None => f.write_str("terminated by signal"),
        }
    }
}

impl From<std::process::ExitStatus> for CommandStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Spawns external commands; the seam tests replace.
pub trait CommandRunner {
    /// Runs the command to completion and returns its exit status.
    ///
    /// An `Err` means the process could not be started; a non-zero exit is
    /// an `Ok` status for the caller to interpret.
    fn run(&self, command: &CommandSpec) -> Result<CommandStatus>;

    /// Reports whether `tool` (a bare name or an absolute path) can be run.
    fn tool_exists(&self, tool: &str) -> bool;
}

/// Runs commands on the host with `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandStatus> {
        let mut child = Command::new(&command.program);
        child.args(&command.args).envs(&command.env);
        if command.quiet {
            child.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let status = child.status().map_err(|e| Error::CommandSpawn {
            command: command.to_string(),
            message: e.to_string(),
        })?;
        Ok(status.into())
    }

    fn tool_exists(&self, tool: &str) -> bool {
        which::which(tool).is_ok()
    }
}

/// Logs each command instead of running it and reports success.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandStatus> {
        info!("[dry-run] {}", command);
        Ok(CommandStatus::success())
    }

    fn tool_exists(&self, _tool: &str) -> bool {
        true
    }
}

/// Result of a best-effort maintenance step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryOutcome {
    Done,
    Failed(String),
}

/// A best-effort step (index rebuild, chown, ...) and how it went.
///
/// Advisories are collected for reporting and never change control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub step: String,
    pub outcome: AdvisoryOutcome,
}

impl Advisory {
    pub fn done(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            outcome: AdvisoryOutcome::Done,
        }
    }

    pub fn failed(step: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            outcome: AdvisoryOutcome::Failed(reason.into()),
        }
    }

    /// Runs `command` and records the outcome under its display form.
    pub fn run(runner: &dyn CommandRunner, command: &CommandSpec) -> Self {
        let step = command.to_string();
        match runner.run(command) {
            Ok(status) if status.is_success() => Self::done(step),
            Ok(status) => Self::failed(step, status.to_string()),
            Err(e) => Self::failed(step, e.to_string()),
        }
    }

    pub fn is_done(&self) -> bool {
        self.outcome == AdvisoryOutcome::Done
    }
}
