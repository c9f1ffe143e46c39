//! Test doubles shared by the unit tests of the strategy modules.

use crate::config::Settings;
use crate::context::SyncContext;
use crate::error::Result;
use crate::permissions::StaticAccessControl;
use crate::runner::{CommandRunner, CommandSpec, CommandStatus};
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;

type Responder = Box<dyn Fn(&CommandSpec) -> CommandStatus>;

/// Records every command and answers with a scripted status.
pub struct RecordingRunner {
    calls: RefCell<Vec<CommandSpec>>,
    missing: HashSet<String>,
    responder: Responder,
}

impl RecordingRunner {
    /// Every tool exists and every command succeeds.
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            missing: HashSet::new(),
            responder: Box::new(|_| CommandStatus::success()),
        }
    }

    pub fn respond_with(mut self, responder: impl Fn(&CommandSpec) -> CommandStatus + 'static) -> Self {
        self.responder = Box::new(responder);
        self
    }

    pub fn without_tool(mut self, tool: &str) -> Self {
        self.missing.insert(tool.to_string());
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.program.clone()).collect()
    }

    /// First recorded command running `program`.
    pub fn find(&self, program: &str) -> Option<CommandSpec> {
        self.calls.borrow().iter().find(|c| c.program == program).cloned()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandStatus> {
        self.calls.borrow_mut().push(command.clone());
        Ok((self.responder)(command))
    }

    fn tool_exists(&self, tool: &str) -> bool {
        !self.missing.contains(tool)
    }
}

pub const NO_MAC: StaticAccessControl = StaticAccessControl(false);

/// Settings rooted in a scratch directory.
pub fn settings_in(webdir: &Path) -> Settings {
    Settings {
        webdir: webdir.to_path_buf(),
        ..Settings::default()
    }
}

pub fn context<'a>(settings: &'a Settings, runner: &'a RecordingRunner) -> SyncContext<'a> {
    SyncContext::new(settings, runner, &NO_MAC)
}
