//! Ownership, mode and security-context normalization for mirrored trees.
//!
//! Mirroring tools usually preserve upstream ownership and modes, which the
//! web server may not be able to read. After every repository the tree is
//! reset to `<owner>:<group>` and mode 755, and when SELinux is enforcing the
//! context of a reference directory is copied onto it. All steps are
//! best-effort.

use crate::context::SyncContext;
use crate::runner::Advisory;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

/// Query for mandatory access control enforcement on the host.
pub trait AccessControl {
    fn enforcing(&self) -> bool;
}

/// Reads SELinux enforcement from selinuxfs.
#[derive(Debug, Clone)]
pub struct SelinuxStatus {
    enforce_path: PathBuf,
}

impl SelinuxStatus {
    pub fn new() -> Self {
        Self::with_path("/sys/fs/selinux/enforce")
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            enforce_path: path.into(),
        }
    }
}

impl Default for SelinuxStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessControl for SelinuxStatus {
    fn enforcing(&self) -> bool {
        fs::read_to_string(&self.enforce_path)
            .map(|s| s.trim() == "1")
            .unwrap_or(false)
    }
}

/// Fixed answer, for hosts without SELinux and for tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticAccessControl(pub bool);

impl AccessControl for StaticAccessControl {
    fn enforcing(&self) -> bool {
        self.0
    }
}

/// Normalizes ownership, mode and security context of `path`.
pub fn apply(path: &Path, ctx: &SyncContext<'_>) -> Vec<Advisory> {
    let settings = ctx.settings;
    let target = path.display().to_string();

    let mut commands = vec![
        ctx.command(&settings.tools.chown)
            .arg("-R")
            .arg(format!("{}:{}", settings.owner, settings.group))
            .arg(target.clone()),
        ctx.command(&settings.tools.chmod)
            .arg("-R")
            .arg("755")
            .arg(target.clone()),
    ];
    if ctx.access.enforcing() {
        commands.push(
            ctx.command(&settings.tools.chcon)
                .arg("--reference")
                .arg(settings.context_reference.display().to_string())
                .arg(target)
                .quiet(),
        );
    }

    commands
        .iter()
        .map(|command| {
            ctx.log_command(command);
            let advisory = Advisory::run(ctx.runner, command);
            if let crate::runner::AdvisoryOutcome::Failed(reason) = &advisory.outcome {
                warn!("- {} failed: {}", advisory.step, reason);
            }
            advisory
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::{Error, Result};
    use crate::runner::{CommandRunner, CommandSpec, CommandStatus};
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<CommandSpec>>,
        spawn_fails: bool,
    }

    impl CommandRunner for Recorder {
        fn run(&self, command: &CommandSpec) -> Result<CommandStatus> {
            self.calls.borrow_mut().push(command.clone());
            if self.spawn_fails {
                return Err(Error::CommandSpawn {
                    command: command.to_string(),
                    message: "not found".to_string(),
                });
            }
            Ok(CommandStatus::success())
        }

        fn tool_exists(&self, _tool: &str) -> bool {
            true
        }
    }

    #[test]
    fn test_apply_without_selinux() {
        let settings = Settings::default();
        let runner = Recorder::default();
        let ctx = SyncContext::new(&settings, &runner, &StaticAccessControl(false));

        let advisories = apply(Path::new("/var/www/cobbler/repo_mirror/base"), &ctx);
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].program, "chown");
        assert_eq!(calls[0].args, vec!["-R", "root:apache", "/var/www/cobbler/repo_mirror/base"]);
        assert_eq!(calls[1].program, "chmod");
        assert_eq!(calls[1].args, vec!["-R", "755", "/var/www/cobbler/repo_mirror/base"]);
        assert!(advisories.iter().all(Advisory::is_done));
    }

    #[test]
    fn test_apply_with_selinux_copies_context() {
        let settings = Settings::default();
        let runner = Recorder::default();
        let ctx = SyncContext::new(&settings, &runner, &StaticAccessControl(true));

        apply(Path::new("/srv/mirror/base"), &ctx);
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2].program, "chcon");
        assert_eq!(calls[2].args, vec!["--reference", "/var/www", "/srv/mirror/base"]);
        assert!(calls[2].quiet);
    }

    #[test]
    fn test_apply_swallows_failures() {
        let settings = Settings::default();
        let runner = Recorder {
            spawn_fails: true,
            ..Recorder::default()
        };
        let ctx = SyncContext::new(&settings, &runner, &StaticAccessControl(true));

        let advisories = apply(Path::new("/srv/mirror/base"), &ctx);
        // every step is still attempted
        assert_eq!(runner.calls.borrow().len(), 3);
        assert!(advisories.iter().all(|a| !a.is_done()));
    }

    #[test]
    fn test_selinux_status_reads_enforce_file() {
        let temp = TempDir::new().unwrap();
        let enforce = temp.path().join("enforce");

        fs::write(&enforce, "1\n").unwrap();
        assert!(SelinuxStatus::with_path(&enforce).enforcing());

        fs::write(&enforce, "0\n").unwrap();
        assert!(!SelinuxStatus::with_path(&enforce).enforcing());

        assert!(!SelinuxStatus::with_path(temp.path().join("missing")).enforcing());
    }
}
