//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_store(stores::BASIC);
//!     fixture.command_with_config().arg("ls").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::stores;
    pub use super::TestFixture;
}

/// Repository store snippets. `@WEBDIR@` is replaced with the fixture's
/// web root by [`TestFixture::with_store`].
#[allow(dead_code)]
pub mod stores {
    /// One repository of each syncable breed.
    pub const BASIC: &str = r#"
settings:
  webdir: "@WEBDIR@"
  server: 10.0.0.1
repos:
  - name: base
    breed: yum
    mirror: http://mirror.example.com/centos/5/os/x86_64
    arch: x86_64
    priority: 10
  - name: tree
    breed: rsync
    mirror: rsync://mirror.example.com/tree
  - name: etch
    breed: apt
    mirror: http://ftp.debian.org/debian/dists/etch
    arch: x86_64
    keep_updated: false
"#;

    /// A store whose second repository cannot be synced.
    pub const WITH_INVALID: &str = r#"
settings:
  webdir: "@WEBDIR@"
repos:
  - name: base
    breed: yum
    mirror: http://mirror.example.com/centos/5/os/x86_64
  - name: rhel5
    breed: rhn
    mirror: rhn://rhel-x86_64-server-5
"#;

    /// A store with an unknown breed.
    pub const UNKNOWN_BREED: &str = r#"
settings:
  webdir: "@WEBDIR@"
repos:
  - name: odd
    breed: portage
    mirror: http://example.com/odd
"#;

    /// Empty store.
    pub const EMPTY: &str = r#"
settings:
  webdir: "@WEBDIR@"
repos: []
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "repos: [unclosed";
}

/// A temporary directory holding a repository store and a web root.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Writes `repos.yaml`, pointing `@WEBDIR@` at [`TestFixture::webdir`].
    pub fn with_store(self, content: &str) -> Self {
        let content = content.replace("@WEBDIR@", &self.webdir().display().to_string());
        self.temp_dir
            .child("repos.yaml")
            .write_str(&content)
            .expect("Failed to write repository store");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn store_path(&self) -> PathBuf {
        self.path().join("repos.yaml")
    }

    pub fn webdir(&self) -> PathBuf {
        self.path().join("www")
    }

    /// Directory of a mirrored repository.
    #[allow(dead_code)]
    pub fn mirror_dir(&self, name: &str) -> PathBuf {
        self.webdir().join("repo_mirror").join(name)
    }

    /// A command running in this fixture's directory, isolated from the
    /// caller's configuration.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repo-mirror");
        cmd.current_dir(self.path())
            .env_remove("REPO_MIRROR_CONFIG")
            .env_remove("REPO_MIRROR_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }

    /// Like [`TestFixture::command`], with the store passed through the
    /// environment.
    #[allow(dead_code)]
    pub fn command_with_config(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.env("REPO_MIRROR_CONFIG", self.store_path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_writes_store_with_webdir() {
        let fixture = TestFixture::new().with_store(stores::EMPTY);
        let content = std::fs::read_to_string(fixture.store_path()).unwrap();
        assert!(content.contains(&fixture.webdir().display().to_string()));
        assert!(!content.contains("@WEBDIR@"));
    }

    #[test]
    fn test_stores_are_valid_yaml() {
        for store in [
            stores::BASIC,
            stores::WITH_INVALID,
            stores::UNKNOWN_BREED,
            stores::EMPTY,
        ] {
            serde_yaml::from_str::<serde_yaml::Value>(store).expect("Store should be valid YAML");
        }
        assert!(serde_yaml::from_str::<serde_yaml::Value>(stores::INVALID_YAML).is_err());
    }
}
