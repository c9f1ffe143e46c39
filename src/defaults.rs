//! Default values for repo-mirror configuration.
//!
//! This module centralizes the paths and flags that a store file may leave
//! out, so that the `settings` section of a config only has to name what a
//! site changes.

/// Default location of the repository store file.
///
/// Overridden by the `--config` flag or the `REPO_MIRROR_CONFIG` environment
/// variable.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/repo-mirror/repos.yaml";

/// Web root under which the `repo_mirror` tree is served.
pub const DEFAULT_WEBDIR: &str = "/var/www/cobbler";

/// Name of the mirror root directory inside the web root.
pub const MIRROR_DIR_NAME: &str = "repo_mirror";

/// Hidden working directory holding source descriptors for yum/rhn mirrors.
pub const ORIGIN_DIR_NAME: &str = ".origin";

/// File name of the client-facing descriptor at each repository root.
pub const CLIENT_DESCRIPTOR_NAME: &str = "config.repo";

/// Placeholder clients substitute with their provisioning server address.
pub const SERVER_PLACEHOLDER: &str = "${server}";

/// Token in a mirror URL that is replaced with `server:port` in source
/// descriptors.
pub const SERVER_TOKEN: &str = "@@server@@";

pub const DEFAULT_SERVER: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 80;
pub const DEFAULT_REPOSYNC_FLAGS: &str = "-l -m -d";
pub const DEFAULT_YUMDOWNLOADER_FLAGS: &str = "--resolve";
pub const DEFAULT_CREATEREPO_FLAGS: &str = "-c cache";
pub const DEFAULT_RSYNC_EXCLUDE: &str = "/etc/cobbler/rsync.exclude";
pub const DEFAULT_PRIORITY: i64 = 99;

/// Ownership and security-context reference applied after each sync.
pub const DEFAULT_OWNER: &str = "root";
pub const DEFAULT_GROUP: &str = "apache";
pub const DEFAULT_CONTEXT_REFERENCE: &str = "/var/www";

/// Stale metadata left behind by interrupted createrepo runs, relative to the
/// directory being indexed.
pub const STALE_INDEX_PATHS: &[&str] = &[
    ".olddata",
    ".repodata/.olddata",
    "repodata/.oldata",
    "repodata/repodata",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_paths_are_relative() {
        for path in STALE_INDEX_PATHS {
            assert!(!path.starts_with('/'), "{} must be relative", path);
        }
    }

    #[test]
    fn test_default_flags_split_cleanly() {
        for flags in [
            DEFAULT_REPOSYNC_FLAGS,
            DEFAULT_YUMDOWNLOADER_FLAGS,
            DEFAULT_CREATEREPO_FLAGS,
        ] {
            assert!(shell_words::split(flags).is_ok());
        }
    }
}
