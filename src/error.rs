//! # Error Handling
//!
//! Centralized error type for `repo-mirror`, built on `thiserror`.
//!
//! The variants fall into three groups:
//!
//! - **Run-level**: `Config`, `ConfigParse`, `RetryLimit` and
//!   `OverallFailure`, raised by the sync driver itself.
//! - **Per-attempt**: `UnsupportedBreed`, `MissingTool`, `UnsupportedOption`,
//!   `NameMismatch`, `MirrorUrl`, `SyncFailed`, `ResourceFetchFailed` and
//!   `CommandSpawn`, raised by a breed strategy and caught by the retry loop.
//! - **Wrapped**: `Io`, `Yaml` and `Walk`, converted from the underlying
//!   library errors.
//!
//! Index rebuilding and permission normalization never produce an `Error`;
//! they report [`crate::runner::Advisory`] values instead.

use thiserror::Error;

/// Main error type for repo-mirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// A run option is invalid, e.g. a retry count that is not a
    /// non-negative integer.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The repository store file could not be understood.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The repository's breed tag is not one of yum, rhn, apt or rsync.
    #[error("Unable to sync repo ({repo}), unknown type ({breed})")]
    UnsupportedBreed { repo: String, breed: String },

    /// A required external binary is not installed.
    #[error("No {tool} found, please install {package}")]
    MissingTool { tool: String, package: String },

    /// The repository combines options its breed cannot honor.
    #[error("Unsupported option for {repo}: {message}")]
    UnsupportedOption { repo: String, message: String },

    /// An RHN repository is not named after its channel.
    #[error(
        "Repository {name} needs to be renamed {channel}, as the name of the repository must match the name of the RHN channel"
    )]
    NameMismatch { name: String, channel: String },

    /// A mirror URL could not be split into the parts a tool needs.
    #[error("Invalid mirror URL {mirror}: {message}")]
    MirrorUrl { mirror: String, message: String },

    /// An external mirroring tool exited unsuccessfully.
    #[error("Mirror command failed for {repo}: {command} ({status})")]
    SyncFailed {
        repo: String,
        command: String,
        status: String,
    },

    /// An optional resource was confirmed present but could not be fetched.
    #[error("Failed to fetch {url} into {dest}")]
    ResourceFetchFailed { url: String, dest: String },

    /// An external process could not be launched at all.
    #[error("Failed to run {command}: {message}")]
    CommandSpawn { command: String, message: String },

    /// Every attempt for a repository failed and the run was aborted.
    #[error("Reposync failed for {repo} after {attempts} attempt(s), retry limit reached, aborting")]
    RetryLimit {
        repo: String,
        attempts: u32,
        #[source]
        last: Box<Error>,
    },

    /// The run completed but at least one repository failed to synchronize.
    #[error("Overall reposync failed, at least one repo failed to synchronize: {}", failed.join(", "))]
    OverallFailure { failed: Vec<String> },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A directory traversal error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "duplicate repository name: base".to_string(),
            hint: Some("Repository names must be unique".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("duplicate repository name: base"));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn test_error_display_name_mismatch_names_both() {
        let error = Error::NameMismatch {
            name: "rhel5".to_string(),
            channel: "rhel-x86_64-server-5".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("rhel5"));
        assert!(display.contains("rhel-x86_64-server-5"));
    }

    #[test]
    fn test_error_display_missing_tool() {
        let error = Error::MissingTool {
            tool: "/usr/bin/reposync".to_string(),
            package: "yum-utils".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "No /usr/bin/reposync found, please install yum-utils"
        );
    }

    #[test]
    fn test_error_retry_limit_keeps_source() {
        use std::error::Error as _;

        let error = Error::RetryLimit {
            repo: "base".to_string(),
            attempts: 2,
            last: Box::new(Error::SyncFailed {
                repo: "base".to_string(),
                command: "rsync".to_string(),
                status: "exit status: 23".to_string(),
            }),
        };
        assert!(error.to_string().contains("2 attempt(s)"));
        let source = error.source().expect("source error");
        assert!(source.to_string().contains("exit status: 23"));
    }

    #[test]
    fn test_error_overall_failure_lists_repos() {
        let error = Error::OverallFailure {
            failed: vec!["a".to_string(), "b".to_string()],
        };
        assert!(error.to_string().ends_with("a, b"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: [unclosed").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(format!("{}", error).contains("YAML parsing error"));
    }
}
