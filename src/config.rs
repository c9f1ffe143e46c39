//! # Repository Store Schema and Parsing
//!
//! This module defines the data that drives a sync run: the [`Settings`] of
//! the provisioning server and the list of [`Repository`] definitions to
//! mirror. Both are read-only for the duration of a run.
//!
//! ## Store Format
//!
//! The YAML-backed store ([`Catalog`]) looks like this:
//!
//! ```yaml
//! settings:
//!   webdir: /var/www/cobbler
//!   server: 192.168.1.1
//!   reposync_flags: "-l -m -d"
//! repos:
//!   - name: f12-updates
//!     breed: yum
//!     mirror: http://download.example.org/pub/fedora/updates/12/x86_64
//!     arch: x86_64
//!     yumopts:
//!       exclude: kernel*
//!     environment:
//!       http_proxy: http://proxy.example.org:3128
//! ```
//!
//! Every field except `name`, `breed` and `mirror` has a default; see
//! [`crate::defaults`].
//!
//! The breed is kept as the raw tag read from the store and only resolved to
//! a [`Breed`] when a repository is dispatched, so a store containing an
//! unknown breed still loads and the offending repository fails on its own.

use crate::defaults;
use crate::error::{Error, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Read-only access to the repositories and settings of a run.
///
/// The sync driver only depends on this trait, so repositories can come from
/// a YAML file, a test fixture, or any other store.
pub trait RepoStore {
    /// All repositories, in store order.
    fn repos(&self) -> &[Repository];

    /// Server-wide settings.
    fn settings(&self) -> &Settings;
}

/// Synchronization technology family of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Breed {
    Yum,
    Rhn,
    Apt,
    Rsync,
}

impl Breed {
    /// Every known breed, in dispatch order.
    pub const ALL: [Breed; 4] = [Breed::Rhn, Breed::Yum, Breed::Apt, Breed::Rsync];

    /// Resolves a breed tag. Tags are matched exactly, as they are stored.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|breed| breed.as_str() == tag)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Breed::Yum => "yum",
            Breed::Rhn => "rhn",
            Breed::Apt => "apt",
            Breed::Rsync => "rsync",
        }
    }
}

impl fmt::Display for Breed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paths or names of the external programs a run may invoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tools {
    pub reposync: String,
    pub yumdownloader: String,
    pub debmirror: String,
    pub rsync: String,
    pub wget: String,
    pub createrepo: String,
    pub chown: String,
    pub chmod: String,
    pub chcon: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            reposync: "/usr/bin/reposync".to_string(),
            yumdownloader: "/usr/bin/yumdownloader".to_string(),
            debmirror: "/usr/bin/debmirror".to_string(),
            rsync: "rsync".to_string(),
            wget: "/usr/bin/wget".to_string(),
            createrepo: "createrepo".to_string(),
            chown: "chown".to_string(),
            chmod: "chmod".to_string(),
            chcon: "chcon".to_string(),
        }
    }
}

/// Provisioning server settings consumed by a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Web root; mirrors live under `<webdir>/repo_mirror`.
    pub webdir: PathBuf,
    /// Address substituted for `@@server@@` in source descriptors.
    pub server: String,
    pub http_port: u16,
    /// Extra flags for every reposync invocation.
    pub reposync_flags: String,
    /// Extra flags for every yumdownloader invocation.
    pub yumdownloader_flags: String,
    /// Exclusion list handed to rsync.
    pub rsync_exclude: PathBuf,
    /// Owner and group applied to a mirror after each sync.
    pub owner: String,
    pub group: String,
    /// Directory whose security context is copied onto mirrors.
    pub context_reference: PathBuf,
    pub tools: Tools,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            webdir: PathBuf::from(defaults::DEFAULT_WEBDIR),
            server: defaults::DEFAULT_SERVER.to_string(),
            http_port: defaults::DEFAULT_HTTP_PORT,
            reposync_flags: defaults::DEFAULT_REPOSYNC_FLAGS.to_string(),
            yumdownloader_flags: defaults::DEFAULT_YUMDOWNLOADER_FLAGS.to_string(),
            rsync_exclude: PathBuf::from(defaults::DEFAULT_RSYNC_EXCLUDE),
            owner: defaults::DEFAULT_OWNER.to_string(),
            group: defaults::DEFAULT_GROUP.to_string(),
            context_reference: PathBuf::from(defaults::DEFAULT_CONTEXT_REFERENCE),
            tools: Tools::default(),
        }
    }
}

impl Settings {
    /// Directory holding one subdirectory per mirrored repository.
    pub fn mirror_root(&self) -> PathBuf {
        self.webdir.join(defaults::MIRROR_DIR_NAME)
    }

    /// Destination directory of a repository.
    pub fn repo_path(&self, name: &str) -> PathBuf {
        self.mirror_root().join(name)
    }

    /// `server:port` as written into source descriptors.
    pub fn http_server(&self) -> String {
        format!("{}:{}", self.server, self.http_port)
    }
}

fn default_true() -> bool {
    true
}

fn default_priority() -> i64 {
    defaults::DEFAULT_PRIORITY
}

fn default_createrepo_flags() -> String {
    defaults::DEFAULT_CREATEREPO_FLAGS.to_string()
}

/// A repository to mirror, as defined in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Unique name; also the directory name under the mirror root.
    pub name: String,
    /// Raw breed tag, resolved with [`Repository::breed`].
    pub breed: String,
    /// Remote URL, `rhn://<channel>` reference, or local path.
    pub mirror: String,
    /// Copy the content locally instead of pointing clients at the mirror.
    #[serde(default = "default_true")]
    pub mirror_locally: bool,
    /// Include this repository in runs that are not filtered by name.
    #[serde(default = "default_true")]
    pub keep_updated: bool,
    #[serde(default)]
    pub arch: String,
    /// Restrict a yum mirror to these packages.
    #[serde(default)]
    pub rpm_list: Vec<String>,
    /// Extra `key=value` lines for the client descriptor.
    #[serde(default, deserialize_with = "scalar_map")]
    pub yumopts: BTreeMap<String, String>,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default = "default_createrepo_flags")]
    pub createrepo_flags: String,
    /// Environment for this repository's external commands. Entries without
    /// a value are ignored.
    #[serde(default, deserialize_with = "optional_scalar_map")]
    pub environment: BTreeMap<String, Option<String>>,
}

impl Repository {
    /// Creates a repository with default options.
    pub fn new(name: impl Into<String>, breed: impl Into<String>, mirror: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            breed: breed.into(),
            mirror: mirror.into(),
            mirror_locally: true,
            keep_updated: true,
            arch: String::new(),
            rpm_list: Vec::new(),
            yumopts: BTreeMap::new(),
            priority: defaults::DEFAULT_PRIORITY,
            createrepo_flags: defaults::DEFAULT_CREATEREPO_FLAGS.to_string(),
            environment: BTreeMap::new(),
        }
    }

    /// Resolves the breed tag, failing with `UnsupportedBreed` for unknown
    /// tags.
    pub fn breed(&self) -> Result<Breed> {
        Breed::from_tag(&self.breed).ok_or_else(|| Error::UnsupportedBreed {
            repo: self.name.clone(),
            breed: self.breed.clone(),
        })
    }

    /// True when the mirror is an `rhn://` channel reference.
    pub fn is_rhn_reference(&self) -> bool {
        self.mirror.to_lowercase().starts_with("rhn://")
    }

    pub fn has_rpm_list(&self) -> bool {
        !self.rpm_list.is_empty()
    }

    /// Environment variables to set on this repository's commands.
    pub fn env_overlay(&self) -> BTreeMap<String, String> {
        self.environment
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key.clone(), v.clone())))
            .collect()
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        // yum expects 1/0 for boolean options
        serde_yaml::Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}

fn scalar_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_yaml::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| match scalar_to_string(&value) {
            Some(s) => Ok((key, s)),
            None => Err(D::Error::custom(format!("option {} must be a scalar", key))),
        })
        .collect()
}

fn optional_scalar_map<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_yaml::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| match value {
            serde_yaml::Value::Null => Ok((key, None)),
            other => match scalar_to_string(&other) {
                Some(s) => Ok((key, Some(s))),
                None => Err(D::Error::custom(format!(
                    "environment variable {} must be a scalar",
                    key
                ))),
            },
        })
        .collect()
}

/// YAML-backed repository store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub repos: Vec<Repository>,
}

impl Catalog {
    pub fn new(settings: Settings, repos: Vec<Repository>) -> Self {
        Self { settings, repos }
    }

    /// Looks up a repository by name.
    pub fn get(&self, name: &str) -> Option<&Repository> {
        self.repos.iter().find(|repo| repo.name == name)
    }
}

impl RepoStore for Catalog {
    fn repos(&self) -> &[Repository] {
        &self.repos
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// True when `name` names exactly one directory below its parent.
fn is_single_component(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

/// Parses a YAML string into a [`Catalog`].
///
/// Repository names must be unique single path components; anything else
/// is reported as `ConfigParse`.
pub fn parse(yaml_content: &str) -> Result<Catalog> {
    let catalog: Catalog = serde_yaml::from_str(yaml_content)?;

    let mut seen = HashSet::new();
    for repo in &catalog.repos {
        if repo.name.is_empty() {
            return Err(Error::ConfigParse {
                message: "repository with an empty name".to_string(),
                hint: Some("Every entry under 'repos' needs a 'name'".to_string()),
            });
        }
        if !is_single_component(&repo.name) {
            return Err(Error::ConfigParse {
                message: format!("invalid repository name: {}", repo.name),
                hint: Some(
                    "Repository names become directories under the mirror root and cannot be '.', '..' or contain '/'"
                        .to_string(),
                ),
            });
        }
        if !seen.insert(repo.name.as_str()) {
            return Err(Error::ConfigParse {
                message: format!("duplicate repository name: {}", repo.name),
                hint: Some("Repository names must be unique".to_string()),
            });
        }
    }

    Ok(catalog)
}

/// Parse a [`Catalog`] from a YAML file path
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_applies_defaults() {
        let yaml = r#"
repos:
  - name: base
    breed: yum
    mirror: http://mirror.example.com/centos/5/os/x86_64
"#;
        let catalog = parse(yaml).unwrap();
        assert_eq!(catalog.settings, Settings::default());
        assert_eq!(catalog.repos.len(), 1);

        let repo = &catalog.repos[0];
        assert!(repo.mirror_locally);
        assert!(repo.keep_updated);
        assert_eq!(repo.priority, 99);
        assert_eq!(repo.createrepo_flags, "-c cache");
        assert!(repo.rpm_list.is_empty());
        assert_eq!(repo.breed().unwrap(), Breed::Yum);
    }

    #[test]
    fn test_parse_settings_override() {
        let yaml = r#"
settings:
  webdir: /srv/www
  server: 10.0.0.5
  http_port: 8080
  tools:
    rsync: /opt/bin/rsync
repos: []
"#;
        let catalog = parse(yaml).unwrap();
        assert_eq!(catalog.settings.mirror_root(), PathBuf::from("/srv/www/repo_mirror"));
        assert_eq!(catalog.settings.http_server(), "10.0.0.5:8080");
        assert_eq!(catalog.settings.tools.rsync, "/opt/bin/rsync");
        assert_eq!(catalog.settings.tools.wget, "/usr/bin/wget");
    }

    #[test]
    fn test_parse_scalar_yumopts_and_environment() {
        let yaml = r#"
repos:
  - name: epel
    breed: yum
    mirror: http://example.com/epel
    yumopts:
      enabled: 0
      gpgcheck: true
      exclude: "kernel*"
    environment:
      http_proxy: http://proxy:3128
      UNSET_ME:
"#;
        let catalog = parse(yaml).unwrap();
        let repo = catalog.get("epel").unwrap();
        assert_eq!(repo.yumopts["enabled"], "0");
        assert_eq!(repo.yumopts["gpgcheck"], "1");
        assert_eq!(repo.yumopts["exclude"], "kernel*");

        let env = repo.env_overlay();
        assert_eq!(env.len(), 1);
        assert_eq!(env["http_proxy"], "http://proxy:3128");
    }

    #[test]
    fn test_parse_rejects_non_scalar_yumopt() {
        let yaml = r#"
repos:
  - name: epel
    breed: yum
    mirror: http://example.com/epel
    yumopts:
      exclude: [a, b]
"#;
        assert!(parse(yaml).is_err());
    }

    #[test]
    fn test_parse_rejects_duplicate_names() {
        let yaml = r#"
repos:
  - name: base
    breed: yum
    mirror: http://a.example.com/
  - name: base
    breed: rsync
    mirror: rsync://b.example.com/
"#;
        let err = parse(yaml).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(err.to_string().contains("duplicate repository name: base"));
    }

    #[test]
    fn test_parse_rejects_names_outside_mirror_root() {
        for name in ["..", ".", "a/../../x", "sub/dir", "/abs"] {
            let yaml = format!(
                "repos:\n  - name: \"{}\"\n    breed: rsync\n    mirror: rsync://mirror.example.com/tree\n",
                name
            );
            let err = parse(&yaml).unwrap_err();
            assert!(
                matches!(err, Error::ConfigParse { ref hint, .. } if hint.is_some()),
                "{name}"
            );
            assert!(err.to_string().contains("invalid repository name"), "{name}");
        }
    }

    #[test]
    fn test_parse_accepts_dotted_names() {
        let yaml = r#"
repos:
  - name: centos-5.4.updates
    breed: yum
    mirror: http://example.com/
  - name: ..hidden-ish
    breed: yum
    mirror: http://example.com/
"#;
        assert_eq!(parse(yaml).unwrap().repos.len(), 2);
    }

    #[test]
    fn test_unknown_breed_loads_but_fails_to_resolve() {
        let yaml = r#"
repos:
  - name: odd
    breed: portage
    mirror: http://example.com/
"#;
        let catalog = parse(yaml).unwrap();
        let err = catalog.repos[0].breed().unwrap_err();
        assert!(matches!(err, Error::UnsupportedBreed { ref breed, .. } if breed == "portage"));
    }

    #[test]
    fn test_breed_tags_are_exact() {
        for breed in Breed::ALL {
            assert_eq!(Breed::from_tag(breed.as_str()), Some(breed));
        }
        assert_eq!(Breed::from_tag("YUM"), None);
    }

    #[test]
    fn test_rhn_reference_is_case_insensitive() {
        assert!(Repository::new("c", "rhn", "RHN://c").is_rhn_reference());
        assert!(!Repository::new("c", "yum", "http://rhn/").is_rhn_reference());
    }

    #[test]
    fn test_from_file_missing() {
        let err = from_file("/nonexistent/repo-mirror/repos.yaml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
