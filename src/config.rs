//! Runtime configuration.
//!
//! Everything goget needs is gathered once in `main` into [`Settings`] and
//! passed down explicitly:
//!
//! - the workspace root from `$GOPATH` (first entry only)
//! - the working directory
//! - the transport preference (`--https`)
//! - an optional `config.toml` with extra hosts, vendor rules and the git binary
//!
//! ```toml
//! hosts = ["git.example.org"]
//! git = "/usr/local/bin/git"
//!
//! [[vendor]]
//! prefix = "corp.dev/go/"
//! url = "https://code.corp.dev/go/{repo}"
//! ssh_url = "git@code.corp.dev:go/{repo}.git"
//! ```

use crate::resolve::{REPO_PLACEHOLDER, Rules, Transport, VendorRule};
use crate::ui;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Environment variable naming the workspace root.
pub const ROOT_ENV: &str = "GOPATH";

/// Subdirectory of the root that holds checkouts.
pub const SOURCE_DIR: &str = "src";

pub const DEFAULT_GIT: &str = "git";

#[derive(Deserialize, Debug, Default)]
pub struct GogetConfig {
    /// Extra hosts following the `owner/repo` convention.
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default, rename = "vendor")]
    pub vendors: Vec<VendorConfig>,
    pub git: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct VendorConfig {
    pub prefix: String,
    pub url: String,
    pub ssh_url: Option<String>,
}

impl GogetConfig {
    /// `<config dir>/goget/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("goget").join("config.toml"))
    }

    /// Load an explicitly named file, or the default one if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        for vendor in &config.vendors {
            let templates = std::iter::once(&vendor.url).chain(vendor.ssh_url.as_ref());
            for template in templates {
                if !template.contains(REPO_PLACEHOLDER) {
                    bail!(
                        "vendor rule for {:?}: template {:?} has no {{repo}} placeholder",
                        vendor.prefix,
                        template
                    );
                }
            }
        }
        Ok(config)
    }

    /// Built-in rules extended with the configured hosts and vendors.
    pub fn rules(&self) -> Rules {
        let mut rules = Rules::default();
        for host in &self.hosts {
            rules.add_host(host);
        }
        // Later entries end up first, so reverse to keep file order.
        for vendor in self.vendors.iter().rev() {
            let mut rule = VendorRule::new(&vendor.prefix, &vendor.url);
            if let Some(ssh_url) = &vendor.ssh_url {
                rule = rule.with_ssh_url(ssh_url);
            }
            rules.add_vendor(rule);
        }
        rules
    }

    pub fn git(&self) -> &str {
        self.git.as_deref().unwrap_or(DEFAULT_GIT)
    }
}

/// Settings shared by every fetch in one run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Absolute workspace root.
    pub root: PathBuf,
    pub working_dir: PathBuf,
    pub transport: Transport,
    /// Version-control binary to invoke.
    pub git: String,
}

/// Workspace root from the raw `$GOPATH` value.
///
/// Only the first entry of a path list is used.
pub fn workspace_root(raw: Option<&OsStr>) -> Result<PathBuf> {
    let raw = raw
        .filter(|value| !value.is_empty())
        .context("cannot clone without GOPATH set")?;

    let mut entries = std::env::split_paths(raw).filter(|p| !p.as_os_str().is_empty());
    let first = entries
        .next()
        .context("cannot clone without GOPATH set")?;
    if entries.next().is_some() {
        ui::warn(format!(
            "multiple paths in GOPATH; goget only works with the first one ({})",
            first.display()
        ));
    }

    let absolute = std::path::absolute(&first).with_context(|| {
        format!(
            "could not get absolute directory for GOPATH {}",
            first.display()
        )
    })?;
    Ok(normalize(&absolute))
}

/// Fold `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn test_workspace_root_single() {
        let root = workspace_root(Some(OsStr::new("/home/user/go"))).unwrap();
        assert_eq!(root, PathBuf::from("/home/user/go"));
    }

    #[test]
    fn test_workspace_root_uses_first_entry() {
        let joined: OsString =
            std::env::join_paths(["/home/user/go", "/opt/go"]).unwrap();
        let root = workspace_root(Some(joined.as_os_str())).unwrap();
        assert_eq!(root, PathBuf::from("/home/user/go"));
    }

    #[test]
    fn test_workspace_root_is_absolute() {
        let root = workspace_root(Some(OsStr::new("relative/go"))).unwrap();
        assert!(root.is_absolute());
        assert!(root.ends_with("relative/go"));
    }

    #[test]
    fn test_workspace_root_folds_parent_components() {
        let root = workspace_root(Some(OsStr::new("/home/user/x/../go"))).unwrap();
        assert_eq!(root, PathBuf::from("/home/user/go"));

        let root = workspace_root(Some(OsStr::new("../go"))).unwrap();
        assert!(root.is_absolute());
        assert!(root.components().all(|c| c != Component::ParentDir));
        assert!(root.ends_with("go"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_workspace_root_missing() {
        assert!(workspace_root(None).is_err());
        assert!(workspace_root(Some(OsStr::new(""))).is_err());
    }

    #[test]
    fn test_parse_config() {
        let config = GogetConfig::parse(
            r#"
hosts = ["git.example.org"]
git = "/usr/local/bin/git"

[[vendor]]
prefix = "corp.dev/go/"
url = "https://code.corp.dev/go/{repo}"

[[vendor]]
prefix = "corp.dev/"
url = "https://code.corp.dev/misc/{repo}"
ssh_url = "git@code.corp.dev:misc/{repo}.git"
"#,
        )
        .unwrap();

        assert_eq!(config.git(), "/usr/local/bin/git");
        let rules = config.rules();
        assert!(rules.is_common_host("git.example.org"));
        assert_eq!(rules.vendors()[0].prefix, "corp.dev/go/");
        assert_eq!(rules.vendors()[1].prefix, "corp.dev/");
        assert_eq!(
            rules
                .heuristic_url("corp.dev/go/lib/x", Transport::Ssh)
                .unwrap(),
            "https://code.corp.dev/go/lib"
        );
        assert_eq!(
            rules.heuristic_url("corp.dev/tool", Transport::Ssh).unwrap(),
            "git@code.corp.dev:misc/tool.git"
        );
    }

    #[test]
    fn test_parse_rejects_template_without_placeholder() {
        let err = GogetConfig::parse(
            r#"
[[vendor]]
prefix = "corp.dev/"
url = "https://code.corp.dev/fixed"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn test_default_config() {
        let config = GogetConfig::parse("").unwrap();
        assert_eq!(config.git(), DEFAULT_GIT);
        assert_eq!(config.rules().hosts().len(), crate::resolve::COMMON_HOSTS.len());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        assert!(GogetConfig::load(Some(Path::new("/nonexistent/goget.toml"))).is_err());
    }
}
