//! Heuristic import-path-to-URL rules.
//!
//! Two layers, checked in order:
//!
//! 1. Vendor rules keyed by an import path prefix (`golang.org/x/` and
//!    friends). Only the first segment after the prefix names the
//!    repository; deeper subpackage segments are dropped.
//! 2. The generic fallback. Hosts that use the `owner/repo` convention keep
//!    exactly two segments after the domain. Any other domain keeps the
//!    whole remaining path.

use super::Transport;

/// Hosts where a repository is always `domain/owner/repo`.
pub const COMMON_HOSTS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org"];

/// Placeholder substituted with the repository segment in vendor templates.
pub const REPO_PLACEHOLDER: &str = "{repo}";

/// One vendor redirect: `<prefix><repo>/...` clones from a fixed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorRule {
    /// Import path prefix, always ending in `/`.
    pub prefix: String,
    /// URL template containing `{repo}`.
    pub url: String,
    /// Template used instead of `url` for SSH-style transport, if the vendor offers one.
    pub ssh_url: Option<String>,
}

impl VendorRule {
    pub fn new(prefix: &str, url: &str) -> Self {
        let mut prefix = prefix.trim().to_string();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self {
            prefix,
            url: url.to_string(),
            ssh_url: None,
        }
    }

    pub fn with_ssh_url(mut self, ssh_url: &str) -> Self {
        self.ssh_url = Some(ssh_url.to_string());
        self
    }

    /// Domain part of the prefix.
    pub fn domain(&self) -> &str {
        self.prefix.split('/').next().unwrap_or_default()
    }

    pub fn apply(&self, import_path: &str, transport: Transport) -> Option<String> {
        let rest = import_path.strip_prefix(&self.prefix)?;
        let repo = rest.split('/').next().unwrap_or(rest);
        let template = match (transport, &self.ssh_url) {
            (Transport::Ssh, Some(ssh_url)) => ssh_url,
            _ => &self.url,
        };
        Some(template.replace(REPO_PLACEHOLDER, repo))
    }
}

fn builtin_vendors() -> Vec<VendorRule> {
    vec![
        VendorRule::new("golang.org/x/", "https://go.googlesource.com/{repo}"),
        VendorRule::new("google.golang.org/", "https://github.com/googleapis/{repo}"),
        VendorRule::new(
            "go.opentelemetry.io/",
            "https://github.com/open-telemetry/{repo}",
        ),
    ]
}

/// The host and vendor tables used by the resolver.
#[derive(Debug, Clone)]
pub struct Rules {
    hosts: Vec<String>,
    vendors: Vec<VendorRule>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            hosts: COMMON_HOSTS.iter().map(|h| h.to_string()).collect(),
            vendors: builtin_vendors(),
        }
    }
}

impl Rules {
    pub fn add_host(&mut self, host: &str) {
        let host = host.trim().to_lowercase();
        if !host.is_empty() && !self.hosts.contains(&host) {
            self.hosts.push(host);
        }
    }

    /// Add a vendor rule. Added rules are checked before the built-in ones.
    pub fn add_vendor(&mut self, rule: VendorRule) {
        self.vendors.insert(0, rule);
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn vendors(&self) -> &[VendorRule] {
        &self.vendors
    }

    pub fn is_common_host(&self, domain: &str) -> bool {
        self.hosts.iter().any(|h| h == domain)
    }

    /// Whether `go-get=1` discovery should be tried before the heuristics.
    ///
    /// Hosts and vendor domains we already have rules for are never queried.
    pub fn needs_discovery(&self, import_path: &str) -> bool {
        let Some(domain) = import_path.split('/').next().filter(|d| !d.is_empty()) else {
            return false;
        };

        if self.is_common_host(domain) {
            return false;
        }

        !self.vendors.iter().any(|v| v.domain() == domain)
    }

    pub fn vendor_url(&self, import_path: &str, transport: Transport) -> Option<String> {
        self.vendors
            .iter()
            .find_map(|rule| rule.apply(import_path, transport))
    }

    pub fn fallback_url(&self, import_path: &str, transport: Transport) -> Option<String> {
        let mut parts = import_path.split('/');
        let domain = parts.next().filter(|d| !d.is_empty())?;
        let rest: Vec<&str> = parts.collect();

        let repo = if self.is_common_host(domain) && rest.len() >= 2 {
            Some(rest[..2].join("/"))
        } else if !rest.is_empty() {
            Some(rest.join("/"))
        } else {
            None
        };

        let url = match (repo, transport) {
            (Some(repo), Transport::Https) => format!("https://{}/{}.git", domain, repo),
            (Some(repo), Transport::Ssh) => format!("git@{}:{}.git", domain, repo),
            (None, Transport::Https) => format!("https://{}.git", domain),
            (None, Transport::Ssh) => format!("git@{}.git", domain),
        };
        Some(url)
    }

    /// Vendor rules first, then the generic fallback.
    pub fn heuristic_url(&self, import_path: &str, transport: Transport) -> Option<String> {
        self.vendor_url(import_path, transport)
            .or_else(|| self.fallback_url(import_path, transport))
    }
}
