//! Import path to clone URL resolution.
//!
//! Resolution order:
//!
//! 1. **Discovery** - domains without a known rule are asked for their
//!    `go-import` meta tag. A `git` directive wins outright.
//! 2. **Vendor rules** - fixed templates for vanity domains such as
//!    `golang.org/x/`.
//! 3. **Fallback** - `owner/repo` for well-known hosts, the full path otherwise.
//!
//! Discovery failures and non-git directives are reported as warnings and
//! resolution continues with the heuristics.

pub mod discovery;
mod rules;
pub mod tags;

pub use discovery::{Directive, DiscoveryError, Fetcher, HttpFetcher};
pub use rules::{COMMON_HOSTS, REPO_PLACEHOLDER, Rules, VendorRule};

use crate::ui;

/// The only version-control system goget can clone.
pub const SUPPORTED_VCS: &str = "git";

/// URL flavour produced by the heuristic rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// `git@host:owner/repo.git`
    #[default]
    Ssh,
    /// `https://host/owner/repo.git`
    Https,
}

impl Transport {
    pub fn from_https_flag(https: bool) -> Self {
        if https { Self::Https } else { Self::Ssh }
    }
}

pub struct Resolver {
    rules: Rules,
    fetcher: Box<dyn Fetcher>,
}

impl Resolver {
    pub fn new(rules: Rules, fetcher: Box<dyn Fetcher>) -> Self {
        Self { rules, fetcher }
    }

    /// Resolver that performs discovery over HTTPS.
    pub fn with_http(rules: Rules) -> Self {
        Self::new(rules, Box::new(HttpFetcher::default()))
    }

    /// Clone URL for `import_path`, or `None` when nothing can be built.
    pub fn resolve(&self, import_path: &str, transport: Transport) -> Option<String> {
        if self.rules.needs_discovery(import_path) {
            match discovery::discover(import_path, self.fetcher.as_ref()) {
                Ok(directive) if directive.vcs == SUPPORTED_VCS => return Some(directive.repo_url),
                Ok(directive) => ui::warn(format!(
                    "discovered VCS type {:?} is not supported, falling back to heuristics",
                    directive.vcs
                )),
                Err(err) => ui::warn(format!(
                    "failed to discover go-import meta tag: {}, falling back to heuristics",
                    err
                )),
            }
        }

        self.rules.heuristic_url(import_path, transport)
    }
}
