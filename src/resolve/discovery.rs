//! `go-import` meta tag discovery.
//!
//! Custom domains announce where their code lives with
//!
//! ```html
//! <meta name="go-import" content="example.com/pkg git https://github.com/example/pkg">
//! ```
//!
//! served from `https://<import path>?go-get=1`. The HTTP side is behind the
//! [`Fetcher`] trait so the parsing can be exercised without a network.

use super::tags::TagStream;
use std::time::Duration;
use thiserror::Error;

/// Upper bound for one discovery request.
pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("got status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("no go-import meta tag found")]
    NotFound,
}

/// Fetch the text body behind a URL.
///
/// Implementations must fail on transport errors and on any status other
/// than 200.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, DiscoveryError>;
}

/// [`Fetcher`] backed by a ureq agent with [`DISCOVERY_TIMEOUT`].
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(DISCOVERY_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, DiscoveryError> {
        let mut response =
            self.agent
                .get(url)
                .call()
                .map_err(|err| DiscoveryError::Transport {
                    url: url.to_string(),
                    reason: err.to_string(),
                })?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(DiscoveryError::Status {
                url: url.to_string(),
                status,
            });
        }

        response
            .body_mut()
            .read_to_string()
            .map_err(|err| DiscoveryError::Transport {
                url: url.to_string(),
                reason: err.to_string(),
            })
    }
}

/// The three fields of a `go-import` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub prefix: String,
    pub vcs: String,
    pub repo_url: String,
}

impl Directive {
    /// Parse tag content; exactly three whitespace-separated fields.
    pub fn parse(content: &str) -> Option<Self> {
        let mut fields = content.split_whitespace();
        let (Some(prefix), Some(vcs), Some(repo_url), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return None;
        };
        Some(Self {
            prefix: prefix.to_string(),
            vcs: vcs.to_string(),
            repo_url: repo_url.to_string(),
        })
    }

    /// A directive applies to the import path itself and to its subpackages.
    pub fn matches(&self, import_path: &str) -> bool {
        import_path.starts_with(&self.prefix)
    }
}

pub fn discovery_url(import_path: &str) -> String {
    format!("https://{}?go-get=1", import_path)
}

/// First well-formed `go-import` directive in `markup` matching `import_path`.
pub fn find_directive(markup: &str, import_path: &str) -> Result<Directive, DiscoveryError> {
    TagStream::new(markup)
        .filter(|tag| tag.name == "meta")
        .filter(|tag| tag.attr("name") == Some("go-import"))
        .filter_map(|tag| Directive::parse(tag.attr("content").unwrap_or_default()))
        .find(|directive| directive.matches(import_path))
        .ok_or(DiscoveryError::NotFound)
}

/// Ask the host behind `import_path` where its repository lives.
pub fn discover(import_path: &str, fetcher: &dyn Fetcher) -> Result<Directive, DiscoveryError> {
    let url = discovery_url(import_path);
    let body = fetcher.fetch(&url)?;
    find_directive(&body, import_path)
}
