//! Import path classification.
//!
//! Turns a raw command-line argument into an [`ImportRequest`]: the
//! normalized import path, whether a `/...` wildcard was requested, and the
//! workspace context the fetch will run in.

use anyhow::{Result, bail};
use std::path::PathBuf;

/// Suffix meaning "this package and all subpackages".
pub const WILDCARD_SUFFIX: &str = "/...";

/// One fetch attempt's worth of input, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    /// Absolute workspace root (first GOPATH entry).
    pub root: PathBuf,
    /// Directory goget was invoked from.
    pub working_dir: PathBuf,
    /// Import path with any wildcard suffix removed.
    pub import_path: String,
    /// Whether the argument ended in `/...`.
    pub wildcard: bool,
}

impl ImportRequest {
    pub fn new(arg: &str, root: PathBuf, working_dir: PathBuf) -> Result<Self> {
        let (import_path, wildcard) = parse_import_path(arg)?;
        validate_import_path(&import_path)?;
        Ok(Self {
            root,
            working_dir,
            import_path,
            wildcard,
        })
    }

    /// Relative requests start with `.` and are resolved against the working directory.
    pub fn is_relative(&self) -> bool {
        self.import_path.starts_with('.')
    }
}

/// Split a raw argument into the import path and the wildcard flag.
pub fn parse_import_path(arg: &str) -> Result<(String, bool)> {
    if arg.is_empty() {
        bail!("empty import path");
    }

    match arg.strip_suffix(WILDCARD_SUFFIX) {
        Some(path) => Ok((path.to_string(), true)),
        None => Ok((arg.to_string(), false)),
    }
}

/// The first segment must look like a domain name.
pub fn validate_import_path(import_path: &str) -> Result<()> {
    let Some(domain) = import_path.split('/').next().filter(|s| !s.is_empty()) else {
        bail!("no package to retrieve: {}", import_path);
    };

    if !domain.contains('.') {
        bail!(
            "first part of package path should be a domain name, got {}",
            import_path
        );
    }

    Ok(())
}
