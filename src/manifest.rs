//! `go.mod` dependency scanning.
//!
//! This is a tolerant line scanner, not a go.mod parser. It recognises both
//!
//! ```text
//! require golang.org/x/sync v0.7.0
//!
//! require (
//!     github.com/pkg/errors v0.9.1
//!     golang.org/x/net v0.25.0 // indirect
//! )
//! ```
//!
//! and returns the module paths in file order. Versions and `// indirect`
//! annotations are dropped; direct and indirect requirements are treated alike.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const REQUIRE_LINE: &str = "require ";
const REQUIRE_BLOCK: &str = "require (";

/// Read `path` and return every required module path.
pub fn scan(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open go.mod file: {}", path.display()))?;
    scan_reader(BufReader::new(file))
        .with_context(|| format!("error reading go.mod file: {}", path.display()))
}

pub fn scan_reader<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut deps = Vec::new();
    let mut in_block = false;

    for line in reader.lines() {
        let line = line?;
        let line = strip_comment(&line).trim();

        if line.starts_with(REQUIRE_BLOCK) {
            in_block = true;
            continue;
        }

        if in_block && line.starts_with(')') {
            in_block = false;
            continue;
        }

        let candidate = if in_block {
            line
        } else if let Some(rest) = line.strip_prefix(REQUIRE_LINE) {
            rest
        } else {
            continue;
        };

        let mut fields = candidate.split_whitespace();
        if let (Some(module), Some(_version)) = (fields.next(), fields.next()) {
            deps.push(module.to_string());
        }
    }

    Ok(deps)
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}
