//! Parallel fetching of many import paths.
//!
//! A dedicated rayon pool of at most [`MAX_CONCURRENT_FETCHES`] threads runs
//! the pipeline for every path. Results are collected by input index, so the
//! returned outcomes line up with the input no matter which clone finishes
//! first. A failed item is recorded and the rest of the batch carries on.

use super::{FetchContext, FetchStatus, fetch_one};
use crate::ui;
use anyhow::{Context, Result};
use colored::*;
use rayon::prelude::*;

/// Upper bound on git clones running at once.
pub const MAX_CONCURRENT_FETCHES: usize = 10;

#[derive(Debug)]
pub struct FetchOutcome {
    pub import_path: String,
    pub error: Option<anyhow::Error>,
    pub skipped: bool,
}

impl FetchOutcome {
    fn new(import_path: &str, result: Result<FetchStatus>) -> Self {
        match result {
            Ok(status) => Self {
                import_path: import_path.to_string(),
                error: None,
                skipped: status.is_skipped(),
            },
            Err(err) => Self {
                import_path: import_path.to_string(),
                error: Some(err),
                skipped: false,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Totals over a batch. Skipped items count as successful.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub cloned: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[FetchOutcome]) -> Self {
        outcomes.iter().fold(
            Self {
                total: outcomes.len(),
                ..Self::default()
            },
            |mut summary, outcome| {
                if !outcome.is_success() {
                    summary.failed += 1;
                } else if outcome.skipped {
                    summary.skipped += 1;
                } else {
                    summary.cloned += 1;
                }
                summary
            },
        )
    }

    pub fn succeeded(&self) -> usize {
        self.cloned + self.skipped
    }

    pub fn print(&self, outcomes: &[FetchOutcome]) {
        let mut lines = vec![
            String::new(),
            ui::rule(),
            "SUMMARY".bold().to_string(),
            ui::rule(),
            format!(
                "Total: {} | Success: {} | Skipped: {} | Failed: {}",
                self.total,
                self.succeeded().to_string().green(),
                self.skipped.to_string().yellow(),
                self.failed.to_string().red()
            ),
        ];

        if self.failed > 0 {
            lines.push(String::new());
            lines.push("Failed dependencies:".to_string());
            for outcome in outcomes {
                if let Some(err) = &outcome.error {
                    lines.push(format!("  - {}: {:#}", outcome.import_path, err));
                }
            }
        }

        ui::block(lines);
    }
}

fn worker_count(items: usize) -> usize {
    items.clamp(1, MAX_CONCURRENT_FETCHES)
}

/// Fetch every path; one outcome per path, in input order.
pub fn fetch_all(paths: &[String], ctx: &FetchContext<'_>) -> Result<Vec<FetchOutcome>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count(paths.len()))
        .thread_name(|i| format!("goget-fetch-{}", i))
        .build()
        .context("failed to start fetch workers")?;

    let ctx = FetchContext {
        spinner: false,
        ..ctx.clone()
    };
    let total = paths.len();

    let outcomes: Vec<FetchOutcome> = pool.install(|| {
        paths
            .par_iter()
            .enumerate()
            .map(|(idx, path)| fetch_indexed(idx, total, path, &ctx))
            .collect()
    });

    Ok(outcomes)
}

fn fetch_indexed(idx: usize, total: usize, path: &str, ctx: &FetchContext<'_>) -> FetchOutcome {
    let counter = ui::counter(idx, total);
    ui::line(format!("\n{} Fetching {}...", counter, path));

    let result = fetch_one(path, ctx);
    match &result {
        Err(err) => ui::error(format!(
            "{} ERROR: Failed to fetch {}: {:#}",
            counter, path, err
        )),
        Ok(status) if status.is_skipped() => ui::line(format!("{} SKIPPED: {}", counter, path)),
        Ok(_) => ui::success(format!("{} SUCCESS: Fetched {}", counter, path)),
    }

    FetchOutcome::new(path, result)
}
