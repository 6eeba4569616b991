//! The fetch pipeline.
//!
//! One import path goes through:
//!
//! 1. classification ([`ImportRequest`])
//! 2. planning ([`ClonePlan`]): destination under `$GOPATH/src` and clone URL
//! 3. the skip check: `go.mod` or `.git` already at the destination
//! 4. `git clone --quiet <url> <destination>`
//!
//! [`batch`] runs the same pipeline for many paths with bounded concurrency.

pub mod batch;
mod cancel;
mod git;
mod plan;

pub use batch::{BatchSummary, FetchOutcome, MAX_CONCURRENT_FETCHES, fetch_all};
pub use cancel::CancelToken;
pub use git::{SkipReason, existing_checkout};
pub use plan::ClonePlan;

use crate::config::Settings;
use crate::request::ImportRequest;
use crate::resolve::Resolver;
use crate::ui;
use anyhow::{Context, Result, bail};

/// What happened to one import path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Cloned,
    Skipped(SkipReason),
}

impl FetchStatus {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

/// Shared, read-only inputs of the pipeline.
#[derive(Clone)]
pub struct FetchContext<'a> {
    pub settings: &'a Settings,
    pub resolver: &'a Resolver,
    pub cancel: CancelToken,
    /// Show a spinner while git runs. Off in batch mode.
    pub spinner: bool,
}

/// Fetch one raw argument (`host/owner/repo[/...]` or `./relative`).
pub fn fetch_one(arg: &str, ctx: &FetchContext<'_>) -> Result<FetchStatus> {
    if ctx.cancel.is_cancelled() {
        bail!("cancelled");
    }

    let request = ImportRequest::new(
        arg,
        ctx.settings.root.clone(),
        ctx.settings.working_dir.clone(),
    )?;

    if request.wildcard {
        ui::line(format!(
            "Stripping /... suffix, will clone: {}",
            request.import_path
        ));
    }

    let plan = ClonePlan::build(&request, ctx.resolver, ctx.settings.transport)?;

    if let Some(reason) = existing_checkout(&plan.destination) {
        ui::line(reason.message(&plan.destination));
        return Ok(FetchStatus::Skipped(reason));
    }

    let command_line = plan.command_line(&ctx.settings.git);
    ui::line(&command_line);

    let spinner = ctx
        .spinner
        .then(|| ui::spinner(format!("Cloning {}...", plan.url)));
    let result = git::run(&ctx.settings.git, &plan, &ctx.cancel);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    result.with_context(|| format!("error running {}", command_line))?;

    if request.wildcard {
        ui::success(format!(
            "Successfully cloned {} (note: /... means this package and all subpackages)",
            request.import_path
        ));
    }

    Ok(FetchStatus::Cloned)
}
