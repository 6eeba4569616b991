//! # goget CLI Entry Point
//!
//! ```text
//! goget [--https] <import path>[/...]
//! goget [--https] --mod <go.mod>
//! ```
//!
//! Single-path mode runs the fetch pipeline once and exits non-zero on any
//! error. Batch mode (`--mod`) fetches every requirement in parallel, prints
//! a summary, and exits non-zero if at least one fetch failed.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use goget::config::{self, GogetConfig, Settings};
use goget::fetch::{self, BatchSummary, CancelToken, FetchContext};
use goget::manifest;
use goget::request;
use goget::resolve::{Resolver, Transport};
use goget::ui;

#[derive(Parser)]
#[command(name = "goget")]
#[command(
    about = "Clone Go packages into GOPATH using git",
    version = env!("CARGO_PKG_VERSION")
)]
#[command(long_about = None)]
struct Cli {
    /// Import path to fetch (a trailing /... is accepted and stripped)
    #[arg(required_unless_present = "manifest")]
    path: Option<String>,

    /// Use HTTPS for git clones instead of SSH
    #[arg(long)]
    https: bool,

    /// Fetch every dependency listed in this go.mod file
    #[arg(long = "mod", value_name = "GO_MOD")]
    manifest: Option<PathBuf>,

    /// Config file with extra hosts and vendor rules
    #[arg(long, env = "GOGET_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            // A second Ctrl-C stops waiting for children to wind down.
            if cancel.is_cancelled() {
                std::process::exit(130);
            }
            cancel.cancel();
        })
        .context("failed to install Ctrl-C handler")?;
    }

    let file_config = GogetConfig::load(cli.config.as_deref())?;
    let resolver = Resolver::with_http(file_config.rules());
    let transport = Transport::from_https_flag(cli.https);

    if let Some(manifest_path) = &cli.manifest {
        return run_batch(manifest_path, &file_config, &resolver, transport, cancel);
    }

    let path = cli.path.context("usage: goget <path> or goget --mod <path/to/go.mod>")?;
    let (import_path, _) = request::parse_import_path(&path)?;
    request::validate_import_path(&import_path)?;

    let settings = load_settings(&file_config, transport)?;
    let ctx = FetchContext {
        settings: &settings,
        resolver: &resolver,
        cancel,
        spinner: true,
    };
    fetch::fetch_one(&path, &ctx)?;
    Ok(())
}

fn load_settings(file_config: &GogetConfig, transport: Transport) -> Result<Settings> {
    let working_dir = std::env::current_dir().context("could not determine working directory")?;
    let root = config::workspace_root(std::env::var_os(config::ROOT_ENV).as_deref())?;
    Ok(Settings {
        root,
        working_dir,
        transport,
        git: file_config.git().to_string(),
    })
}

fn run_batch(
    manifest_path: &Path,
    file_config: &GogetConfig,
    resolver: &Resolver,
    transport: Transport,
    cancel: CancelToken,
) -> Result<()> {
    ui::line(format!(
        "Parsing dependencies from {}...",
        manifest_path.display()
    ));
    let deps = manifest::scan(manifest_path)?;

    if deps.is_empty() {
        ui::line("No dependencies found in go.mod");
        return Ok(());
    }

    ui::line(format!(
        "Found {} dependencies (direct and indirect)",
        deps.len()
    ));

    let settings = load_settings(file_config, transport)?;
    let ctx = FetchContext {
        settings: &settings,
        resolver,
        cancel,
        spinner: false,
    };

    let outcomes = fetch::fetch_all(&deps, &ctx)?;
    let summary = BatchSummary::from_outcomes(&outcomes);
    summary.print(&outcomes);

    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
