// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod manifest;
pub mod report;
pub mod store;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::cli::{BuildArgs, CliArgs, Command, GraphArgs, SourceSelection};
use crate::config::{load_or_default, ConfigFile};
use crate::engine::{build_sources, RebuildOutcome, WatchEvent, WatchRuntime, Workspace};
use crate::errors::{Result, TododagError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::store::{QualifiedId, Status};
use crate::watch::{spawn_watcher, ItemPathFilter};

/// Exit code of `validate` when it found issues.
pub const EXIT_ISSUES: u8 = 2;

/// High-level entry point used by `main.rs`.
///
/// Loads the config, builds a [`Workspace`] over the real filesystem and
/// dispatches the subcommand.
pub async fn run(args: CliArgs) -> Result<ExitCode> {
    let cfg = load_or_default(PathBuf::from(&args.config))?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let workspace = Arc::new(Workspace::new(cfg, fs));

    info!(root = ?workspace.todos_root(), "tododag starting");

    match args.command {
        Command::Build(build) => run_build(workspace, build).await,
        Command::Validate(sel) => run_validate(&workspace, &sel),
        Command::Graph(graph) => run_graph(&workspace, &graph),
        Command::Status => run_status(&workspace),
        Command::MarkDirty { source } => {
            workspace.claim(&source)?.mark_dirty()?;
            println!("{source}: marked dirty");
            Ok(ExitCode::SUCCESS)
        }
        Command::SetStatus { item, status } => run_set_status(&workspace, &item, &status),
        Command::Watch { debounce_ms } => run_watch(workspace, debounce_ms).await,
    }
}

/// Explicit `--source` names, or every discovered source.
fn select_sources(workspace: &Workspace, explicit: &[String]) -> Result<Vec<String>> {
    if explicit.is_empty() {
        workspace.sources()
    } else {
        let mut sources = explicit.to_vec();
        sources.sort();
        sources.dedup();
        Ok(sources)
    }
}

async fn run_build(workspace: Arc<Workspace>, args: BuildArgs) -> Result<ExitCode> {
    let sources = select_sources(&workspace, &args.source)?;
    if sources.is_empty() {
        warn!(root = ?workspace.todos_root(), "no sources found");
        return Ok(ExitCode::SUCCESS);
    }

    let force = args.all || args.force;
    let results = build_sources(Arc::clone(&workspace), sources, force).await;

    let mut failed = 0usize;
    for r in results {
        match r.result {
            Ok(RebuildOutcome::Skipped) => println!("{}: clean", r.source),
            Ok(RebuildOutcome::Rebuilt(report)) => {
                let m = &report.manifest;
                let cycles = if m.has_cycles { ", has cycles" } else { "" };
                println!(
                    "{}: rebuilt ({} items, {} waves{cycles})",
                    r.source,
                    m.item_count,
                    m.waves.len()
                );
            }
            Err(e) => {
                failed += 1;
                error!(source = %r.source, error = %e, "build failed");
                println!("{}: failed: {e}", r.source);
            }
        }
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_validate(workspace: &Workspace, sel: &SourceSelection) -> Result<ExitCode> {
    let mut issues = 0usize;
    for source in select_sources(workspace, &sel.source)? {
        let (scan, output) = workspace.context(&source)?.plan()?;
        issues += output.issue_count() + scan.warnings.len();
        print!("{}", report::render_validation(&output, &scan.warnings));
    }
    Ok(if issues == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_ISSUES)
    })
}

fn run_graph(workspace: &Workspace, args: &GraphArgs) -> Result<ExitCode> {
    let source = match &args.source {
        Some(s) => s.clone(),
        None => {
            let mut all = workspace.sources()?;
            if all.len() != 1 {
                return Err(TododagError::ConfigError(format!(
                    "--source is required when there are {} sources",
                    all.len()
                )));
            }
            all.remove(0)
        }
    };

    let (_, output) = workspace.context(&source)?.plan()?;
    if args.json {
        println!("{}", output.manifest(Utc::now()).to_json()?.trim_end());
    } else {
        print!("{}", report::render_graph(&output, args.waves));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_status(workspace: &Workspace) -> Result<ExitCode> {
    for source in workspace.sources()? {
        let freshness = workspace.context(&source)?.freshness()?;
        println!("{}", report::render_status_line(&source, freshness));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_set_status(workspace: &Workspace, item: &str, status: &str) -> Result<ExitCode> {
    let width = workspace.config().config.id_width;
    let qid = QualifiedId::parse(item, "", width).map_err(TododagError::ConfigError)?;
    let status: Status = status.parse().map_err(TododagError::ConfigError)?;

    let mut handle = workspace.claim(&qid.source)?;
    let previous = handle.set_status(&qid.id, status)?;
    println!("{qid}: {previous} -> {status}");
    Ok(ExitCode::SUCCESS)
}

async fn run_watch(workspace: Arc<Workspace>, debounce_ms: Option<u64>) -> Result<ExitCode> {
    let cfg: &ConfigFile = workspace.config();
    let quiet = Duration::from_millis(debounce_ms.unwrap_or(cfg.config.debounce_ms));
    let root = workspace.todos_root();
    workspace.fs().create_dir_all(&root)?;

    let (tx, rx) = mpsc::channel::<WatchEvent>(64);
    let filter = ItemPathFilter::new(&cfg.config.manifest_name)?;
    let _watcher = spawn_watcher(root, filter, tx.clone())?;

    // Ctrl-C -> graceful shutdown.
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = tx.send(WatchEvent::Shutdown).await;
    });

    WatchRuntime::new(workspace, rx, quiet).run().await?;
    Ok(ExitCode::SUCCESS)
}
