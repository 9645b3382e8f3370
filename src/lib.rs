// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::{RunConfig, default_config_path, load_optional};
use crate::engine::{Orchestrator, RuntimeEvent, Runtime, TriggerReason};
use crate::exec::{ChildSupervisor, ShellCompiler, find_executable};
use crate::fs::{FileSystem, RealFileSystem, native_file_ops};
use crate::watch::{Debouncer, EventFilter, build_watch_set, spawn_debouncer, spawn_watcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file, then CLI overrides)
/// - the startup walk and the file watcher
/// - the debouncer and the runtime loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let (config_path, explicit) = match &args.config {
        Some(path) => (PathBuf::from(path), true),
        None => (default_config_path(), false),
    };
    let mut raw = load_optional(&config_path, explicit)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    args.apply_to(&mut raw.run);

    let mut cfg = RunConfig::try_from(raw)?;

    if find_executable(Path::new(&cfg.compiler)).is_none() {
        bail!(
            "command {:?} not found in your environment, please install it first",
            cfg.compiler
        );
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    if !fs.is_file(&cfg.target.entry) {
        bail!("entry file {:?} does not exist", cfg.target.entry);
    }
    cfg.watch.root = fs
        .canonicalize(&cfg.watch.root)
        .with_context(|| format!("resolving watch root {:?}", cfg.watch.root))?;

    let dirs = build_watch_set(fs.as_ref(), &cfg.watch);

    if args.dry_run {
        print_dry_run(&cfg, &dirs);
        return Ok(());
    }

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);

    let filter = EventFilter::new(
        cfg.watch.root.clone(),
        cfg.watch.ignore.clone(),
        cfg.extensions.clone(),
    );
    let debouncer = Debouncer::new(filter, cfg.debounce, rt_tx.clone());

    // notify -> debouncer.
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let _watcher_handle = spawn_watcher(&dirs, event_tx)?;
    spawn_debouncer(debouncer.clone(), event_rx);

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    // Initial build goes through the same flag as file changes.
    debouncer.schedule(TriggerReason::Startup, Duration::ZERO);

    let orchestrator = Orchestrator::new(
        cfg.target.clone(),
        ShellCompiler::new(cfg.compiler.clone()),
        ChildSupervisor::new(),
        native_file_ops(),
        fs,
    );

    let summary = Runtime::new(orchestrator, rt_rx).run().await?;
    info!(
        cycles = summary.cycles,
        failed_builds = summary.failed_builds,
        "hotbuild stopped"
    );
    Ok(())
}

/// Simple dry-run output: print the resolved config and the watch set.
fn print_dry_run(cfg: &RunConfig, dirs: &[PathBuf]) {
    println!("hotbuild dry-run");
    println!("  entry: {}", cfg.target.entry.display());
    println!(
        "  output: {}",
        cfg.target.output_path(native_file_ops().as_ref()).display()
    );
    println!("  compiler: {}", cfg.compiler);
    if !cfg.target.extra_build_args.is_empty() {
        println!("  extra: {}", cfg.target.extra_build_args);
    }
    if !cfg.target.run_args.is_empty() {
        println!("  args: {}", cfg.target.run_args);
    }
    println!("  extensions: {:?}", cfg.extensions);
    println!("  debounce: {:?}", cfg.debounce);
    if !cfg.watch.ignore.is_empty() {
        println!("  ignore: {:?}", cfg.watch.ignore.patterns());
    }
    if let Some(re) = &cfg.watch.exclude_dir_regex {
        println!("  exclude_dir_regex: {re}");
    }
    println!();

    println!("watched directories ({}):", dirs.len());
    for dir in dirs {
        println!("  - {}", dir.display());
    }

    debug!("dry-run complete (nothing built)");
}
