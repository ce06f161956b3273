// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod report;
pub mod retention;
pub mod task;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use tracing::{debug, info, warn};

use crate::cli::{CliArgs, TaskKind};
use crate::config::model::SettingsSection;
use crate::config::{load_or_init, save_to_path, validate_config, ConfigFile};
use crate::exec::{CopyOptions, ProcessRegistry};
use crate::platform::OsFamily;
use crate::report::Reporter;
use crate::task::{Runner, Task};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (and write-back for the editing flags)
/// - snapshot path + retention plan for this host
/// - reporter / console renderer
/// - the task runner worker
/// - Ctrl-C cancellation
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let mut cfg = load_or_init(&config_path)?;
    validate_config(&cfg)?;

    let hostname = platform::hostname();
    info!(hostname = %hostname, os = ?OsFamily::current(), "resolved host identity");

    if let Some(dest) = &args.dest {
        cfg.ensure_host(&hostname).select_destination(dest.clone());
        save_to_path(&cfg, &config_path)?;
        info!(dest = %dest.display(), "recorded destination selection");
    }
    if args.add_source.is_some() || args.remove_source.is_some() {
        return edit_sources(&mut cfg, &config_path, &hostname, args.add_source, args.remove_source);
    }

    let (dest_root, sources) = {
        let host = cfg.host(&hostname).with_context(|| {
            format!("no config entry for host '{hostname}'; run with --dest <PATH> to create one")
        })?;
        let dest_root = host
            .destination()
            .cloned()
            .with_context(|| format!("no destination configured for host '{hostname}'; run with --dest <PATH>"))?;
        (dest_root, host.backup_paths.clone())
    };
    let settings = cfg.settings.clone();

    if args.tasks.contains(&TaskKind::FileBackup) && sources.is_empty() {
        bail!("no backup sources configured for host '{hostname}'; add one with --add-source <PATH>");
    }

    let today = Local::now().date_naive();
    let host_dir = dest_root.join(&hostname);
    let snapshot = retention::snapshot_path(&dest_root, &hostname, today);

    if args.dry_run {
        let plan = if host_dir.is_dir() {
            retention::plan_deletions(
                &host_dir,
                retention::SNAPSHOT_PREFIX,
                settings.retention_limit,
                today,
            )?
        } else {
            Vec::new()
        };
        print_dry_run(&hostname, &dest_root, &sources, &snapshot, &plan, &settings, &args.tasks);
        return Ok(());
    }

    if retention::backup_already_exists(&dest_root, &hostname, today) {
        warn!(snapshot = %snapshot.display(), "today's snapshot already exists; copying into it");
    }
    // Created before planning so today's snapshot counts among the kept set.
    fs::create_dir_all(&snapshot)
        .with_context(|| format!("creating snapshot directory {}", snapshot.display()))?;
    let plan = retention::plan_deletions(
        &host_dir,
        retention::SNAPSHOT_PREFIX,
        settings.retention_limit,
        today,
    )?;

    let options = CopyOptions {
        threads: settings.copy_threads,
        mirror: settings.mirror || args.mirror,
    };
    let tool = exec::tool_for_platform(OsFamily::current(), options);
    let registry = Arc::new(ProcessRegistry::default());
    let (reporter, events_rx) = Reporter::channel();
    let renderer = report::spawn_console_renderer(events_rx);

    let mut runner = Runner::new(tool, registry, reporter);
    runner.set_tasks(build_tasks(&args.tasks, &plan, &snapshot, &sources));
    let cancel = runner.cancel_handle();

    // Ctrl-C → cooperative cancellation.
    {
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("interrupt received; cancelling run");
            cancel.cancel().await;
        });
    }

    let worker = runner.start();
    worker.await.context("backup worker task failed")?;
    let _ = renderer.await;
    Ok(())
}

/// Translate the CLI task selection into concrete tasks with parameters.
fn build_tasks(
    kinds: &[TaskKind],
    plan: &[PathBuf],
    snapshot: &Path,
    sources: &[PathBuf],
) -> Vec<Task> {
    kinds
        .iter()
        .map(|kind| match kind {
            TaskKind::Clean => Task::Clean {
                old_backups: plan.to_vec(),
            },
            TaskKind::SmartphoneBackup => Task::SmartphoneBackup,
            TaskKind::VirusScan => Task::VirusScan,
            TaskKind::HealthScan => Task::HealthScan,
            TaskKind::FileBackup => Task::FileBackup {
                dest: snapshot.to_path_buf(),
                sources: sources.to_vec(),
            },
        })
        .collect()
}

/// Apply `--add-source` / `--remove-source` edits and persist them.
fn edit_sources(
    cfg: &mut ConfigFile,
    config_path: &Path,
    hostname: &str,
    add: Option<PathBuf>,
    remove: Option<PathBuf>,
) -> Result<()> {
    if let Some(path) = add {
        if cfg.ensure_host(hostname).add_backup_path(path.clone()) {
            println!("added source {}", path.display());
        } else {
            info!(path = %path.display(), "source already configured; ignoring");
            println!("source {} is already configured", path.display());
        }
    }
    if let Some(path) = remove {
        let host = cfg
            .host_mut(hostname)
            .with_context(|| format!("no config entry for host '{hostname}'"))?;
        if host.remove_backup_path(&path) {
            println!("removed source {}", path.display());
        } else {
            bail!("source '{}' is not in the backup list", path.display());
        }
    }
    save_to_path(cfg, config_path)
}

/// Simple dry-run output: print the resolved host plan without executing.
fn print_dry_run(
    hostname: &str,
    dest_root: &Path,
    sources: &[PathBuf],
    snapshot: &Path,
    plan: &[PathBuf],
    settings: &SettingsSection,
    tasks: &[TaskKind],
) {
    println!("bakrun dry-run");
    println!("  host: {hostname}");
    println!("  destination root: {}", dest_root.display());
    println!("  snapshot (would be created): {}", snapshot.display());
    println!("  settings.retention_limit = {}", settings.retention_limit);
    println!("  settings.copy_threads = {}", settings.copy_threads);
    println!("  settings.mirror = {}", settings.mirror);
    println!();

    println!("tasks ({}):", tasks.len());
    for task in tasks {
        println!("  - {task}");
    }
    println!();

    println!("sources ({}):", sources.len());
    for src in sources {
        println!("  - {}", src.display());
    }
    println!();

    println!("snapshots to delete ({}):", plan.len());
    for path in plan {
        println!("  - {}", path.display());
    }

    debug!("dry-run complete (no execution)");
}
