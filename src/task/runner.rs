// src/task/runner.rs

//! Sequential task runner.
//!
//! `execute()` drives the requested tasks strictly in order on one worker.
//! A failing task sets the run's global error flag and is surfaced to the
//! reporter, but never aborts the loop; the remaining tasks still run.
//! Cancellation is cooperative: a shared stop flag polled before each task
//! and before each per-folder copy, plus a group interrupt to any live copy
//! process via the registry.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::exec::{MirrorTool, ProcessRegistry, ProgressTracker};
use crate::report::{Reporter, Severity};
use crate::task::Task;

pub struct Runner {
    tool: Arc<dyn MirrorTool>,
    registry: Arc<ProcessRegistry>,
    reporter: Reporter,
    stop: Arc<AtomicBool>,
    tasks: Vec<Task>,
    global_error: bool,
}

/// Clonable cancellation side-channel: sets the stop flag and interrupts
/// live copy processes. Safe to call at any time, including when idle.
#[derive(Clone)]
pub struct CancelHandle {
    stop: Arc<AtomicBool>,
    registry: Arc<ProcessRegistry>,
}

impl CancelHandle {
    pub async fn cancel(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.registry.stop_all().await;
    }
}

impl Runner {
    pub fn new(
        tool: Arc<dyn MirrorTool>,
        registry: Arc<ProcessRegistry>,
        reporter: Reporter,
    ) -> Self {
        Self {
            tool,
            registry,
            reporter,
            stop: Arc::new(AtomicBool::new(false)),
            tasks: Vec::new(),
            global_error: false,
        }
    }

    /// Replace the pending task list; call before `execute` or `start`.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            stop: Arc::clone(&self.stop),
            registry: Arc::clone(&self.registry),
        }
    }

    /// Whether any task of the last run failed.
    pub fn global_error(&self) -> bool {
        self.global_error
    }

    /// Run `execute` on its own worker so the caller stays responsive.
    pub fn start(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.execute().await;
        })
    }

    /// Execute all pending tasks sequentially.
    pub async fn execute(&mut self) {
        self.global_error = false;
        self.reporter.clear();
        let tasks = std::mem::take(&mut self.tasks);
        let total = tasks.len();

        for (idx, task) in tasks.iter().enumerate() {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }
            self.reporter
                .info(format!("Now executing task {}/{}...", idx + 1, total));

            let outcome = match task {
                Task::Clean { old_backups } => self.clean(old_backups).await,
                Task::FileBackup { dest, sources } => self.file_backup(dest, sources).await,
                Task::SmartphoneBackup | Task::VirusScan | Task::HealthScan => {
                    self.reporter
                        .info(format!("Task '{}' is not implemented; skipping.", task.name()));
                    Ok(())
                }
            };

            // Task boundary: a failure is logged and surfaced, then the run
            // moves on to the next task.
            if let Err(err) = outcome {
                self.global_error = true;
                error!(task = task.name(), error = %err, "task failed");
                self.reporter.error(format!(
                    "An error occurred on the '{}' task. See the session log for details.",
                    task.name()
                ));
            }
        }

        if self.stop.swap(false, Ordering::SeqCst) {
            info!("run stopped before completion");
            self.reporter.update("Stopped.", Some(Severity::Warning));
        } else if !self.global_error {
            self.reporter.success("Finished every task.");
        }
        self.reporter.ready();
    }

    /// Delete the pre-computed list of old snapshots.
    ///
    /// Not interrupted mid-list by cancellation; an in-flight delete is
    /// allowed to finish.
    async fn clean(&self, old_backups: &[PathBuf]) -> Result<()> {
        info!("------------ clean task ------------");
        self.reporter.info("Starting cleaning...");

        for path in old_backups {
            let mut child = self.tool.spawn_delete(path, false)?;
            let status = child
                .wait()
                .await
                .with_context(|| format!("waiting for delete of {}", path.display()))?;
            if !status.success() {
                // Deletes are idempotent; a missing target is not an error.
                warn!(path = %path.display(), %status, "delete exited non-zero");
            } else {
                debug!(path = %path.display(), "deleted");
            }
        }

        info!("cleaning finished");
        self.reporter.info("Cleaning finished.");
        Ok(())
    }

    /// Copy each source folder into the snapshot destination, streaming
    /// deduplicated progress percentages.
    async fn file_backup(&self, dest: &Path, sources: &[PathBuf]) -> Result<()> {
        info!("------------ file backup task ------------");
        self.reporter.info("Starting file backup...");
        let total_dirs = sources.len();

        for (dir_num, src) in sources.iter().enumerate() {
            if self.stop.load(Ordering::SeqCst) {
                return Ok(());
            }

            // Static per-folder total, needed to reconstruct a global
            // percentage for per-file progress dialects.
            let total_files = count_files(src);
            debug!(src = %src.display(), total_files, "starting folder copy");

            let mut child = self.tool.spawn_copy(src, dest)?;
            // A pid of `None` means the child already exited; nothing to
            // track for cancellation then.
            let pid = child.id();
            if let Some(pid) = pid {
                self.registry.register(pid);
            }

            let stderr_task = child.stderr.take().map(|stderr| {
                tokio::spawn(async move {
                    let mut lines = BufReader::new(stderr).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        error!("copy stderr: {}", line.trim_end());
                    }
                })
            });

            if let Some(stdout) = child.stdout.take() {
                let mut tracker = ProgressTracker::new(self.tool.as_ref(), total_files);
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if let Some(percent) = tracker.observe(&line) {
                        self.reporter.progress(format!(
                            "Copying: {percent:.2}% (folder {}/{})",
                            dir_num + 1,
                            total_dirs
                        ));
                    }
                }
            }

            let status = child
                .wait()
                .await
                .with_context(|| format!("waiting for copy of {}", src.display()))?;
            if let Some(pid) = pid {
                self.registry.unregister(pid);
            }
            if let Some(join) = stderr_task {
                let _ = join.await;
            }

            match status.code() {
                Some(code) => {
                    let code = code as u32;
                    match self.tool.exit_code_meaning(code) {
                        Some(meaning) => {
                            info!(tool = self.tool.name(), code, meaning, "copy finished")
                        }
                        None => {
                            warn!(tool = self.tool.name(), code, "copy finished with unknown exit code")
                        }
                    }
                }
                None => warn!(tool = self.tool.name(), "copy terminated by a signal"),
            }
        }

        info!("file backup finished");
        self.reporter.success("File backup finished.");
        Ok(())
    }
}

/// Recursive file count of one source folder, computed once before its copy
/// starts. Unreadable entries are skipped.
fn count_files(root: &Path) -> usize {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry while counting files");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .count()
}
