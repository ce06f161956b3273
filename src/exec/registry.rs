// src/exec/registry.rs

//! Registry of live copy processes, used for cancellation.
//!
//! The worker appends a pid when it spawns a copy and removes it after the
//! child is reaped; whichever task handles cancellation (typically the
//! Ctrl-C listener) calls [`ProcessRegistry::stop_all`]. The mutex is the
//! one piece of shared mutable state between those two sides.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct ProcessRegistry {
    live: Mutex<Vec<u32>>,
}

impl ProcessRegistry {
    pub fn register(&self, pid: u32) {
        self.lock().push(pid);
    }

    pub fn unregister(&self, pid: u32) {
        self.lock().retain(|&p| p != pid);
    }

    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    /// Interrupt every live process (group-wide) and wait for each to exit.
    ///
    /// Idempotent: processes that already exited are skipped silently, and
    /// a second call finds an empty (or smaller) registry. Waiting is
    /// bounded per process so a wedged child cannot hang cancellation
    /// forever.
    pub async fn stop_all(&self) {
        let pids: Vec<u32> = self.lock().clone();
        if pids.is_empty() {
            return;
        }
        info!(count = pids.len(), "interrupting live copy processes");
        for &pid in &pids {
            interrupt(pid).await;
        }
        for &pid in &pids {
            wait_for_exit(pid).await;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<u32>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Send a graceful interrupt to the process group led by `pid`.
#[cfg(unix)]
async fn interrupt(pid: u32) {
    let pid = pid as libc::pid_t;
    let rc = unsafe { libc::killpg(pid, libc::SIGINT) };
    if rc != 0 {
        // Group already gone (or the child never became a leader); try the
        // process itself, ignoring failure for already-dead pids.
        unsafe { libc::kill(pid, libc::SIGINT) };
    }
}

/// Windows has no process-group interrupt; `taskkill /T` asks the process
/// tree to close.
#[cfg(windows)]
async fn interrupt(pid: u32) {
    match tokio::process::Command::new("taskkill")
        .args(["/T", "/PID", &pid.to_string()])
        .status()
        .await
    {
        Ok(status) => debug!(pid, %status, "taskkill dispatched"),
        Err(err) => debug!(pid, error = %err, "taskkill failed to run"),
    }
}

#[cfg(unix)]
async fn wait_for_exit(pid: u32) {
    // Probe with signal 0; the worker reaps the child concurrently, after
    // which the pid stops resolving.
    for _ in 0..100 {
        let alive = unsafe { libc::kill(pid as libc::pid_t, 0) } == 0;
        if !alive {
            debug!(pid, "process exited after interrupt");
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    warn!(pid, "process still running after interrupt; giving up on it");
}

#[cfg(windows)]
async fn wait_for_exit(pid: u32) {
    // taskkill already blocked until dispatch; give the tree a moment to
    // unwind. kill_on_drop backstops anything that ignored the request.
    let _ = pid;
    tokio::time::sleep(Duration::from_millis(200)).await;
}
