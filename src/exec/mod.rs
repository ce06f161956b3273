// src/exec/mod.rs

//! Process execution layer.
//!
//! This module wraps the platform mirroring/delete tools behind the
//! [`MirrorTool`] trait, using `tokio::process::Command`:
//!
//! - [`rsync`] and [`robocopy`] are the two concrete tool families; exactly
//!   one is selected at startup from the detected OS family.
//! - [`progress`] turns tool stdout lines into deduplicated percentages.
//! - [`registry`] tracks live copy processes for cancellation.

pub mod progress;
pub mod registry;
pub mod robocopy;
pub mod rsync;

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::platform::OsFamily;

pub use progress::ProgressTracker;
pub use registry::ProcessRegistry;
pub use robocopy::Robocopy;
pub use rsync::Rsync;

/// Spawn-time failure; anything past a successful spawn (non-zero exits,
/// odd output) is tolerated and logged instead.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("could not spawn {tool} for '{}': {source}", .path.display())]
    SpawnFailed {
        tool: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Tunables for the copy invocation.
#[derive(Debug, Clone, Copy)]
pub struct CopyOptions {
    /// Worker threads where the tool supports them (robocopy `/MT`).
    pub threads: u32,
    /// Mirror the destination subtree instead of copying additively.
    pub mirror: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            threads: 16,
            mirror: false,
        }
    }
}

/// One platform's mirroring tool family: how to spawn a delete or a copy,
/// and how to read the copy's progress output.
///
/// Implementations are stateless apart from [`CopyOptions`]; per-copy state
/// (file counts, last percent) lives in [`ProgressTracker`].
pub trait MirrorTool: Send + Sync {
    /// Tool family name for logs ("rsync", "robocopy").
    fn name(&self) -> &'static str;

    /// Spawn the platform delete primitive for `path`. The caller awaits the
    /// exit; a non-zero status is a warning there, not an error here.
    fn spawn_delete(&self, path: &Path, is_file: bool) -> Result<Child, ExecError>;

    /// Spawn an asynchronous copy of `src` into `dest` with line-buffered
    /// stdout/stderr pipes.
    fn spawn_copy(&self, src: &Path, dest: &Path) -> Result<Child, ExecError>;

    /// Extract a whole-transfer percentage from one stdout line, or `None`
    /// when the line carries no percent token.
    ///
    /// Cumulative-style tools ignore the counters; per-file-style tools
    /// reconstruct the global figure from `copied_files` / `total_files`.
    fn parse_progress(&self, line: &str, copied_files: usize, total_files: usize) -> Option<f64>;

    /// Whether this stdout line marks the beginning of a new file transfer
    /// (used by the caller to maintain `copied_files`).
    fn marks_new_file(&self, line: &str) -> bool;

    /// Human-readable meaning of a tool exit code, or `None` for codes
    /// outside the known table.
    fn exit_code_meaning(&self, code: u32) -> Option<&'static str>;
}

/// The single platform-selection point: pick the tool family once at
/// startup.
pub fn tool_for_platform(os: OsFamily, options: CopyOptions) -> Arc<dyn MirrorTool> {
    match os {
        OsFamily::Windows => Arc::new(Robocopy::new(options)),
        OsFamily::Unix => Arc::new(Rsync::new(options)),
    }
}

/// Shared spawn helper: piped stdio, kill-on-drop, own process group on
/// unix so cancellation can signal the whole tree.
pub(crate) fn spawn_tool(
    mut cmd: Command,
    tool: &'static str,
    path: &Path,
) -> Result<Child, ExecError> {
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    debug!(tool, path = %path.display(), "spawning");
    cmd.spawn().map_err(|source| ExecError::SpawnFailed {
        tool,
        path: path.to_path_buf(),
        source,
    })
}
