// src/exec/progress.rs

//! Progress extraction from mirroring-tool stdout.

use std::sync::LazyLock;

use regex::Regex;

use crate::exec::MirrorTool;

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)%").expect("percent regex"));

/// First bare `NN%` token in a line, if any.
pub(crate) fn percent_token(line: &str) -> Option<f64> {
    PERCENT_RE
        .captures(line)?
        .get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
}

/// Per-copy progress state: maintains the copied-file count from new-file
/// marker lines and suppresses repeats of an unchanged percentage so the
/// reporter is not flooded.
pub struct ProgressTracker<'t> {
    tool: &'t dyn MirrorTool,
    total_files: usize,
    copied_files: usize,
    last_percent: Option<f64>,
}

impl<'t> ProgressTracker<'t> {
    pub fn new(tool: &'t dyn MirrorTool, total_files: usize) -> Self {
        Self {
            tool,
            total_files,
            copied_files: 0,
            last_percent: None,
        }
    }

    /// Feed one stdout line; returns a percentage only when it differs from
    /// the last one reported.
    pub fn observe(&mut self, line: &str) -> Option<f64> {
        if self.tool.marks_new_file(line) {
            self.copied_files += 1;
        }
        if !line.contains('%') {
            return None;
        }
        let percent = self
            .tool
            .parse_progress(line, self.copied_files, self.total_files)?;
        if self.last_percent == Some(percent) {
            return None;
        }
        self.last_percent = Some(percent);
        Some(percent)
    }

    pub fn copied_files(&self) -> usize {
        self.copied_files
    }
}
