// src/exec/rsync.rs

//! rsync-family tool (unix hosts).
//!
//! rsync reports progress cumulatively (`--info=progress2`): a bare `NN%`
//! token on a line is already the percentage for the whole transfer.

use std::path::Path;

use tokio::process::{Child, Command};

use crate::exec::progress::percent_token;
use crate::exec::{spawn_tool, CopyOptions, ExecError, MirrorTool};

pub struct Rsync {
    options: CopyOptions,
}

impl Rsync {
    pub fn new(options: CopyOptions) -> Self {
        Self { options }
    }
}

impl MirrorTool for Rsync {
    fn name(&self) -> &'static str {
        "rsync"
    }

    fn spawn_delete(&self, path: &Path, is_file: bool) -> Result<Child, ExecError> {
        let mut cmd = Command::new("rm");
        cmd.arg(if is_file { "-f" } else { "-rf" });
        cmd.arg(path);
        spawn_tool(cmd, "rm", path)
    }

    fn spawn_copy(&self, src: &Path, dest: &Path) -> Result<Child, ExecError> {
        // rsync without a trailing slash creates `<dest>/<src basename>`.
        let mut cmd = Command::new("rsync");
        cmd.arg("--mkpath").arg("-avz").arg("--info=progress2");
        if self.options.mirror {
            cmd.arg("--delete");
        }
        cmd.arg(src).arg(dest);
        spawn_tool(cmd, "rsync", src)
    }

    fn parse_progress(&self, line: &str, _copied_files: usize, _total_files: usize) -> Option<f64> {
        percent_token(line)
    }

    fn marks_new_file(&self, _line: &str) -> bool {
        false
    }

    fn exit_code_meaning(&self, code: u32) -> Option<&'static str> {
        match code {
            0 => Some("no errors"),
            1 => Some("some skipped"),
            2 => Some("skipped, no errors"),
            3 => Some("permission issues"),
            4 => Some("extra files detected"),
            5 => Some("copied but some inaccessible"),
            19 => Some("interrupted via related-process signal"),
            20 => Some("terminated manually/by signal"),
            _ => None,
        }
    }
}
