// src/exec/robocopy.rs

//! robocopy-family tool (windows hosts).
//!
//! robocopy reports progress per file, so the whole-transfer percentage has
//! to be reconstructed from the copied-file count and a pre-computed total:
//! `(file_percent/100 + (copied - 1)) / total * 100`. The copied-file count
//! is advanced on "begin copying new file" lines, recognized by a tab
//! followed by a drive-letter path.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tokio::process::{Child, Command};

use crate::exec::progress::percent_token;
use crate::exec::{spawn_tool, CopyOptions, ExecError, MirrorTool};

static NEW_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t[A-Z]:\\").expect("new-file regex"));

pub struct Robocopy {
    options: CopyOptions,
}

impl Robocopy {
    pub fn new(options: CopyOptions) -> Self {
        Self { options }
    }
}

impl MirrorTool for Robocopy {
    fn name(&self) -> &'static str {
        "robocopy"
    }

    fn spawn_delete(&self, path: &Path, is_file: bool) -> Result<Child, ExecError> {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C");
        if is_file {
            cmd.arg("del").arg("/F");
        } else {
            cmd.arg("RD").arg("/S").arg("/Q");
        }
        cmd.arg(path);
        spawn_tool(cmd, "cmd", path)
    }

    fn spawn_copy(&self, src: &Path, dest: &Path) -> Result<Child, ExecError> {
        // robocopy copies the *contents* of src, so the source folder name
        // has to be appended to the destination by hand.
        let dest = match src.file_name() {
            Some(name) => dest.join(name),
            None => dest.to_path_buf(),
        };
        let mut cmd = Command::new("robocopy");
        cmd.arg(src)
            .arg(&dest)
            .arg("/E")
            .arg("/Z")
            .arg(format!("/MT:{}", self.options.threads));
        if self.options.mirror {
            cmd.arg("/PURGE");
        }
        spawn_tool(cmd, "robocopy", src)
    }

    fn parse_progress(&self, line: &str, copied_files: usize, total_files: usize) -> Option<f64> {
        if total_files == 0 {
            return None;
        }
        let file_percent = percent_token(line)?;
        // A percent line can precede the first new-file marker.
        let copied = copied_files.max(1) as f64;
        Some((file_percent / 100.0 + (copied - 1.0)) / total_files as f64 * 100.0)
    }

    fn marks_new_file(&self, line: &str) -> bool {
        NEW_FILE_RE.is_match(line)
    }

    fn exit_code_meaning(&self, code: u32) -> Option<&'static str> {
        match code {
            0 => Some("no errors, nothing copied"),
            1 => Some("all copied"),
            2 => Some("some skipped"),
            3 => Some("copied+skipped, no errors"),
            5 => Some("permission issues"),
            6 => Some("extra files detected, not copied"),
            7 => Some("copied but some inaccessible"),
            8 => Some("copied some, some inaccessible"),
            16 => Some("nothing copied, src==dst"),
            3221225786 => Some("terminated by interrupt signal"),
            _ => None,
        }
    }
}
