// src/retention.rs

//! Snapshot naming and the retention planner.
//!
//! One snapshot is one dated directory `<dest>/<host>/backup_<YYYY-MM-DD>/`.
//! The planner only lists the snapshot parent and decides which directories
//! fall outside the retention limit; deletion is executed later, explicitly,
//! by the task runner through the process adapter.

use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use tracing::{info, warn};

/// Prefix of snapshot directory names.
pub const SNAPSHOT_PREFIX: &str = "backup";

/// Number of snapshots kept per host unless configured otherwise.
pub const DEFAULT_RETENTION_LIMIT: usize = 3;

static YMD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})[-_.](\d{1,2})[-_.](\d{1,2})").expect("date regex"));
static DMY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})[-_.](\d{1,2})[-_.](\d{4})").expect("date regex"));

/// Fuzzy date extraction from a directory name.
///
/// Accepts a year-first or day-first date anywhere in the name, with `-`,
/// `_` or `.` separators. Returns `None` when no calendar-valid date is
/// embedded.
pub fn extract_date(name: &str) -> Option<NaiveDate> {
    if let Some(caps) = YMD_RE.captures(name) {
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
        if date.is_some() {
            return date;
        }
    }
    if let Some(caps) = DMY_RE.captures(name) {
        return NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            caps[2].parse().ok()?,
            caps[1].parse().ok()?,
        );
    }
    None
}

/// Directory name of the snapshot for `date`, e.g. `backup_2026-08-06`.
pub fn snapshot_dir_name(date: NaiveDate) -> String {
    format!("{SNAPSHOT_PREFIX}_{}", date.format("%Y-%m-%d"))
}

/// Full snapshot path `<dest_root>/<hostname>/backup_<date>`.
pub fn snapshot_path(dest_root: &Path, hostname: &str, date: NaiveDate) -> PathBuf {
    dest_root.join(hostname).join(snapshot_dir_name(date))
}

/// Whether the snapshot for `date` already exists and holds content.
pub fn backup_already_exists(dest_root: &Path, hostname: &str, date: NaiveDate) -> bool {
    let path = snapshot_path(dest_root, hostname, date);
    path.is_dir() && dir_has_entries(&path)
}

/// Decide which snapshots under `parent` fall outside the retention limit.
///
/// Rules:
/// - entries whose name ends in `.log` are ignored
/// - entries with no extractable date are warned about and skipped (they are
///   neither deleted nor counted against the limit)
/// - directories named `<prefix>*` are candidates; today's candidate is
///   warned about when it already holds content and is never returned
/// - standalone files in the snapshot parent are warned about
/// - candidates are ordered newest-first; everything beyond `limit` is
///   returned for deletion
pub fn plan_deletions(
    parent: &Path,
    prefix: &str,
    limit: usize,
    today: NaiveDate,
) -> Result<Vec<PathBuf>> {
    info!(parent = %parent.display(), limit, "checking for old snapshots");

    // (date, path, protected)
    let mut candidates: Vec<(NaiveDate, PathBuf, bool)> = Vec::new();

    let entries = fs::read_dir(parent)
        .with_context(|| format!("listing snapshot directory {}", parent.display()))?;
    for entry in entries {
        let entry = entry.context("reading snapshot directory entry")?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".log") {
            continue;
        }
        let path = entry.path();
        let Some(date) = extract_date(&name) else {
            warn!(name = %name, "entry name contains no date; ignoring");
            continue;
        };
        if name.starts_with(prefix) && path.is_dir() {
            let protected = date == today && dir_has_entries(&path);
            if protected {
                warn!(
                    path = %path.display(),
                    "today's snapshot already holds content; it will not be deleted"
                );
            }
            candidates.push((date, path, protected));
        } else if path.is_file() {
            warn!(path = %path.display(), "standalone file in snapshot directory");
        }
    }

    candidates.sort_by_key(|(date, _, _)| Reverse(*date));
    let deletable: Vec<PathBuf> = candidates
        .into_iter()
        .skip(limit)
        .filter(|(_, _, protected)| !protected)
        .map(|(_, path, _)| path)
        .collect();

    info!(count = deletable.len(), "snapshots marked for deletion");
    Ok(deletable)
}

fn dir_has_entries(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
