// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [settings]
/// retention_limit = 3
/// copy_threads = 16
/// mirror = false
///
/// [[host]]
/// hostname = "crabcake"
/// last_selected_dest = "/mnt/backup"
/// dest_paths = ["/mnt/backup"]
/// backup_paths = ["/home/me/documents"]
/// ```
///
/// All sections are optional and have defaults; one file serves every host
/// that shares it (entries are keyed by hostname).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Global behaviour from `[settings]`.
    #[serde(default)]
    pub settings: SettingsSection,

    /// Per-host entries from `[[host]]`.
    #[serde(default, rename = "host")]
    pub hosts: Vec<HostEntry>,
}

/// `[settings]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSection {
    /// How many snapshots to keep per host; older ones become deletable.
    #[serde(default = "default_retention_limit")]
    pub retention_limit: usize,

    /// Worker-thread count handed to the mirroring tool where it supports
    /// one (robocopy `/MT`).
    #[serde(default = "default_copy_threads")]
    pub copy_threads: u32,

    /// Mirror policy: delete destination entries absent from the source.
    /// Default is additive copying.
    #[serde(default)]
    pub mirror: bool,
}

fn default_retention_limit() -> usize {
    crate::retention::DEFAULT_RETENTION_LIMIT
}

fn default_copy_threads() -> u32 {
    16
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            retention_limit: default_retention_limit(),
            copy_threads: default_copy_threads(),
            mirror: false,
        }
    }
}

/// One `[[host]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostEntry {
    pub hostname: String,

    /// Destination chosen on the last run; wins over `dest_paths`.
    #[serde(default)]
    pub last_selected_dest: Option<PathBuf>,

    /// Destinations this host has used before.
    #[serde(default)]
    pub dest_paths: Vec<PathBuf>,

    /// Ordered source folders backed up for this host.
    #[serde(default)]
    pub backup_paths: Vec<PathBuf>,
}

impl HostEntry {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            last_selected_dest: None,
            dest_paths: Vec::new(),
            backup_paths: Vec::new(),
        }
    }

    /// Resolved destination root: the last selected one, falling back to the
    /// first known destination.
    pub fn destination(&self) -> Option<&PathBuf> {
        self.last_selected_dest
            .as_ref()
            .or_else(|| self.dest_paths.first())
    }

    /// Record `dest` as the last selected destination, remembering it in
    /// `dest_paths` as well.
    pub fn select_destination(&mut self, dest: PathBuf) {
        if !self.dest_paths.contains(&dest) {
            self.dest_paths.push(dest.clone());
        }
        self.last_selected_dest = Some(dest);
    }

    /// Append a backup source; returns false when it was already configured.
    pub fn add_backup_path(&mut self, path: PathBuf) -> bool {
        if self.backup_paths.contains(&path) {
            return false;
        }
        self.backup_paths.push(path);
        true
    }

    /// Remove a backup source; returns false when it was not configured.
    pub fn remove_backup_path(&mut self, path: &Path) -> bool {
        let before = self.backup_paths.len();
        self.backup_paths.retain(|p| p != path);
        self.backup_paths.len() != before
    }
}

impl ConfigFile {
    pub fn host(&self, hostname: &str) -> Option<&HostEntry> {
        self.hosts.iter().find(|h| h.hostname == hostname)
    }

    pub fn host_mut(&mut self, hostname: &str) -> Option<&mut HostEntry> {
        self.hosts.iter_mut().find(|h| h.hostname == hostname)
    }

    /// Fetch the entry for `hostname`, creating an empty one if missing.
    pub fn ensure_host(&mut self, hostname: &str) -> &mut HostEntry {
        if let Some(idx) = self.hosts.iter().position(|h| h.hostname == hostname) {
            &mut self.hosts[idx]
        } else {
            self.hosts.push(HostEntry::new(hostname));
            let last = self.hosts.len() - 1;
            &mut self.hosts[last]
        }
    }
}
