// src/config/validate.rs

use std::collections::HashSet;

use anyhow::{anyhow, Result};

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `retention_limit >= 1` (something must always be kept)
/// - `copy_threads >= 1`
/// - host entries have non-empty, unique hostnames
///
/// It does **not** check that configured paths exist; sources may live on
/// media that is not currently mounted.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_settings(cfg)?;
    validate_hosts(cfg)?;
    Ok(())
}

fn validate_settings(cfg: &ConfigFile) -> Result<()> {
    if cfg.settings.retention_limit == 0 {
        return Err(anyhow!(
            "[settings].retention_limit must be >= 1 (got 0); at least the newest snapshot is always kept"
        ));
    }
    if cfg.settings.copy_threads == 0 {
        return Err(anyhow!("[settings].copy_threads must be >= 1 (got 0)"));
    }
    Ok(())
}

fn validate_hosts(cfg: &ConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for host in &cfg.hosts {
        if host.hostname.trim().is_empty() {
            return Err(anyhow!("[[host]] entry with an empty hostname"));
        }
        if !seen.insert(host.hostname.as_str()) {
            return Err(anyhow!(
                "duplicate [[host]] entry for hostname '{}'",
                host.hostname
            ));
        }
    }
    Ok(())
}
