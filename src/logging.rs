// src/logging.rs

//! Logging setup for `bakrun` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `BAKRUN_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Output goes to stderr and, when a log file path is given, is duplicated
//! into an append-mode session log so failed runs can be inspected later.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use crate::cli::LogLevel;

/// Initialise the global logging subscriber.
///
/// Safe to call once at startup. If the log file cannot be opened, logging
/// falls back to stderr only.
pub fn init_logging(cli_level: Option<LogLevel>, log_file: Option<&Path>) -> Result<()> {
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var("BAKRUN_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    let file = log_file.and_then(|path| {
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    match file {
        Some(file) => {
            fmt()
                .with_max_level(level)
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::io::stderr.and(Mutex::new(file)))
                .init();
        }
        None => {
            fmt()
                .with_max_level(level)
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::io::stderr)
                .init();
            if log_file.is_some() {
                tracing::warn!("could not open session log file; logging to stderr only");
            }
        }
    }

    Ok(())
}

/// Session log location: `bakrun.log` next to the config file.
pub fn default_log_path(config: &str) -> PathBuf {
    Path::new(config)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.join("bakrun.log"))
        .unwrap_or_else(|| PathBuf::from("bakrun.log"))
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
