// src/cli.rs

//! CLI argument parsing using `clap`.

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `bakrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bakrun",
    version,
    about = "Run host-specific backup tasks with platform-native copy tools.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Bakrun.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Bakrun.toml")]
    pub config: String,

    /// Destination root for this host's snapshots.
    ///
    /// Recorded in the config as the last selected destination; creates the
    /// host entry on first use.
    #[arg(long, value_name = "PATH")]
    pub dest: Option<PathBuf>,

    /// Tasks to run, in order.
    #[arg(
        long,
        value_enum,
        value_name = "TASK[,TASK...]",
        value_delimiter = ',',
        default_values_t = [TaskKind::Clean, TaskKind::FileBackup]
    )]
    pub tasks: Vec<TaskKind>,

    /// Add a folder to this host's backup sources, then exit.
    #[arg(long, value_name = "PATH")]
    pub add_source: Option<PathBuf>,

    /// Remove a folder from this host's backup sources, then exit.
    #[arg(long, value_name = "PATH")]
    pub remove_source: Option<PathBuf>,

    /// Mirror the destination: entries absent from the source are deleted.
    ///
    /// Overrides `settings.mirror = false` in the config for this run.
    #[arg(long)]
    pub mirror: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BAKRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve the host config and retention plan, print it, execute nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Task identifiers as exposed on the CLI.
///
/// `smartphone-backup`, `virus-scan` and `health-scan` are recognized but not
/// implemented; they run as no-ops.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum TaskKind {
    Clean,
    SmartphoneBackup,
    VirusScan,
    HealthScan,
    FileBackup,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskKind::Clean => "clean",
            TaskKind::SmartphoneBackup => "smartphone-backup",
            TaskKind::VirusScan => "virus-scan",
            TaskKind::HealthScan => "health-scan",
            TaskKind::FileBackup => "file-backup",
        };
        f.write_str(name)
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
