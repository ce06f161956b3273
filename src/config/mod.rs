// src/config/mod.rs

//! Configuration loading, validation and write-back for bakrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load and persist the config file (`loader.rs`).
//! - Validate basic invariants before a run starts (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_init, save_to_path};
pub use model::{ConfigFile, HostEntry, SettingsSection};
pub use validate::validate_config;
