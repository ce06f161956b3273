// src/errors.rs

//! Crate-wide error aliases.
//!
//! Orchestration code uses `anyhow` throughout; the one structured error
//! type lives at the process-adapter seam (`exec::ExecError`).

pub use anyhow::{Error, Result};
