// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neuprint-observability
//!
//! Logging setup shared by the neuprint tools, with per-crate debug flags.
//!
//! ## Features
//! - `file-logging`: JSON log file per run, written next to console output

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Crate names accepted by `--debug-{crate}` flags; also the `tracing` targets they log under
pub const KNOWN_CRATES: &[&str] = &["neuprint", "neuprint-skeleton", "neuprint-config"];
