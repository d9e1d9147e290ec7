// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `neuprint_configuration.toml`. Missing
//! sections and keys fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NeuprintConfig {
    pub heal: HealConfig,
    pub swc: SwcConfig,
    pub logging: LoggingConfig,
}

/// Skeleton healing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HealConfig {
    /// Stitch fragment pairs in parallel
    pub parallel: bool,
    /// Fragment pairs needed before parallel stitching kicks in
    pub parallel_pair_threshold: usize,
}

impl Default for HealConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_pair_threshold: 64,
        }
    }
}

/// SWC export
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SwcConfig {
    /// Structure type code written to every row
    pub node_type: i32,
    pub write_header: bool,
}

impl Default for SwcConfig {
    fn default() -> Self {
        Self {
            node_type: 0,
            write_header: true,
        }
    }
}

/// Logging
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Base directory for per-run log folders
    pub log_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("./logs"),
        }
    }
}
