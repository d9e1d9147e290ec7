// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones winning:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, NeuprintConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "neuprint_configuration.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `NEUPRINT_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("NEUPRINT_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by NEUPRINT_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        for ancestor in cwd.ancestors().skip(1).take(5) {
            search_paths.push(ancestor.join(CONFIG_FILE_NAME));
        }
    }

    if let Some(found) = search_paths.iter().find(|path| path.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet NEUPRINT_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<NeuprintConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: NeuprintConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `NEUPRINT_HEAL_PARALLEL` -> `heal.parallel`
/// - `NEUPRINT_HEAL_PARALLEL_THRESHOLD` -> `heal.parallel_pair_threshold`
/// - `NEUPRINT_SWC_NODE_TYPE` -> `swc.node_type`
/// - `NEUPRINT_LOG_LEVEL` -> `logging.level`
/// - `NEUPRINT_LOG_DIR` -> `logging.log_dir`
pub fn apply_environment_overrides(config: &mut NeuprintConfig) {
    if let Ok(value) = env::var("NEUPRINT_HEAL_PARALLEL") {
        config.heal.parallel = parse_flag(&value);
    }
    if let Ok(value) = env::var("NEUPRINT_HEAL_PARALLEL_THRESHOLD") {
        if let Ok(threshold) = value.parse::<usize>() {
            config.heal.parallel_pair_threshold = threshold;
        }
    }
    if let Ok(value) = env::var("NEUPRINT_SWC_NODE_TYPE") {
        if let Ok(node_type) = value.parse::<i32>() {
            config.swc.node_type = node_type;
        }
    }
    if let Ok(value) = env::var("NEUPRINT_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("NEUPRINT_LOG_DIR") {
        config.logging.log_dir = PathBuf::from(value);
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - CLI arguments keyed by name (e.g., `{"log_level": "debug", "parallel": "false"}`)
pub fn apply_cli_overrides(
    config: &mut NeuprintConfig,
    cli_args: &HashMap<String, String>,
) {
    if let Some(value) = cli_args.get("parallel") {
        config.heal.parallel = parse_flag(value);
    }
    if let Some(value) = cli_args.get("parallel_pair_threshold") {
        if let Ok(threshold) = value.parse::<usize>() {
            config.heal.parallel_pair_threshold = threshold;
        }
    }
    if let Some(value) = cli_args.get("node_type") {
        if let Ok(node_type) = value.parse::<i32>() {
            config.swc.node_type = node_type;
        }
    }
    if let Some(value) = cli_args.get("no_header") {
        config.swc.write_header = !parse_flag(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("log_dir") {
        config.logging.log_dir = PathBuf::from(value);
    }
}

fn parse_flag(value: &str) -> bool {
    let lowered = value.to_lowercase();
    lowered == "true" || lowered == "1" || lowered == "yes"
}
