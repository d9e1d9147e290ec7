// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Collects every problem in one pass so the user sees them all at once.

use crate::{ConfigError, ConfigResult, NeuprintConfig};

/// Log levels accepted by the logging subscriber
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &NeuprintConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Every validation problem in `config`, in section order
pub fn collect_errors(config: &NeuprintConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();

    if config.heal.parallel_pair_threshold == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "heal.parallel_pair_threshold".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if config.swc.node_type < 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "swc.node_type".to_string(),
            reason: format!("{} is negative", config.swc.node_type),
        });
    }

    if !LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("'{}' is not one of {}", config.logging.level, LOG_LEVELS.join(", ")),
        });
    }

    if config.logging.log_dir.as_os_str().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "logging.log_dir".to_string(),
        });
    }

    errors
}
