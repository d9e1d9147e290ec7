// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output always; with the `file-logging` feature, also a JSON log
//! in a timestamped run folder:
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       └── neuprint.log
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

/// Keeps background log writers alive; drop it last
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder holding the log file, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Initialize the global subscriber
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags for filtering
/// * `default_level` - Level for everything not raised by a flag
/// * `log_dir` - Base directory for run folders (used with `file-logging`)
///
/// # Errors
/// Invalid filter directives, an unwritable log directory, or a subscriber
/// that was already installed.
pub fn init_logging(
    debug_flags: &CrateDebugFlags,
    default_level: &str,
    log_dir: Option<&Path>,
) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(default_level);
    let build_filter = || {
        EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter: {}", filter))
    };

    let mut layers = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(build_filter()?);
    layers.push(console_layer.boxed());

    #[cfg(feature = "file-logging")]
    let (file_guard, run_folder) = match log_dir {
        Some(base_log_dir) => {
            let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
            let run_folder = base_log_dir.join(format!("run_{}", timestamp));
            std::fs::create_dir_all(&run_folder).with_context(|| {
                format!("Failed to create log directory: {}", run_folder.display())
            })?;

            let file_appender = tracing_appender::rolling::never(&run_folder, "neuprint.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(build_filter()?)
                .boxed();
            layers.push(file_layer);

            (Some(guard), Some(run_folder))
        }
        None => (None, None),
    };

    #[cfg(not(feature = "file-logging"))]
    let run_folder = {
        let _ = log_dir;
        None
    };

    Registry::default()
        .with(layers)
        .try_init()
        .context("Failed to install logging subscriber")?;

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guard: file_guard,
        log_dir: run_folder,
    })
}

/// Initialize console logging at `info` plus any debug flags
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, "info", None)
}
