//! # neuprint
//!
//! Post-processing for skeletons fetched from a neuprint server. Skeletons
//! derived from segmentation are often split into disconnected fragments;
//! this crate joins them back into a single rooted tree.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! neuprint = "0.1"  # Default: parallel stitching
//! ```
//!
//! ```rust,no_run
//! use neuprint::prelude::*;
//!
//! let skeleton = read_swc("neuron.swc")?;
//! let report = SkeletonHealer::default().heal(skeleton)?;
//! println!("joined {} fragments", report.fragment_count);
//! write_swc("neuron_healed.swc", &report.skeleton, &SwcOptions::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//! - **`parallel`** (default): stitch fragment pairs on the rayon pool
//! - **`file-logging`**: JSON log file per tool run
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: neuprint-config, neuprint-observability    │
//! │  (TOML config + overrides, tracing setup)               │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: neuprint-skeleton                          │
//! │  (graph, fragments, stitching, MST, re-rooting, SWC)    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export member crates
pub use neuprint_config as config;
pub use neuprint_observability as observability;
pub use neuprint_skeleton as skeleton;

use neuprint_config::{HealConfig, SwcConfig};
use neuprint_skeleton::{HealOptions, SwcOptions};

/// Healing options from the `[heal]` config section
pub fn heal_options(config: &HealConfig) -> HealOptions {
    HealOptions {
        parallel: config.parallel,
        parallel_pair_threshold: config.parallel_pair_threshold,
    }
}

/// SWC export options from the `[swc]` config section
pub fn swc_options(config: &SwcConfig) -> SwcOptions {
    SwcOptions {
        node_type: config.node_type,
        write_header: config.write_header,
    }
}

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::config::{load_config, validate_config, NeuprintConfig};
    pub use crate::skeleton::{
        heal_skeleton, parse_swc, read_swc, to_swc, validate_tree, write_swc, HealOptions,
        HealReport, Skeleton, SkeletonError, SkeletonHealer, SkeletonNode, SwcOptions, ROOT_PARENT,
    };
    pub use crate::{heal_options, swc_options};
}
