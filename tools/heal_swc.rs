// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Skeleton Healing Tool
//!
//! Reads a skeleton in SWC format, joins its fragments into a single tree
//! rooted at the smallest node id and writes the result as SWC.
//!
//! Usage:
//!   cargo run --bin heal_swc -- <input.swc> <output.swc> [options]

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use neuprint::config::{apply_cli_overrides, load_config, validate_config, NeuprintConfig};
use neuprint::observability::{debug_flags_help, init_logging, parse_debug_flags};
use neuprint::skeleton::{read_swc, write_swc, SkeletonHealer};
use neuprint::{heal_options, swc_options};
use tracing::info;

struct Args {
    input: PathBuf,
    output: PathBuf,
    config_path: Option<PathBuf>,
    overrides: HashMap<String, String>,
}

fn usage(program: &str) -> String {
    format!(
        r#"Usage: {} <input.swc> <output.swc> [options]

Options:
  --config <path>                Configuration file (neuprint_configuration.toml)
  --sequential                   Stitch fragment pairs on one thread
  --node-type <n>                SWC structure type written to every row
  --no-header                    Omit the SWC header line
  --log-level <level>            trace, debug, info, warn or error
  --log-dir <path>               Base directory for run log folders

{}"#,
        program,
        debug_flags_help()
    )
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut positional = Vec::new();
    let mut config_path = None;
    let mut overrides = HashMap::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value_for = |flag: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("{} requires a value", flag))
        };
        match arg.as_str() {
            "--config" => config_path = Some(PathBuf::from(value_for("--config")?)),
            "--sequential" => {
                overrides.insert("parallel".to_string(), "false".to_string());
            }
            "--node-type" => {
                overrides.insert("node_type".to_string(), value_for("--node-type")?);
            }
            "--no-header" => {
                overrides.insert("no_header".to_string(), "true".to_string());
            }
            "--log-level" => {
                overrides.insert("log_level".to_string(), value_for("--log-level")?);
            }
            "--log-dir" => {
                overrides.insert("log_dir".to_string(), value_for("--log-dir")?);
            }
            flag if flag.starts_with("--debug-") => {}
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    match <[PathBuf; 2]>::try_from(positional) {
        Ok([input, output]) => Ok(Args {
            input,
            output,
            config_path,
            overrides,
        }),
        Err(found) => bail!("Expected <input.swc> <output.swc>, got {} paths", found.len()),
    }
}

fn resolve_config(
    config_path: Option<&Path>,
    overrides: &HashMap<String, String>,
) -> Result<NeuprintConfig> {
    let config = match config_path {
        Some(path) => load_config(Some(path), Some(overrides))
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => {
            let mut config = NeuprintConfig::default();
            apply_cli_overrides(&mut config, overrides);
            config
        }
    };
    validate_config(&config)?;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = resolve_config(args.config_path.as_deref(), &args.overrides)?;

    let debug_flags = parse_debug_flags();
    let _logging = init_logging(
        &debug_flags,
        &config.logging.level,
        Some(config.logging.log_dir.as_path()),
    )?;

    println!("🩹 Skeleton Healing Tool");
    println!("   Input:  {}", args.input.display());
    println!("   Output: {}", args.output.display());
    println!();

    let skeleton = read_swc(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    println!("📖 Loaded {} nodes ({} roots)", skeleton.len(), skeleton.root_count());

    let healer = SkeletonHealer::new(heal_options(&config.heal));
    let report = healer.heal(skeleton)?;
    info!(
        target: "neuprint",
        "Healed {} into {} fragments",
        args.input.display(),
        report.fragment_count
    );

    if report.was_healed() && report.fragment_count == 1 {
        println!("   ✅ Re-rooted a connected skeleton without a single root");
    } else if report.was_healed() {
        println!(
            "   ✅ Joined {} fragments with {} stitches (total length {:.3})",
            report.fragment_count,
            report.retained_stitches.len(),
            report.stitch_length()
        );
        for stitch in &report.retained_stitches {
            println!(
                "      {} ↔ {} ({:.3})",
                stitch.anchor, stitch.joined, stitch.distance
            );
        }
    } else {
        println!("   ✅ Already a single tree, nothing to heal");
    }
    println!();

    write_swc(&args.output, &report.skeleton, &swc_options(&config.swc))
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("💾 Saved to: {}", args.output.display());

    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("heal_swc");

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", usage(program));
        return;
    }

    let parsed = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!();
            eprintln!("{}", usage(program));
            process::exit(2);
        }
    };

    if let Err(e) = run(parsed) {
        eprintln!("❌ Healing failed: {:#}", e);
        process::exit(1);
    }
}
