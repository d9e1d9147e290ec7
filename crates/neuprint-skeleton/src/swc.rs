// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
SWC text import and export.

Rows are `id node_type x y z radius parent`, space separated, `-1` marking
the root. Lines starting with `#` are comments.
*/

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::types::{NodeId, Skeleton, SkeletonError, SkeletonNode, SkeletonResult};

/// Header line written before the rows
pub const SWC_HEADER: &str = "# rowId node_type x y z radius link";

const SWC_COLUMNS: usize = 7;

/// SWC export settings
#[derive(Debug, Clone, PartialEq)]
pub struct SwcOptions {
    /// Structure type code written in the second column
    pub node_type: i32,
    pub write_header: bool,
}

impl Default for SwcOptions {
    fn default() -> Self {
        Self {
            node_type: 0,
            write_header: true,
        }
    }
}

/// Render a skeleton as SWC text, rows in skeleton order
pub fn to_swc(skeleton: &Skeleton, options: &SwcOptions) -> String {
    let mut swc = String::with_capacity(64 * (skeleton.len() + 1));
    if options.write_header {
        swc.push_str(SWC_HEADER);
        swc.push('\n');
    }
    for node in skeleton {
        // Writing into a String cannot fail
        let _ = writeln!(
            swc,
            "{} {} {} {} {} {} {}",
            node.id, options.node_type, node.x, node.y, node.z, node.radius, node.parent
        );
    }
    swc
}

/// Write SWC text to `path`
pub fn write_swc(
    path: impl AsRef<Path>,
    skeleton: &Skeleton,
    options: &SwcOptions,
) -> SkeletonResult<()> {
    fs::write(path, to_swc(skeleton, options))?;
    Ok(())
}

/// Parse SWC text. The type column is read but not kept.
pub fn parse_swc(text: &str) -> SkeletonResult<Skeleton> {
    let mut nodes = Vec::new();

    for (line_index, line) in text.lines().enumerate() {
        let line_number = line_index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let columns: Vec<&str> = trimmed.split_whitespace().collect();
        if columns.len() != SWC_COLUMNS {
            return Err(SkeletonError::InvalidSwc {
                line: line_number,
                reason: format!("expected {} columns, found {}", SWC_COLUMNS, columns.len()),
            });
        }

        let id: NodeId = parse_column(columns[0], "id", line_number)?;
        let _node_type: i32 = parse_column(columns[1], "node_type", line_number)?;
        let x: f64 = parse_column(columns[2], "x", line_number)?;
        let y: f64 = parse_column(columns[3], "y", line_number)?;
        let z: f64 = parse_column(columns[4], "z", line_number)?;
        let radius: f64 = parse_column(columns[5], "radius", line_number)?;
        let parent: NodeId = parse_column(columns[6], "parent", line_number)?;

        nodes.push(SkeletonNode::new(id, x, y, z, radius, parent));
    }

    Ok(Skeleton::new(nodes))
}

/// Read and parse an SWC file
pub fn read_swc(path: impl AsRef<Path>) -> SkeletonResult<Skeleton> {
    let text = fs::read_to_string(path)?;
    parse_swc(&text)
}

fn parse_column<T: std::str::FromStr>(
    value: &str,
    column: &str,
    line: usize,
) -> SkeletonResult<T> {
    value.parse::<T>().map_err(|_| SkeletonError::InvalidSwc {
        line,
        reason: format!("cannot parse {} from '{}'", column, value),
    })
}
