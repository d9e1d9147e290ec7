// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Skeleton healing.

Skeletons derived from segmentation often consist of several fragments
(multiple rows with `link == -1`). Healing joins every fragment pair at its
nearest points, keeps the minimum spanning tree of the result and re-roots it
at the node with the smallest id.

```text
rows ─► SkeletonGraph ─► fragments ─► stitches ─► MST ─► reroot ─► validate
```
*/

use tracing::{debug, info, warn};

use crate::fragment::{connected_components, verify_partition, Fragment};
use crate::graph::SkeletonGraph;
use crate::mst::minimum_spanning_tree;
use crate::orient::{reroot, validate_tree};
use crate::stitch::{stitch_fragments, StitchEdge};
use crate::types::{Skeleton, SkeletonError, SkeletonResult};

/// Tuning knobs for [`SkeletonHealer`]
#[derive(Debug, Clone, PartialEq)]
pub struct HealOptions {
    /// Stitch fragment pairs on the rayon pool (requires the `parallel` feature)
    pub parallel: bool,
    /// Minimum number of fragment pairs before going parallel
    pub parallel_pair_threshold: usize,
}

impl Default for HealOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_pair_threshold: 64,
        }
    }
}

/// Outcome of a heal run
#[derive(Debug, Clone)]
pub struct HealReport {
    /// Id-sorted skeleton forming a single rooted tree
    pub skeleton: Skeleton,
    /// Connected components found in the input
    pub fragment_count: usize,
    /// Candidate stitches considered (one per fragment pair)
    pub candidate_stitches: usize,
    /// Stitches kept in the final tree; `fragment_count - 1` of them
    pub retained_stitches: Vec<StitchEdge>,
    /// Parent links were rebuilt from a spanning tree
    pub rerooted: bool,
}

impl HealReport {
    /// True if parent links were rewritten
    pub fn was_healed(&self) -> bool {
        self.rerooted
    }

    pub fn stitch_length(&self) -> f64 {
        self.retained_stitches.iter().map(|edge| edge.distance).sum()
    }
}

/// Joins fragmented skeletons into a single tree
#[derive(Debug, Clone, Default)]
pub struct SkeletonHealer {
    options: HealOptions,
}

impl SkeletonHealer {
    pub fn new(options: HealOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HealOptions {
        &self.options
    }

    /// Heal a skeleton.
    ///
    /// Input that already forms a single tree is returned unchanged apart
    /// from sorting rows by id.
    ///
    /// # Errors
    /// Malformed input (see [`SkeletonError::is_malformed_input`]) or an
    /// `InvariantViolation` if the healed links fail validation.
    pub fn heal(&self, mut skeleton: Skeleton) -> SkeletonResult<HealReport> {
        if skeleton.is_empty() {
            return Err(SkeletonError::EmptySkeleton);
        }

        skeleton.sort_by_id();
        skeleton.check_geometry()?;

        let graph = SkeletonGraph::build(&skeleton)?;
        let components = connected_components(&graph);
        verify_partition(&components, skeleton.len())?;
        let fragment_count = components.len();

        if fragment_count == 1 {
            if skeleton.root_count() == 1 {
                debug!(
                    target: "neuprint-skeleton",
                    "Skeleton of {} nodes is already a single tree",
                    skeleton.len()
                );
                return Ok(HealReport {
                    skeleton,
                    fragment_count,
                    candidate_stitches: 0,
                    retained_stitches: Vec::new(),
                    rerooted: false,
                });
            }
            warn!(
                target: "neuprint-skeleton",
                "Connected skeleton has {} roots; re-rooting its spanning tree",
                skeleton.root_count()
            );
        }

        let fragments: Vec<Fragment> = components
            .into_iter()
            .map(|members| Fragment::new(members, &skeleton))
            .collect();
        debug!(
            target: "neuprint-skeleton",
            "Healing {} fragments (largest {} nodes)",
            fragment_count,
            fragments.iter().map(Fragment::len).max().unwrap_or(0)
        );

        let stitches = stitch_fragments(&fragments, &skeleton, &self.options);
        let candidate_stitches = stitches.len();

        let tree = minimum_spanning_tree(&graph, &stitches);
        if tree.stitches().len() + 1 != fragment_count {
            return Err(SkeletonError::InvariantViolation(format!(
                "spanning tree joined {} fragments with {} stitches",
                fragment_count,
                tree.stitches().len()
            )));
        }

        reroot(&mut skeleton, tree.graph(), 0)?;
        validate_tree(&skeleton)?;

        info!(
            target: "neuprint-skeleton",
            "Healed skeleton: {} nodes, {} fragments joined by {} stitches (total length {:.3})",
            skeleton.len(),
            fragment_count,
            tree.stitches().len(),
            tree.total_weight()
        );

        Ok(HealReport {
            skeleton,
            fragment_count,
            candidate_stitches,
            retained_stitches: tree.into_stitches(),
            rerooted: true,
        })
    }
}

/// Heal with default options and return only the skeleton
pub fn heal_skeleton(skeleton: Skeleton) -> SkeletonResult<Skeleton> {
    SkeletonHealer::default()
        .heal(skeleton)
        .map(|report| report.skeleton)
}
