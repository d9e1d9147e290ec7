// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Nearest-neighbour stitching between fragments.

Every unordered fragment pair gets one candidate edge joining its closest
pair of nodes. The R-tree of the larger fragment is queried with each point
of the smaller one, so index construction happens once per fragment rather
than once per pair.
*/

use std::cmp::Reverse;

use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::fragment::Fragment;
use crate::heal::HealOptions;
use crate::types::{NodeId, Skeleton};

/// Candidate edge between two fragments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StitchEdge {
    /// Node in the larger fragment of the pair
    pub anchor: NodeId,
    /// Node in the smaller fragment of the pair
    pub joined: NodeId,
    /// Euclidean distance between the two nodes
    pub distance: f64,
    pub(crate) anchor_row: usize,
    pub(crate) joined_row: usize,
}

/// Fragment indices ordered largest to smallest (stable for equal sizes)
pub fn order_by_size(fragments: &[Fragment]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..fragments.len()).collect();
    order.sort_by_key(|&i| Reverse(fragments[i].len()));
    order
}

/// Closest node pair between `larger` and `smaller`.
///
/// On equal distances the first point of `smaller` (in row order) wins.
pub fn closest_pair(
    larger: &Fragment,
    smaller: &Fragment,
    skeleton: &Skeleton,
) -> Option<StitchEdge> {
    let nodes = skeleton.nodes();
    let mut best: Option<StitchEdge> = None;

    for &joined_row in smaller.members() {
        let Some((anchor_row, distance)) = larger.nearest(&nodes[joined_row].position()) else {
            continue;
        };
        if best.map_or(true, |edge| distance < edge.distance) {
            best = Some(StitchEdge {
                anchor: nodes[anchor_row].id,
                joined: nodes[joined_row].id,
                distance,
                anchor_row,
                joined_row,
            });
        }
    }

    best
}

/// One stitch per unordered fragment pair: `F * (F - 1) / 2` edges
pub fn stitch_fragments(
    fragments: &[Fragment],
    skeleton: &Skeleton,
    options: &HealOptions,
) -> Vec<StitchEdge> {
    let order = order_by_size(fragments);
    let mut pairs = Vec::with_capacity(order.len() * order.len().saturating_sub(1) / 2);
    for (i, &larger) in order.iter().enumerate() {
        for &smaller in &order[i + 1..] {
            pairs.push((larger, smaller));
        }
    }

    #[cfg(feature = "parallel")]
    if options.parallel && pairs.len() >= options.parallel_pair_threshold {
        debug!(
            target: "neuprint-skeleton",
            "Stitching {} fragment pairs in parallel",
            pairs.len()
        );
        return pairs
            .par_iter()
            .filter_map(|&(a, b)| closest_pair(&fragments[a], &fragments[b], skeleton))
            .collect();
    }

    #[cfg(not(feature = "parallel"))]
    let _ = options;

    debug!(
        target: "neuprint-skeleton",
        "Stitching {} fragment pairs",
        pairs.len()
    );
    pairs
        .iter()
        .filter_map(|&(a, b)| closest_pair(&fragments[a], &fragments[b], skeleton))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::extract_fragments;
    use crate::graph::SkeletonGraph;
    use crate::types::{SkeletonNode, ROOT_PARENT};

    fn three_fragments() -> Skeleton {
        Skeleton::new(vec![
            // Fragment A: 1-2-3 along x
            SkeletonNode::new(1, 0.0, 0.0, 0.0, 1.0, ROOT_PARENT),
            SkeletonNode::new(2, 1.0, 0.0, 0.0, 1.0, 1),
            SkeletonNode::new(3, 2.0, 0.0, 0.0, 1.0, 2),
            // Fragment B: 4-5 further along x
            SkeletonNode::new(4, 5.0, 0.0, 0.0, 1.0, ROOT_PARENT),
            SkeletonNode::new(5, 6.0, 0.0, 0.0, 1.0, 4),
            // Fragment C: single node above A
            SkeletonNode::new(6, 0.0, 3.0, 0.0, 1.0, ROOT_PARENT),
        ])
    }

    fn fragments_of(skeleton: &Skeleton) -> Vec<Fragment> {
        let graph = SkeletonGraph::build(skeleton).unwrap();
        extract_fragments(&graph, skeleton).unwrap()
    }

    #[test]
    fn test_order_by_size() {
        let skeleton = three_fragments();
        let fragments = fragments_of(&skeleton);
        assert_eq!(order_by_size(&fragments), vec![0, 1, 2]);
    }

    #[test]
    fn test_one_stitch_per_pair() {
        let skeleton = three_fragments();
        let fragments = fragments_of(&skeleton);
        let stitches = stitch_fragments(&fragments, &skeleton, &HealOptions::default());

        assert_eq!(stitches.len(), 3);

        let ab = stitches[0];
        assert_eq!((ab.anchor, ab.joined), (3, 4));
        assert!((ab.distance - 3.0).abs() < 1e-12);

        let ac = stitches[1];
        assert_eq!((ac.anchor, ac.joined), (1, 6));
        assert!((ac.distance - 3.0).abs() < 1e-12);

        let bc = stitches[2];
        assert_eq!((bc.anchor, bc.joined), (4, 6));
        assert!((bc.distance - 34.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let skeleton = three_fragments();
        let fragments = fragments_of(&skeleton);

        let sequential = stitch_fragments(
            &fragments,
            &skeleton,
            &HealOptions {
                parallel: false,
                ..HealOptions::default()
            },
        );
        let parallel = stitch_fragments(
            &fragments,
            &skeleton,
            &HealOptions {
                parallel: true,
                parallel_pair_threshold: 1,
            },
        );
        assert_eq!(sequential, parallel);
    }
}
