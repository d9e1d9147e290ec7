// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Minimum spanning tree over intra-fragment links and stitch candidates.

Kruskal's algorithm. Intra-fragment links carry weight zero and are offered
to the union-find before any stitch, so even a zero-length stitch between
coincident points can never displace an original link.
*/

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use tracing::debug;

use crate::graph::SkeletonGraph;
use crate::stitch::StitchEdge;
use crate::types::NodeId;

/// Spanning tree plus the stitches that made it into the tree
#[derive(Debug, Clone)]
pub struct SpanningTree {
    graph: UnGraph<NodeId, f64>,
    stitches: Vec<StitchEdge>,
    dropped_links: usize,
}

impl SpanningTree {
    /// Tree graph; vertex `i` is skeleton row `i`
    pub fn graph(&self) -> &UnGraph<NodeId, f64> {
        &self.graph
    }

    /// Stitch edges kept in the tree, cheapest first
    pub fn stitches(&self) -> &[StitchEdge] {
        &self.stitches
    }

    pub fn into_stitches(self) -> Vec<StitchEdge> {
        self.stitches
    }

    /// Original links rejected because they closed a cycle in the input
    pub fn dropped_links(&self) -> usize {
        self.dropped_links
    }

    pub fn total_weight(&self) -> f64 {
        self.stitches.iter().map(|edge| edge.distance).sum()
    }
}

/// Compute the MST of the skeleton graph augmented with `stitches`
pub fn minimum_spanning_tree(graph: &SkeletonGraph, stitches: &[StitchEdge]) -> SpanningTree {
    let node_count = graph.node_count();
    let mut sets = UnionFind::<usize>::new(node_count);
    let mut tree = UnGraph::with_capacity(node_count, node_count.saturating_sub(1));
    for row in 0..node_count {
        tree.add_node(graph.node_id(row));
    }

    let mut dropped_links = 0;
    for (child, parent) in graph.edges() {
        if sets.union(child, parent) {
            tree.add_edge(NodeIndex::new(child), NodeIndex::new(parent), 0.0);
        } else {
            dropped_links += 1;
        }
    }

    let mut candidates = stitches.to_vec();
    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let mut kept = Vec::new();
    for edge in candidates {
        if tree.edge_count() + 1 >= node_count.max(1) {
            break;
        }
        if sets.union(edge.anchor_row, edge.joined_row) {
            tree.add_edge(
                NodeIndex::new(edge.anchor_row),
                NodeIndex::new(edge.joined_row),
                edge.distance,
            );
            kept.push(edge);
        }
    }

    debug!(
        target: "neuprint-skeleton",
        "MST kept {} of {} stitches ({} cyclic links dropped)",
        kept.len(),
        stitches.len(),
        dropped_links
    );

    SpanningTree {
        graph: tree,
        stitches: kept,
        dropped_links,
    }
}
