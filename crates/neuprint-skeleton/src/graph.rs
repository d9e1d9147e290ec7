// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Undirected connectivity graph of a skeleton.

Vertex `i` of the graph is row `i` of the skeleton it was built from, so
row positions double as graph indices throughout the healing pipeline.
*/

use petgraph::graph::{Graph, NodeIndex, UnGraph};
use petgraph::EdgeType;
use tracing::debug;

use crate::types::{NodeId, Skeleton, SkeletonError, SkeletonResult};

/// Parent/child links of a skeleton with direction dropped
#[derive(Debug, Clone)]
pub struct SkeletonGraph {
    graph: UnGraph<NodeId, ()>,
}

impl SkeletonGraph {
    /// Build the graph, one edge per non-root node.
    ///
    /// # Errors
    /// `DuplicateNodeId`, `ReservedNodeId`, `SelfParent` or `UnknownParent`
    /// for rows that do not describe a forest over the skeleton's own ids.
    pub fn build(skeleton: &Skeleton) -> SkeletonResult<Self> {
        let index = skeleton.id_index()?;
        let mut graph = UnGraph::with_capacity(skeleton.len(), skeleton.len());

        for node in skeleton {
            graph.add_node(node.id);
        }

        for (row, node) in skeleton.iter().enumerate() {
            if node.is_root() {
                continue;
            }
            if node.parent == node.id {
                return Err(SkeletonError::SelfParent(node.id));
            }
            let Some(&parent_row) = index.get(&node.parent) else {
                return Err(SkeletonError::UnknownParent {
                    node: node.id,
                    parent: node.parent,
                });
            };
            graph.add_edge(NodeIndex::new(row), NodeIndex::new(parent_row), ());
        }

        debug!(
            target: "neuprint-skeleton",
            "Built skeleton graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self { graph })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node id stored at a row position
    pub fn node_id(&self, row: usize) -> NodeId {
        self.graph[NodeIndex::new(row)]
    }

    /// Edges as `(child_row, parent_row)` pairs, in skeleton order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .raw_edges()
            .iter()
            .map(|edge| (edge.source().index(), edge.target().index()))
    }

    pub fn inner(&self) -> &UnGraph<NodeId, ()> {
        &self.graph
    }
}

/// Convert a skeleton into a petgraph graph carrying full node records.
///
/// Directed graphs point parent -> child. The root sentinel adds no edge.
pub fn skeleton_to_graph<Ty: EdgeType>(
    skeleton: &Skeleton,
) -> SkeletonResult<Graph<crate::SkeletonNode, (), Ty>> {
    let index = skeleton.id_index()?;
    let mut graph = Graph::with_capacity(skeleton.len(), skeleton.len());

    for node in skeleton {
        graph.add_node(*node);
    }

    for (row, node) in skeleton.iter().enumerate() {
        if node.is_root() {
            continue;
        }
        let Some(&parent_row) = index.get(&node.parent) else {
            return Err(SkeletonError::UnknownParent {
                node: node.id,
                parent: node.parent,
            });
        };
        graph.add_edge(NodeIndex::new(parent_row), NodeIndex::new(row), ());
    }

    Ok(graph)
}
