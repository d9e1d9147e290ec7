// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Fragment extraction.

A fragment is one connected component of the skeleton graph. Each fragment
keeps the rows of its members and an R-tree over their positions for
nearest-neighbour queries.
*/

use petgraph::unionfind::UnionFind;
use rstar::primitives::GeomWithData;
use rstar::{PointDistance, RTree};

use crate::graph::SkeletonGraph;
use crate::types::{Skeleton, SkeletonError, SkeletonResult};

/// Indexed position: point plus the skeleton row it came from
pub type IndexedPoint = GeomWithData<[f64; 3], usize>;

/// One connected component of a skeleton
pub struct Fragment {
    /// Skeleton rows, ascending (rows are id-sorted before healing)
    members: Vec<usize>,
    index: RTree<IndexedPoint>,
}

impl Fragment {
    /// Bulk-load the spatial index for the given member rows
    pub fn new(members: Vec<usize>, skeleton: &Skeleton) -> Self {
        let nodes = skeleton.nodes();
        let points = members
            .iter()
            .map(|&row| IndexedPoint::new(nodes[row].position(), row))
            .collect();

        Self {
            members,
            index: RTree::bulk_load(points),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Closest member to `point` as `(row, distance)`
    pub fn nearest(&self, point: &[f64; 3]) -> Option<(usize, f64)> {
        self.index
            .nearest_neighbor(point)
            .map(|entry| (entry.data, entry.distance_2(point).sqrt()))
    }
}

/// Group skeleton rows into connected components.
///
/// Components are ordered by their smallest row and members are ascending.
pub fn connected_components(graph: &SkeletonGraph) -> Vec<Vec<usize>> {
    let node_count = graph.node_count();
    let mut sets = UnionFind::<usize>::new(node_count);
    for (child, parent) in graph.edges() {
        sets.union(child, parent);
    }

    let labels = sets.into_labeling();
    let mut slot_of_label = vec![usize::MAX; node_count];
    let mut components: Vec<Vec<usize>> = Vec::new();

    for (row, &label) in labels.iter().enumerate() {
        if slot_of_label[label] == usize::MAX {
            slot_of_label[label] = components.len();
            components.push(Vec::new());
        }
        components[slot_of_label[label]].push(row);
    }

    components
}

/// Check that the components cover every row exactly once
pub fn verify_partition(components: &[Vec<usize>], node_count: usize) -> SkeletonResult<()> {
    let mut seen = vec![false; node_count];
    let mut covered = 0usize;

    for component in components {
        for &row in component {
            match seen.get_mut(row) {
                Some(flag) if !*flag => {
                    *flag = true;
                    covered += 1;
                }
                Some(_) => {
                    return Err(SkeletonError::InvariantViolation(format!(
                        "row {} assigned to more than one fragment",
                        row
                    )))
                }
                None => {
                    return Err(SkeletonError::InvariantViolation(format!(
                        "fragment references row {} outside a skeleton of {} nodes",
                        row, node_count
                    )))
                }
            }
        }
    }

    if covered != node_count {
        return Err(SkeletonError::InvariantViolation(format!(
            "fragments cover {} of {} nodes",
            covered, node_count
        )));
    }

    Ok(())
}

/// Split a skeleton into indexed fragments
pub fn extract_fragments(
    graph: &SkeletonGraph,
    skeleton: &Skeleton,
) -> SkeletonResult<Vec<Fragment>> {
    let components = connected_components(graph);
    verify_partition(&components, skeleton.len())?;

    Ok(components
        .into_iter()
        .map(|members| Fragment::new(members, skeleton))
        .collect())
}
