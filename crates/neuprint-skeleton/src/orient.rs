// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Re-rooting a spanning tree and validating the resulting parent links.
*/

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::{Dfs, VisitMap};

use crate::types::{NodeId, Skeleton, SkeletonError, SkeletonResult, ROOT_PARENT};

/// Parent id of every row, reached by depth-first traversal from `root_row`.
///
/// In a tree the only already-discovered neighbour of a freshly visited node
/// is the node it was reached from; a second one means the graph has a cycle.
pub fn orient_from_root(
    tree: &UnGraph<NodeId, f64>,
    root_row: usize,
) -> SkeletonResult<Vec<NodeId>> {
    let node_count = tree.node_count();
    if root_row >= node_count {
        return Err(SkeletonError::InvariantViolation(format!(
            "root row {} outside a tree of {} nodes",
            root_row, node_count
        )));
    }

    let mut parents: Vec<Option<NodeId>> = vec![None; node_count];
    let mut visited = 0usize;
    let mut dfs = Dfs::new(tree, NodeIndex::new(root_row));

    while let Some(node) = dfs.next(tree) {
        visited += 1;
        let mut predecessors = tree
            .neighbors(node)
            .filter(|neighbor| dfs.discovered.is_visited(neighbor));

        let parent = match (predecessors.next(), predecessors.next()) {
            (None, _) => ROOT_PARENT,
            (Some(predecessor), None) => tree[predecessor],
            (Some(_), Some(_)) => {
                return Err(SkeletonError::InvariantViolation(format!(
                    "node {} closes a cycle in the spanning tree",
                    tree[node]
                )))
            }
        };
        parents[node.index()] = Some(parent);
    }

    if visited != node_count {
        return Err(SkeletonError::InvariantViolation(format!(
            "traversal from node {} reached {} of {} nodes",
            tree[NodeIndex::new(root_row)],
            visited,
            node_count
        )));
    }

    let roots = parents.iter().filter(|p| **p == Some(ROOT_PARENT)).count();
    if roots != 1 {
        return Err(SkeletonError::InvariantViolation(format!(
            "traversal produced {} roots",
            roots
        )));
    }

    Ok(parents.into_iter().flatten().collect())
}

/// Rewrite the skeleton's parent links from a spanning tree over its rows
pub fn reroot(
    skeleton: &mut Skeleton,
    tree: &UnGraph<NodeId, f64>,
    root_row: usize,
) -> SkeletonResult<()> {
    if tree.node_count() != skeleton.len() {
        return Err(SkeletonError::InvariantViolation(format!(
            "spanning tree has {} nodes, skeleton has {}",
            tree.node_count(),
            skeleton.len()
        )));
    }

    let parents = orient_from_root(tree, root_row)?;
    for (node, parent) in skeleton.nodes_mut().iter_mut().zip(parents) {
        node.parent = parent;
    }
    Ok(())
}

/// Check that the parent links form one rooted tree over all nodes.
///
/// # Errors
/// `InvariantViolation` on zero or several roots, a parent that does not
/// resolve, a cycle, or a disconnected node set.
pub fn validate_tree(skeleton: &Skeleton) -> SkeletonResult<()> {
    if skeleton.is_empty() {
        return Err(SkeletonError::InvariantViolation(
            "skeleton has no nodes".to_string(),
        ));
    }

    let roots = skeleton.roots();
    if roots.len() != 1 {
        return Err(SkeletonError::InvariantViolation(format!(
            "expected exactly one root, found {} {:?}",
            roots.len(),
            roots
        )));
    }

    let index = skeleton
        .id_index()
        .map_err(|err| SkeletonError::InvariantViolation(err.to_string()))?;

    // One root and n - 1 links that never close a cycle span every node
    let mut sets = UnionFind::<usize>::new(skeleton.len());
    for (row, node) in skeleton.iter().enumerate() {
        if node.is_root() {
            continue;
        }
        let Some(&parent_row) = index.get(&node.parent) else {
            return Err(SkeletonError::InvariantViolation(format!(
                "node {} has parent {} outside the skeleton",
                node.id, node.parent
            )));
        };
        if !sets.union(row, parent_row) {
            return Err(SkeletonError::InvariantViolation(format!(
                "parent link {} -> {} closes a cycle",
                node.id, node.parent
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SkeletonNode;

    fn star() -> UnGraph<NodeId, f64> {
        let mut tree = UnGraph::new_undirected();
        let nodes: Vec<NodeIndex> = [10, 20, 30, 40].iter().map(|&id| tree.add_node(id)).collect();
        tree.add_edge(nodes[1], nodes[0], 0.0);
        tree.add_edge(nodes[1], nodes[2], 0.0);
        tree.add_edge(nodes[2], nodes[3], 2.5);
        tree
    }

    #[test]
    fn test_orient_from_first_row() {
        let parents = orient_from_root(&star(), 0).unwrap();
        assert_eq!(parents, vec![ROOT_PARENT, 10, 20, 30]);
    }

    #[test]
    fn test_orient_from_other_root() {
        let parents = orient_from_root(&star(), 2).unwrap();
        assert_eq!(parents, vec![20, 30, ROOT_PARENT, 30]);
    }

    #[test]
    fn test_disconnected_tree_is_violation() {
        let mut tree = star();
        tree.add_node(50);
        let err = orient_from_root(&tree, 0).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_cycle_is_violation() {
        let mut tree = star();
        tree.add_edge(NodeIndex::new(3), NodeIndex::new(0), 1.0);
        let err = orient_from_root(&tree, 0).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_validate_two_roots() {
        let skeleton = Skeleton::new(vec![
            SkeletonNode::new(1, 0.0, 0.0, 0.0, 1.0, ROOT_PARENT),
            SkeletonNode::new(2, 1.0, 0.0, 0.0, 1.0, ROOT_PARENT),
        ]);
        let err = validate_tree(&skeleton).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_validate_cycle_with_single_root() {
        let skeleton = Skeleton::new(vec![
            SkeletonNode::new(1, 0.0, 0.0, 0.0, 1.0, ROOT_PARENT),
            SkeletonNode::new(2, 1.0, 0.0, 0.0, 1.0, 3),
            SkeletonNode::new(3, 2.0, 0.0, 0.0, 1.0, 2),
        ]);
        assert!(validate_tree(&skeleton).unwrap_err().is_invariant_violation());
    }

    #[test]
    fn test_validate_chain() {
        let skeleton = Skeleton::new(vec![
            SkeletonNode::new(1, 0.0, 0.0, 0.0, 1.0, ROOT_PARENT),
            SkeletonNode::new(2, 1.0, 0.0, 0.0, 1.0, 1),
            SkeletonNode::new(3, 2.0, 0.0, 0.0, 1.0, 2),
        ]);
        assert!(validate_tree(&skeleton).is_ok());
    }
}
