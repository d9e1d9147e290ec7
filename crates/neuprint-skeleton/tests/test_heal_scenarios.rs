// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Skeleton Healing Scenario Tests

Covers the healing pipeline end to end:
- Already-whole skeletons pass through unchanged
- Fragmented skeletons are joined at their nearest points
- Malformed input is rejected before healing
- Broken results are reported as invariant violations
*/

use neuprint_skeleton::{
    heal_skeleton, parse_swc, to_swc, validate_tree, HealOptions, Skeleton, SkeletonError,
    SkeletonHealer, SkeletonNode, SwcOptions, ROOT_PARENT,
};

fn node(id: i64, x: f64, parent: i64) -> SkeletonNode {
    SkeletonNode::new(id, x, 0.0, 0.0, 1.0, parent)
}

/// Count connected components of the healed parent links
fn component_count(skeleton: &Skeleton) -> usize {
    let ids: Vec<i64> = skeleton.iter().map(|n| n.id).collect();
    let mut label: Vec<usize> = (0..ids.len()).collect();

    fn find(label: &mut Vec<usize>, i: usize) -> usize {
        let mut root = i;
        while label[root] != root {
            root = label[root];
        }
        label[i] = root;
        root
    }

    for (row, n) in skeleton.iter().enumerate() {
        if n.parent == ROOT_PARENT {
            continue;
        }
        let parent_row = ids.iter().position(|&id| id == n.parent).unwrap();
        let (a, b) = (find(&mut label, row), find(&mut label, parent_row));
        label[a] = b;
    }

    (0..ids.len())
        .map(|i| find(&mut label, i))
        .collect::<std::collections::HashSet<_>>()
        .len()
}

// ============================================================================
// Already whole
// ============================================================================

#[test]
fn test_single_chain_is_unchanged() {
    let chain = Skeleton::new(vec![node(1, 0.0, -1), node(2, 1.0, 1), node(3, 2.0, 2)]);
    let healed = heal_skeleton(chain.clone()).unwrap();
    assert_eq!(healed, chain);
}

#[test]
fn test_unsorted_tree_is_only_sorted() {
    let shuffled = Skeleton::new(vec![node(3, 2.0, 2), node(1, 0.0, -1), node(2, 1.0, 1)]);
    let healed = heal_skeleton(shuffled).unwrap();

    let ids: Vec<i64> = healed.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(healed.parent_of(3), Some(2));
    assert_eq!(healed.parent_of(2), Some(1));
}

#[test]
fn test_tree_rooted_away_from_smallest_id_is_kept() {
    // Already a tree; healing must not move the root
    let tree = Skeleton::new(vec![node(1, 0.0, 2), node(2, 1.0, -1), node(3, 2.0, 2)]);
    let healed = heal_skeleton(tree.clone()).unwrap();
    assert_eq!(healed, tree);
}

// ============================================================================
// Fragmented
// ============================================================================

#[test]
fn test_two_fragments_joined_at_nearest_points() {
    let skeleton = Skeleton::new(vec![
        node(1, 0.0, -1),
        node(2, 1.0, 1),
        node(3, 10.0, -1),
        node(4, 11.0, 3),
    ]);
    let report = SkeletonHealer::default().heal(skeleton).unwrap();
    let healed = &report.skeleton;

    assert_eq!(healed.roots(), vec![1]);
    assert_eq!(healed.parent_of(3), Some(2));
    assert_eq!(healed.parent_of(4), Some(3));
    assert_eq!(healed.edge_count(), 3);
    assert_eq!(component_count(healed), 1);

    assert_eq!(report.fragment_count, 2);
    assert_eq!(report.candidate_stitches, 1);
    assert_eq!(report.retained_stitches.len(), 1);
    assert!((report.retained_stitches[0].distance - 9.0).abs() < 1e-12);
}

#[test]
fn test_root_moves_to_smallest_id() {
    // Smallest id sits in the smaller fragment
    let skeleton = Skeleton::new(vec![
        node(10, 0.0, -1),
        node(11, 1.0, 10),
        node(12, 2.0, 11),
        node(5, 3.5, -1),
    ]);
    let healed = heal_skeleton(skeleton).unwrap();

    assert_eq!(healed.roots(), vec![5]);
    assert_eq!(healed.parent_of(12), Some(5));
    assert_eq!(healed.parent_of(11), Some(12));
    assert_eq!(healed.parent_of(10), Some(11));
    assert!(validate_tree(&healed).is_ok());
}

#[test]
fn test_many_fragments_need_f_minus_one_stitches() {
    let mut nodes = Vec::new();
    for fragment in 0..6i64 {
        let base = fragment * 100;
        nodes.push(SkeletonNode::new(base + 1, fragment as f64 * 5.0, 0.0, 0.0, 1.0, ROOT_PARENT));
        nodes.push(SkeletonNode::new(base + 2, fragment as f64 * 5.0, 1.0, 0.0, 1.0, base + 1));
        nodes.push(SkeletonNode::new(base + 3, fragment as f64 * 5.0, 2.0, 0.5, 1.0, base + 2));
    }
    let skeleton = Skeleton::new(nodes);
    let report = SkeletonHealer::new(HealOptions {
        parallel: true,
        parallel_pair_threshold: 1,
    })
    .heal(skeleton)
    .unwrap();

    assert_eq!(report.fragment_count, 6);
    assert_eq!(report.candidate_stitches, 15);
    assert_eq!(report.retained_stitches.len(), 5);
    assert_eq!(report.skeleton.root_count(), 1);
    assert_eq!(report.skeleton.roots(), vec![1]);
    assert_eq!(component_count(&report.skeleton), 1);
    assert!((report.stitch_length() - 25.0).abs() < 1e-9);
}

#[test]
fn test_healed_swc_has_single_root_row() {
    let swc = "# rowId node_type x y z radius link\n\
               1 0 0 0 0 1 -1\n\
               2 0 1 0 0 1 1\n\
               3 0 5 0 0 1 -1\n";
    let healed = heal_skeleton(parse_swc(swc).unwrap()).unwrap();
    let text = to_swc(&healed, &SwcOptions::default());

    let root_rows = text
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter(|line| line.ends_with(" -1"))
        .count();
    assert_eq!(root_rows, 1);
    assert!(text.contains("\n3 0 5 0 0 1 2\n"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unknown_parent_is_malformed() {
    let skeleton = Skeleton::new(vec![node(1, 0.0, -1), node(2, 1.0, 99)]);
    let err = heal_skeleton(skeleton).unwrap_err();
    assert!(err.is_malformed_input());
    assert!(matches!(err, SkeletonError::UnknownParent { node: 2, parent: 99 }));
}

#[test]
fn test_duplicate_ids_are_malformed() {
    let skeleton = Skeleton::new(vec![node(1, 0.0, -1), node(1, 1.0, -1)]);
    let err = heal_skeleton(skeleton).unwrap_err();
    assert!(matches!(err, SkeletonError::DuplicateNodeId(1)));
}

#[test]
fn test_node_id_equal_to_root_marker_is_malformed() {
    // Node 2 would look like a root because its parent id is the marker
    let skeleton = Skeleton::new(vec![
        node(ROOT_PARENT, 0.0, ROOT_PARENT),
        node(2, 1.0, ROOT_PARENT),
        node(3, 2.0, 2),
    ]);
    let err = heal_skeleton(skeleton).unwrap_err();
    assert!(err.is_malformed_input());
    assert!(!err.is_invariant_violation());
    assert!(matches!(err, SkeletonError::ReservedNodeId(ROOT_PARENT)));
}

#[test]
fn test_two_roots_raise_invariant_violation() {
    // Hand-built result in which two nodes lack a parent
    let broken = Skeleton::new(vec![node(1, 0.0, -1), node(2, 1.0, 1), node(3, 5.0, -1)]);
    let err = validate_tree(&broken).unwrap_err();
    assert!(err.is_invariant_violation());
    assert!(!err.is_malformed_input());
}
