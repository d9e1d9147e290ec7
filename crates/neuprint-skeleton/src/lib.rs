// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# neuprint-skeleton

Skeleton data model and healing for neuprint neuron skeletons.

Skeletons served by neuprint are point-and-radius trees, but artifacts in the
underlying segmentation frequently split one neuron into several disconnected
fragments. This crate repairs such skeletons:

- `graph`: undirected connectivity graph of the parent links
- `fragment`: connected components, each with an R-tree over its points
- `stitch`: nearest-point candidate edge for every fragment pair
- `mst`: minimum spanning tree keeping every original link
- `orient`: re-rooting and tree validation
- `heal`: the full pipeline
- `swc`: SWC text import/export

## Usage

```rust
use neuprint_skeleton::{heal_skeleton, Skeleton, SkeletonNode, ROOT_PARENT};

let fragmented = Skeleton::new(vec![
    SkeletonNode::new(1, 0.0, 0.0, 0.0, 1.0, ROOT_PARENT),
    SkeletonNode::new(2, 1.0, 0.0, 0.0, 1.0, 1),
    SkeletonNode::new(3, 10.0, 0.0, 0.0, 1.0, ROOT_PARENT),
    SkeletonNode::new(4, 11.0, 0.0, 0.0, 1.0, 3),
]);

let healed = heal_skeleton(fragmented)?;
assert_eq!(healed.roots(), vec![1]);
assert_eq!(healed.parent_of(3), Some(2));
# Ok::<(), neuprint_skeleton::SkeletonError>(())
```

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod fragment;
pub mod graph;
pub mod heal;
pub mod mst;
pub mod orient;
pub mod stitch;
pub mod swc;
pub mod types;

pub use fragment::{connected_components, extract_fragments, Fragment};
pub use graph::{skeleton_to_graph, SkeletonGraph};
pub use heal::{heal_skeleton, HealOptions, HealReport, SkeletonHealer};
pub use mst::{minimum_spanning_tree, SpanningTree};
pub use orient::{orient_from_root, reroot, validate_tree};
pub use stitch::{stitch_fragments, StitchEdge};
pub use swc::{parse_swc, read_swc, to_swc, write_swc, SwcOptions, SWC_HEADER};
pub use types::{NodeId, Skeleton, SkeletonError, SkeletonNode, SkeletonResult, ROOT_PARENT};
