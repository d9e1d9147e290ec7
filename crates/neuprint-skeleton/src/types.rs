// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types for skeleton operations.

Field names serialize as the columns of the neuprint skeleton table
(`rowId`, `x`, `y`, `z`, `radius`, `link`).
*/

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Skeleton node identifier (`rowId` in neuprint)
pub type NodeId = i64;

/// Parent id marking a root node
pub const ROOT_PARENT: NodeId = -1;

/// Result type for skeleton operations
pub type SkeletonResult<T> = Result<T, SkeletonError>;

/// Errors that can occur while validating, healing or (de)serializing skeletons
#[derive(Debug, thiserror::Error)]
pub enum SkeletonError {
    #[error("Skeleton has no nodes")]
    EmptySkeleton,

    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(NodeId),

    #[error("Node {node} references unknown parent {parent}")]
    UnknownParent { node: NodeId, parent: NodeId },

    #[error("Node {0} is its own parent")]
    SelfParent(NodeId),

    #[error("Node id {0} is reserved for the root parent marker")]
    ReservedNodeId(NodeId),

    #[error("Node {node} has invalid geometry: {reason}")]
    InvalidGeometry { node: NodeId, reason: String },

    #[error("Invalid SWC at line {line}: {reason}")]
    InvalidSwc { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The healed parent graph is not a single rooted tree. Always a bug in
    /// healing, never a property of the input data.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl SkeletonError {
    /// True for errors caused by the input data rather than by healing itself
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            SkeletonError::EmptySkeleton
                | SkeletonError::DuplicateNodeId(_)
                | SkeletonError::UnknownParent { .. }
                | SkeletonError::SelfParent(_)
                | SkeletonError::ReservedNodeId(_)
                | SkeletonError::InvalidGeometry { .. }
                | SkeletonError::InvalidSwc { .. }
        )
    }

    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, SkeletonError::InvariantViolation(_))
    }
}

/// One 3D point sample of a neuron's morphology
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkeletonNode {
    #[serde(rename = "rowId")]
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f64,
    /// Parent node id, or [`ROOT_PARENT`]
    #[serde(rename = "link")]
    pub parent: NodeId,
}

impl SkeletonNode {
    pub fn new(id: NodeId, x: f64, y: f64, z: f64, radius: f64, parent: NodeId) -> Self {
        Self {
            id,
            x,
            y,
            z,
            radius,
            parent,
        }
    }

    #[inline]
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent == ROOT_PARENT
    }

    /// Euclidean distance between two node positions
    pub fn distance_to(&self, other: &SkeletonNode) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Ordered collection of nodes describing one neuron.
///
/// Nominally a tree, but skeletons derived from segmentation are often a
/// forest of disconnected fragments. See [`crate::heal`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Skeleton {
    nodes: Vec<SkeletonNode>,
}

impl Skeleton {
    pub fn new(nodes: Vec<SkeletonNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[SkeletonNode] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [SkeletonNode] {
        &mut self.nodes
    }

    pub fn into_nodes(self) -> Vec<SkeletonNode> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SkeletonNode> {
        self.nodes.iter()
    }

    /// Find a node by id (linear scan)
    pub fn get(&self, id: NodeId) -> Option<&SkeletonNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Parent id of the node with the given id
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|node| node.parent)
    }

    /// Ids of all nodes carrying the root sentinel
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.is_root())
            .map(|node| node.id)
            .collect()
    }

    pub fn root_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_root()).count()
    }

    /// Number of parent links (non-root nodes)
    pub fn edge_count(&self) -> usize {
        self.nodes.len() - self.root_count()
    }

    /// Stable sort of the rows by node id
    pub fn sort_by_id(&mut self) {
        self.nodes.sort_by_key(|node| node.id);
    }

    /// Map each node id to its row position.
    ///
    /// # Errors
    /// `DuplicateNodeId` if an id appears twice, `ReservedNodeId` for a node
    /// whose id is [`ROOT_PARENT`].
    pub fn id_index(&self) -> SkeletonResult<AHashMap<NodeId, usize>> {
        let mut index = AHashMap::with_capacity(self.nodes.len());
        for (position, node) in self.nodes.iter().enumerate() {
            if node.id == ROOT_PARENT {
                return Err(SkeletonError::ReservedNodeId(node.id));
            }
            if index.insert(node.id, position).is_some() {
                return Err(SkeletonError::DuplicateNodeId(node.id));
            }
        }
        Ok(index)
    }

    /// Reject coordinates and radii that cannot take part in distance queries
    pub fn check_geometry(&self) -> SkeletonResult<()> {
        for node in &self.nodes {
            if !node.position().iter().all(|c| c.is_finite()) {
                return Err(SkeletonError::InvalidGeometry {
                    node: node.id,
                    reason: format!("non-finite position {:?}", node.position()),
                });
            }
            if !node.radius.is_finite() || node.radius < 0.0 {
                return Err(SkeletonError::InvalidGeometry {
                    node: node.id,
                    reason: format!("radius {} is not a non-negative number", node.radius),
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<SkeletonNode>> for Skeleton {
    fn from(nodes: Vec<SkeletonNode>) -> Self {
        Self::new(nodes)
    }
}

impl FromIterator<SkeletonNode> for Skeleton {
    fn from_iter<I: IntoIterator<Item = SkeletonNode>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Skeleton {
    type Item = &'a SkeletonNode;
    type IntoIter = std::slice::Iter<'a, SkeletonNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
