// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::ObjectId;
use lumen_core::math::Rect;

/// Index of a node in a [`SpatialIndexRoot`](super::SpatialIndexRoot) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The root node of every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An object stored in a node, with the bounds it was indexed with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeEntry {
    /// The stored object.
    pub id: ObjectId,
    /// Bounds at the time of the last insert or update.
    pub bounds: Rect,
}

/// A node of the quadtree.
///
/// A node is either a leaf or has exactly four children covering its
/// quadrants in NW, NE, SW, SE order. Nodes are never merged once created.
#[derive(Debug, Clone)]
pub struct SpatialNode {
    pub(crate) bounds: Rect,
    pub(crate) depth: u32,
    pub(crate) remaining_depth: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Option<[NodeId; 4]>,
    pub(crate) entries: Vec<NodeEntry>,
}

impl SpatialNode {
    pub(crate) fn new(
        bounds: Rect,
        depth: u32,
        remaining_depth: u32,
        parent: Option<NodeId>,
    ) -> Self {
        Self {
            bounds,
            depth,
            remaining_depth,
            parent,
            children: None,
            entries: Vec::new(),
        }
    }

    /// The area covered by this node.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Distance from the root; the root has depth 0.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// How many more levels may be created below this node.
    #[inline]
    pub fn remaining_depth(&self) -> u32 {
        self.remaining_depth
    }

    /// The parent node, `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The four children, if the node has been subdivided.
    #[inline]
    pub fn children(&self) -> Option<[NodeId; 4]> {
        self.children
    }

    /// Returns true if this node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Objects stored directly at this node.
    pub fn entries(&self) -> &[NodeEntry] {
        &self.entries
    }

    /// Whether `id` is stored directly at this node.
    pub fn holds(&self, id: ObjectId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub(crate) fn position_of(&self, id: ObjectId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }
}
