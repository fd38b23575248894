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

//! # Spatial Index Root
//!
//! A quadtree over object bounds with a reverse lookup from object to the
//! node holding it.
//!
//! Objects are stored at the deepest existing node whose bounds inclusively
//! contain them. Leaves subdivide lazily when an insert would push them past
//! their capacity and they still have depth budget left; at zero budget a
//! node keeps accepting objects past capacity. Objects lying outside the root
//! bounds are kept at the root.

use super::node::{NodeEntry, NodeId, SpatialNode};
use super::{ObjectId, SpatialError};
use ahash::AHashMap;
use lumen_core::math::Rect;
use lumen_core::SpatialConfig;

/// Deepest subdivision a tree accepts. Node ids are 32-bit and a full tree
/// of this depth stays below `u32::MAX` nodes.
pub const MAX_TREE_DEPTH: u32 = 15;

/// The result of [`SpatialIndexRoot::update_object`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The object stays in the same node; only its stored bounds changed.
    Unchanged(NodeId),
    /// The object moved between nodes.
    Moved {
        /// The node that held the object before.
        from: NodeId,
        /// The node holding it now.
        to: NodeId,
    },
}

/// The root of one quadtree and the owner of its node arena.
#[derive(Debug, Clone)]
pub struct SpatialIndexRoot {
    nodes: Vec<SpatialNode>,
    capacity: usize,
    object_to_node: AHashMap<ObjectId, NodeId>,
}

impl SpatialIndexRoot {
    /// Creates an empty tree covering `bounds`.
    pub fn new(bounds: Rect, config: &SpatialConfig) -> Self {
        Self::with_limits(bounds, config.node_capacity, config.max_depth)
    }

    /// Creates an empty tree with an explicit node capacity and depth budget.
    ///
    /// A capacity of zero is treated as one. Depths past [`MAX_TREE_DEPTH`]
    /// are clamped to it.
    pub fn with_limits(bounds: Rect, capacity: usize, max_depth: u32) -> Self {
        if max_depth > MAX_TREE_DEPTH {
            log::warn!(
                "Spatial depth {max_depth} exceeds the supported maximum, using {MAX_TREE_DEPTH}."
            );
        }
        let max_depth = max_depth.min(MAX_TREE_DEPTH);
        Self {
            nodes: vec![SpatialNode::new(bounds, 0, max_depth, None)],
            capacity: capacity.max(1),
            object_to_node: AHashMap::new(),
        }
    }

    /// The area covered by the root node.
    pub fn bounds(&self) -> Rect {
        self.nodes[NodeId::ROOT.index()].bounds
    }

    /// Number of objects a node holds before it wants to subdivide.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: NodeId) -> Option<&SpatialNode> {
        self.nodes.get(id.index())
    }

    /// Returns the root node.
    pub fn root(&self) -> &SpatialNode {
        &self.nodes[NodeId::ROOT.index()]
    }

    /// Number of nodes created so far.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over every node with its id.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SpatialNode)> {
        self.nodes
            .iter()
            .zip(0u32..)
            .map(|(node, index)| (NodeId(index), node))
    }

    /// Number of objects in the tree.
    pub fn len(&self) -> usize {
        self.object_to_node.len()
    }

    /// Returns true if the tree holds no objects.
    pub fn is_empty(&self) -> bool {
        self.object_to_node.is_empty()
    }

    /// Whether `id` is in the tree.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.object_to_node.contains_key(&id)
    }

    /// The node currently holding `id`.
    pub fn node_of(&self, id: ObjectId) -> Option<NodeId> {
        self.object_to_node.get(&id).copied()
    }

    /// The bounds `id` was last indexed with.
    pub fn bounds_of(&self, id: ObjectId) -> Option<Rect> {
        let node = self.node_of(id)?;
        let entry = self.nodes[node.index()]
            .entries
            .iter()
            .find(|entry| entry.id == id)?;
        Some(entry.bounds)
    }

    /// Finds the deepest existing node whose bounds inclusively contain
    /// `bounds`, descending from the root.
    pub fn node_for_bounds(&self, bounds: &Rect) -> NodeId {
        self.node_for_bounds_from(NodeId::ROOT, bounds)
    }

    /// Same as [`node_for_bounds`](Self::node_for_bounds) but starts the
    /// descent at `start`. The first child fully containing `bounds` is
    /// followed; if none does, the current node is returned.
    pub fn node_for_bounds_from(&self, start: NodeId, bounds: &Rect) -> NodeId {
        let mut current = start;
        'descend: loop {
            if let Some(children) = self.nodes[current.index()].children {
                for child in children {
                    if self.nodes[child.index()].bounds.contains_inclusive(bounds) {
                        current = child;
                        continue 'descend;
                    }
                }
            }
            return current;
        }
    }

    /// Inserts an object and records the node holding it.
    ///
    /// Returns the node that ends up holding the object.
    pub fn add_object(&mut self, id: ObjectId, bounds: Rect) -> Result<NodeId, SpatialError> {
        if self.object_to_node.contains_key(&id) {
            log::error!("Object {id} inserted twice into the same spatial root.");
            return Err(SpatialError::DuplicateObject(id));
        }
        Ok(self.insert_at(NodeId::ROOT, id, bounds))
    }

    /// Removes an object using the reverse lookup, without searching the tree.
    ///
    /// Returns the node that held it.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<NodeId, SpatialError> {
        let node = self
            .object_to_node
            .remove(&id)
            .ok_or(SpatialError::UnknownObject(id))?;
        self.remove_from_node(node, id);
        Ok(node)
    }

    /// Re-indexes an object whose bounds changed.
    ///
    /// If the object still belongs in the same node only its stored bounds
    /// are refreshed. Otherwise it is moved and the reverse lookup updated.
    pub fn update_object(
        &mut self,
        id: ObjectId,
        bounds: Rect,
    ) -> Result<UpdateOutcome, SpatialError> {
        let current = self
            .node_of(id)
            .ok_or(SpatialError::UnknownObject(id))?;
        let target = self.node_for_bounds(&bounds);

        if target == current {
            let node = &mut self.nodes[current.index()];
            if let Some(position) = node.position_of(id) {
                node.entries[position].bounds = bounds;
            }
            return Ok(UpdateOutcome::Unchanged(current));
        }

        self.remove_from_node(current, id);
        self.object_to_node.remove(&id);
        let to = self.insert_at(target, id, bounds);
        Ok(UpdateOutcome::Moved { from: current, to })
    }

    /// Collects the ids of objects whose indexed bounds intersect `area`.
    pub fn query(&self, area: &Rect) -> Vec<ObjectId> {
        let mut found = Vec::new();
        self.for_each_intersecting(area, |entry| found.push(entry.id));
        found
    }

    /// Calls `f` for every stored entry whose bounds intersect `area`.
    ///
    /// Only nodes whose bounds intersect `area` are visited. The root is
    /// always visited because it may hold objects outside its bounds.
    pub fn for_each_intersecting(&self, area: &Rect, mut f: impl FnMut(&NodeEntry)) {
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            for entry in &node.entries {
                if entry.bounds.intersects(area) {
                    f(entry);
                }
            }
            if let Some(children) = node.children {
                // Reverse so NW is visited first.
                for child in children.into_iter().rev() {
                    if self.nodes[child.index()].bounds.intersects(area) {
                        stack.push(child);
                    }
                }
            }
        }
    }

    fn insert_at(&mut self, start: NodeId, id: ObjectId, bounds: Rect) -> NodeId {
        debug_assert!(
            !self.object_to_node.contains_key(&id),
            "object {id} is already in the tree"
        );

        let mut current = self.node_for_bounds_from(start, &bounds);
        loop {
            let node = &self.nodes[current.index()];
            let wants_split = node.is_leaf()
                && node.entries.len() + 1 > self.capacity
                && node.remaining_depth > 0;
            if !wants_split {
                break;
            }
            if !self.subdivide(current) {
                break;
            }
            let next = self.node_for_bounds_from(current, &bounds);
            if next == current {
                // Straddles the new quadrants.
                break;
            }
            current = next;
        }

        self.nodes[current.index()]
            .entries
            .push(NodeEntry { id, bounds });
        self.object_to_node.insert(id, current);
        current
    }

    /// Splits a leaf into four children. Returns false when the arena has no
    /// room for more node ids.
    fn subdivide(&mut self, id: NodeId) -> bool {
        let (quadrants, depth, remaining) = {
            let node = &self.nodes[id.index()];
            (node.bounds.quadrants(), node.depth + 1, node.remaining_depth - 1)
        };

        let Some(first) = u32::try_from(self.nodes.len())
            .ok()
            .filter(|first| first.checked_add(3).is_some())
        else {
            log::error!("Spatial node arena is full, node {} stays a leaf.", id.index());
            return false;
        };
        let children = [
            NodeId(first),
            NodeId(first + 1),
            NodeId(first + 2),
            NodeId(first + 3),
        ];
        for quadrant in quadrants {
            self.nodes
                .push(SpatialNode::new(quadrant, depth, remaining, Some(id)));
        }

        let entries = {
            let node = &mut self.nodes[id.index()];
            node.children = Some(children);
            std::mem::take(&mut node.entries)
        };

        for entry in entries {
            let target = children
                .into_iter()
                .find(|child| self.nodes[child.index()].bounds.contains_inclusive(&entry.bounds))
                .unwrap_or(id);
            self.nodes[target.index()].entries.push(entry);
            self.object_to_node.insert(entry.id, target);
        }
        true
    }

    fn remove_from_node(&mut self, node: NodeId, id: ObjectId) {
        let node = &mut self.nodes[node.index()];
        if let Some(position) = node.position_of(id) {
            node.entries.swap_remove(position);
        } else {
            debug_assert!(false, "reverse lookup pointed at a node without {id}");
        }
    }
}
