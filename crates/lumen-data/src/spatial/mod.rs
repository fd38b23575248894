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

//! Spatial indexing of 2D object bounds.
//!
//! A [`SpatialIndexRoot`] is a capacity- and depth-bounded quadtree whose
//! nodes live in an arena and are addressed by [`NodeId`]. A [`WorldTree`]
//! keeps one root per registered layer and fans object changes out to the
//! layers each object belongs to.

mod layer;
mod node;
mod root;
mod world_tree;

pub use self::layer::{LayerId, LayerMask};
pub use self::node::{NodeEntry, NodeId, SpatialNode};
pub use self::root::{SpatialIndexRoot, UpdateOutcome, MAX_TREE_DEPTH};
pub use self::world_tree::WorldTree;

use lumen_core::math::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable identifier of an object tracked by the spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that can be placed in a [`WorldTree`].
pub trait SpatialObject {
    /// The identifier the object is tracked under.
    fn spatial_id(&self) -> ObjectId;

    /// Current world-space bounds.
    fn spatial_bounds(&self) -> Rect;

    /// The layers the object belongs to besides [`LayerId::ALL`].
    fn layer_mask(&self) -> LayerMask {
        LayerMask::EMPTY
    }
}

/// Errors produced by the spatial index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpatialError {
    /// The object is already tracked.
    #[error("object {0} is already present in the spatial index")]
    DuplicateObject(ObjectId),
    /// The object is not tracked.
    #[error("object {0} is not present in the spatial index")]
    UnknownObject(ObjectId),
    /// No root is registered for the layer.
    #[error("layer {0} has no spatial root")]
    UnknownLayer(LayerId),
}
