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

//! # Lumen Data
//!
//! The world model of the engine. The [`spatial`] module holds the layered
//! quadtree used for queries and culling; the [`scene`] module holds the map
//! of game objects and the scene manager that drives it.

#![warn(missing_docs)]

pub mod scene;
pub mod spatial;

pub use scene::{GameObject, Map, MapEvent, MapScene, ObjectContext, Scene, SceneManager};
pub use spatial::{
    LayerId, LayerMask, NodeId, ObjectId, SpatialError, SpatialIndexRoot, SpatialObject,
    UpdateOutcome, WorldTree, MAX_TREE_DEPTH,
};
