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

//! # World Tree
//!
//! Coordinates one [`SpatialIndexRoot`] per layer over a fixed map area.

use super::layer::{LayerId, LayerMask};
use super::node::NodeEntry;
use super::root::SpatialIndexRoot;
use super::{ObjectId, SpatialError, SpatialObject};
use lumen_core::math::{Rect, Vec2};
use lumen_core::SpatialConfig;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
struct TrackedObject {
    bounds: Rect,
    layers: LayerMask,
}

/// A set of layered quadtrees sharing the same map area.
///
/// Layer [`LayerId::ALL`] always exists and holds every object. An object's
/// layer mask is read once, when it is added; later changes to what the
/// object reports are not picked up until it is removed and added again.
#[derive(Debug, Clone)]
pub struct WorldTree {
    map_bounds: Rect,
    config: SpatialConfig,
    layers: BTreeMap<LayerId, SpatialIndexRoot>,
    objects: BTreeMap<ObjectId, TrackedObject>,
}

impl WorldTree {
    /// Creates a tree covering `(0, 0)` to `map_size` with only the
    /// [`LayerId::ALL`] layer registered.
    pub fn new(map_size: Vec2, config: &SpatialConfig) -> Self {
        let map_bounds = Rect::from_position_size(Vec2::ZERO, map_size);
        let mut layers = BTreeMap::new();
        layers.insert(LayerId::ALL, SpatialIndexRoot::new(map_bounds, config));
        Self {
            map_bounds,
            config: *config,
            layers,
            objects: BTreeMap::new(),
        }
    }

    /// The area covered by every layer.
    pub fn map_bounds(&self) -> Rect {
        self.map_bounds
    }

    /// Registers a layer and backfills every tracked object belonging to it.
    ///
    /// Returns `false` if the layer was already registered.
    pub fn add_tree_layer(&mut self, layer: LayerId) -> bool {
        if self.layers.contains_key(&layer) {
            return false;
        }

        let mut root = SpatialIndexRoot::new(self.map_bounds, &self.config);
        let mut backfilled = 0usize;
        for (&id, tracked) in &self.objects {
            if tracked.layers.contains(layer) && root.add_object(id, tracked.bounds).is_ok() {
                backfilled += 1;
            }
        }
        log::debug!("Added world tree layer {layer}, backfilled {backfilled} object(s).");
        self.layers.insert(layer, root);
        true
    }

    /// Registers a layer after asking each of `objects` again whether it
    /// belongs to it, then backfills.
    ///
    /// Only membership of `layer` is refreshed; the registered layers an
    /// object was indexed in stay as captured. Objects that are not tracked
    /// are ignored. Returns `false` if the layer was already registered.
    pub fn add_tree_layer_from<'o, O>(
        &mut self,
        layer: LayerId,
        objects: impl IntoIterator<Item = &'o O>,
    ) -> bool
    where
        O: SpatialObject + ?Sized + 'o,
    {
        if self.layers.contains_key(&layer) {
            return false;
        }
        for object in objects {
            if let Some(tracked) = self.objects.get_mut(&object.spatial_id()) {
                tracked.layers = if object.layer_mask().contains(layer) {
                    tracked.layers.with(layer)
                } else {
                    tracked.layers.without(layer)
                };
            }
        }
        self.add_tree_layer(layer)
    }

    /// Registered layers in ascending order.
    pub fn layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.keys().copied()
    }

    /// The root of `layer`, if registered.
    pub fn root_for_layer(&self, layer: LayerId) -> Option<&SpatialIndexRoot> {
        self.layers.get(&layer)
    }

    /// Number of tracked objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if no objects are tracked.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether `id` is tracked.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// The layers `id` was registered with, including [`LayerId::ALL`].
    pub fn layers_of(&self, id: ObjectId) -> Option<LayerMask> {
        self.objects.get(&id).map(|tracked| tracked.layers)
    }

    /// Starts tracking `object` and inserts it into every registered layer it
    /// belongs to.
    pub fn add_object<O: SpatialObject + ?Sized>(&mut self, object: &O) -> Result<(), SpatialError> {
        let id = object.spatial_id();
        if self.objects.contains_key(&id) {
            return Err(SpatialError::DuplicateObject(id));
        }

        let tracked = TrackedObject {
            bounds: object.spatial_bounds(),
            layers: object.layer_mask().with(LayerId::ALL),
        };
        for (&layer, root) in self.layers.iter_mut() {
            if tracked.layers.contains(layer) {
                root.add_object(id, tracked.bounds)?;
            }
        }
        self.objects.insert(id, tracked);
        Ok(())
    }

    /// Stops tracking `id` and removes it from every layer.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<(), SpatialError> {
        let tracked = self
            .objects
            .remove(&id)
            .ok_or(SpatialError::UnknownObject(id))?;
        for (&layer, root) in self.layers.iter_mut() {
            if tracked.layers.contains(layer) {
                root.remove_object(id)?;
            }
        }
        Ok(())
    }

    /// Re-indexes `object` with its current bounds in every layer it was
    /// registered with.
    pub fn update_object<O: SpatialObject + ?Sized>(&mut self, object: &O) -> Result<(), SpatialError> {
        let id = object.spatial_id();
        let tracked = self
            .objects
            .get_mut(&id)
            .ok_or(SpatialError::UnknownObject(id))?;
        tracked.bounds = object.spatial_bounds();

        let (bounds, layers) = (tracked.bounds, tracked.layers);
        for (&layer, root) in self.layers.iter_mut() {
            if layers.contains(layer) {
                root.update_object(id, bounds)?;
            }
        }
        Ok(())
    }

    /// Ids of objects in `layer` whose bounds intersect `area`.
    pub fn query(&self, layer: LayerId, area: &Rect) -> Result<Vec<ObjectId>, SpatialError> {
        let root = self
            .layers
            .get(&layer)
            .ok_or(SpatialError::UnknownLayer(layer))?;
        Ok(root.query(area))
    }

    /// Calls `f` for every entry in `layer` whose bounds intersect `area`.
    pub fn for_each_in(
        &self,
        layer: LayerId,
        area: &Rect,
        f: impl FnMut(&NodeEntry),
    ) -> Result<(), SpatialError> {
        let root = self
            .layers
            .get(&layer)
            .ok_or(SpatialError::UnknownLayer(layer))?;
        root.for_each_intersecting(area, f);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker {
        id: ObjectId,
        bounds: Rect,
        layers: LayerMask,
    }

    impl SpatialObject for Marker {
        fn spatial_id(&self) -> ObjectId {
            self.id
        }
        fn spatial_bounds(&self) -> Rect {
            self.bounds
        }
        fn layer_mask(&self) -> LayerMask {
            self.layers
        }
    }

    fn world() -> WorldTree {
        WorldTree::new(Vec2::new(256.0, 256.0), &SpatialConfig::default())
    }

    #[test]
    fn layer_zero_always_exists() {
        let tree = world();
        assert!(tree.root_for_layer(LayerId::ALL).is_some());
        assert!(!tree.clone().add_tree_layer(LayerId::ALL));
    }

    #[test]
    fn objects_fan_out_to_registered_layers() {
        let two = LayerId::new(2).unwrap();
        let mut tree = world();
        tree.add_tree_layer(two);

        let marker = Marker {
            id: ObjectId(1),
            bounds: Rect::new(10.0, 10.0, 4.0, 4.0),
            layers: LayerMask::from(two),
        };
        tree.add_object(&marker).unwrap();

        assert!(tree.root_for_layer(LayerId::ALL).unwrap().contains(ObjectId(1)));
        assert!(tree.root_for_layer(two).unwrap().contains(ObjectId(1)));

        tree.remove_object(ObjectId(1)).unwrap();
        assert!(tree.root_for_layer(LayerId::ALL).unwrap().is_empty());
        assert!(tree.root_for_layer(two).unwrap().is_empty());
        assert!(tree.is_empty());
    }

    #[test]
    fn update_uses_mask_captured_at_registration() {
        let one = LayerId::new(1).unwrap();
        let mut tree = world();
        tree.add_tree_layer(one);

        let mut marker = Marker {
            id: ObjectId(4),
            bounds: Rect::new(0.0, 0.0, 2.0, 2.0),
            layers: LayerMask::EMPTY,
        };
        tree.add_object(&marker).unwrap();

        marker.layers = LayerMask::from(one);
        marker.bounds = Rect::new(200.0, 200.0, 2.0, 2.0);
        tree.update_object(&marker).unwrap();

        assert!(!tree.root_for_layer(one).unwrap().contains(ObjectId(4)));
        assert_eq!(
            tree.query(LayerId::ALL, &Rect::new(199.0, 199.0, 4.0, 4.0)),
            Ok(vec![ObjectId(4)])
        );
    }

    #[test]
    fn layer_added_later_asks_objects_again() {
        let one = LayerId::new(1).unwrap();
        let mut tree = world();
        let mut joined = Marker {
            id: ObjectId(1),
            bounds: Rect::new(4.0, 4.0, 2.0, 2.0),
            layers: LayerMask::EMPTY,
        };
        let mut left = Marker {
            id: ObjectId(2),
            bounds: Rect::new(40.0, 40.0, 2.0, 2.0),
            layers: LayerMask::from(one),
        };
        tree.add_object(&joined).unwrap();
        tree.add_object(&left).unwrap();

        joined.layers = LayerMask::from(one);
        left.layers = LayerMask::EMPTY;
        assert!(tree.add_tree_layer_from(one, [&joined, &left]));

        let everything = Rect::new(0.0, 0.0, 256.0, 256.0);
        assert_eq!(tree.query(one, &everything), Ok(vec![ObjectId(1)]));
        assert!(tree.layers_of(ObjectId(1)).unwrap().contains(one));
        assert!(!tree.layers_of(ObjectId(2)).unwrap().contains(one));

        // Both stay removable from every layer they were indexed in.
        tree.remove_object(ObjectId(1)).unwrap();
        tree.remove_object(ObjectId(2)).unwrap();
        assert!(tree.root_for_layer(one).unwrap().is_empty());
    }

    #[test]
    fn queries_on_missing_layers_fail() {
        let tree = world();
        let nine = LayerId::new(9).unwrap();
        assert_eq!(
            tree.query(nine, &Rect::ZERO),
            Err(SpatialError::UnknownLayer(nine))
        );
    }
}
