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

//! # Map
//!
//! Owns the game objects of a world and keeps the [`WorldTree`] in sync with
//! them.
//!
//! Adding an object indexes it immediately. Removing an object or changing
//! its bounds is deferred: both are queued and applied at the start of the
//! next [`Map::update`], removals first. This keeps the tree stable while
//! objects iterate or query it during a tick.

use super::object::{GameObject, ObjectContext};
use crate::spatial::{LayerId, LayerMask, ObjectId, SpatialError, SpatialObject, WorldTree};
use anyhow::Context;
use lumen_core::event::EventBus;
use lumen_core::math::{Rect, Vec2};
use lumen_core::renderer::Renderer;
use lumen_core::{SpatialConfig, TickContext};
use std::collections::BTreeMap;

/// Notifications published by a [`Map`] as objects come and go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    /// An object was added and indexed.
    ObjectAdded(ObjectId),
    /// An object was removed and destroyed.
    ObjectRemoved(ObjectId),
}

/// Counts of deferred changes applied by [`Map::process_object_changes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectChanges {
    /// Objects removed from the map.
    pub removed: usize,
    /// Objects re-indexed in the world tree.
    pub updated: usize,
}

struct MapEntry {
    object: Box<dyn GameObject>,
    bounds_dirty: bool,
    pending_removal: bool,
}

struct Indexed<'a> {
    id: ObjectId,
    object: &'a dyn GameObject,
}

impl SpatialObject for Indexed<'_> {
    fn spatial_id(&self) -> ObjectId {
        self.id
    }

    fn spatial_bounds(&self) -> Rect {
        self.object.bounds()
    }

    fn layer_mask(&self) -> LayerMask {
        self.object.layers()
    }
}

/// A world of game objects backed by a layered spatial index.
pub struct Map {
    name: String,
    size: Vec2,
    next_id: u64,
    objects: BTreeMap<ObjectId, MapEntry>,
    world_tree: WorldTree,
    pending_removal: Vec<ObjectId>,
    pending_update: Vec<ObjectId>,
    events: EventBus<MapEvent>,
}

impl Map {
    /// Creates an empty map of the given size.
    pub fn new(name: impl Into<String>, size: Vec2, config: &SpatialConfig) -> Self {
        Self {
            name: name.into(),
            size,
            next_id: 1,
            objects: BTreeMap::new(),
            world_tree: WorldTree::new(size, config),
            pending_removal: Vec::new(),
            pending_update: Vec::new(),
            events: EventBus::new(),
        }
    }

    /// The map's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The map's size in world units.
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// The spatial index of the map.
    pub fn world_tree(&self) -> &WorldTree {
        &self.world_tree
    }

    /// The bus add and remove notifications are published on.
    pub fn events(&self) -> &EventBus<MapEvent> {
        &self.events
    }

    /// Registers a spatial layer, indexing existing objects that belong to it.
    ///
    /// Every object is asked for its layers again, so one whose
    /// [`GameObject::layers`] changed since it was added is placed according
    /// to its current answer.
    pub fn add_tree_layer(&mut self, layer: LayerId) -> bool {
        let indexed: Vec<Indexed<'_>> = self
            .objects
            .iter()
            .map(|(&id, entry)| Indexed {
                id,
                object: entry.object.as_ref(),
            })
            .collect();
        self.world_tree.add_tree_layer_from(layer, &indexed)
    }

    /// Number of objects in the map, including those queued for removal.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Ids of all objects in the order they were added.
    pub fn object_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    /// Returns the object with the given id.
    pub fn get(&self, id: ObjectId) -> Option<&dyn GameObject> {
        self.objects.get(&id).map(|entry| entry.object.as_ref())
    }

    /// Returns the object with the given id, downcast to `T`.
    pub fn object<T: GameObject>(&self, id: ObjectId) -> Option<&T> {
        self.objects
            .get(&id)
            .and_then(|entry| entry.object.as_any().downcast_ref::<T>())
    }

    /// Returns the object with the given id mutably, downcast to `T`.
    ///
    /// Call [`Map::invalidate_object_bounds`] after moving it.
    pub fn object_mut<T: GameObject>(&mut self, id: ObjectId) -> Option<&mut T> {
        self.objects
            .get_mut(&id)
            .and_then(|entry| entry.object.as_any_mut().downcast_mut::<T>())
    }

    /// Adds an object, assigns it a fresh id and indexes it right away.
    pub fn add_object(&mut self, mut object: Box<dyn GameObject>) -> Result<ObjectId, SpatialError> {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        object.init(id);
        self.world_tree.add_object(&Indexed {
            id,
            object: object.as_ref(),
        })?;
        log::trace!("Map '{}' added {} {id}.", self.name, object.name());
        self.objects.insert(
            id,
            MapEntry {
                object,
                bounds_dirty: false,
                pending_removal: false,
            },
        );
        self.events.publish(MapEvent::ObjectAdded(id));
        Ok(id)
    }

    /// Queues an object for removal at the start of the next update.
    ///
    /// Returns `false` if the object is unknown or already queued.
    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        match self.objects.get_mut(&id) {
            Some(entry) if !entry.pending_removal => {
                entry.pending_removal = true;
                self.pending_removal.push(id);
                true
            }
            _ => false,
        }
    }

    /// Queues an object to be re-indexed with its current bounds.
    ///
    /// Repeated calls before the queue is processed are collapsed.
    pub fn invalidate_object_bounds(&mut self, id: ObjectId) -> bool {
        match self.objects.get_mut(&id) {
            Some(entry) if !entry.bounds_dirty && !entry.pending_removal => {
                entry.bounds_dirty = true;
                self.pending_update.push(id);
                true
            }
            _ => false,
        }
    }

    /// Whether `id` is queued for removal.
    pub fn is_pending_removal(&self, id: ObjectId) -> bool {
        self.objects
            .get(&id)
            .is_some_and(|entry| entry.pending_removal)
    }

    /// Applies queued removals, then queued bound updates.
    ///
    /// Updates for objects removed in the same batch are skipped.
    pub fn process_object_changes(&mut self) -> ObjectChanges {
        let mut changes = ObjectChanges::default();

        for id in std::mem::take(&mut self.pending_removal) {
            let Some(mut entry) = self.objects.remove(&id) else {
                continue;
            };
            if let Err(e) = self.world_tree.remove_object(id) {
                log::error!("Map '{}' failed to unindex {id}: {e}", self.name);
            }
            entry.object.destroy();
            self.events.publish(MapEvent::ObjectRemoved(id));
            changes.removed += 1;
        }

        for id in std::mem::take(&mut self.pending_update) {
            let Some(entry) = self.objects.get_mut(&id) else {
                continue;
            };
            entry.bounds_dirty = false;
            let indexed = Indexed {
                id,
                object: entry.object.as_ref(),
            };
            if let Err(e) = self.world_tree.update_object(&indexed) {
                log::error!("Map '{}' failed to reindex {id}: {e}", self.name);
                continue;
            }
            changes.updated += 1;
        }

        changes
    }

    /// Runs one tick: applies deferred changes, then updates every object
    /// in the order they were added.
    ///
    /// Objects queued for removal are not updated. Objects spawned during
    /// the pass are added after it. The first object error aborts the pass.
    pub fn update(&mut self, tick: &mut TickContext<'_>) -> anyhow::Result<()> {
        self.process_object_changes();

        let ids: Vec<ObjectId> = self.objects.keys().copied().collect();
        let mut spawned = Vec::new();
        for id in ids {
            let Some(entry) = self.objects.get_mut(&id) else {
                continue;
            };
            if entry.pending_removal {
                continue;
            }

            let mut ctx = ObjectContext::new(id, tick);
            entry
                .object
                .update(&mut ctx)
                .with_context(|| format!("{} {id} failed to update", entry.object.name()))?;

            let (invalidate, remove, mut new_objects) = ctx.into_requests();
            spawned.append(&mut new_objects);
            if invalidate {
                self.invalidate_object_bounds(id);
            }
            if remove {
                self.remove_object(id);
            }
        }

        for object in spawned {
            self.add_object(object)?;
        }
        Ok(())
    }

    /// Ids of objects in `layer` whose indexed bounds intersect `area`,
    /// sorted by id.
    pub fn query(&self, layer: LayerId, area: &Rect) -> Result<Vec<ObjectId>, SpatialError> {
        let mut ids = self.world_tree.query(layer, area)?;
        ids.sort_unstable();
        Ok(ids)
    }

    /// Objects of type `T` in `layer` whose indexed bounds intersect `area`,
    /// in id order. Objects of other types are skipped.
    pub fn objects_in<T: GameObject>(
        &self,
        layer: LayerId,
        area: &Rect,
    ) -> Result<impl Iterator<Item = (ObjectId, &T)> + '_, SpatialError> {
        let mut ids = Vec::new();
        self.world_tree
            .for_each_in(layer, area, |entry| ids.push(entry.id))?;
        ids.sort_unstable();
        Ok(ids.into_iter().filter_map(move |id| {
            self.objects
                .get(&id)
                .and_then(|entry| entry.object.as_any().downcast_ref::<T>())
                .map(|object| (id, object))
        }))
    }

    /// The first object, in id order, whose [`GameObject::name`] is `name`.
    pub fn object_by_name(&self, name: &str) -> Option<(ObjectId, &dyn GameObject)> {
        self.objects
            .iter()
            .find(|(_, entry)| entry.object.name() == name)
            .map(|(&id, entry)| (id, entry.object.as_ref()))
    }

    /// Draws the objects visible through the renderer's camera.
    ///
    /// Returns the number of objects drawn.
    pub fn draw(&self, renderer: &mut dyn Renderer) -> usize {
        let view = renderer.camera().view_bounds();
        let visible = match self.query(LayerId::ALL, &view) {
            Ok(ids) => ids,
            Err(e) => {
                log::error!("Map '{}' could not cull objects: {e}", self.name);
                return 0;
            }
        };

        let mut drawn = 0;
        for id in visible {
            if let Some(entry) = self.objects.get(&id) {
                entry.object.draw(renderer);
                drawn += 1;
            }
        }
        drawn
    }

    /// Removes and destroys every object immediately.
    pub fn clear(&mut self) {
        self.pending_removal.clear();
        self.pending_update.clear();
        for (id, mut entry) in std::mem::take(&mut self.objects) {
            if let Err(e) = self.world_tree.remove_object(id) {
                log::error!("Map '{}' failed to unindex {id}: {e}", self.name);
            }
            entry.object.destroy();
            self.events.publish(MapEvent::ObjectRemoved(id));
        }
        log::debug!("Map '{}' cleared.", self.name);
    }
}
