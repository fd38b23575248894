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

use crate::spatial::{LayerMask, ObjectId};
use lumen_core::math::Rect;
use lumen_core::renderer::Renderer;
use lumen_core::TickContext;
use std::any::Any;

/// An object living in a [`Map`](super::Map).
///
/// The map calls [`GameObject::init`] once the object has an id,
/// [`GameObject::update`] once per tick, [`GameObject::draw`] when the
/// object is visible, and [`GameObject::destroy`] after it was removed.
pub trait GameObject: Any {
    /// A human readable name used in logs and errors.
    fn name(&self) -> &str {
        "object"
    }

    /// World-space bounds used for spatial indexing and culling.
    fn bounds(&self) -> Rect;

    /// Extra layers the object belongs to. Read once, when the object is added.
    fn layers(&self) -> LayerMask {
        LayerMask::EMPTY
    }

    /// Called when the object is added to a map.
    fn init(&mut self, _id: ObjectId) {}

    /// Advances the object by one tick.
    fn update(&mut self, _ctx: &mut ObjectContext<'_, '_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Issues draw calls for the object.
    fn draw(&self, _renderer: &mut dyn Renderer) {}

    /// Called once the object has been taken out of the map.
    fn destroy(&mut self) {}

    /// Returns a reference to the underlying object as `Any`.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to the underlying object as `Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// What a [`GameObject`] may ask of its map while it updates.
///
/// Requests are applied by the map after the update pass: bound changes and
/// removals go through the deferred change queues, spawned objects are added
/// once every object has updated.
pub struct ObjectContext<'a, 'b> {
    id: ObjectId,
    /// The tick being run.
    pub tick: &'a mut TickContext<'b>,
    invalidate_bounds: bool,
    remove: bool,
    spawned: Vec<Box<dyn GameObject>>,
}

impl<'a, 'b> ObjectContext<'a, 'b> {
    pub(crate) fn new(id: ObjectId, tick: &'a mut TickContext<'b>) -> Self {
        Self {
            id,
            tick,
            invalidate_bounds: false,
            remove: false,
            spawned: Vec::new(),
        }
    }

    /// Id of the object being updated.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Marks the object's bounds as changed so the world tree re-indexes it.
    pub fn invalidate_bounds(&mut self) {
        self.invalidate_bounds = true;
    }

    /// Asks the map to remove this object.
    pub fn remove_self(&mut self) {
        self.remove = true;
    }

    /// Queues a new object to be added after the update pass.
    pub fn spawn(&mut self, object: Box<dyn GameObject>) {
        self.spawned.push(object);
    }

    pub(crate) fn into_requests(self) -> (bool, bool, Vec<Box<dyn GameObject>>) {
        (self.invalidate_bounds, self.remove, self.spawned)
    }
}
