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

use super::manager::Scene;
use super::map::{Map, MapEvent};
use lumen_core::renderer::Renderer;
use lumen_core::TickContext;
use std::any::Any;

type LoadHook = Box<dyn FnMut(&mut Map) -> anyhow::Result<()>>;

/// A [`Scene`] that owns a single [`Map`].
///
/// Map events are drained after every update; the batch from the last tick
/// is available through [`MapScene::recent_events`].
pub struct MapScene {
    map: Map,
    on_load: Option<LoadHook>,
    recent_events: Vec<MapEvent>,
}

impl MapScene {
    /// Wraps `map` in a scene.
    pub fn new(map: Map) -> Self {
        Self {
            map,
            on_load: None,
            recent_events: Vec::new(),
        }
    }

    /// Sets a hook run against the map when the scene loads, typically to
    /// register layers and spawn the initial objects.
    pub fn with_load_hook(
        mut self,
        hook: impl FnMut(&mut Map) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.on_load = Some(Box::new(hook));
        self
    }

    /// The owned map.
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// The owned map, mutably.
    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    /// Events published by the map during the last update.
    pub fn recent_events(&self) -> &[MapEvent] {
        &self.recent_events
    }
}

impl Scene for MapScene {
    fn name(&self) -> &str {
        self.map.name()
    }

    fn load(&mut self) -> anyhow::Result<()> {
        if let Some(hook) = self.on_load.as_mut() {
            hook(&mut self.map)?;
        }
        // Adds made by the hook are reported with the first update.
        log::info!(
            "Map '{}' loaded with {} object(s).",
            self.map.name(),
            self.map.object_count()
        );
        Ok(())
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> anyhow::Result<()> {
        let result = self.map.update(ctx);
        self.recent_events = self.map.events().drain();
        result
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) {
        self.map.draw(renderer);
    }

    fn unload(&mut self) {
        self.map.clear();
        self.map.events().drain();
        self.recent_events.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
