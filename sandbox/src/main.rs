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


// Lumen Sandbox
// Runs a small arena headlessly for a few seconds of simulated time.

use anyhow::Result;
use lumen_sdk::prelude::*;
use std::any::Any;

const ARENA_SIZE: f32 = 1024.0;
const SIMULATED_FRAMES: u64 = 600;

fn hazards() -> LayerId {
    LayerId::new(1).unwrap_or(LayerId::ALL)
}

/// A box bouncing off the arena walls.
struct Drifter {
    bounds: Rect,
    velocity: Vec2,
    layers: LayerMask,
    lifetime_ticks: Option<u32>,
}

impl Drifter {
    fn new(position: Vec2, velocity: Vec2, layers: LayerMask) -> Self {
        Self {
            bounds: Rect::from_position_size(position, Vec2::new(16.0, 16.0)),
            velocity,
            layers,
            lifetime_ticks: None,
        }
    }
}

impl GameObject for Drifter {
    fn name(&self) -> &str {
        "drifter"
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn layers(&self) -> LayerMask {
        self.layers
    }

    fn update(&mut self, ctx: &mut ObjectContext<'_, '_>) -> Result<()> {
        let seconds = ctx.tick.delta_ms / 1000.0;
        let mut next = self.bounds.translated(self.velocity * seconds);
        if next.x < 0.0 || next.x + next.width > ARENA_SIZE {
            self.velocity.x = -self.velocity.x;
            next = self.bounds;
        }
        if next.y < 0.0 || next.y + next.height > ARENA_SIZE {
            self.velocity.y = -self.velocity.y;
            next = self.bounds;
        }
        if next != self.bounds {
            self.bounds = next;
            ctx.invalidate_bounds();
        }

        if let Some(ticks) = self.lifetime_ticks.as_mut() {
            *ticks = ticks.saturating_sub(1);
            if *ticks == 0 {
                ctx.remove_self();
            }
        }
        Ok(())
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let color = if self.layers.contains(hazards()) {
            LinearRgba::RED
        } else {
            LinearRgba::WHITE
        };
        renderer.render_rect(self.bounds, color);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Sits in the middle of the arena and periodically releases short-lived
/// hazards.
struct Emitter {
    bounds: Rect,
    every_ticks: u64,
}

impl GameObject for Emitter {
    fn name(&self) -> &str {
        "emitter"
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn update(&mut self, ctx: &mut ObjectContext<'_, '_>) -> Result<()> {
        let tick = ctx.tick.tick;
        if tick % self.every_ticks == 0 {
            let angle = tick as f32 * 0.7;
            let velocity = Vec2::new(angle.cos(), angle.sin()) * 180.0;
            let mut hazard = Drifter::new(self.bounds.center(), velocity, hazards().into());
            hazard.lifetime_ticks = Some(240);
            ctx.spawn(Box::new(hazard));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The demo scene: a map plus a periodic proximity report.
struct Arena {
    map: Map,
}

impl Arena {
    fn new(config: &SpatialConfig) -> Self {
        Self {
            map: Map::new("arena", Vec2::new(ARENA_SIZE, ARENA_SIZE), config),
        }
    }
}

impl Scene for Arena {
    fn name(&self) -> &str {
        "arena"
    }

    fn load(&mut self) -> Result<()> {
        self.map.add_tree_layer(hazards());

        for i in 0..48u16 {
            let f = f32::from(i);
            let position = Vec2::new((f * 97.0) % 960.0 + 16.0, (f * 61.0) % 960.0 + 16.0);
            let velocity = Vec2::new((f * 1.3).cos(), (f * 2.1).sin()) * 90.0;
            self.map
                .add_object(Box::new(Drifter::new(position, velocity, LayerMask::EMPTY)))?;
        }
        self.map.add_object(Box::new(Emitter {
            bounds: Rect::from_center(
                Vec2::new(ARENA_SIZE / 2.0, ARENA_SIZE / 2.0),
                Vec2::new(32.0, 32.0),
            ),
            every_ticks: 30,
        }))?;

        log::info!("Arena loaded with {} objects.", self.map.object_count());
        Ok(())
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        self.map.update(ctx)?;
        for event in self.map.events().drain() {
            log::trace!("{event:?}");
        }

        if ctx.tick % 60 == 0 {
            let center = Vec2::new(ARENA_SIZE / 2.0, ARENA_SIZE / 2.0);
            let near_center = Rect::from_center(center, Vec2::new(256.0, 256.0));
            let everything = self.map.query(LayerId::ALL, &near_center)?;
            let hazard_hits = self
                .map
                .objects_in::<Drifter>(hazards(), &near_center)?
                .filter(|(_, hazard)| hazard.lifetime_ticks.is_some())
                .count();
            log::info!(
                "t={:.1}s: {} objects, {} near the center, {} of them hazards.",
                ctx.total_time_ms / 1000.0,
                self.map.object_count(),
                everything.len(),
                hazard_hits
            );
            if let Some((id, emitter)) = self.map.object_by_name("emitter") {
                log::debug!("Emitter {id} at {:?}.", emitter.bounds());
            }
        }
        Ok(())
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) {
        let drawn = self.map.draw(renderer);
        log::trace!("Drew {drawn} objects.");
    }

    fn unload(&mut self) {
        self.map.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Stops the demo on Escape.
struct EscapeToQuit;

impl Plugin for EscapeToQuit {
    fn name(&self) -> &str {
        "escape-to-quit"
    }

    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        if ctx.input.is_key_pressed(Key::ESCAPE) {
            ctx.request_quit();
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_file(&path)?,
        None => EngineConfig {
            host_title: "Lumen Sandbox".to_string(),
            ..EngineConfig::default()
        },
    };

    let settings = HeadlessSettings {
        frames_before_close: Some(SIMULATED_FRAMES),
        ..HeadlessSettings::default()
    };
    let arena = Arena::new(&config.spatial);
    let mut engine = Engine::headless(config, settings)
        .with_plugin(EscapeToQuit)
        .with_scene(arena);

    engine.setup()?;
    engine.run()?;

    log::info!("Sandbox finished after {} ticks.", engine.context().tick_count());
    Ok(())
}
