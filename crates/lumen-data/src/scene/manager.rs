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

//! # Scene Manager
//!
//! Holds the active [`Scene`] and swaps it for a queued one between ticks.

use anyhow::Context;
use lumen_core::renderer::Renderer;
use lumen_core::TickContext;
use std::any::Any;

/// A self-contained piece of game state driven by the [`SceneManager`].
pub trait Scene: Any {
    /// A human readable name used in logs.
    fn name(&self) -> &str;

    /// Called when the scene becomes active.
    fn load(&mut self) -> anyhow::Result<()>;

    /// Called once per fixed tick while active.
    fn update(&mut self, ctx: &mut TickContext<'_>) -> anyhow::Result<()>;

    /// Called once per rendered frame while active.
    fn draw(&mut self, renderer: &mut dyn Renderer);

    /// Called when the scene is replaced or the engine shuts down.
    fn unload(&mut self) {}

    /// Returns a reference to the underlying scene as `Any`.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to the underlying scene as `Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Owns the active scene and applies scene changes at tick boundaries.
///
/// [`SceneManager::set_scene`] only queues the new scene. The swap happens at
/// the start of the next [`SceneManager::update`]: the old scene is unloaded,
/// the new one loaded, then updated in that same tick.
#[derive(Default)]
pub struct SceneManager {
    current: Option<Box<dyn Scene>>,
    pending: Option<Box<dyn Scene>>,
    swaps: u64,
}

impl SceneManager {
    /// Creates a manager without an active scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `scene` to become active on the next update.
    ///
    /// A scene queued earlier and not yet applied is dropped.
    pub fn set_scene(&mut self, scene: Box<dyn Scene>) {
        if let Some(previous) = self.pending.replace(scene) {
            log::debug!("Queued scene '{}' replaced before loading.", previous.name());
        }
    }

    /// The active scene, if any.
    pub fn current(&self) -> Option<&dyn Scene> {
        self.current.as_deref()
    }

    /// The active scene downcast to `T`.
    pub fn current_as<T: Scene>(&self) -> Option<&T> {
        self.current.as_ref()?.as_any().downcast_ref::<T>()
    }

    /// The active scene downcast to `T`, mutably.
    pub fn current_as_mut<T: Scene>(&mut self) -> Option<&mut T> {
        self.current.as_mut()?.as_any_mut().downcast_mut::<T>()
    }

    /// Whether a scene is waiting to be swapped in.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of scene swaps applied so far.
    pub fn swap_count(&self) -> u64 {
        self.swaps
    }

    /// Applies a queued swap, then updates the active scene.
    pub fn update(&mut self, ctx: &mut TickContext<'_>) -> anyhow::Result<()> {
        self.apply_pending()?;
        match self.current.as_mut() {
            Some(scene) => scene
                .update(ctx)
                .with_context(|| format!("scene '{}' failed to update", scene.name())),
            None => Ok(()),
        }
    }

    /// Draws the active scene.
    pub fn draw(&mut self, renderer: &mut dyn Renderer) {
        if let Some(scene) = self.current.as_mut() {
            scene.draw(renderer);
        }
    }

    /// Unloads the active scene and drops any queued one.
    pub fn unload(&mut self) {
        self.pending = None;
        if let Some(mut scene) = self.current.take() {
            log::debug!("Unloading scene '{}'.", scene.name());
            scene.unload();
        }
    }

    fn apply_pending(&mut self) -> anyhow::Result<()> {
        let Some(mut next) = self.pending.take() else {
            return Ok(());
        };

        if let Some(mut old) = self.current.take() {
            log::debug!("Unloading scene '{}'.", old.name());
            old.unload();
        }

        log::info!("Loading scene '{}'...", next.name());
        next.load()
            .with_context(|| format!("scene '{}' failed to load", next.name()))?;
        self.current = Some(next);
        self.swaps += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::platform::InputLatch;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    struct ScriptedScene {
        name: &'static str,
        journal: Journal,
        fail_load: bool,
    }

    impl ScriptedScene {
        fn boxed(name: &'static str, journal: &Journal) -> Box<dyn Scene> {
            Box::new(Self {
                name,
                journal: journal.clone(),
                fail_load: false,
            })
        }

        fn log(&self, what: &str) {
            self.journal.borrow_mut().push(format!("{what} {}", self.name));
        }
    }

    impl Scene for ScriptedScene {
        fn name(&self) -> &str {
            self.name
        }
        fn load(&mut self) -> anyhow::Result<()> {
            self.log("load");
            if self.fail_load {
                anyhow::bail!("missing assets");
            }
            Ok(())
        }
        fn update(&mut self, _ctx: &mut TickContext<'_>) -> anyhow::Result<()> {
            self.log("update");
            Ok(())
        }
        fn draw(&mut self, _renderer: &mut dyn Renderer) {}
        fn unload(&mut self) {
            self.log("unload");
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn swap_is_deferred_to_next_update() {
        // ARRANGE
        let journal = Journal::default();
        let input = InputLatch::new();
        let mut manager = SceneManager::new();
        manager.set_scene(ScriptedScene::boxed("a", &journal));
        assert!(manager.current().is_none());

        // ACT
        let mut ctx = TickContext::new(16.0, 1, 16.0, &input);
        manager.update(&mut ctx).unwrap();
        manager.set_scene(ScriptedScene::boxed("b", &journal));
        assert_eq!(manager.current().unwrap().name(), "a");
        manager.update(&mut ctx).unwrap();

        // ASSERT
        assert_eq!(
            *journal.borrow(),
            vec!["load a", "update a", "unload a", "load b", "update b"]
        );
        assert_eq!(manager.swap_count(), 2);
        assert!(manager.current_as::<ScriptedScene>().is_some());
    }

    #[test]
    fn failed_load_is_reported() {
        let journal = Journal::default();
        let input = InputLatch::new();
        let mut manager = SceneManager::new();
        manager.set_scene(Box::new(ScriptedScene {
            name: "broken",
            journal: journal.clone(),
            fail_load: true,
        }));

        let mut ctx = TickContext::new(16.0, 1, 16.0, &input);
        let err = manager.update(&mut ctx).unwrap_err();
        assert!(err.to_string().contains("broken"));
        assert!(manager.current().is_none());
    }

    #[test]
    fn unload_drops_current_and_pending() {
        let journal = Journal::default();
        let input = InputLatch::new();
        let mut manager = SceneManager::new();
        manager.set_scene(ScriptedScene::boxed("a", &journal));
        let mut ctx = TickContext::new(16.0, 1, 16.0, &input);
        manager.update(&mut ctx).unwrap();
        manager.set_scene(ScriptedScene::boxed("b", &journal));

        manager.unload();

        assert!(manager.current().is_none());
        assert!(!manager.has_pending());
        assert_eq!(journal.borrow().last().map(String::as_str), Some("unload a"));
    }
}
