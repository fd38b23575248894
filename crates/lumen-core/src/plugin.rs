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

//! Engine extensions with a setup, per-tick and shutdown hook.

use crate::context::TickContext;

/// A unit of engine functionality installed before setup.
///
/// Plugins are initialized in installation order once the platform, the
/// renderer and the scene manager exist, updated once per tick after the
/// scene, and disposed in installation order when the engine quits.
pub trait Plugin {
    /// A short, human readable name used in logs and errors.
    fn name(&self) -> &str;

    /// Called once during setup. An error aborts setup.
    fn initialize(&mut self) -> anyhow::Result<()>;

    /// Called once per fixed tick, after the scene update.
    fn update(&mut self, _ctx: &mut TickContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once at shutdown.
    fn dispose(&mut self) {}
}
