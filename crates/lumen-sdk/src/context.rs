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

//! State shared by every part of a running engine.

use crate::engine::EngineStatus;
use lumen_core::platform::InputLatch;
use lumen_core::EngineConfig;

/// The engine's global state.
///
/// Exactly one context exists per [`Engine`](crate::Engine). It is created
/// with the engine and lives until the engine is dropped.
#[derive(Debug, Clone)]
pub struct EngineContext {
    pub(crate) config: EngineConfig,
    pub(crate) status: EngineStatus,
    pub(crate) tick_count: u64,
    pub(crate) frame_count: u64,
    pub(crate) total_time_ms: f64,
    pub(crate) delta_ms: f32,
    pub(crate) input: InputLatch,
    pub(crate) forced_vsync: bool,
    pub(crate) focused: bool,
    pub(crate) host_size: (u32, u32),
}

impl EngineContext {
    pub(crate) fn new(config: EngineConfig, delta_ms: f32) -> Self {
        let host_size = config.host_size;
        Self {
            config,
            status: EngineStatus::Initial,
            tick_count: 0,
            frame_count: 0,
            total_time_ms: 0.0,
            delta_ms,
            input: InputLatch::new(),
            forced_vsync: false,
            focused: true,
            host_size,
        }
    }

    /// The configuration the engine was created with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current lifecycle status.
    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Ticks run since the loop started.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Frames rendered since the loop started.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Simulated time in milliseconds: `tick_count` fixed steps.
    pub fn total_time_ms(&self) -> f64 {
        self.total_time_ms
    }

    /// The fixed tick duration in milliseconds.
    pub fn delta_ms(&self) -> f32 {
        self.delta_ms
    }

    /// Input latched for the most recent tick.
    pub fn input(&self) -> &InputLatch {
        &self.input
    }

    /// Whether calibration found vsync to be forced by the driver.
    pub fn forced_vsync(&self) -> bool {
        self.forced_vsync
    }

    /// Whether the host has focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Last known drawable size of the host.
    pub fn host_size(&self) -> (u32, u32) {
        self.host_size
    }
}
