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

//! The public-facing Software Development Kit (SDK) for the Lumen engine.
//!
//! [`Engine`] owns every subsystem and drives them through the fixed-step
//! loop: platform events, zero or more simulation ticks timed by
//! [`EngineClock`], then exactly one rendered frame.

#![warn(missing_docs)]

pub mod clock;
pub mod context;
pub mod engine;
pub mod vsync;

pub use clock::{EngineClock, FrameTicks};
pub use context::EngineContext;
pub use engine::{Engine, EngineStatus};
pub use vsync::{VSyncDetector, VSyncReport};

/// Commonly used types for building applications on the engine.
pub mod prelude {
    pub use crate::{Engine, EngineStatus};
    pub use lumen_core::math::{LinearRgba, Rect, Vec2};
    pub use lumen_core::platform::{InputLatch, Key};
    pub use lumen_core::plugin::Plugin;
    pub use lumen_core::renderer::{Camera2D, Renderer};
    pub use lumen_core::{EngineConfig, EngineError, SpatialConfig, TickContext};
    pub use lumen_data::{
        GameObject, LayerId, LayerMask, Map, MapScene, ObjectContext, ObjectId, Scene,
        SceneManager,
    };
    pub use lumen_infra::headless::{HeadlessPlatform, HeadlessSettings};
}
