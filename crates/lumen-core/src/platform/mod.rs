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

//! Abstractions over the platform layer: the host window and its input.
//!
//! A [`PlatformProvider`] is the single factory the loop uses during setup.
//! It creates the [`Host`] first and then the [`Renderer`] bound to it, which
//! keeps the loop independent from any concrete windowing backend.

pub mod host;
pub mod input;

pub use self::host::Host;
pub use self::input::{InputLatch, InputState, Key};

use crate::config::EngineConfig;
use crate::renderer::Renderer;

/// Events reported by a host while it pumps its message queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformEvent {
    /// The drawable area changed size.
    Resized {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// The host gained (`true`) or lost (`false`) focus.
    FocusChanged(bool),
    /// The user asked the host to close.
    CloseRequested,
}

/// Creates the platform objects the engine depends on.
pub trait PlatformProvider {
    /// Creates and opens the host.
    ///
    /// Events produced by the host afterwards are sent through `events`.
    fn create_host(
        &mut self,
        config: &EngineConfig,
        events: flume::Sender<PlatformEvent>,
    ) -> anyhow::Result<Box<dyn Host>>;

    /// Creates the renderer for an already created host.
    fn create_renderer(
        &mut self,
        host: &mut dyn Host,
        config: &EngineConfig,
    ) -> anyhow::Result<Box<dyn Renderer>>;
}
