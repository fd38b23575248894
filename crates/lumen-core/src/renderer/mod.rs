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

//! The renderer contract consumed by the engine loop and by drawable objects.

mod camera;

pub use self::camera::Camera2D;

use crate::math::{LinearRgba, Rect};
use crate::platform::Host;

/// A trait for the 2D renderer collaborator.
///
/// The loop calls [`Renderer::start_frame`], the scene draw and
/// [`Renderer::end_frame`] exactly once per rendered frame, in that order,
/// followed by a buffer swap on the host.
pub trait Renderer {
    /// Begins a new frame.
    fn start_frame(&mut self);

    /// Finishes the current frame and flushes pending draw calls.
    fn end_frame(&mut self);

    /// Advances the camera by one fixed tick of `delta_ms` milliseconds.
    fn update_camera(&mut self, delta_ms: f32);

    /// The active camera.
    fn camera(&self) -> &Camera2D;

    /// Mutable access to the active camera.
    fn camera_mut(&mut self) -> &mut Camera2D;

    /// Draws a filled rectangle in world space.
    fn render_rect(&mut self, rect: Rect, color: LinearRgba);

    /// Notifies the renderer that the drawable area changed size.
    fn resize(&mut self, width: u32, height: u32);

    /// Records whether the driver ignores swap interval requests.
    fn set_forced_vsync(&mut self, forced: bool);

    /// Whether vsync was found to be forced by the driver.
    fn forced_vsync(&self) -> bool;

    /// Applies presentation settings to the host, such as the swap interval.
    fn apply_settings(&mut self, host: &mut dyn Host);
}
