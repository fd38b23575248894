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

use lumen_core::math::{LinearRgba, Rect, Vec2};
use lumen_core::platform::Host;
use lumen_core::renderer::{Camera2D, Renderer};
use std::cell::RefCell;
use std::rc::Rc;

/// Calls received by a [`RecordingRenderer`].
#[derive(Debug, Clone, Default)]
pub struct RenderLog {
    /// Frames started.
    pub frames_started: u64,
    /// Frames ended.
    pub frames_ended: u64,
    /// Rectangles drawn in the current or last frame.
    pub rects: Vec<(Rect, LinearRgba)>,
    /// Rectangles drawn since creation.
    pub total_rects: u64,
    /// Camera updates, one per tick.
    pub camera_updates: u64,
    /// Sizes received through [`Renderer::resize`].
    pub resizes: Vec<(u32, u32)>,
    /// Times settings were applied to the host.
    pub settings_applied: u32,
}

/// A [`Renderer`] that draws nothing and records every call.
pub struct RecordingRenderer {
    camera: Camera2D,
    vsync: bool,
    forced_vsync: bool,
    log: Rc<RefCell<RenderLog>>,
}

impl RecordingRenderer {
    /// Creates a renderer with a camera looking at `(0, 0)..(width, height)`.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_log(width, height, Rc::default())
    }

    /// Same as [`RecordingRenderer::new`] but records into `log`.
    pub fn with_log(width: u32, height: u32, log: Rc<RefCell<RenderLog>>) -> Self {
        let viewport = Vec2::new(width as f32, height as f32);
        Self {
            camera: Camera2D::new(viewport * 0.5, viewport),
            vsync: true,
            forced_vsync: false,
            log,
        }
    }

    /// Sets whether [`Renderer::apply_settings`] enables vsync on the host.
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// The shared call record.
    pub fn log_handle(&self) -> Rc<RefCell<RenderLog>> {
        self.log.clone()
    }
}

impl Renderer for RecordingRenderer {
    fn start_frame(&mut self) {
        let mut log = self.log.borrow_mut();
        log.frames_started += 1;
        log.rects.clear();
    }

    fn end_frame(&mut self) {
        self.log.borrow_mut().frames_ended += 1;
    }

    fn update_camera(&mut self, delta_ms: f32) {
        self.camera.update(delta_ms);
        self.log.borrow_mut().camera_updates += 1;
    }

    fn camera(&self) -> &Camera2D {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    fn render_rect(&mut self, rect: Rect, color: LinearRgba) {
        let mut log = self.log.borrow_mut();
        log.rects.push((rect, color));
        log.total_rects += 1;
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.viewport = Vec2::new(width as f32, height as f32);
        self.log.borrow_mut().resizes.push((width, height));
    }

    fn set_forced_vsync(&mut self, forced: bool) {
        self.forced_vsync = forced;
    }

    fn forced_vsync(&self) -> bool {
        self.forced_vsync
    }

    fn apply_settings(&mut self, host: &mut dyn Host) {
        host.set_swap_interval(u32::from(self.vsync));
        self.log.borrow_mut().settings_applied += 1;
        log::debug!(
            "Renderer settings applied: vsync {}, forced by driver {}.",
            self.vsync,
            self.forced_vsync
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_calls_are_recorded() {
        let mut renderer = RecordingRenderer::new(64, 32);
        let log = renderer.log_handle();

        renderer.start_frame();
        renderer.render_rect(Rect::new(0.0, 0.0, 1.0, 1.0), LinearRgba::WHITE);
        renderer.end_frame();
        renderer.start_frame();

        let log = log.borrow();
        assert_eq!(log.frames_started, 2);
        assert_eq!(log.frames_ended, 1);
        assert!(log.rects.is_empty());
        assert_eq!(log.total_rects, 1);
    }

    #[test]
    fn default_camera_covers_the_viewport() {
        let renderer = RecordingRenderer::new(64, 32);
        assert_eq!(renderer.camera().view_bounds(), Rect::new(0.0, 0.0, 64.0, 32.0));
    }

    #[test]
    fn resize_updates_the_camera_viewport() {
        let mut renderer = RecordingRenderer::new(64, 32);
        renderer.resize(128, 64);
        assert_eq!(renderer.camera().viewport, Vec2::new(128.0, 64.0));
        assert_eq!(renderer.log_handle().borrow().resizes, vec![(128, 64)]);
    }
}
