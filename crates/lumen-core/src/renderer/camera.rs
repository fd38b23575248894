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

use crate::math::{Rect, Vec2};

/// A 2D camera looking at the world with a y-down convention.
///
/// `position` is the world point shown at the center of the viewport. When a
/// follow target is set, [`Camera2D::update`] moves the camera toward it at
/// `follow_speed` world units per millisecond; a speed of zero snaps.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2D {
    /// World point at the center of the view.
    pub position: Vec2,
    /// Size of the viewport in pixels.
    pub viewport: Vec2,
    /// Scale factor; values above one zoom in.
    pub zoom: f32,
    /// Speed used when following a target, zero to snap.
    pub follow_speed: f32,
    target: Option<Vec2>,
}

impl Camera2D {
    /// Creates a camera centered on `position`.
    pub fn new(position: Vec2, viewport: Vec2) -> Self {
        Self {
            position,
            viewport,
            zoom: 1.0,
            follow_speed: 0.0,
            target: None,
        }
    }

    /// Sets or clears the point the camera follows.
    pub fn set_target(&mut self, target: Option<Vec2>) {
        self.target = target;
    }

    /// The point being followed, if any.
    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    /// Moves the camera toward its target for one tick.
    pub fn update(&mut self, delta_ms: f32) {
        let Some(target) = self.target else {
            return;
        };
        if self.follow_speed <= 0.0 {
            self.position = target;
            return;
        }
        let offset = target - self.position;
        let distance = offset.length();
        let step = self.follow_speed * delta_ms;
        if distance <= step {
            self.position = target;
        } else {
            self.position = self.position + offset.normalize() * step;
        }
    }

    /// The world-space rectangle visible through this camera.
    pub fn view_bounds(&self) -> Rect {
        let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        Rect::from_center(self.position, self.viewport / zoom)
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::new(640.0, 360.0))
    }
}
