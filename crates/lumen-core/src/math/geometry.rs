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

//! Provides the axis-aligned rectangle used for object bounds, quadtree
//! nodes and camera views.

use super::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle defined by its top-left corner and its size.
///
/// All containment and intersection tests are **inclusive**: a rectangle
/// touching another one on an edge is considered to intersect it, and a
/// rectangle sharing an edge with its container is still contained.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge (y grows downwards).
    pub y: f32,
    /// Horizontal extent. Expected to be non-negative.
    pub width: f32,
    /// Vertical extent. Expected to be non-negative.
    pub height: f32,
}

impl Rect {
    /// A zero-sized rectangle at the origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a rectangle from its top-left corner and size.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from a position and a size vector.
    #[inline]
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    /// Creates a rectangle of the given size centered on `center`.
    #[inline]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x * 0.5,
            center.y - size.y * 0.5,
            size.x,
            size.y,
        )
    }

    /// The right edge (`x + width`).
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// The bottom edge (`y + height`).
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// The top-left corner.
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// The size as a vector.
    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// The center point.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Returns a copy moved by `offset`.
    #[inline]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Checks whether `other` lies fully inside this rectangle, edges included.
    #[inline]
    pub fn contains_inclusive(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Checks whether the two rectangles overlap. Touching edges count as overlap.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    /// Splits the rectangle into four equally sized quadrants.
    ///
    /// The order is top-left, top-right, bottom-left, bottom-right.
    pub fn quadrants(&self) -> [Rect; 4] {
        let half_w = self.width * 0.5;
        let half_h = self.height * 0.5;
        let mid_x = self.x + half_w;
        let mid_y = self.y + half_h;
        [
            Rect::new(self.x, self.y, half_w, half_h),
            Rect::new(mid_x, self.y, self.right() - mid_x, half_h),
            Rect::new(self.x, mid_y, half_w, self.bottom() - mid_y),
            Rect::new(mid_x, mid_y, self.right() - mid_x, self.bottom() - mid_y),
        ]
    }
}
