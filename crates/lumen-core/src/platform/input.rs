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

//! Keyboard and mouse state as seen by the simulation.

use crate::math::Vec2;
use ahash::AHashSet;

/// A platform independent key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub u32);

impl Key {
    /// The escape key.
    pub const ESCAPE: Key = Key(27);
    /// The space bar.
    pub const SPACE: Key = Key(32);
}

/// A snapshot of the input devices.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Keys held down.
    pub keys_down: AHashSet<Key>,
    /// Cursor position in host pixels.
    pub mouse_position: Vec2,
}

impl InputState {
    /// Whether `key` is held in this snapshot.
    pub fn is_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

/// Holds the input state for the current tick and the tick before it.
///
/// The platform may deliver input at any point during a frame, so the loop
/// latches it once per tick. Edge queries compare the two latched
/// snapshots, which means a key press is observed by exactly one tick even
/// when several ticks run in the same frame.
#[derive(Debug, Clone, Default)]
pub struct InputLatch {
    current: InputState,
    previous: InputState,
}

impl InputLatch {
    /// Creates a latch with no keys held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shifts the current snapshot to previous and stores `state` as current.
    pub fn latch(&mut self, state: &InputState) {
        std::mem::swap(&mut self.previous, &mut self.current);
        self.current.clone_from(state);
    }

    /// The snapshot latched for this tick.
    pub fn current(&self) -> &InputState {
        &self.current
    }

    /// Whether `key` is held this tick.
    pub fn is_key_down(&self, key: Key) -> bool {
        self.current.is_down(key)
    }

    /// Whether `key` went down between the previous tick and this one.
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.current.is_down(key) && !self.previous.is_down(key)
    }

    /// Whether `key` was released between the previous tick and this one.
    pub fn is_key_released(&self, key: Key) -> bool {
        !self.current.is_down(key) && self.previous.is_down(key)
    }

    /// Cursor position latched for this tick.
    pub fn mouse_position(&self) -> Vec2 {
        self.current.mouse_position
    }
}
