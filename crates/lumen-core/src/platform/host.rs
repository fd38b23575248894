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

use super::input::InputState;

/// A trait that abstracts the behavior of the host window.
///
/// Any windowing backend can implement this trait to be driven by the engine
/// loop. The loop only needs to pump messages, present frames and query a
/// few properties.
pub trait Host {
    /// Pumps pending platform messages.
    ///
    /// Returns `false` once the host has closed and the loop should stop.
    fn update(&mut self) -> bool;

    /// Whether the host is still open.
    fn is_open(&self) -> bool;

    /// Presents the back buffer. Blocks for the display interval when a swap
    /// interval is active.
    fn swap_buffers(&mut self);

    /// Sets how many display refreshes to wait for on each swap. Zero disables
    /// vertical synchronization.
    fn set_swap_interval(&mut self, interval: u32);

    /// The swap interval currently in effect.
    fn swap_interval(&self) -> u32;

    /// Returns the dimensions (width, height) of the drawable area.
    fn size(&self) -> (u32, u32);

    /// Whether the host currently has input focus.
    fn is_focused(&self) -> bool;

    /// The input state accumulated by the last [`Host::update`].
    fn input(&self) -> &InputState;

    /// Shows a blocking message to the user.
    fn display_message_box(&mut self, message: &str);

    /// Closes the host. Subsequent calls have no effect.
    fn close(&mut self);
}
