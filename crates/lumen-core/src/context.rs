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

//! Per-tick context handed to scenes, objects and plugins.

use crate::platform::input::InputLatch;

/// A snapshot of the simulation clock for the tick being run, plus a channel
/// back to the loop.
///
/// Every tick gets a fresh context; `delta_ms` is always the fixed step.
#[derive(Debug)]
pub struct TickContext<'a> {
    /// Fixed duration of this tick in milliseconds.
    pub delta_ms: f32,
    /// Index of this tick (the first tick is `1`).
    pub tick: u64,
    /// Simulated time elapsed since the loop started, including this tick.
    pub total_time_ms: f64,
    /// Input latched at the start of this tick.
    pub input: &'a InputLatch,
    quit_requested: bool,
}

impl<'a> TickContext<'a> {
    /// Creates a context for a single tick.
    pub fn new(delta_ms: f32, tick: u64, total_time_ms: f64, input: &'a InputLatch) -> Self {
        Self {
            delta_ms,
            tick,
            total_time_ms,
            input,
            quit_requested: false,
        }
    }

    /// Asks the loop to stop once the current tick returns.
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    /// Whether anything run during this tick asked the loop to stop.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}
