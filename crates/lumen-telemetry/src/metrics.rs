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

//! Tick and frame rate bookkeeping for the main loop.

use serde::Serialize;

/// A point-in-time copy of [`PerformanceMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Ticks per second over the last complete window.
    pub ticks_per_second: f64,
    /// Frames per second over the last complete window.
    pub frames_per_second: f64,
    /// Ticks run since start.
    pub total_ticks: u64,
    /// Frames rendered since start.
    pub total_frames: u64,
    /// Wall-clock cost of the last tick, in milliseconds.
    pub last_tick_ms: f64,
    /// Most expensive tick seen, in milliseconds.
    pub max_tick_ms: f64,
    /// Simulation time discarded by the tick cap, in milliseconds.
    pub dropped_ms: f64,
    /// Frames that hit the tick cap.
    pub capped_frames: u64,
}

/// Accumulates per-tick and per-frame measurements and derives rates over
/// fixed windows.
#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    window_ms: f64,
    window_start_ms: Option<f64>,
    ticks_in_window: u32,
    frames_in_window: u32,
    snapshot: MetricsSnapshot,
}

impl PerformanceMetrics {
    /// Creates metrics computing rates over windows of `window_ms`.
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms: window_ms.max(1.0),
            window_start_ms: None,
            ticks_in_window: 0,
            frames_in_window: 0,
            snapshot: MetricsSnapshot::default(),
        }
    }

    /// Records one tick that took `duration_ms` of wall-clock time.
    pub fn record_tick(&mut self, duration_ms: f64) {
        self.ticks_in_window += 1;
        self.snapshot.total_ticks += 1;
        self.snapshot.last_tick_ms = duration_ms;
        if duration_ms > self.snapshot.max_tick_ms {
            self.snapshot.max_tick_ms = duration_ms;
        }
    }

    /// Records a frame whose ticks hit the per-frame cap, discarding
    /// `dropped_ms` of simulation time. Nothing left over still counts.
    pub fn record_capped(&mut self, dropped_ms: f64) {
        self.snapshot.capped_frames += 1;
        self.snapshot.dropped_ms += dropped_ms.max(0.0);
    }

    /// Records a rendered frame at time `now_ms`. Closes the window once it
    /// is full.
    pub fn record_frame(&mut self, now_ms: f64) {
        self.frames_in_window += 1;
        self.snapshot.total_frames += 1;

        let start = *self.window_start_ms.get_or_insert(now_ms);
        let elapsed = now_ms - start;
        if elapsed >= self.window_ms {
            let per_second = 1000.0 / elapsed;
            self.snapshot.ticks_per_second = f64::from(self.ticks_in_window) * per_second;
            self.snapshot.frames_per_second = f64::from(self.frames_in_window) * per_second;
            self.ticks_in_window = 0;
            self.frames_in_window = 0;
            self.window_start_ms = Some(now_ms);
        }
    }

    /// The current values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.snapshot
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new(1000.0)
    }
}
