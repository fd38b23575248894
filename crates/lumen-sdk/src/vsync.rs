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

//! Detection of vertical synchronization forced by the driver.

use lumen_core::platform::Host;
use lumen_core::TimeSource;

/// Averages measured by [`VSyncDetector::detect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VSyncReport {
    /// Mean swap duration with swap interval 0, in milliseconds.
    pub average_off_ms: f64,
    /// Mean swap duration with swap interval 1, in milliseconds.
    pub average_on_ms: f64,
    /// Whether the driver appears to ignore the swap interval.
    pub forced: bool,
}

/// Measures buffer swaps with vsync requested off and then on.
///
/// If both averages are within the threshold of each other the request had
/// no effect and vsync is reported as forced. The result is a heuristic:
/// averages are used so that single outlier swaps do not decide it.
#[derive(Debug, Clone)]
pub struct VSyncDetector {
    warmup_swaps: u32,
    samples_per_mode: u32,
    threshold_ms: f64,
}

impl VSyncDetector {
    /// Swaps discarded before measuring.
    pub const DEFAULT_WARMUP_SWAPS: u32 = 5;
    /// Swaps measured for each swap interval.
    pub const DEFAULT_SAMPLES_PER_MODE: u32 = 10;

    /// Creates a detector using the given equality threshold.
    pub fn new(threshold_ms: f64) -> Self {
        Self {
            warmup_swaps: Self::DEFAULT_WARMUP_SWAPS,
            samples_per_mode: Self::DEFAULT_SAMPLES_PER_MODE,
            threshold_ms,
        }
    }

    /// Overrides how many swaps are discarded and measured.
    pub fn with_samples(mut self, warmup_swaps: u32, samples_per_mode: u32) -> Self {
        self.warmup_swaps = warmup_swaps;
        self.samples_per_mode = samples_per_mode.max(1);
        self
    }

    /// Runs the calibration. Leaves the host with swap interval 1; callers
    /// should re-apply their presentation settings afterwards.
    pub fn detect(&self, host: &mut dyn Host, time: &dyn TimeSource) -> VSyncReport {
        host.set_swap_interval(0);
        for _ in 0..self.warmup_swaps {
            host.swap_buffers();
        }
        let average_off_ms = self.measure(host, time);

        host.set_swap_interval(1);
        let average_on_ms = self.measure(host, time);

        let forced = (average_off_ms - average_on_ms).abs() <= self.threshold_ms;
        log::info!(
            "VSync calibration: {average_off_ms:.3}ms off, {average_on_ms:.3}ms on, forced: {forced}."
        );
        VSyncReport {
            average_off_ms,
            average_on_ms,
            forced,
        }
    }

    fn measure(&self, host: &mut dyn Host, time: &dyn TimeSource) -> f64 {
        let mut total = 0.0;
        for _ in 0..self.samples_per_mode {
            let start = time.now_ms();
            host.swap_buffers();
            total += time.now_ms() - start;
        }
        total / f64::from(self.samples_per_mode)
    }
}

impl Default for VSyncDetector {
    fn default() -> Self {
        Self::new(1.0)
    }
}
