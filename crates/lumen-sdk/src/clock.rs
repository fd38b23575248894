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

//! # Engine Clock
//!
//! Converts wall-clock frame deltas into a whole number of fixed-duration
//! simulation ticks.
//!
//! Deltas within [`SNAP_TOLERANCE_MS`] of the step are snapped to the step so
//! ordinary frames tick exactly once. Spare time accumulates across frames.
//! A tolerance band around the step absorbs scheduler jitter: a tick runs as
//! soon as the accumulator exceeds `1000 / (rate + 1)`, and a remainder below
//! `1000 / (rate - 1) - step` after a tick is cleared. A frame never runs
//! more than the configured maximum of ticks; whatever is left then is
//! dropped instead of being caught up.

/// Deltas closer than this to the step are treated as exactly one step.
pub const SNAP_TOLERANCE_MS: f64 = 1.0;

/// The outcome of feeding one frame delta to the [`EngineClock`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTicks {
    /// Number of fixed ticks to run this frame.
    pub ticks: u32,
    /// The delta actually added to the accumulator, after snapping.
    pub effective_delta_ms: f64,
    /// Whether the raw delta was snapped to the step.
    pub snapped: bool,
    /// Whether the frame stopped at the tick cap.
    pub capped: bool,
    /// Accumulated time discarded because the tick cap was hit.
    pub dropped_ms: f64,
    /// Net time added (positive) or removed (negative) by clearing
    /// near-zero remainders after a tick.
    pub clamp_adjust_ms: f64,
}

/// The fixed-step accumulator driving simulation ticks.
#[derive(Debug, Clone)]
pub struct EngineClock {
    step_ms: f64,
    fuzzy_lower_ms: f64,
    fuzzy_upper_ms: f64,
    max_ticks_per_frame: u32,
    accumulator_ms: f64,
    last_timestamp_ms: Option<f64>,
}

impl EngineClock {
    /// Creates a clock for `tick_rate` ticks per second.
    ///
    /// A rate of zero falls back to 60. A tick cap of zero is treated as one.
    pub fn new(tick_rate: u32, max_ticks_per_frame: u32) -> Self {
        let rate = if tick_rate == 0 {
            lumen_core::config::DEFAULT_TICK_RATE
        } else {
            tick_rate
        };
        let rate = f64::from(rate);
        Self {
            step_ms: 1000.0 / rate,
            fuzzy_lower_ms: 1000.0 / (rate - 1.0).max(1.0),
            fuzzy_upper_ms: 1000.0 / (rate + 1.0),
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            accumulator_ms: 0.0,
            last_timestamp_ms: None,
        }
    }

    /// Creates a clock from the engine configuration.
    pub fn from_config(config: &lumen_core::EngineConfig) -> Self {
        Self::new(config.effective_tick_rate(), config.effective_max_ticks())
    }

    /// Duration of one tick in milliseconds.
    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    /// Unspent time carried to the next frame.
    pub fn accumulator_ms(&self) -> f64 {
        self.accumulator_ms
    }

    /// The accumulator level above which a tick runs.
    pub fn fuzzy_upper_ms(&self) -> f64 {
        self.fuzzy_upper_ms
    }

    /// Upper edge of the band used to clear remainders after a tick.
    pub fn fuzzy_lower_ms(&self) -> f64 {
        self.fuzzy_lower_ms
    }

    /// Most ticks a single frame may run.
    pub fn max_ticks_per_frame(&self) -> u32 {
        self.max_ticks_per_frame
    }

    /// Clears the accumulator and restarts delta measurement at `now_ms`.
    pub fn reset(&mut self, now_ms: f64) {
        self.accumulator_ms = 0.0;
        self.last_timestamp_ms = Some(now_ms);
    }

    /// Clears the accumulator and places the origin one step before `now_ms`,
    /// so a frame at `now_ms` runs one tick.
    pub fn start(&mut self, now_ms: f64) {
        self.reset(now_ms - self.step_ms);
    }

    /// Feeds the time elapsed since the previous call.
    ///
    /// The first call only records `now_ms` and produces no ticks.
    pub fn advance(&mut self, now_ms: f64) -> FrameTicks {
        let delta = match self.last_timestamp_ms.replace(now_ms) {
            Some(last) => now_ms - last,
            None => 0.0,
        };
        self.feed(delta)
    }

    /// Feeds a raw frame delta and returns how many ticks to run.
    ///
    /// Negative or non-finite deltas count as zero.
    pub fn feed(&mut self, delta_ms: f64) -> FrameTicks {
        let mut frame = FrameTicks::default();

        let mut delta = if delta_ms.is_finite() && delta_ms > 0.0 {
            delta_ms
        } else {
            0.0
        };
        if (delta - self.step_ms).abs() <= SNAP_TOLERANCE_MS {
            delta = self.step_ms;
            frame.snapped = true;
        }
        frame.effective_delta_ms = delta;
        self.accumulator_ms += delta;

        let clear_below = self.fuzzy_lower_ms - self.step_ms;
        while self.accumulator_ms > self.fuzzy_upper_ms {
            frame.ticks += 1;
            self.accumulator_ms -= self.step_ms;

            if self.accumulator_ms < clear_below {
                frame.clamp_adjust_ms -= self.accumulator_ms;
                self.accumulator_ms = 0.0;
            }

            if frame.ticks >= self.max_ticks_per_frame {
                frame.capped = true;
                frame.dropped_ms = self.accumulator_ms;
                self.accumulator_ms = 0.0;
                if frame.dropped_ms > 0.0 {
                    log::trace!(
                        "Tick cap reached, dropping {:.3}ms of simulation time.",
                        frame.dropped_ms
                    );
                }
                break;
            }
        }

        frame
    }
}

impl Default for EngineClock {
    fn default() -> Self {
        Self::new(
            lumen_core::config::DEFAULT_TICK_RATE,
            lumen_core::config::DEFAULT_MAX_TICKS_PER_FRAME,
        )
    }
}
