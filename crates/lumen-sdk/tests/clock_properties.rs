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


//! Accumulator properties of the fixed-step clock.

use approx::assert_relative_eq;
use lumen_sdk::EngineClock;

/// Deterministic frame deltas between 0 and `max_ms`.
struct DeltaGen(u64);

impl DeltaGen {
    fn next(&mut self, max_ms: f64) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 % 10_000) as f64 / 10_000.0 * max_ms
    }
}

#[test]
fn accumulated_time_is_conserved() {
    // ARRANGE
    let mut clock = EngineClock::new(60, 5);
    let mut deltas = DeltaGen(0x9E37_79B9_7F4A_7C15);
    let (mut effective, mut clamped, mut dropped) = (0.0, 0.0, 0.0);
    let mut ticks = 0u64;

    // ACT
    for _ in 0..2_000 {
        let frame = clock.feed(deltas.next(120.0));
        effective += frame.effective_delta_ms;
        clamped += frame.clamp_adjust_ms;
        dropped += frame.dropped_ms;
        ticks += u64::from(frame.ticks);
    }

    // ASSERT
    let spent = ticks as f64 * clock.step_ms() + clock.accumulator_ms() + dropped;
    assert_relative_eq!(effective + clamped, spent, epsilon = 1e-6);
}

#[test]
fn accumulator_stays_below_one_step() {
    let mut clock = EngineClock::new(60, 5);
    let mut deltas = DeltaGen(42);

    for _ in 0..2_000 {
        let frame = clock.feed(deltas.next(80.0));
        assert!(frame.ticks <= clock.max_ticks_per_frame());
        assert!(clock.accumulator_ms() >= 0.0);
        assert!(clock.accumulator_ms() < clock.step_ms());
    }
}

#[test]
fn deltas_near_the_step_snap_to_it() {
    let mut clock = EngineClock::new(60, 5);
    let step = clock.step_ms();

    for jitter in [-0.9, -0.5, 0.0, 0.4, 1.0] {
        let frame = clock.feed(step + jitter);
        assert!(frame.snapped, "jitter {jitter} was not snapped");
        assert_eq!(frame.effective_delta_ms, step);
        assert_eq!(frame.ticks, 1);
        assert_eq!(clock.accumulator_ms(), 0.0);
    }

    let frame = clock.feed(step + 1.5);
    assert!(!frame.snapped);
}

#[test]
fn steady_frames_tick_exactly_once_each() {
    // ARRANGE
    let mut clock = EngineClock::new(60, 5);
    let step = clock.step_ms();

    // ACT
    let ticks: u32 = (0..60).map(|_| clock.feed(step).ticks).sum();

    // ASSERT
    assert_eq!(ticks, 60);
    assert_eq!(clock.accumulator_ms(), 0.0);
}

#[test]
fn a_long_stall_is_capped_and_dropped() {
    // ARRANGE
    let mut clock = EngineClock::new(60, 5);
    let step = clock.step_ms();

    // ACT
    let frame = clock.feed(100.0 * step);

    // ASSERT
    assert_eq!(frame.ticks, 5);
    assert!(frame.capped);
    assert_eq!(clock.accumulator_ms(), 0.0);
    assert_relative_eq!(frame.dropped_ms, 95.0 * step, epsilon = 1e-6);

    // The next ordinary frame is unaffected.
    assert_eq!(clock.feed(step).ticks, 1);
}

#[test]
fn the_cap_follows_configuration() {
    let mut clock = EngineClock::new(30, 2);
    let frame = clock.feed(10.0 * clock.step_ms());
    assert_eq!(frame.ticks, 2);
    assert_eq!(clock.accumulator_ms(), 0.0);
}
