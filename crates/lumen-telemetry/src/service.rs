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

//! Service collecting loop metrics and reporting them periodically.

use crate::metrics::{MetricsSnapshot, PerformanceMetrics};

/// Collects loop metrics and logs a summary on a fixed interval.
///
/// Time is passed in by the caller so the service follows whatever clock
/// drives the loop.
#[derive(Debug)]
pub struct TelemetryService {
    metrics: PerformanceMetrics,
    report_interval_ms: f64,
    last_report_ms: Option<f64>,
    reports: u64,
}

impl TelemetryService {
    /// Creates a new telemetry service reporting every `report_interval_ms`.
    pub fn new(report_interval_ms: f64) -> Self {
        Self {
            metrics: PerformanceMetrics::default(),
            report_interval_ms,
            last_report_ms: None,
            reports: 0,
        }
    }

    /// Mutable access to the collected metrics.
    pub fn metrics_mut(&mut self) -> &mut PerformanceMetrics {
        &mut self.metrics
    }

    /// Current metric values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Number of summaries logged so far.
    pub fn report_count(&self) -> u64 {
        self.reports
    }

    /// Should be called once per frame.
    /// Logs a summary if the interval has passed and returns whether it did.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let last = *self.last_report_ms.get_or_insert(now_ms);
        if now_ms - last < self.report_interval_ms {
            return false;
        }
        self.last_report_ms = Some(now_ms);
        self.reports += 1;

        let snapshot = self.metrics.snapshot();
        log::debug!(
            "Loop: {:.1} tps, {:.1} fps, last tick {:.3}ms (max {:.3}ms), {:.1}ms dropped over {} capped frame(s)",
            snapshot.ticks_per_second,
            snapshot.frames_per_second,
            snapshot.last_tick_ms,
            snapshot.max_tick_ms,
            snapshot.dropped_ms,
            snapshot.capped_frames,
        );
        match serde_json::to_string(&snapshot) {
            Ok(json) => log::trace!("Telemetry snapshot: {json}"),
            Err(e) => log::warn!("Failed to serialize telemetry snapshot: {e}"),
        }
        true
    }
}

impl Default for TelemetryService {
    fn default() -> Self {
        Self::new(1000.0)
    }
}
