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

//! Engine configuration.
//!
//! The configuration is a plain, read-only data structure. It can be built in
//! code or deserialized from JSON; every field has a sensible default so a
//! partial document is valid.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The tick rate used when the configured one is zero.
pub const DEFAULT_TICK_RATE: u32 = 60;

/// The number of fixed ticks a single frame may run before the remaining
/// accumulated time is dropped.
pub const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 5;

/// Settings for the spatial index backing each map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Number of objects a leaf holds before it subdivides.
    pub node_capacity: usize,
    /// Number of times the root may be subdivided along any path.
    pub max_depth: u32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            node_capacity: 8,
            max_depth: 10,
        }
    }
}

/// The engine-wide configuration consumed during setup and by the main loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simulation ticks per second. `0` falls back to [`DEFAULT_TICK_RATE`].
    pub desired_tick_rate: u32,
    /// Upper bound of ticks run in one frame.
    pub max_ticks_per_frame: u32,
    /// Enables verbose logging and suppresses fatal error popups.
    pub debug_mode: bool,
    /// Never show a message box on fatal errors.
    pub suppress_error_popup: bool,
    /// Run the swap-interval calibration when the loop starts.
    pub detect_vsync: bool,
    /// Maximum difference (ms) between the vsync-off and vsync-on averages for
    /// vsync to be considered forced by the driver.
    pub vsync_threshold_ms: f64,
    /// Title of the host window.
    pub host_title: String,
    /// Initial size of the host window in physical pixels.
    pub host_size: (u32, u32),
    /// Optional `env_logger` filter directive, e.g. `"lumen_sdk=trace"`.
    pub log_filter: Option<String>,
    /// Spatial index settings.
    pub spatial: SpatialConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            desired_tick_rate: DEFAULT_TICK_RATE,
            max_ticks_per_frame: DEFAULT_MAX_TICKS_PER_FRAME,
            debug_mode: false,
            suppress_error_popup: false,
            detect_vsync: true,
            vsync_threshold_ms: 1.0,
            host_title: "Untitled".to_string(),
            host_size: (640, 360),
            log_filter: None,
            spatial: SpatialConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(EngineError::from)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| EngineError::ConfigIo {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&contents)
    }

    /// The tick rate actually used by the loop.
    #[inline]
    pub fn effective_tick_rate(&self) -> u32 {
        if self.desired_tick_rate == 0 {
            DEFAULT_TICK_RATE
        } else {
            self.desired_tick_rate
        }
    }

    /// The tick cap actually used by the loop. Never lower than one.
    #[inline]
    pub fn effective_max_ticks(&self) -> u32 {
        self.max_ticks_per_frame.max(1)
    }

    /// Whether a fatal error should be reported through a message box.
    #[inline]
    pub fn shows_error_popup(&self) -> bool {
        !self.suppress_error_popup && !self.debug_mode
    }
}
