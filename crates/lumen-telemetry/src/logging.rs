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

//! Process-wide logger initialization.

use env_logger::{Builder, Env};
use lumen_core::EngineConfig;

/// Installs `env_logger` as the global logger.
///
/// The default level is `info`, or `debug` in debug mode. `RUST_LOG` replaces
/// the default and `config.log_filter` is applied on top of both. Returns
/// `false` if a logger was already installed, in which case the existing one
/// is kept.
pub fn init_logging(config: &EngineConfig) -> bool {
    let default_level = if config.debug_mode { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));
    if let Some(filter) = config.log_filter.as_deref() {
        builder.parse_filters(filter);
    }
    builder.try_init().is_ok()
}

/// Flushes buffered log records.
pub fn flush() {
    log::logger().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialization_is_ignored() {
        let config = EngineConfig::default();
        // Another test may have installed a logger first.
        let _ = init_logging(&config);
        assert!(!init_logging(&config));
        flush();
    }
}
