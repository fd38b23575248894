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

//! Defines the error type for engine lifecycle failures.

use thiserror::Error;

/// Errors raised while configuring, setting up or running the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration file could not be read.
    #[error("failed to read configuration '{path}': {source}")]
    ConfigIo {
        /// The path that failed to load.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration document is not valid.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
    /// The platform (window, input, context) could not be created.
    #[error("platform couldn't initialize: {0:#}")]
    PlatformCreation(#[source] anyhow::Error),
    /// The renderer could not be created on top of the platform.
    #[error("renderer couldn't initialize: {0:#}")]
    RendererCreation(#[source] anyhow::Error),
    /// A plugin failed during initialization.
    #[error("plugin '{name}' failed to initialize: {source:#}")]
    PluginInitialization {
        /// The name reported by the plugin.
        name: String,
        /// The error returned by the plugin.
        #[source]
        source: anyhow::Error,
    },
    /// An error escaped a tick or a frame.
    #[error("runtime error: {0:#}")]
    Runtime(#[source] anyhow::Error),
    /// An operation was called in a lifecycle state that does not allow it.
    #[error("engine is in state {current}, expected {expected}")]
    InvalidState {
        /// The state the engine was in.
        current: String,
        /// The state the operation requires.
        expected: String,
    },
}
