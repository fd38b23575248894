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

//! A windowless platform backend.
//!
//! The headless host never blocks: presenting a frame advances a shared
//! [`ManualTimeSource`](lumen_core::ManualTimeSource) by a configured cost,
//! which makes loop runs deterministic. Everything the engine does to the
//! host and the renderer is recorded for inspection.

mod host;
mod platform;
mod renderer;

pub use self::host::{HeadlessHost, HostRecord};
pub use self::platform::{HeadlessPlatform, HeadlessSettings};
pub use self::renderer::{RecordingRenderer, RenderLog};
