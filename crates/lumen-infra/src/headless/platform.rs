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

use super::host::{HeadlessHost, HostRecord};
use super::renderer::{RecordingRenderer, RenderLog};
use lumen_core::platform::{Host, Key, PlatformEvent, PlatformProvider};
use lumen_core::renderer::Renderer;
use lumen_core::{EngineConfig, ManualTimeSource};
use std::cell::RefCell;
use std::rc::Rc;

/// Behavior of the headless backend.
#[derive(Debug, Clone)]
pub struct HeadlessSettings {
    /// Close the host after this many updates. `None` keeps it open until
    /// the engine quits.
    pub frames_before_close: Option<u64>,
    /// Time a swap takes with vsync off, in milliseconds.
    pub swap_cost_ms: f64,
    /// Time a swap takes with vsync on, in milliseconds.
    pub vsync_swap_cost_ms: f64,
    /// Simulates a driver that ignores swap interval 0.
    pub forced_vsync: bool,
    /// Whether the renderer asks the host for vsync when applying settings.
    pub vsync: bool,
    /// Fail host creation.
    pub fail_host: bool,
    /// Fail renderer creation.
    pub fail_renderer: bool,
    /// Events emitted during the given update (1-based).
    pub scripted_events: Vec<(u64, PlatformEvent)>,
    /// Keys held from the given update on, until the next entry.
    pub scripted_keys: Vec<(u64, Vec<Key>)>,
}

impl Default for HeadlessSettings {
    fn default() -> Self {
        Self {
            frames_before_close: None,
            swap_cost_ms: 1000.0 / 60.0,
            vsync_swap_cost_ms: 1000.0 / 60.0,
            forced_vsync: false,
            vsync: true,
            fail_host: false,
            fail_renderer: false,
            scripted_events: Vec::new(),
            scripted_keys: Vec::new(),
        }
    }
}

/// A [`PlatformProvider`] creating a [`HeadlessHost`] and a
/// [`RecordingRenderer`].
///
/// The records of both are shared with the provider, so they stay readable
/// after the engine takes ownership of the host and the renderer.
pub struct HeadlessPlatform {
    settings: HeadlessSettings,
    clock: ManualTimeSource,
    host_record: Rc<RefCell<HostRecord>>,
    render_log: Rc<RefCell<RenderLog>>,
}

impl HeadlessPlatform {
    /// Creates a backend whose host advances `clock` on every swap.
    pub fn new(settings: HeadlessSettings, clock: ManualTimeSource) -> Self {
        Self {
            settings,
            clock,
            host_record: Rc::default(),
            render_log: Rc::default(),
        }
    }

    /// Shared record of host activity.
    pub fn host_record(&self) -> Rc<RefCell<HostRecord>> {
        self.host_record.clone()
    }

    /// Shared record of renderer activity.
    pub fn render_log(&self) -> Rc<RefCell<RenderLog>> {
        self.render_log.clone()
    }
}

impl PlatformProvider for HeadlessPlatform {
    fn create_host(
        &mut self,
        config: &EngineConfig,
        events: flume::Sender<PlatformEvent>,
    ) -> anyhow::Result<Box<dyn Host>> {
        if self.settings.fail_host {
            anyhow::bail!("headless host creation disabled by settings");
        }
        log::info!(
            "Creating headless host '{}' ({}x{}).",
            config.host_title,
            config.host_size.0,
            config.host_size.1
        );
        Ok(Box::new(HeadlessHost::new(
            self.settings.clone(),
            config.host_size,
            self.clock.clone(),
            events,
            self.host_record.clone(),
        )))
    }

    fn create_renderer(
        &mut self,
        host: &mut dyn Host,
        _config: &EngineConfig,
    ) -> anyhow::Result<Box<dyn Renderer>> {
        if self.settings.fail_renderer {
            anyhow::bail!("headless renderer creation disabled by settings");
        }
        let (width, height) = host.size();
        Ok(Box::new(
            RecordingRenderer::with_log(width, height, self.render_log.clone())
                .with_vsync(self.settings.vsync),
        ))
    }
}
