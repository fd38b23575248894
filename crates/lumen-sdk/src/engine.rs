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

//! # Engine
//!
//! The top-level driver. It owns the platform, the renderer, the scene
//! manager and the plugins, sequences their construction, and runs the
//! tick/render loop until the host closes or something asks it to quit.

use crate::clock::{EngineClock, FrameTicks};
use crate::context::EngineContext;
use crate::vsync::{VSyncDetector, VSyncReport};
use anyhow::Context as _;
use lumen_core::event::{EventBus, TaskQueue, TaskSender};
use lumen_core::math::LinearRgba;
use lumen_core::platform::{Host, PlatformEvent, PlatformProvider};
use lumen_core::plugin::Plugin;
use lumen_core::renderer::Renderer;
use lumen_core::{
    EngineConfig, EngineError, ManualTimeSource, Stopwatch, SystemTimeSource, TickContext,
    TimeSource,
};
use lumen_data::{Scene, SceneManager};
use lumen_infra::headless::{HeadlessPlatform, HeadlessSettings};
use lumen_telemetry::metrics::MetricsSnapshot;
use lumen_telemetry::{logging, TelemetryService};
use std::fmt;

/// The lifecycle of an [`Engine`].
///
/// Status only ever moves forward. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EngineStatus {
    /// Nothing initialized yet.
    Initial,
    /// Logging is up; no platform objects exist.
    LightSetup,
    /// Platform, renderer, scene manager and plugins are ready.
    Setup,
    /// The loop is running.
    Running,
    /// The engine has shut down.
    Stopped,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineStatus::Initial => "Initial",
            EngineStatus::LightSetup => "LightSetup",
            EngineStatus::Setup => "Setup",
            EngineStatus::Running => "Running",
            EngineStatus::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// The engine: owner of every subsystem and driver of the main loop.
pub struct Engine {
    ctx: EngineContext,
    clock: EngineClock,
    time: Box<dyn TimeSource>,
    platform: Option<Box<dyn PlatformProvider>>,
    host: Option<Box<dyn Host>>,
    renderer: Option<Box<dyn Renderer>>,
    scenes: SceneManager,
    plugins: Vec<Box<dyn Plugin>>,
    initialized_plugins: usize,
    platform_events: EventBus<PlatformEvent>,
    tasks: TaskQueue<SceneManager>,
    telemetry: TelemetryService,
    vsync_report: Option<VSyncReport>,
    last_frame: FrameTicks,
    quit_requested: bool,
}

impl Engine {
    /// Creates an engine in the [`EngineStatus::Initial`] state, timed by the
    /// system clock and without a platform.
    pub fn new(config: EngineConfig) -> Self {
        let clock = EngineClock::from_config(&config);
        let ctx = EngineContext::new(config, clock.step_ms() as f32);
        Self {
            ctx,
            clock,
            time: Box::new(SystemTimeSource::new()),
            platform: None,
            host: None,
            renderer: None,
            scenes: SceneManager::new(),
            plugins: Vec::new(),
            initialized_plugins: 0,
            platform_events: EventBus::new(),
            tasks: TaskQueue::new(),
            telemetry: TelemetryService::default(),
            vsync_report: None,
            last_frame: FrameTicks::default(),
            quit_requested: false,
        }
    }

    /// Creates an engine running on the headless backend, timed by a manual
    /// clock that the host advances on every swap.
    pub fn headless(config: EngineConfig, settings: HeadlessSettings) -> Self {
        let time = ManualTimeSource::new();
        let platform = HeadlessPlatform::new(settings, time.clone());
        Self::new(config)
            .with_time_source(time)
            .with_platform(platform)
    }

    /// Sets the factory used to create the host and the renderer.
    pub fn with_platform(mut self, platform: impl PlatformProvider + 'static) -> Self {
        self.platform = Some(Box::new(platform));
        self
    }

    /// Replaces the time source read by the loop.
    pub fn with_time_source(mut self, time: impl TimeSource + 'static) -> Self {
        self.time = Box::new(time);
        self
    }

    /// Installs a plugin. Plugins are initialized in installation order.
    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        if self.ctx.status >= EngineStatus::Setup {
            log::warn!("Plugin '{}' installed after setup is ignored.", plugin.name());
            return self;
        }
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Queues `scene` to become active on the next tick.
    pub fn with_scene(mut self, scene: impl Scene) -> Self {
        self.scenes.set_scene(Box::new(scene));
        self
    }

    /// Queues `scene` to become active on the next tick.
    pub fn set_scene(&mut self, scene: Box<dyn Scene>) {
        self.scenes.set_scene(scene);
    }

    /// Current lifecycle status.
    pub fn status(&self) -> EngineStatus {
        self.ctx.status
    }

    /// The engine's shared state.
    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// The scene manager.
    pub fn scene_manager(&self) -> &SceneManager {
        &self.scenes
    }

    /// The scene manager, mutably.
    pub fn scene_manager_mut(&mut self) -> &mut SceneManager {
        &mut self.scenes
    }

    /// A handle worker threads use to hand results back to the loop. Tasks
    /// run on the loop thread at the start of each tick, before the scene
    /// update.
    pub fn task_sender(&self) -> TaskSender<SceneManager> {
        self.tasks.sender()
    }

    /// The host, once setup has created it.
    pub fn host(&self) -> Option<&dyn Host> {
        self.host.as_deref()
    }

    /// The renderer, once setup has created it.
    pub fn renderer(&self) -> Option<&dyn Renderer> {
        self.renderer.as_deref()
    }

    /// The result of vsync calibration, if it ran.
    pub fn vsync_report(&self) -> Option<VSyncReport> {
        self.vsync_report
    }

    /// What the clock decided for the most recent frame.
    pub fn last_frame(&self) -> FrameTicks {
        self.last_frame
    }

    /// Loop performance counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.telemetry.snapshot()
    }

    /// Initializes logging. Does nothing if already done.
    pub fn light_setup(&mut self) {
        if self.ctx.status >= EngineStatus::LightSetup {
            return;
        }
        if !logging::init_logging(&self.ctx.config) {
            log::debug!("A logger was already installed, keeping it.");
        }
        log::info!(
            "Light setup complete, tick rate {} ({:.3}ms per tick).",
            self.ctx.config.effective_tick_rate(),
            self.clock.step_ms()
        );
        self.ctx.status = EngineStatus::LightSetup;
    }

    /// Creates the host, the renderer and the scene manager, then initializes
    /// plugins. Runs [`Engine::light_setup`] first if needed.
    ///
    /// Any failure is treated as fatal: it is reported through
    /// [`Engine::critical_error`], the engine ends up `Stopped` and the error
    /// is returned.
    pub fn setup(&mut self) -> Result<(), EngineError> {
        match self.ctx.status {
            EngineStatus::Setup | EngineStatus::Running => return Ok(()),
            EngineStatus::Stopped => {
                return Err(EngineError::InvalidState {
                    current: EngineStatus::Stopped.to_string(),
                    expected: "Initial or LightSetup".to_string(),
                })
            }
            EngineStatus::Initial | EngineStatus::LightSetup => {}
        }

        self.light_setup();
        log::info!("Setting up engine...");
        if let Err(e) = self.try_setup() {
            self.critical_error(&e);
            return Err(e);
        }
        self.ctx.status = EngineStatus::Setup;
        log::info!("Engine setup complete.");
        Ok(())
    }

    fn try_setup(&mut self) -> Result<(), EngineError> {
        let platform = self.platform.as_mut().ok_or_else(|| {
            EngineError::PlatformCreation(anyhow::anyhow!("no platform provider configured"))
        })?;

        let host = platform
            .create_host(&self.ctx.config, self.platform_events.sender())
            .map_err(EngineError::PlatformCreation)?;
        let host = self.host.insert(host);
        self.ctx.host_size = host.size();
        self.ctx.focused = host.is_focused();

        let mut renderer = platform
            .create_renderer(host.as_mut(), &self.ctx.config)
            .map_err(EngineError::RendererCreation)?;
        renderer.apply_settings(host.as_mut());
        self.renderer = Some(renderer);

        log::debug!("Scene manager ready.");

        for plugin in self.plugins.iter_mut() {
            plugin
                .initialize()
                .map_err(|source| EngineError::PluginInitialization {
                    name: plugin.name().to_owned(),
                    source,
                })?;
            self.initialized_plugins += 1;
            log::debug!("Plugin '{}' initialized.", plugin.name());
        }
        Ok(())
    }

    /// Runs the loop until the host closes or the engine quits, then shuts
    /// down. Does nothing unless the status is exactly `Setup`.
    ///
    /// An error escaping a tick is fatal: it is reported through
    /// [`Engine::critical_error`] and returned.
    pub fn run(&mut self) -> Result<(), EngineError> {
        if self.ctx.status != EngineStatus::Setup {
            log::warn!("Run called while {}, ignoring.", self.ctx.status);
            return Ok(());
        }
        self.ctx.status = EngineStatus::Running;
        log::info!(
            "Starting loop at {} ticks per second.",
            self.ctx.config.effective_tick_rate()
        );

        if self.ctx.config.detect_vsync {
            self.detect_vsync();
        }
        // Calibration time is not simulated. The first frame runs one tick.
        self.clock.start(self.time.now_ms());

        while self.ctx.status == EngineStatus::Running {
            match self.run_frame() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    self.critical_error(&e);
                    return Err(EngineError::Runtime(e));
                }
            }
        }

        self.quit();
        Ok(())
    }

    /// Shuts the engine down: closes the host, unloads the scene, disposes
    /// initialized plugins and flushes the log. Calling it again does nothing.
    pub fn quit(&mut self) {
        if self.ctx.status == EngineStatus::Stopped {
            return;
        }
        self.ctx.status = EngineStatus::Stopped;
        log::info!("Quitting...");

        if let Some(host) = self.host.as_mut() {
            host.close();
        }
        self.scenes.unload();
        for plugin in self.plugins.iter_mut().take(self.initialized_plugins) {
            plugin.dispose();
        }
        self.initialized_plugins = 0;

        let metrics = self.telemetry.snapshot();
        log::info!(
            "Engine stopped after {} tick(s) and {} frame(s).",
            self.ctx.tick_count,
            metrics.total_frames
        );
        logging::flush();
    }

    /// Reports a fatal error and quits.
    ///
    /// The error is logged and, unless popups are suppressed or debug mode is
    /// on, shown in a message box on the host.
    pub fn critical_error(&mut self, error: &dyn fmt::Display) {
        log::error!("Fatal error: {error:#}");
        if self.ctx.config.shows_error_popup() {
            if let Some(host) = self.host.as_mut() {
                host.display_message_box(&format!("Fatal error occurred!\n{error:#}"));
            }
        }
        self.quit();
    }

    fn detect_vsync(&mut self) {
        let (Some(host), Some(renderer)) = (self.host.as_mut(), self.renderer.as_mut()) else {
            return;
        };
        if !host.is_open() {
            return;
        }

        let detector = VSyncDetector::new(self.ctx.config.vsync_threshold_ms);
        let report = detector.detect(host.as_mut(), self.time.as_ref());
        renderer.set_forced_vsync(report.forced);
        renderer.apply_settings(host.as_mut());
        self.ctx.forced_vsync = report.forced;
        self.vsync_report = Some(report);
    }

    fn host_is_open(&self) -> bool {
        self.host.as_ref().is_some_and(|host| host.is_open())
    }

    /// One loop iteration. Returns `Ok(false)` when the loop should stop.
    fn run_frame(&mut self) -> anyhow::Result<bool> {
        let Some(host) = self.host.as_mut() else {
            return Ok(false);
        };
        if !host.update() {
            log::info!("Host was closed.");
            return Ok(false);
        }
        self.process_platform_events();
        if !self.host_is_open() {
            return Ok(false);
        }

        let now = self.time.now_ms();
        let frame = self.clock.advance(now);
        self.last_frame = frame;
        if frame.capped {
            self.telemetry
                .metrics_mut()
                .record_capped(frame.dropped_ms);
        }
        for _ in 0..frame.ticks {
            self.tick()?;
            if self.quit_requested || !self.host_is_open() {
                break;
            }
        }
        if self.quit_requested {
            log::info!("Quit requested during tick {}.", self.ctx.tick_count);
            return Ok(false);
        }
        // A tick may have closed the host.
        if !self.host_is_open() {
            return Ok(false);
        }

        self.render_frame();
        self.telemetry
            .metrics_mut()
            .record_frame(now);
        self.telemetry.tick(now);
        Ok(true)
    }

    fn process_platform_events(&mut self) {
        for event in self.platform_events.drain() {
            match event {
                PlatformEvent::Resized { width, height } => {
                    log::debug!("Host resized to {width}x{height}.");
                    self.ctx.host_size = (width, height);
                    if let Some(renderer) = self.renderer.as_mut() {
                        renderer.resize(width, height);
                    }
                }
                PlatformEvent::FocusChanged(focused) => {
                    log::debug!("Host focus changed: {focused}.");
                    self.ctx.focused = focused;
                }
                PlatformEvent::CloseRequested => {
                    log::info!("Close requested by the platform.");
                    if let Some(host) = self.host.as_mut() {
                        host.close();
                    }
                }
            }
        }
    }

    fn tick(&mut self) -> anyhow::Result<()> {
        let stopwatch = Stopwatch::new();
        self.ctx.tick_count += 1;
        self.ctx.total_time_ms += self.clock.step_ms();

        if let Some(host) = self.host.as_ref() {
            self.ctx.input.latch(host.input());
        }
        self.tasks.drain(&mut self.scenes);

        let mut tick = TickContext::new(
            self.ctx.delta_ms,
            self.ctx.tick_count,
            self.ctx.total_time_ms,
            &self.ctx.input,
        );
        self.scenes.update(&mut tick)?;
        for plugin in self.plugins.iter_mut() {
            plugin
                .update(&mut tick)
                .with_context(|| format!("plugin '{}' failed to update", plugin.name()))?;
        }
        if tick.quit_requested() {
            self.quit_requested = true;
        }

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.update_camera(self.ctx.delta_ms);
        }
        self.telemetry
            .metrics_mut()
            .record_tick(stopwatch.elapsed_ms_f64());
        Ok(())
    }

    fn render_frame(&mut self) {
        let (Some(host), Some(renderer)) = (self.host.as_mut(), self.renderer.as_mut()) else {
            return;
        };
        self.ctx.frame_count += 1;

        renderer.start_frame();
        if self.ctx.config.debug_mode {
            let backdrop = renderer.camera().view_bounds();
            renderer.render_rect(backdrop, LinearRgba::CORNFLOWER_BLUE);
        }
        self.scenes.draw(renderer.as_mut());
        renderer.end_frame();
        host.swap_buffers();
    }
}
