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


//! Engine lifecycle and main loop, driven by the headless backend.

use lumen_core::math::{LinearRgba, Rect};
use lumen_core::platform::{Key, PlatformEvent};
use lumen_core::plugin::Plugin;
use lumen_core::renderer::Renderer;
use lumen_core::{EngineConfig, EngineError, ManualTimeSource, TickContext};
use lumen_data::{Scene, SceneManager};
use lumen_infra::headless::{HeadlessPlatform, HeadlessSettings, HostRecord, RenderLog};
use lumen_sdk::{Engine, EngineStatus};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

type Journal = Arc<Mutex<Vec<String>>>;

fn note(journal: &Journal, entry: impl Into<String>) {
    journal.lock().unwrap().push(entry.into());
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// A scene that writes what happens to it into a journal.
#[derive(Default)]
struct JournalScene {
    journal: Journal,
    quit_at: Option<u64>,
    fail_at: Option<u64>,
}

impl Scene for JournalScene {
    fn name(&self) -> &str {
        "journal"
    }

    fn load(&mut self) -> anyhow::Result<()> {
        note(&self.journal, "load");
        Ok(())
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> anyhow::Result<()> {
        note(&self.journal, format!("scene {}", ctx.tick));
        if ctx.input.is_key_pressed(Key::SPACE) {
            note(&self.journal, format!("space {}", ctx.tick));
        }
        if self.quit_at == Some(ctx.tick) {
            ctx.request_quit();
        }
        if self.fail_at == Some(ctx.tick) {
            anyhow::bail!("scene exploded");
        }
        Ok(())
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) {
        renderer.render_rect(Rect::new(0.0, 0.0, 8.0, 8.0), LinearRgba::WHITE);
    }

    fn unload(&mut self) {
        note(&self.journal, "unload");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct JournalPlugin {
    name: &'static str,
    journal: Journal,
    fail_init: bool,
}

impl JournalPlugin {
    fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            fail_init: false,
        }
    }
}

impl Plugin for JournalPlugin {
    fn name(&self) -> &str {
        self.name
    }

    fn initialize(&mut self) -> anyhow::Result<()> {
        if self.fail_init {
            anyhow::bail!("{} refused to start", self.name);
        }
        note(&self.journal, format!("init {}", self.name));
        Ok(())
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> anyhow::Result<()> {
        note(&self.journal, format!("{} {}", self.name, ctx.tick));
        Ok(())
    }

    fn dispose(&mut self) {
        note(&self.journal, format!("dispose {}", self.name));
    }
}

struct Harness {
    engine: Engine,
    host: Rc<RefCell<HostRecord>>,
    render: Rc<RefCell<RenderLog>>,
}

fn harness(config: EngineConfig, settings: HeadlessSettings) -> Harness {
    let clock = ManualTimeSource::new();
    let platform = HeadlessPlatform::new(settings, clock.clone());
    let host = platform.host_record();
    let render = platform.render_log();
    let engine = Engine::new(config)
        .with_time_source(clock)
        .with_platform(platform);
    Harness {
        engine,
        host,
        render,
    }
}

fn no_calibration() -> EngineConfig {
    EngineConfig {
        detect_vsync: false,
        ..EngineConfig::default()
    }
}

fn closing_after(frames: u64) -> HeadlessSettings {
    HeadlessSettings {
        frames_before_close: Some(frames),
        ..HeadlessSettings::default()
    }
}

#[test]
fn headless_loop_runs_until_the_host_closes() {
    // ARRANGE
    let mut h = harness(no_calibration(), closing_after(10));
    h.engine.set_scene(Box::new(JournalScene::default()));

    // ACT
    h.engine.setup().unwrap();
    h.engine.run().unwrap();

    // ASSERT
    let ctx = h.engine.context();
    assert_eq!(h.engine.status(), EngineStatus::Stopped);
    assert_eq!(ctx.frame_count(), 10);
    assert_eq!(ctx.tick_count(), 10);
    assert!((ctx.total_time_ms() - 10.0 * 1000.0 / 60.0).abs() < 1e-6);

    let host = h.host.borrow();
    assert_eq!(host.swaps, 10);
    assert_eq!(host.closes, 1);
    assert_eq!(host.swap_intervals, vec![1]);

    let render = h.render.borrow();
    assert_eq!(render.frames_started, 10);
    assert_eq!(render.frames_ended, 10);
    assert_eq!(render.camera_updates, 10);
    assert_eq!(render.total_rects, 10);

    let metrics = h.engine.metrics();
    assert_eq!(metrics.total_ticks, 10);
    assert_eq!(metrics.total_frames, 10);
}

#[test]
fn one_second_of_steady_frames() {
    // ARRANGE
    let mut h = harness(no_calibration(), closing_after(60));

    // ACT
    h.engine.setup().unwrap();
    h.engine.run().unwrap();

    // ASSERT
    let ctx = h.engine.context();
    assert_eq!(ctx.frame_count(), 60);
    assert_eq!(ctx.tick_count(), 60);
    assert!((ctx.total_time_ms() - 1000.0).abs() < 1e-6);
    assert!(h.engine.last_frame().snapped);
    assert_eq!(h.engine.metrics().capped_frames, 0);
    assert_eq!(h.engine.metrics().total_frames, 60);
}

#[test]
fn slow_frames_hit_the_tick_cap() {
    // ARRANGE
    let settings = HeadlessSettings {
        vsync_swap_cost_ms: 100.0,
        ..HeadlessSettings::default()
    };
    let mut h = harness(no_calibration(), settings);
    h.engine.set_scene(Box::new(JournalScene {
        quit_at: Some(11),
        ..JournalScene::default()
    }));

    // ACT
    h.engine.setup().unwrap();
    h.engine.run().unwrap();

    // ASSERT
    // One tick, then two frames of six steps each cut to five ticks. The
    // last of them quits before it is rendered.
    let ctx = h.engine.context();
    assert_eq!(ctx.tick_count(), 11);
    assert_eq!(ctx.frame_count(), 2);
    assert!(h.engine.last_frame().capped);

    let metrics = h.engine.metrics();
    assert_eq!(metrics.capped_frames, 2);
    assert!((metrics.dropped_ms - 2.0 * 1000.0 / 60.0).abs() < 1e-6);
}

#[test]
fn status_only_moves_forward() {
    let mut h = harness(no_calibration(), closing_after(2));
    let mut seen = vec![h.engine.status()];

    h.engine.light_setup();
    seen.push(h.engine.status());
    h.engine.setup().unwrap();
    seen.push(h.engine.status());
    h.engine.run().unwrap();
    seen.push(h.engine.status());

    assert_eq!(
        seen,
        vec![
            EngineStatus::Initial,
            EngineStatus::LightSetup,
            EngineStatus::Setup,
            EngineStatus::Stopped,
        ]
    );
    assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn run_does_nothing_unless_set_up() {
    let mut h = harness(no_calibration(), closing_after(2));

    h.engine.run().unwrap();
    assert_eq!(h.engine.status(), EngineStatus::Initial);

    h.engine.light_setup();
    h.engine.run().unwrap();
    assert_eq!(h.engine.status(), EngineStatus::LightSetup);
    assert_eq!(h.host.borrow().updates, 0);
}

#[test]
fn setup_is_idempotent_once_done() {
    let mut h = harness(no_calibration(), closing_after(2));
    h.engine.setup().unwrap();
    h.engine.setup().unwrap();
    assert_eq!(h.engine.status(), EngineStatus::Setup);
    assert_eq!(h.render.borrow().settings_applied, 1);
}

#[test]
fn missing_platform_fails_setup() {
    let mut engine = Engine::new(no_calibration());

    let result = engine.setup();

    assert!(matches!(result, Err(EngineError::PlatformCreation(_))));
    assert_eq!(engine.status(), EngineStatus::Stopped);
    assert!(engine.host().is_none());
}

#[test]
fn host_creation_failure_stops_the_engine() {
    // ARRANGE
    let settings = HeadlessSettings {
        fail_host: true,
        ..HeadlessSettings::default()
    };
    let mut h = harness(no_calibration(), settings);

    // ACT
    let result = h.engine.setup();

    // ASSERT
    assert!(matches!(result, Err(EngineError::PlatformCreation(_))));
    assert_eq!(h.engine.status(), EngineStatus::Stopped);
    // No host, nowhere to show a message box.
    assert!(h.host.borrow().messages.is_empty());

    h.engine.run().unwrap();
    assert_eq!(h.engine.status(), EngineStatus::Stopped);
    assert!(matches!(
        h.engine.setup(),
        Err(EngineError::InvalidState { .. })
    ));
}

#[test]
fn renderer_creation_failure_shows_a_message_box() {
    // ARRANGE
    let settings = HeadlessSettings {
        fail_renderer: true,
        ..HeadlessSettings::default()
    };
    let mut h = harness(no_calibration(), settings);

    // ACT
    let result = h.engine.setup();

    // ASSERT
    assert!(matches!(result, Err(EngineError::RendererCreation(_))));
    assert_eq!(h.engine.status(), EngineStatus::Stopped);
    let host = h.host.borrow();
    assert_eq!(host.messages.len(), 1);
    assert!(host.messages[0].starts_with("Fatal error occurred!"));
    assert_eq!(host.closes, 1);
}

#[test]
fn message_box_is_suppressed_by_config_and_debug_mode() {
    for config in [
        EngineConfig {
            suppress_error_popup: true,
            ..no_calibration()
        },
        EngineConfig {
            debug_mode: true,
            ..no_calibration()
        },
    ] {
        let settings = HeadlessSettings {
            fail_renderer: true,
            ..HeadlessSettings::default()
        };
        let mut h = harness(config, settings);

        assert!(h.engine.setup().is_err());
        assert!(h.host.borrow().messages.is_empty());
        assert_eq!(h.engine.status(), EngineStatus::Stopped);
    }
}

#[test]
fn plugin_failure_disposes_only_initialized_plugins() {
    // ARRANGE
    let journal = Journal::default();
    let mut broken = JournalPlugin::new("broken", &journal);
    broken.fail_init = true;
    let clock = ManualTimeSource::new();
    let mut engine = Engine::new(no_calibration())
        .with_time_source(clock.clone())
        .with_platform(HeadlessPlatform::new(closing_after(2), clock))
        .with_plugin(JournalPlugin::new("audio", &journal))
        .with_plugin(broken)
        .with_plugin(JournalPlugin::new("net", &journal));

    // ACT
    let result = engine.setup();

    // ASSERT
    match result {
        Err(EngineError::PluginInitialization { name, .. }) => assert_eq!(name, "broken"),
        other => panic!("unexpected setup result: {other:?}"),
    }
    assert_eq!(engine.status(), EngineStatus::Stopped);
    assert_eq!(entries(&journal), vec!["init audio", "dispose audio"]);
}

#[test]
fn ticks_run_tasks_then_scene_then_plugins() {
    // ARRANGE
    let journal = Journal::default();
    let mut h = harness(no_calibration(), closing_after(3));
    h.engine = h
        .engine
        .with_plugin(JournalPlugin::new("audio", &journal))
        .with_scene(JournalScene {
            journal: journal.clone(),
            ..JournalScene::default()
        });
    let task_journal = journal.clone();
    assert!(h.engine.task_sender().post(move |scenes: &mut SceneManager| {
        note(&task_journal, format!("task pending={}", scenes.has_pending()));
    }));

    // ACT
    h.engine.setup().unwrap();
    h.engine.run().unwrap();

    // ASSERT
    assert_eq!(
        entries(&journal),
        vec![
            "init audio",
            "task pending=true",
            "load",
            "scene 1",
            "audio 1",
            "scene 2",
            "audio 2",
            "scene 3",
            "audio 3",
            "unload",
            "dispose audio",
        ]
    );
}

#[test]
fn tasks_posted_from_another_thread_reach_the_loop() {
    let mut h = harness(no_calibration(), HeadlessSettings::default());
    let sender = h.engine.task_sender();

    std::thread::spawn(move || {
        sender.post(|scenes: &mut SceneManager| {
            scenes.set_scene(Box::new(JournalScene {
                quit_at: Some(1),
                ..JournalScene::default()
            }));
        })
    })
    .join()
    .unwrap();

    h.engine.setup().unwrap();
    h.engine.run().unwrap();

    // The scene queued by the task is loaded and updated in that same tick.
    assert_eq!(h.engine.context().tick_count(), 1);
    assert_eq!(h.engine.scene_manager().swap_count(), 1);
}

#[test]
fn quit_requested_from_a_tick_stops_the_loop() {
    // ARRANGE
    let journal = Journal::default();
    let mut h = harness(no_calibration(), HeadlessSettings::default());
    h.engine = h
        .engine
        .with_plugin(JournalPlugin::new("audio", &journal))
        .with_scene(JournalScene {
            journal: journal.clone(),
            quit_at: Some(3),
            ..JournalScene::default()
        });

    // ACT
    h.engine.setup().unwrap();
    h.engine.run().unwrap();

    // ASSERT
    assert_eq!(h.engine.status(), EngineStatus::Stopped);
    assert_eq!(h.engine.context().tick_count(), 3);
    // The frame of the quitting tick is not rendered.
    assert_eq!(h.engine.context().frame_count(), 2);
    assert_eq!(h.host.borrow().closes, 1);
    let disposals = entries(&journal)
        .iter()
        .filter(|entry| entry.starts_with("dispose"))
        .count();
    assert_eq!(disposals, 1);
}

#[test]
fn quit_is_idempotent() {
    let journal = Journal::default();
    let mut h = harness(no_calibration(), closing_after(2));
    h.engine = h.engine.with_plugin(JournalPlugin::new("audio", &journal));
    h.engine.setup().unwrap();
    h.engine.run().unwrap();

    h.engine.quit();
    h.engine.quit();

    assert_eq!(h.host.borrow().closes, 1);
    assert_eq!(
        entries(&journal)
            .iter()
            .filter(|entry| entry.as_str() == "dispose audio")
            .count(),
        1
    );
}

#[test]
fn quit_before_setup_is_terminal() {
    let mut h = harness(no_calibration(), closing_after(2));

    h.engine.quit();

    assert_eq!(h.engine.status(), EngineStatus::Stopped);
    assert!(h.engine.setup().is_err());
    assert_eq!(h.host.borrow().updates, 0);
}

#[test]
fn tick_error_is_fatal() {
    // ARRANGE
    let journal = Journal::default();
    let mut h = harness(no_calibration(), HeadlessSettings::default());
    h.engine = h
        .engine
        .with_plugin(JournalPlugin::new("audio", &journal))
        .with_scene(JournalScene {
            journal: journal.clone(),
            fail_at: Some(2),
            ..JournalScene::default()
        });
    h.engine.setup().unwrap();

    // ACT
    let result = h.engine.run();

    // ASSERT
    let error = match result {
        Err(EngineError::Runtime(error)) => error,
        other => panic!("unexpected run result: {other:?}"),
    };
    assert!(format!("{error:#}").contains("scene exploded"));
    assert_eq!(h.engine.status(), EngineStatus::Stopped);
    assert_eq!(h.engine.context().tick_count(), 2);

    let host = h.host.borrow();
    assert_eq!(host.messages.len(), 1);
    assert!(host.messages[0].contains("scene exploded"));
    assert!(entries(&journal).contains(&"dispose audio".to_string()));
}

#[test]
fn platform_events_reach_the_renderer_and_context() {
    // ARRANGE
    let settings = HeadlessSettings {
        frames_before_close: Some(5),
        scripted_events: vec![
            (
                3,
                PlatformEvent::Resized {
                    width: 800,
                    height: 600,
                },
            ),
            (4, PlatformEvent::FocusChanged(false)),
        ],
        ..HeadlessSettings::default()
    };
    let mut h = harness(no_calibration(), settings);

    // ACT
    h.engine.setup().unwrap();
    h.engine.run().unwrap();

    // ASSERT
    let ctx = h.engine.context();
    assert_eq!(ctx.host_size(), (800, 600));
    assert!(!ctx.is_focused());
    assert_eq!(h.render.borrow().resizes, vec![(800, 600)]);
    assert_eq!(ctx.frame_count(), 5);
}

#[test]
fn close_request_ends_the_loop() {
    let settings = HeadlessSettings {
        scripted_events: vec![(3, PlatformEvent::CloseRequested)],
        ..HeadlessSettings::default()
    };
    let mut h = harness(no_calibration(), settings);

    h.engine.setup().unwrap();
    h.engine.run().unwrap();

    assert_eq!(h.engine.context().frame_count(), 2);
    assert_eq!(h.engine.status(), EngineStatus::Stopped);
    assert_eq!(h.host.borrow().closes, 1);
}

#[test]
fn input_is_latched_per_tick() {
    // ARRANGE
    let journal = Journal::default();
    let settings = HeadlessSettings {
        frames_before_close: Some(5),
        scripted_keys: vec![(3, vec![Key::SPACE])],
        ..HeadlessSettings::default()
    };
    let mut h = harness(no_calibration(), settings);
    h.engine.set_scene(Box::new(JournalScene {
        journal: journal.clone(),
        ..JournalScene::default()
    }));

    // ACT
    h.engine.setup().unwrap();
    h.engine.run().unwrap();

    // ASSERT
    // Keys appear on the third host update, which runs the third tick.
    let presses: Vec<String> = entries(&journal)
        .into_iter()
        .filter(|entry| entry.starts_with("space"))
        .collect();
    assert_eq!(presses, vec!["space 3"]);
    let input = h.engine.context().input();
    assert!(input.is_key_down(Key::SPACE));
    assert!(!input.is_key_pressed(Key::SPACE));
}

#[test]
fn debug_mode_draws_a_backdrop_first() {
    let config = EngineConfig {
        debug_mode: true,
        ..no_calibration()
    };
    let mut h = harness(config, closing_after(2));
    h.engine.set_scene(Box::new(JournalScene::default()));

    h.engine.setup().unwrap();
    h.engine.run().unwrap();

    let render = h.render.borrow();
    assert_eq!(render.rects.len(), 2);
    assert_eq!(render.rects[0].1, LinearRgba::CORNFLOWER_BLUE);
    assert_eq!(render.rects[1].1, LinearRgba::WHITE);
}

#[test]
fn calibration_detects_an_honoured_swap_interval() {
    // ARRANGE
    let settings = HeadlessSettings {
        frames_before_close: Some(3),
        swap_cost_ms: 2.0,
        vsync_swap_cost_ms: 16.0,
        ..HeadlessSettings::default()
    };
    let mut h = harness(EngineConfig::default(), settings);

    // ACT
    h.engine.setup().unwrap();
    h.engine.run().unwrap();

    // ASSERT
    let report = h.engine.vsync_report().unwrap();
    assert!(!report.forced);
    assert!(!h.engine.context().forced_vsync());
    let host = h.host.borrow();
    assert_eq!(host.swaps, 25 + 3);
    // Setup, calibration off and on, then settings re-applied.
    assert_eq!(host.swap_intervals, vec![1, 0, 1, 1]);
}

#[test]
fn calibration_detects_forced_vsync() {
    let settings = HeadlessSettings {
        frames_before_close: Some(2),
        swap_cost_ms: 2.0,
        vsync_swap_cost_ms: 16.0,
        forced_vsync: true,
        ..HeadlessSettings::default()
    };
    let mut h = harness(EngineConfig::default(), settings);

    h.engine.setup().unwrap();
    h.engine.run().unwrap();

    assert!(h.engine.vsync_report().unwrap().forced);
    assert!(h.engine.context().forced_vsync());
    assert!(h.engine.renderer().unwrap().forced_vsync());
}
