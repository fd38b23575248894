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

use super::platform::HeadlessSettings;
use lumen_core::platform::{Host, InputState, PlatformEvent};
use lumen_core::ManualTimeSource;
use std::cell::RefCell;
use std::rc::Rc;

/// What happened to a [`HeadlessHost`].
#[derive(Debug, Clone, Default)]
pub struct HostRecord {
    /// Calls to [`Host::update`] made while open.
    pub updates: u64,
    /// Buffer swaps performed.
    pub swaps: u64,
    /// Every swap interval requested, in order.
    pub swap_intervals: Vec<u32>,
    /// Messages shown through [`Host::display_message_box`].
    pub messages: Vec<String>,
    /// Number of times [`Host::close`] closed an open host.
    pub closes: u32,
}

/// A [`Host`] without a window.
pub struct HeadlessHost {
    settings: HeadlessSettings,
    clock: ManualTimeSource,
    events: flume::Sender<PlatformEvent>,
    record: Rc<RefCell<HostRecord>>,
    open: bool,
    swap_interval: u32,
    size: (u32, u32),
    focused: bool,
    input: InputState,
}

impl HeadlessHost {
    /// Creates an open host.
    pub fn new(
        settings: HeadlessSettings,
        size: (u32, u32),
        clock: ManualTimeSource,
        events: flume::Sender<PlatformEvent>,
        record: Rc<RefCell<HostRecord>>,
    ) -> Self {
        Self {
            settings,
            clock,
            events,
            record,
            open: true,
            swap_interval: 0,
            size,
            focused: true,
            input: InputState::default(),
        }
    }

    fn emit(&mut self, event: PlatformEvent) {
        match event {
            PlatformEvent::Resized { width, height } => self.size = (width, height),
            PlatformEvent::FocusChanged(focused) => self.focused = focused,
            PlatformEvent::CloseRequested => {}
        }
        if self.events.send(event).is_err() {
            log::warn!("Headless host event dropped: {event:?}");
        }
    }
}

impl Host for HeadlessHost {
    fn update(&mut self) -> bool {
        if !self.open {
            return false;
        }

        let update = {
            let mut record = self.record.borrow_mut();
            record.updates += 1;
            record.updates
        };
        if let Some(limit) = self.settings.frames_before_close {
            if update > limit {
                self.close();
                return false;
            }
        }

        let events: Vec<PlatformEvent> = self
            .settings
            .scripted_events
            .iter()
            .filter(|(at, _)| *at == update)
            .map(|(_, event)| *event)
            .collect();
        for event in events {
            self.emit(event);
        }

        if let Some((_, keys)) = self
            .settings
            .scripted_keys
            .iter()
            .rev()
            .find(|(from, _)| *from <= update)
        {
            self.input.keys_down = keys.iter().copied().collect();
        }

        self.open
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn swap_buffers(&mut self) {
        let vsync = self.swap_interval > 0 || self.settings.forced_vsync;
        let cost = if vsync {
            self.settings.vsync_swap_cost_ms
        } else {
            self.settings.swap_cost_ms
        };
        self.clock.advance(cost);
        self.record.borrow_mut().swaps += 1;
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.swap_interval = interval;
        self.record.borrow_mut().swap_intervals.push(interval);
    }

    fn swap_interval(&self) -> u32 {
        self.swap_interval
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn input(&self) -> &InputState {
        &self.input
    }

    fn display_message_box(&mut self, message: &str) {
        log::info!("[message box] {message}");
        self.record.borrow_mut().messages.push(message.to_owned());
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.record.borrow_mut().closes += 1;
            log::debug!("Headless host closed.");
        }
    }
}
