// Copyright 2026 Daniel Pelikan
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

//! Application state management.

use parking_lot::RwLock;
use std::sync::Arc;

/// Connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Error => "Error",
        }
    }
}

/// Which controls the front-end should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// Parameter entry fields.
    pub inputs: bool,
    /// Send button.
    pub send: bool,
    /// Bluetooth setup button.
    pub setup: bool,
}

impl Controls {
    /// Before any session: only setup is offered.
    pub const INITIAL: Controls = Controls {
        inputs: false,
        send: false,
        setup: true,
    };

    /// Session established.
    pub const READY: Controls = Controls {
        inputs: true,
        send: true,
        setup: false,
    };

    /// Everything off after an unrecoverable transport error.
    pub const LOCKED: Controls = Controls {
        inputs: false,
        send: false,
        setup: false,
    };
}

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    /// Current connection status.
    pub connection_status: RwLock<ConnectionStatus>,

    /// Connected device name.
    pub connected_device: RwLock<Option<String>>,

    /// Enabled controls.
    pub controls: RwLock<Controls>,

    /// Errors from the current attempt, oldest first.
    pub errors: RwLock<Vec<String>>,

    /// Last transient notice ("Data sent").
    pub notice: RwLock<Option<String>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            connection_status: RwLock::new(ConnectionStatus::Disconnected),
            connected_device: RwLock::new(None),
            controls: RwLock::new(Controls::INITIAL),
            errors: RwLock::new(Vec::new()),
            notice: RwLock::new(None),
        }
    }
}

impl AppState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_connecting(&self) {
        *self.connection_status.write() = ConnectionStatus::Connecting;
    }

    pub fn set_connected(&self, device_name: String) {
        *self.connection_status.write() = ConnectionStatus::Connected;
        *self.connected_device.write() = Some(device_name);
        *self.controls.write() = Controls::READY;
    }

    pub fn set_disconnected(&self) {
        *self.connection_status.write() = ConnectionStatus::Disconnected;
        *self.connected_device.write() = None;
    }

    pub fn set_error(&self) {
        *self.connection_status.write() = ConnectionStatus::Error;
        *self.connected_device.write() = None;
    }

    /// Disable every device-dependent control.
    pub fn disable_all(&self) {
        *self.controls.write() = Controls::LOCKED;
    }

    pub fn get_status(&self) -> ConnectionStatus {
        *self.connection_status.read()
    }

    pub fn get_device_name(&self) -> Option<String> {
        self.connected_device.read().clone()
    }

    pub fn get_controls(&self) -> Controls {
        *self.controls.read()
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.errors.write().push(message.into());
    }

    pub fn push_errors<I>(&self, messages: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.errors.write().extend(messages);
    }

    pub fn clear_errors(&self) {
        self.errors.write().clear();
    }

    pub fn get_errors(&self) -> Vec<String> {
        self.errors.read().clone()
    }

    pub fn set_notice(&self, notice: impl Into<String>) {
        *self.notice.write() = Some(notice.into());
    }

    /// Take the pending notice, if any.
    pub fn take_notice(&self) -> Option<String> {
        self.notice.write().take()
    }
}
