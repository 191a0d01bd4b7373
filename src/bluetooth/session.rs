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

//! Connection lifecycle for one FES device.
//!
//! ```text
//! Idle -> Discovering -> Connecting -> StreamReady <-> Sending
//!   ^          |              |             |
//!   +----------+--------------+-------------+  (teardown)
//! ```
//!
//! `setup` walks the chain in one call. Any failure returns the session to
//! `Idle` with no transport held; the next `setup` starts again from
//! discovery. `send` never tears down: a failed write leaves the session
//! ready so the operator can retry.
//!
//! Nothing here has a timeout. A hung connect or write blocks the awaiting
//! task until the OS gives up; callers that need a bound wrap the future.

use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::{SendError, SetupError};
use super::link::{PairedDevice, SerialLink, SerialSocket, DEVICE_NAME_PATTERN, SPP_UUID};
use super::protocol::EncodedMessage;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Discovering,
    Connecting,
    StreamReady,
    Sending,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Discovering => "Discovering",
            SessionState::Connecting => "Connecting",
            SessionState::StreamReady => "Ready",
            SessionState::Sending => "Sending",
        }
    }
}

/// How the session finds and addresses the device.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Substring a paired device's name must contain.
    pub name_pattern: String,
    /// Service requested when opening the socket.
    pub service_uuid: Uuid,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            name_pattern: DEVICE_NAME_PATTERN.to_string(),
            service_uuid: SPP_UUID,
        }
    }
}

/// Socket and stream of an established connection. Only exists whole.
struct Transport<S: SerialSocket> {
    device: PairedDevice,
    socket: S,
    writer: S::Writer,
}

/// Owns the link to one FES device.
pub struct DeviceSession<L: SerialLink> {
    link: L,
    options: SessionOptions,
    state: SessionState,
    transport: Option<Transport<L::Socket>>,
}

impl<L: SerialLink> DeviceSession<L> {
    /// Create an idle session over `link`.
    pub fn new(link: L, options: SessionOptions) -> Self {
        Self {
            link,
            options,
            state: SessionState::Idle,
            transport: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.transport.is_some()
    }

    /// Name of the connected device, if any.
    pub fn device_name(&self) -> Option<&str> {
        self.transport.as_ref().map(|t| t.device.name.as_str())
    }

    /// Discover, connect and open the stream.
    ///
    /// Returns immediately if the session is already ready. Otherwise no
    /// state from an earlier attempt is reused.
    pub async fn setup(&mut self) -> Result<(), SetupError> {
        if self.is_ready() {
            debug!("Session already ready, skipping setup");
            return Ok(());
        }

        let result = self.run_setup().await;
        if let Err(ref e) = result {
            warn!("Session setup failed: {}", e);
            self.state = SessionState::Idle;
        }
        result
    }

    async fn run_setup(&mut self) -> Result<(), SetupError> {
        self.state = SessionState::Discovering;
        let device = self.discover().await?;
        info!("Found FES device: {} ({})", device.name, device.address);

        self.state = SessionState::Connecting;
        let mut socket = self
            .link
            .create_socket(&device, self.options.service_uuid)
            .await
            .map_err(SetupError::SocketInit)?;

        if let Err(connect) = socket.connect().await {
            return Err(match socket.close().await {
                Ok(()) => SetupError::Connect {
                    device: device.name,
                    source: connect,
                },
                Err(close) => {
                    error!("Failed to close half-open socket: {}", close);
                    SetupError::SocketClose {
                        device: device.name,
                        connect,
                        close,
                    }
                }
            });
        }
        info!("Connected to {}", device.name);

        let writer = match socket.output_stream() {
            Ok(writer) => writer,
            Err(e) => {
                if let Err(close) = socket.close().await {
                    warn!("Failed to close socket after stream error: {}", close);
                }
                return Err(SetupError::Stream(e));
            }
        };

        self.transport = Some(Transport {
            device,
            socket,
            writer,
        });
        self.state = SessionState::StreamReady;
        info!("Session ready");
        Ok(())
    }

    /// First paired device whose name contains the pattern.
    async fn discover(&self) -> Result<PairedDevice, SetupError> {
        if !self.link.adapter_available().await {
            return Err(SetupError::AdapterUnavailable);
        }

        let devices = self.link.paired_devices().await.map_err(|e| {
            warn!("Failed to list paired devices: {}", e);
            SetupError::AdapterUnavailable
        })?;
        debug!("{} paired device(s)", devices.len());

        devices
            .into_iter()
            .find(|d| d.name.contains(&self.options.name_pattern))
            .ok_or_else(|| SetupError::DeviceNotFound {
                pattern: self.options.name_pattern.clone(),
            })
    }

    /// Write one message to the device.
    pub async fn send(&mut self, message: &EncodedMessage) -> Result<(), SendError> {
        let transport = self.transport.as_mut().ok_or(SendError::NotReady)?;

        self.state = SessionState::Sending;
        debug!("Sending {:?}", message.as_str());
        let result = async {
            transport.writer.write_all(message.as_bytes()).await?;
            transport.writer.flush().await
        }
        .await;
        self.state = SessionState::StreamReady;

        match result {
            Ok(()) => {
                info!("Sent {} bytes to {}", message.as_bytes().len(), transport.device.name);
                Ok(())
            }
            Err(e) => {
                error!("Send to {} failed: {}", transport.device.name, e);
                Err(SendError::Write(e))
            }
        }
    }

    /// Drop the connection and return to `Idle`.
    pub async fn teardown(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            info!("Closing connection to {}", transport.device.name);
            if let Err(e) = transport.writer.shutdown().await {
                debug!("Stream shutdown failed: {}", e);
            }
            if let Err(e) = transport.socket.close().await {
                warn!("Socket close failed: {}", e);
            }
        }
        self.state = SessionState::Idle;
    }
}
