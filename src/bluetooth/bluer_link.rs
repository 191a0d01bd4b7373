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

//! BlueZ RFCOMM client link.

use bluer::rfcomm::{Socket, SocketAddr, Stream};
use bluer::{Adapter, Address, Session};
use std::io;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::link::{PairedDevice, SerialLink, SerialSocket};

/// RFCOMM channel HC-06 modules expose SPP on.
pub const DEFAULT_RFCOMM_CHANNEL: u8 = 1;

fn bluez_error(e: bluer::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

/// Link to the local BlueZ adapter.
pub struct BluerLink {
    session: Option<Session>,
    adapter_name: Option<String>,
    channel: u8,
}

impl BluerLink {
    /// Connect to BlueZ.
    ///
    /// A missing daemon is not an error here; the link then reports the
    /// adapter as unavailable on every attempt.
    pub async fn new(adapter_name: Option<String>, channel: u8) -> Self {
        let session = match Session::new().await {
            Ok(session) => {
                info!("BlueZ session created");
                Some(session)
            }
            Err(e) => {
                warn!("Failed to create BlueZ session: {}", e);
                None
            }
        };

        Self {
            session,
            adapter_name,
            channel,
        }
    }

    async fn adapter(&self) -> io::Result<Adapter> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "BlueZ is not running"))?;

        let adapter = match &self.adapter_name {
            Some(name) => session.adapter(name).map_err(bluez_error)?,
            None => session.default_adapter().await.map_err(bluez_error)?,
        };
        Ok(adapter)
    }
}

impl SerialLink for BluerLink {
    type Socket = BluerSocket;

    async fn adapter_available(&self) -> bool {
        let adapter = match self.adapter().await {
            Ok(adapter) => adapter,
            Err(e) => {
                warn!("No Bluetooth adapter: {}", e);
                return false;
            }
        };

        match adapter.is_powered().await {
            Ok(powered) => {
                debug!("Adapter {} powered: {}", adapter.name(), powered);
                powered
            }
            Err(e) => {
                warn!("Failed to query adapter {}: {}", adapter.name(), e);
                false
            }
        }
    }

    async fn paired_devices(&self) -> io::Result<Vec<PairedDevice>> {
        let adapter = self.adapter().await?;
        let mut devices = Vec::new();

        for addr in adapter.device_addresses().await.map_err(bluez_error)? {
            let device = adapter.device(addr).map_err(bluez_error)?;
            if device.is_paired().await.map_err(bluez_error)? {
                let name = match device.name().await {
                    Ok(Some(name)) => name,
                    _ => device.alias().await.unwrap_or_else(|_| addr.to_string()),
                };
                devices.push(PairedDevice {
                    address: addr.to_string(),
                    name,
                });
            }
        }

        Ok(devices)
    }

    async fn create_socket(&self, device: &PairedDevice, service: Uuid) -> io::Result<BluerSocket> {
        let address: Address = device
            .address
            .parse()
            .map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid device address {}", device.address),
                )
            })?;

        // Only reject when BlueZ has resolved the service list and it lacks
        // the service; unresolved lists are common for classic devices.
        let adapter = self.adapter().await?;
        let remote = adapter.device(address).map_err(bluez_error)?;
        if let Ok(Some(uuids)) = remote.uuids().await {
            if !uuids.contains(&service) {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} does not offer service {}", device.name, service),
                ));
            }
        }

        let socket = Socket::new()?;
        debug!("Allocated RFCOMM socket for {} channel {}", address, self.channel);

        Ok(BluerSocket {
            target: SocketAddr::new(address, self.channel),
            state: SocketState::Unconnected(socket),
        })
    }
}

enum SocketState {
    Unconnected(Socket),
    Connected(Stream),
    Closed,
}

/// RFCOMM socket to one device.
pub struct BluerSocket {
    target: SocketAddr,
    state: SocketState,
}

impl SerialSocket for BluerSocket {
    type Writer = Stream;

    async fn connect(&mut self) -> io::Result<()> {
        match std::mem::replace(&mut self.state, SocketState::Closed) {
            SocketState::Unconnected(socket) => {
                info!("Connecting to {:?}", self.target);
                // On failure the socket is dropped, which releases it.
                let stream = socket.connect(self.target.clone()).await?;
                self.state = SocketState::Connected(stream);
                Ok(())
            }
            other => {
                self.state = other;
                Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "socket is not in the unconnected state",
                ))
            }
        }
    }

    /// Shut down a connected stream.
    ///
    /// `connect` consumes the socket, so after a failed connect there is
    /// nothing left to close and this always succeeds. The double-fault
    /// `SocketClose` error therefore cannot arise on this transport.
    async fn close(&mut self) -> io::Result<()> {
        match std::mem::replace(&mut self.state, SocketState::Closed) {
            SocketState::Connected(mut stream) => stream.shutdown().await,
            SocketState::Unconnected(_) | SocketState::Closed => Ok(()),
        }
    }

    fn output_stream(&mut self) -> io::Result<Stream> {
        match std::mem::replace(&mut self.state, SocketState::Closed) {
            SocketState::Connected(stream) => Ok(stream),
            other => {
                self.state = other;
                Err(io::Error::new(io::ErrorKind::NotConnected, "socket is not connected"))
            }
        }
    }
}
