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

//! Transport abstraction for serial-profile links.

use std::future::Future;
use std::io;
use tokio::io::AsyncWrite;
use uuid::Uuid;

/// Standard SPP UUID.
pub const SPP_UUID: Uuid = Uuid::from_u128(0x00001101_0000_1000_8000_00805F9B34FB);

/// Name fragment identifying the FES device's radio module.
pub const DEVICE_NAME_PATTERN: &str = "HC-06";

/// A paired Bluetooth device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedDevice {
    pub address: String,
    pub name: String,
}

/// Access to the local radio.
pub trait SerialLink: Send + Sync {
    /// Socket type produced by this link.
    type Socket: SerialSocket;

    /// Whether an adapter is present and powered.
    fn adapter_available(&self) -> impl Future<Output = bool> + Send;

    /// Devices currently paired with the adapter, in transport order.
    fn paired_devices(&self) -> impl Future<Output = io::Result<Vec<PairedDevice>>> + Send;

    /// Allocate an unconnected socket for `service` on `device`.
    fn create_socket(
        &self,
        device: &PairedDevice,
        service: Uuid,
    ) -> impl Future<Output = io::Result<Self::Socket>> + Send;
}

/// A serial-profile socket.
pub trait SerialSocket: Send {
    /// Writable byte stream handed out once the socket is connected.
    type Writer: AsyncWrite + Unpin + Send;

    /// Run the connect handshake.
    fn connect(&mut self) -> impl Future<Output = io::Result<()>> + Send;

    /// Release the socket.
    fn close(&mut self) -> impl Future<Output = io::Result<()>> + Send;

    /// Take the writable stream of a connected socket.
    fn output_stream(&mut self) -> io::Result<Self::Writer>;
}
