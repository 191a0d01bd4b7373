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

//! Bluetooth communication module.
//!
//! Handles the RFCOMM client link to the FES device and the wire encoding of
//! stimulation parameters.

mod bluer_link;
mod error;
mod link;
pub mod protocol;
mod session;

#[cfg(test)]
pub(crate) mod mock;

pub use bluer_link::{BluerLink, BluerSocket, DEFAULT_RFCOMM_CHANNEL};
pub use error::{SendError, SetupError};
pub use link::{PairedDevice, SerialLink, SerialSocket, DEVICE_NAME_PATTERN, SPP_UUID};
pub use protocol::{decode, encode, DecodeError, EncodedMessage, MESSAGE_LEN};
pub use session::{DeviceSession, SessionOptions, SessionState};
