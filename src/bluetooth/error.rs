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

//! Device session errors and their user-facing messages.

use std::io;
use thiserror::Error;

const ADAPTER_UNAVAILABLE_MESSAGE: &str =
    "Please turn on bluetooth and pair with the device.";
const DEVICE_NOT_FOUND_MESSAGE: &str =
    "FES device not found. Make sure that the FES device is powered and paired to this computer, then restart the app and FES device.";
const SOCKET_INIT_MESSAGE: &str = "Bluetooth socket initialization error. Restart your device.";
const CONNECT_MESSAGE: &str =
    "Could not connect to the FES device. Make sure that it is powered and in range, then try again.";
const SOCKET_CLOSE_MESSAGE: &str = "Bluetooth socket close error. Restart your device.";
const STREAM_MESSAGE: &str = "Output stream error. Restart the app or your device.";
const SEND_MESSAGE: &str =
    "Message sending error. Make sure that the FES device is powered and paired to this computer, then restart the app and FES device.";
const NOT_READY_MESSAGE: &str = "Set up Bluetooth before sending.";

/// Failure while establishing a session.
#[derive(Debug, Error)]
pub enum SetupError {
    /// No adapter, or the adapter is powered off.
    #[error("Bluetooth adapter unavailable")]
    AdapterUnavailable,

    /// No paired device name contains the pattern.
    #[error("no paired device matching '{pattern}'")]
    DeviceNotFound { pattern: String },

    /// Socket allocation failed.
    #[error("socket initialization failed: {0}")]
    SocketInit(#[source] io::Error),

    /// Connect handshake failed; the socket was closed cleanly.
    #[error("connect to {device} failed: {source}")]
    Connect { device: String, source: io::Error },

    /// Connect handshake failed and closing the half-open socket failed too.
    #[error("connect to {device} failed ({connect}) and socket close failed: {close}")]
    SocketClose {
        device: String,
        connect: io::Error,
        #[source]
        close: io::Error,
    },

    /// The connected socket had no writable stream.
    #[error("output stream unavailable: {0}")]
    Stream(#[source] io::Error),
}

impl SetupError {
    /// Messages to show the operator, in order.
    pub fn user_messages(&self) -> Vec<String> {
        let messages: &[&str] = match self {
            SetupError::AdapterUnavailable => &[ADAPTER_UNAVAILABLE_MESSAGE],
            SetupError::DeviceNotFound { .. } => &[DEVICE_NOT_FOUND_MESSAGE],
            SetupError::SocketInit(_) => &[SOCKET_INIT_MESSAGE],
            SetupError::Connect { .. } => &[CONNECT_MESSAGE],
            SetupError::SocketClose { .. } => &[CONNECT_MESSAGE, SOCKET_CLOSE_MESSAGE],
            SetupError::Stream(_) => &[STREAM_MESSAGE],
        };
        messages.iter().map(|m| m.to_string()).collect()
    }

    /// Whether device-dependent controls must be disabled.
    ///
    /// A missing adapter or device is something the operator can fix and
    /// retry; anything that fails after socket allocation locks the controls.
    pub fn locks_out(&self) -> bool {
        !matches!(
            self,
            SetupError::AdapterUnavailable | SetupError::DeviceNotFound { .. }
        )
    }
}

/// Failure while sending a message.
#[derive(Debug, Error)]
pub enum SendError {
    /// The session never reached the ready state.
    #[error("session is not ready")]
    NotReady,

    /// The write to the stream failed.
    #[error("write failed: {0}")]
    Write(#[from] io::Error),
}

impl SendError {
    pub fn user_message(&self) -> String {
        match self {
            SendError::NotReady => NOT_READY_MESSAGE.to_string(),
            SendError::Write(_) => SEND_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_err() -> io::Error {
        io::Error::new(io::ErrorKind::Other, "boom")
    }

    #[test]
    fn test_lockout_policy() {
        assert!(!SetupError::AdapterUnavailable.locks_out());
        assert!(!SetupError::DeviceNotFound {
            pattern: "HC-06".into()
        }
        .locks_out());
        assert!(SetupError::SocketInit(io_err()).locks_out());
        assert!(SetupError::Stream(io_err()).locks_out());
        assert!(SetupError::Connect {
            device: "x".into(),
            source: io_err()
        }
        .locks_out());
    }

    #[test]
    fn test_double_fault_reports_both() {
        let err = SetupError::SocketClose {
            device: "HC-06".into(),
            connect: io_err(),
            close: io_err(),
        };
        assert_eq!(err.user_messages(), vec![CONNECT_MESSAGE, SOCKET_CLOSE_MESSAGE]);
    }
}
