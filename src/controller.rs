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

//! Operator actions wired through validation, encoding and the session.

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::bluetooth::{encode, DeviceSession, EncodedMessage, SendError, SerialLink, SetupError};
use crate::params::{parse_fields, validate_values, Field, InvalidParameters, ParseError};
use crate::state::AppState;
use crate::storage::PreferenceStore;

/// Notice shown after a successful send.
pub const SENT_NOTICE: &str = "Data sent";

/// Why a send attempt produced no transmission.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Invalid(#[from] InvalidParameters),

    #[error(transparent)]
    Send(#[from] SendError),
}

/// Drives one device session on behalf of the front-end.
pub struct Controller<L: SerialLink, P: PreferenceStore> {
    session: DeviceSession<L>,
    prefs: P,
    state: Arc<AppState>,
}

impl<L: SerialLink, P: PreferenceStore> Controller<L, P> {
    pub fn new(session: DeviceSession<L>, prefs: P, state: Arc<AppState>) -> Self {
        Self {
            session,
            prefs,
            state,
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn session(&self) -> &DeviceSession<L> {
        &self.session
    }

    /// Last values that passed validation, in field order.
    pub fn last_values(&self) -> [i32; 4] {
        Field::ALL.map(|field| self.prefs.get(field.key()))
    }

    /// Establish the device session.
    ///
    /// On success the parameter inputs and send control are enabled. Failures
    /// are appended to the error list; transport failures also disable every
    /// control.
    pub async fn setup_device(&mut self) -> Result<(), SetupError> {
        self.state.set_connecting();

        match self.session.setup().await {
            Ok(()) => {
                let name = self.session.device_name().unwrap_or_default().to_string();
                info!("Device ready: {}", name);
                self.state.set_connected(name);
                Ok(())
            }
            Err(e) => {
                self.state.set_error();
                self.state.push_errors(e.user_messages());
                if e.locks_out() {
                    error!("Locking controls after setup failure: {}", e);
                    self.state.disable_all();
                }
                Err(e)
            }
        }
    }

    /// Validate, store, encode and send one set of raw field inputs.
    ///
    /// The error list is cleared first. Parse failures are reported once and
    /// skip range checks; range failures are reported per field.
    pub async fn submit(&mut self, inputs: [&str; 4]) -> Result<EncodedMessage, SubmitError> {
        self.state.clear_errors();

        let values = match parse_fields(inputs) {
            Ok(values) => values,
            Err(e) => {
                warn!("Unparseable {} input: {:?}", e.field, e.input);
                self.state.push_error(e.to_string());
                return Err(e.into());
            }
        };

        let params = match validate_values(values) {
            Ok(params) => params,
            Err(e) => {
                warn!("Rejected parameters {:?}: {}", values, e);
                self.state.push_errors(e.messages());
                return Err(e.into());
            }
        };

        self.save_values(values);

        let message = encode(&params);
        info!("Sending {} as {:?}", params, message.as_str());

        match self.session.send(&message).await {
            Ok(()) => {
                self.state.set_notice(SENT_NOTICE);
                Ok(message)
            }
            Err(e) => {
                self.state.push_error(e.user_message());
                Err(e.into())
            }
        }
    }

    fn save_values(&mut self, values: [i32; 4]) {
        for (field, value) in Field::ALL.into_iter().zip(values) {
            if let Err(e) = self.prefs.put(field.key(), value) {
                error!("Failed to store {}: {}", field.key(), e);
                let label = field.label().to_lowercase();
                self.state.push_error(format!("Could not save the {} value.", label));
            }
        }
    }

    /// Force every device-dependent control off.
    pub fn disable_all(&self) {
        info!("Disabling all device controls");
        self.state.disable_all();
    }

    /// Close the session.
    pub async fn shutdown(&mut self) {
        self.session.teardown().await;
        self.state.set_disconnected();
    }
}
