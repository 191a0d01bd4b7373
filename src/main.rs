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

//! FES Controller Desktop Application

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fes_controller::bluetooth::{BluerLink, DeviceSession};
use fes_controller::config::Config;
use fes_controller::controller::Controller;
use fes_controller::state::AppState;
use fes_controller::storage::JsonPreferences;
use fes_controller::ui;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging; stdout belongs to the console prompt
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("Starting FES Controller v{}...", env!("CARGO_PKG_VERSION"));
    info!(
        "Looking for devices named '{}' (service {})",
        config.device.name_pattern, config.device.service_uuid
    );

    // Initialize storage
    let prefs = JsonPreferences::new(&config.data_dir)?;

    let link = BluerLink::new(config.device.adapter.clone(), config.device.rfcomm_channel).await;
    let session = DeviceSession::new(link, config.device.session_options());
    let mut controller = Controller::new(session, prefs, AppState::new());

    ui::run_console(&mut controller).await?;

    controller.shutdown().await;
    info!("FES Controller stopped");
    Ok(())
}
