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

//! Last-used parameter values.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Value returned for keys that were never written.
pub const MISSING_VALUE: i32 = -1;

/// Integer key-value store.
pub trait PreferenceStore: Send {
    /// Stored value, or [`MISSING_VALUE`].
    fn get(&self, key: &str) -> i32;

    /// Store a value.
    fn put(&mut self, key: &str, value: i32) -> Result<()>;
}

/// Preferences kept in a JSON file.
pub struct JsonPreferences {
    path: PathBuf,
    values: BTreeMap<String, i32>,
}

impl JsonPreferences {
    /// Create or open the store in `data_dir`.
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join("preferences.json");
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        info!("Opened preferences: {:?} ({} values)", path, values.len());

        Ok(Self { path, values })
    }

    /// Save to disk.
    fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PreferenceStore for JsonPreferences {
    fn get(&self, key: &str) -> i32 {
        self.values.get(key).copied().unwrap_or(MISSING_VALUE)
    }

    fn put(&mut self, key: &str, value: i32) -> Result<()> {
        debug!("Storing {} = {}", key, value);
        self.values.insert(key.to_string(), value);
        self.save()
    }
}
