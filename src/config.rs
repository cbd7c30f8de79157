// Copyright 2025 Chris Custine
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

//! Application configuration management.
//!
//! Persistent defaults are stored in TOML format via `confy`. Every value
//! can be overridden on the command line.

use serde::{Deserialize, Serialize};

/// Application name used for the configuration directory.
const APP_NAME: &str = "aisdecode";

/// Default address for a live AIVDM feed (AIS-catcher, rtl_ais, gpsd relay)
pub const DEFAULT_FEED_ADDRESS: &str = "localhost:10110";

/// Report format
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `legend: value` line per field
    #[default]
    Dump,
    /// Pipe-delimited values, one message per line
    Dsv,
    /// One JSON object per message
    Json,
    /// Message type counts printed at end of input
    Histogram,
}

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Report format used when no format flag is given
    #[serde(default)]
    pub output: OutputFormat,

    /// Render values through their formatters
    #[serde(default)]
    pub scaled: bool,

    /// Stop at the first decoding error
    #[serde(default)]
    pub strict: bool,

    /// Print the raw text of messages with a bad payload length
    #[serde(default)]
    pub show_malformed: bool,

    /// Feed address in host:port format
    #[serde(default = "default_feed_address")]
    pub feed_address: String,

    /// Seconds to wait before reconnecting a dropped feed
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_feed_address() -> String {
    DEFAULT_FEED_ADDRESS.to_string()
}

fn default_reconnect_delay() -> u64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            output: OutputFormat::Dump,
            scaled: false,
            strict: false,
            show_malformed: false,
            feed_address: default_feed_address(),
            reconnect_delay_secs: default_reconnect_delay(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, "config")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, "config", self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, "config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.output, OutputFormat::Dump);
        assert_eq!(config.feed_address, DEFAULT_FEED_ADDRESS);
        assert_eq!(config.reconnect_delay_secs, 5);
        assert!(!config.strict);
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"output": "json", "scaled": true}"#).unwrap();
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.scaled);
        assert_eq!(config.config_version, 1);
        assert_eq!(config.feed_address, DEFAULT_FEED_ADDRESS);
    }
}
