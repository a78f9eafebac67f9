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
//! Configuration is stored as TOML through `confy`. Every field has a serde
//! default so older or hand-edited files keep loading. The API token may
//! also come from the `FR24_API_TOKEN` environment variable, which wins over
//! the file.

use std::time::Duration;

use chrono::FixedOffset;
use flight_feed::feed::{
    DEFAULT_ALTITUDE_RANGES, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_CATEGORIES,
};
use flight_feed::FeedConfig;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "flights-overhead";
const CONFIG_NAME: &str = "config";

/// Environment variable holding the flight API token
pub const API_TOKEN_ENV: &str = "FR24_API_TOKEN";

/// Airline logo URL; `%%` is replaced by the two-letter airline code
pub const DEFAULT_LOGO_URL_TEMPLATE: &str =
    "https://content.airhex.com/content/logos/airlines_%%_130_130_s.png";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Flight API bearer token (env var takes precedence)
    #[serde(default)]
    pub api_token: Option<String>,

    /// Flight positions endpoint
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Value sent in the Accept-Version header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Search radius around the observer in statute miles
    #[serde(default = "default_radius_miles")]
    pub radius_miles: f64,

    /// Altitude filter in feet, "min-max"
    #[serde(default = "default_altitude_ranges")]
    pub altitude_ranges: String,

    /// Aircraft category codes, comma separated
    #[serde(default = "default_categories")]
    pub categories: String,

    /// Seconds each flight card stays on screen
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// HTTP timeout for API and geolocation requests
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Override observer latitude (skips IP geolocation)
    #[serde(default)]
    pub override_latitude: Option<f64>,

    /// Override observer longitude (skips IP geolocation)
    #[serde(default)]
    pub override_longitude: Option<f64>,

    /// Fixed UTC offset for ETA display; local time zone when unset.
    ///
    /// The offset does not follow daylight saving time: `-300` (US/Eastern
    /// standard time) shows ETAs an hour early while EDT is in effect.
    /// Leave unset to use the system time zone, which does.
    #[serde(default)]
    pub eta_utc_offset_minutes: Option<i32>,

    /// Airline logo URL template
    #[serde(default = "default_logo_url_template")]
    pub logo_url_template: String,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_radius_miles() -> f64 {
    20.0
}

fn default_altitude_ranges() -> String {
    DEFAULT_ALTITUDE_RANGES.to_string()
}

fn default_categories() -> String {
    DEFAULT_CATEGORIES.to_string()
}

fn default_refresh_interval_secs() -> u64 {
    6
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_logo_url_template() -> String {
    DEFAULT_LOGO_URL_TEMPLATE.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            api_token: None,
            api_base_url: default_api_base_url(),
            api_version: default_api_version(),
            radius_miles: default_radius_miles(),
            altitude_ranges: default_altitude_ranges(),
            categories: default_categories(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            override_latitude: None,
            override_longitude: None,
            eta_utc_offset_minutes: None,
            logo_url_template: default_logo_url_template(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults on first run
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Resolve the API token from the environment or the config file
    pub fn resolve_api_token(&self) -> Option<String> {
        resolve_token(std::env::var(API_TOKEN_ENV).ok(), self.api_token.as_deref())
    }

    /// Where the resolved token came from, for log output
    pub fn api_token_source(&self) -> Option<&'static str> {
        if std::env::var(API_TOKEN_ENV).is_ok_and(|k| !k.trim().is_empty()) {
            Some("environment variable")
        } else if self.api_token.as_deref().is_some_and(|k| !k.trim().is_empty()) {
            Some("config file")
        } else {
            None
        }
    }

    /// Build the feed settings around a resolved token
    pub fn feed_config(&self, api_token: String) -> FeedConfig {
        FeedConfig {
            base_url: self.api_base_url.clone(),
            api_token,
            api_version: self.api_version.clone(),
            altitude_ranges: self.altitude_ranges.clone(),
            categories: self.categories.clone(),
            timeout: self.request_timeout(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    /// Configured observer position, only when both coordinates are set
    pub fn observer_override(&self) -> Option<(f64, f64)> {
        self.override_latitude.zip(self.override_longitude)
    }

    /// Offset used to display ETAs, `None` for the local time zone
    pub fn eta_offset(&self) -> Option<FixedOffset> {
        self.eta_utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes.checked_mul(60)?))
    }
}

fn resolve_token(env_value: Option<String>, config_value: Option<&str>) -> Option<String> {
    // Check environment variable first
    if let Some(key) = env_value.map(|k| k.trim().to_string()) {
        if !key.is_empty() {
            return Some(key);
        }
    }

    // Fall back to config
    config_value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
