// wxdat - Record weather observations from multiple providers
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! Station configuration loaded from a YAML file.
//!
//! ```yaml
//! update_interval: 300
//! output: /var/lib/wxdat/records.jsonl
//! stations:
//!   - name: home
//!     provider: noaa
//!     station: KBOS
//!   - name: backyard
//!     provider: ambient
//!     update_interval: 60
//!     device_id: "AA:BB:CC:DD:EE:FF"
//!     app_key: "..."
//!     user_key: "..."
//! ```

use crate::client::{ClientError, ProviderClient, RateLimiters};
use crate::metrics::WeatherMetrics;
use crate::model::Provider;
use crate::providers::{
    accuweather, ambient, noaa, openweather, wunderground, AccuWeatherStation, AmbientStation, NoaaStation,
    OpenWeatherStation, Station, WUndergroundStation,
};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 300;

/// Environment variable that overrides the output path from the config file.
pub const OUTPUT_ENV_VAR: &str = "WXDAT_OUTPUT";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error, PathBuf),
    Parse(serde_yaml::Error),
    Invalid(String),
    Station(String, ClientError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e, path) => write!(f, "unable to read {}: {}", path.display(), e),
            Self::Parse(e) => write!(f, "unable to parse configuration: {}", e),
            Self::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
            Self::Station(name, e) => write!(f, "unable to create station {}: {}", name, e),
        }
    }
}

impl error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(e, _) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Station(_, e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

fn default_update_interval() -> u64 {
    DEFAULT_UPDATE_INTERVAL_SECS
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Default polling interval for each station, in seconds.
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,
    /// File to append records to as JSON lines. Records are logged if unset.
    #[serde(default)]
    pub output: Option<PathBuf>,
    pub stations: Vec<StationConfig>,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e, path.to_path_buf()))?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(yaml).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval == 0 {
            return Err(ConfigError::Invalid("update_interval must be greater than zero".to_owned()));
        }

        let mut names = HashSet::new();
        for station in self.stations.iter() {
            if !names.insert(station.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate station name {}", station.name)));
            }

            station.validate()?;
        }

        Ok(())
    }

    /// Polling interval for a station, falling back to the global interval.
    pub fn interval(&self, station: &StationConfig) -> Duration {
        Duration::from_secs(station.update_interval.unwrap_or(self.update_interval))
    }

    /// Output path to use, preferring the command line, then the environment, then
    /// the config file.
    pub fn output(&self, cli: Option<&Path>) -> Option<PathBuf> {
        let env = std::env::var_os(OUTPUT_ENV_VAR).map(PathBuf::from);
        resolve_output(cli, env, self.output.as_deref())
    }
}

fn resolve_output(cli: Option<&Path>, env: Option<PathBuf>, file: Option<&Path>) -> Option<PathBuf> {
    cli.map(Path::to_path_buf)
        .or_else(|| env.filter(|p| !p.as_os_str().is_empty()))
        .or_else(|| file.map(Path::to_path_buf))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationConfig {
    /// Name used for logs and metric labels.
    pub name: String,
    /// Polling interval override, in seconds.
    #[serde(default)]
    pub update_interval: Option<u64>,
    /// Base URL override for the provider API.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(flatten)]
    pub provider: ProviderConfig,
}

/// Provider specific settings, selected by the `provider` key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderConfig {
    AccuWeather {
        location: String,
        api_key: String,
    },
    Ambient {
        device_id: String,
        app_key: String,
        user_key: String,
    },
    Noaa {
        station: String,
    },
    OpenWeather {
        api_key: String,
        latitude: f64,
        longitude: f64,
    },
    WUnderground {
        station_id: String,
        api_key: String,
    },
}

impl ProviderConfig {
    pub fn provider(&self) -> Provider {
        match self {
            Self::AccuWeather { .. } => Provider::AccuWeather,
            Self::Ambient { .. } => Provider::AmbientWeather,
            Self::Noaa { .. } => Provider::Noaa,
            Self::OpenWeather { .. } => Provider::OpenWeatherMap,
            Self::WUnderground { .. } => Provider::WUnderground,
        }
    }

    fn default_api_url(&self) -> &'static str {
        match self {
            Self::AccuWeather { .. } => accuweather::DEFAULT_API_URL,
            Self::Ambient { .. } => ambient::DEFAULT_API_URL,
            Self::Noaa { .. } => noaa::DEFAULT_API_URL,
            Self::OpenWeather { .. } => openweather::DEFAULT_API_URL,
            Self::WUnderground { .. } => wunderground::DEFAULT_API_URL,
        }
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::AccuWeather { location, api_key } => {
                vec![("location", location.as_str()), ("api_key", api_key.as_str())]
            }
            Self::Ambient {
                device_id,
                app_key,
                user_key,
            } => vec![
                ("device_id", device_id.as_str()),
                ("app_key", app_key.as_str()),
                ("user_key", user_key.as_str()),
            ],
            Self::Noaa { station } => vec![("station", station.as_str())],
            Self::OpenWeather { api_key, .. } => vec![("api_key", api_key.as_str())],
            Self::WUnderground { station_id, api_key } => {
                vec![("station_id", station_id.as_str()), ("api_key", api_key.as_str())]
            }
        }
    }
}

impl StationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("station name must not be empty".to_owned()));
        }

        if self.update_interval == Some(0) {
            return Err(ConfigError::Invalid(format!(
                "update_interval for station {} must be greater than zero",
                self.name
            )));
        }

        for (key, value) in self.provider.required() {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} for station {} must not be empty", key, self.name)));
            }
        }

        if let ProviderConfig::OpenWeather { latitude, longitude, .. } = &self.provider {
            if !(-90.0..=90.0).contains(latitude) || !(-180.0..=180.0).contains(longitude) {
                return Err(ConfigError::Invalid(format!(
                    "coordinates for station {} are out of range",
                    self.name
                )));
            }
        }

        Ok(())
    }

    /// Create the station this configuration describes.
    ///
    /// Stations using the same provider share a rate limiter.
    pub fn build(
        &self,
        http: &Client,
        limiters: &mut RateLimiters,
        metrics: &WeatherMetrics,
    ) -> Result<Station, ConfigError> {
        let provider = self.provider.provider();
        let client = ProviderClient::new(
            http.clone(),
            limiters.get(provider),
            metrics.client(provider, &self.name),
        );
        let url = self.api_url.as_deref().unwrap_or_else(|| self.provider.default_api_url());
        let name = self.name.as_str();

        let station = match &self.provider {
            ProviderConfig::AccuWeather { location, api_key } => {
                AccuWeatherStation::new(name, location, api_key, client, url).map(Station::AccuWeather)
            }
            ProviderConfig::Ambient {
                device_id,
                app_key,
                user_key,
            } => AmbientStation::new(name, device_id, app_key, user_key, client, url).map(Station::Ambient),
            ProviderConfig::Noaa { station } => NoaaStation::new(name, station, client, url).map(Station::Noaa),
            ProviderConfig::OpenWeather {
                api_key,
                latitude,
                longitude,
            } => OpenWeatherStation::new(name, api_key, *latitude, *longitude, client, url).map(Station::OpenWeather),
            ProviderConfig::WUnderground { station_id, api_key } => {
                WUndergroundStation::new(name, station_id, api_key, client, url).map(Station::WUnderground)
            }
        };

        station.map_err(|e| ConfigError::Station(self.name.clone(), e))
    }
}
