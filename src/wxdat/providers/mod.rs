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

//! Provider adapters.
//!
//! Each adapter knows how to fetch data from one upstream API and how to map the
//! provider specific response into the canonical [`Observation`] and
//! [`HourlyForecast`] records, converting every value into its canonical unit.
//!
//! Adapters never return errors to their caller. Transport and parse failures are
//! logged and counted by the [`ProviderClient`](crate::client::ProviderClient) and
//! reported as `None` ("not available"). A response with no records is counted as
//! an error by the adapter itself. Fields missing from an otherwise valid
//! response are left unknown in the resulting record.

use crate::client::ClientError;
use crate::model::{HourlyForecast, Observation, Provider};
use std::future::Future;

pub mod accuweather;
pub mod ambient;
pub mod noaa;
pub mod openweather;
pub mod wunderground;

pub use accuweather::AccuWeatherStation;
pub use ambient::AmbientStation;
pub use noaa::NoaaStation;
pub use openweather::OpenWeatherStation;
pub use wunderground::WUndergroundStation;

/// Capabilities of a source of weather data for a single station.
///
/// Each source is owned and called by exactly one recorder so methods take `&mut self`
/// and implementations need no internal locking.
pub trait WeatherSource: Send + 'static {
    /// Configured name of the station.
    fn name(&self) -> &str;

    fn provider(&self) -> Provider;

    /// Fetch current conditions, `None` if they are not available.
    fn current_conditions(&mut self) -> impl Future<Output = Option<Observation>> + Send;

    /// Whether `hourly_forecast()` is supported by this source.
    fn supports_forecast(&self) -> bool {
        false
    }

    /// Fetch the hourly forecast ordered by forecast time, `None` if not available.
    fn hourly_forecast(&mut self) -> impl Future<Output = Option<Vec<HourlyForecast>>> + Send {
        async { None }
    }
}

/// A configured station for one of the supported providers.
#[derive(Debug)]
pub enum Station {
    AccuWeather(AccuWeatherStation),
    Ambient(AmbientStation),
    Noaa(NoaaStation),
    OpenWeather(OpenWeatherStation),
    WUnderground(WUndergroundStation),
}

impl Station {
    /// Make sure the station exists before we start polling it.
    ///
    /// Only some providers have a way to check this, the rest always succeed.
    pub async fn verify(&self) -> Result<(), ClientError> {
        match self {
            Self::Noaa(s) => s.verify().await,
            _ => Ok(()),
        }
    }
}

impl WeatherSource for Station {
    fn name(&self) -> &str {
        match self {
            Self::AccuWeather(s) => s.name(),
            Self::Ambient(s) => s.name(),
            Self::Noaa(s) => s.name(),
            Self::OpenWeather(s) => s.name(),
            Self::WUnderground(s) => s.name(),
        }
    }

    fn provider(&self) -> Provider {
        match self {
            Self::AccuWeather(s) => s.provider(),
            Self::Ambient(s) => s.provider(),
            Self::Noaa(s) => s.provider(),
            Self::OpenWeather(s) => s.provider(),
            Self::WUnderground(s) => s.provider(),
        }
    }

    async fn current_conditions(&mut self) -> Option<Observation> {
        match self {
            Self::AccuWeather(s) => s.current_conditions().await,
            Self::Ambient(s) => s.current_conditions().await,
            Self::Noaa(s) => s.current_conditions().await,
            Self::OpenWeather(s) => s.current_conditions().await,
            Self::WUnderground(s) => s.current_conditions().await,
        }
    }

    fn supports_forecast(&self) -> bool {
        match self {
            Self::AccuWeather(s) => s.supports_forecast(),
            Self::Ambient(s) => s.supports_forecast(),
            Self::Noaa(s) => s.supports_forecast(),
            Self::OpenWeather(s) => s.supports_forecast(),
            Self::WUnderground(s) => s.supports_forecast(),
        }
    }

    async fn hourly_forecast(&mut self) -> Option<Vec<HourlyForecast>> {
        match self {
            Self::AccuWeather(s) => s.hourly_forecast().await,
            Self::Ambient(s) => s.hourly_forecast().await,
            Self::Noaa(s) => s.hourly_forecast().await,
            Self::OpenWeather(s) => s.hourly_forecast().await,
            Self::WUnderground(s) => s.hourly_forecast().await,
        }
    }
}

/// Treat empty strings from upstream APIs the same as missing ones.
pub(crate) fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}
