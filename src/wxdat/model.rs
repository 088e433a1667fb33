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

//! Provider independent weather records.
//!
//! Every numeric field is stored in one fixed canonical unit regardless of the unit
//! used by the upstream API. The canonical units are encoded in the field types so
//! that adapters are forced to convert at the boundary:
//!
//! * temperatures: Fahrenheit
//! * speeds: miles per hour
//! * pressures: inches of mercury
//! * precipitation accumulation: inches, precipitation rate: inches per hour
//! * visibility: miles
//!
//! Bearings are degrees (0-360), humidity and cloud cover are percentages (0-100).

use crate::units::{Fahrenheit, Inch, InchesMercury, InchesPerHour, MilesPerHour, Mile, Quantity, Temperature, Unit};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Upstream weather data providers supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Provider {
    AccuWeather,
    AmbientWeather,
    #[serde(rename = "NOAA")]
    Noaa,
    OpenWeatherMap,
    #[serde(rename = "WUndergroundPWS")]
    WUnderground,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccuWeather => "AccuWeather",
            Self::AmbientWeather => "AmbientWeather",
            Self::Noaa => "NOAA",
            Self::OpenWeatherMap => "OpenWeatherMap",
            Self::WUnderground => "WUndergroundPWS",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current conditions for a single station at a single instant.
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub provider: Provider,
    pub station_id: String,

    pub temperature: Quantity<Fahrenheit>,
    pub feels_like: Quantity<Fahrenheit>,
    pub dew_point: Quantity<Fahrenheit>,

    pub wind_speed: Quantity<MilesPerHour>,
    pub wind_gust: Quantity<MilesPerHour>,
    pub wind_bearing: Option<f64>,

    pub humidity: Option<f64>,

    pub abs_pressure: Quantity<InchesMercury>,
    pub rel_pressure: Quantity<InchesMercury>,

    pub precip_rate: Quantity<InchesPerHour>,
    pub precip_hour: Quantity<Inch>,
    pub precip_day: Quantity<Inch>,
    pub precip_week: Quantity<Inch>,
    pub precip_month: Quantity<Inch>,
    pub precip_year: Quantity<Inch>,
    pub precip_total: Quantity<Inch>,

    pub cloud_cover: Option<f64>,
    pub visibility: Quantity<Mile>,
    pub uv_index: Option<f64>,
    pub ozone: Option<f64>,
    pub solar_radiation: Option<f64>,
    pub solar_lux: Option<f64>,

    pub remarks: Option<String>,
}

impl Observation {
    /// Create an observation with only identity fields set, all measurements unknown.
    pub fn new<S: Into<String>>(timestamp: DateTime<Utc>, provider: Provider, station_id: S) -> Self {
        Observation {
            timestamp,
            provider,
            station_id: station_id.into(),
            temperature: Quantity::unknown(),
            feels_like: Quantity::unknown(),
            dew_point: Quantity::unknown(),
            wind_speed: Quantity::unknown(),
            wind_gust: Quantity::unknown(),
            wind_bearing: None,
            humidity: None,
            abs_pressure: Quantity::unknown(),
            rel_pressure: Quantity::unknown(),
            precip_rate: Quantity::unknown(),
            precip_hour: Quantity::unknown(),
            precip_day: Quantity::unknown(),
            precip_week: Quantity::unknown(),
            precip_month: Quantity::unknown(),
            precip_year: Quantity::unknown(),
            precip_total: Quantity::unknown(),
            cloud_cover: None,
            visibility: Quantity::unknown(),
            uv_index: None,
            ozone: None,
            solar_radiation: None,
            solar_lux: None,
            remarks: None,
        }
    }
}

/// Forecast conditions for one upcoming hour.
///
/// `timestamp` is the hour being forecast while `origin_time` is when the forecast
/// was generated (or fetched, for providers that don't report it).
#[derive(Debug, Clone, Serialize)]
pub struct HourlyForecast {
    pub timestamp: DateTime<Utc>,
    pub origin_time: DateTime<Utc>,
    pub provider: Provider,
    pub station_id: String,

    pub temperature: Quantity<Fahrenheit>,
    pub feels_like: Quantity<Fahrenheit>,
    pub dew_point: Quantity<Fahrenheit>,

    pub wind_speed: Quantity<MilesPerHour>,
    pub wind_gust: Quantity<MilesPerHour>,
    pub wind_bearing: Option<f64>,

    pub humidity: Option<f64>,
    pub precip: Quantity<InchesPerHour>,
    pub precip_probability: Option<f64>,

    pub abs_pressure: Quantity<InchesMercury>,
    pub rel_pressure: Quantity<InchesMercury>,

    pub cloud_cover: Option<f64>,
    pub visibility: Quantity<Mile>,
    pub uv_index: Option<f64>,
    pub ozone: Option<f64>,

    pub remarks: Option<String>,
}

impl HourlyForecast {
    pub fn new<S: Into<String>>(
        timestamp: DateTime<Utc>,
        origin_time: DateTime<Utc>,
        provider: Provider,
        station_id: S,
    ) -> Self {
        HourlyForecast {
            timestamp,
            origin_time,
            provider,
            station_id: station_id.into(),
            temperature: Quantity::unknown(),
            feels_like: Quantity::unknown(),
            dew_point: Quantity::unknown(),
            wind_speed: Quantity::unknown(),
            wind_gust: Quantity::unknown(),
            wind_bearing: None,
            humidity: None,
            precip: Quantity::unknown(),
            precip_probability: None,
            abs_pressure: Quantity::unknown(),
            rel_pressure: Quantity::unknown(),
            cloud_cover: None,
            visibility: Quantity::unknown(),
            uv_index: None,
            ozone: None,
            remarks: None,
        }
    }
}

/// At or above this temperature, "feels like" is the heat index.
pub const HEAT_INDEX_THRESHOLD_F: f64 = 70.0;

/// At or below this temperature, "feels like" is the wind chill.
pub const WIND_CHILL_THRESHOLD_F: f64 = 61.0;

/// Derive "feels like" for providers that don't report it directly.
///
/// Uses the heat index at or above 70°F, the wind chill at or below 61°F, and the
/// temperature itself in between. If the temperature is unknown or the index that
/// applies is unknown, the result is unknown: it never falls back to the raw
/// temperature outside of the 61-70°F band.
pub fn feels_like<U: Unit<Kind = Temperature>>(
    temperature: Quantity<U>,
    heat_index: Quantity<U>,
    wind_chill: Quantity<U>,
) -> Quantity<Fahrenheit> {
    match temperature.fahrenheit() {
        Some(t) if t >= HEAT_INDEX_THRESHOLD_F => heat_index.to(),
        Some(t) if t <= WIND_CHILL_THRESHOLD_F => wind_chill.to(),
        Some(_) => temperature.to(),
        None => Quantity::unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::{feels_like, Observation, Provider};
    use crate::units::testing::assert_close;
    use crate::units::{Celsius, Fahrenheit, Quantity};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_feels_like_heat_index() {
        let res = feels_like(
            Quantity::<Fahrenheit>::new(85.0),
            Quantity::new(90.0),
            Quantity::new(85.0),
        );
        assert_eq!(Some(90.0), res.value());
    }

    #[test]
    fn test_feels_like_wind_chill() {
        let res = feels_like(
            Quantity::<Fahrenheit>::new(30.0),
            Quantity::unknown(),
            Quantity::new(21.0),
        );
        assert_eq!(Some(21.0), res.value());
    }

    #[test]
    fn test_feels_like_between_thresholds() {
        let res = feels_like(
            Quantity::<Fahrenheit>::new(65.0),
            Quantity::unknown(),
            Quantity::unknown(),
        );
        assert_eq!(Some(65.0), res.value());
    }

    #[test]
    fn test_feels_like_missing_index() {
        let res = feels_like(
            Quantity::<Fahrenheit>::new(95.0),
            Quantity::unknown(),
            Quantity::new(95.0),
        );
        assert!(res.is_unknown());
    }

    #[test]
    fn test_feels_like_missing_temperature() {
        let res = feels_like(
            Quantity::<Fahrenheit>::unknown(),
            Quantity::new(90.0),
            Quantity::new(20.0),
        );
        assert!(res.is_unknown());
    }

    #[test]
    fn test_feels_like_celsius() {
        // 30°C is 86°F, over the heat index threshold
        let res = feels_like(Quantity::<Celsius>::new(30.0), Quantity::new(35.0), Quantity::unknown());
        assert_close(95.0, res.value());
    }

    #[test]
    fn test_observation_serialize() {
        let ts = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
        let mut obs = Observation::new(ts, Provider::Noaa, "KBOS");
        obs.temperature = Quantity::new(72.5);

        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!("NOAA", json["provider"]);
        assert_eq!("KBOS", json["station_id"]);
        assert_eq!(72.5, json["temperature"]);
        assert!(json["wind_gust"].is_null());
    }
}
