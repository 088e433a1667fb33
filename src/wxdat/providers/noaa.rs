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

//! National Weather Service (NOAA) adapter for [api.weather.gov].
//!
//! Measurements from this API carry their own unit codes so each value is converted
//! based on the unit reported rather than the unit we expect.
//!
//! [api.weather.gov]: https://www.weather.gov/documentation/services-web-api

use crate::client::{self, ClientError, ProviderClient};
use crate::model::{self, Observation, Provider};
use crate::providers::{non_empty, WeatherSource};
use crate::units::{
    Celsius, Fahrenheit, Foot, Hectopascal, InchesMercury, KilometersPerHour, Meter, MetersPerSecond, MilesPerHour,
    Millimeter, Pascal, Quantity,
};
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Url;
use serde::Deserialize;
use tracing::Instrument;

pub const DEFAULT_API_URL: &str = "https://api.weather.gov/";

const UNIT_METERS: &str = "wmoUnit:m";
const UNIT_MILLIMETERS: &str = "wmoUnit:mm";
const UNIT_FEET: &str = "wmoUnit:ft";
const UNIT_DEGREES_C: &str = "wmoUnit:degC";
const UNIT_DEGREES_F: &str = "wmoUnit:degF";
const UNIT_PERCENT: &str = "wmoUnit:percent";
const UNIT_DEGREES_ANGLE: &str = "wmoUnit:degree_(angle)";
const UNIT_KPH: &str = "wmoUnit:km_h-1";
const UNIT_MPS: &str = "wmoUnit:m_s-1";
const UNIT_PASCALS: &str = "wmoUnit:Pa";
const UNIT_HECTOPASCALS: &str = "wmoUnit:hPa";

const GEO_JSON_RESPONSE: &str = "application/geo+json";

#[derive(Debug)]
pub struct NoaaStation {
    name: String,
    station: String,
    client: ProviderClient,
    base_url: Url,
}

impl NoaaStation {
    pub fn new(name: &str, station: &str, client: ProviderClient, base_url: &str) -> Result<Self, ClientError> {
        tracing::info!(message = "created NOAA station", name = %name, station = %station);

        Ok(NoaaStation {
            name: name.to_owned(),
            station: station.to_owned(),
            client,
            base_url: client::base_url(base_url)?,
        })
    }

    /// Fetch station metadata, failing with `ClientError::NotFound` for stations
    /// that don't exist.
    pub async fn verify(&self) -> Result<(), ClientError> {
        let url = self.station_url(&[])?;
        let station: StationMetadata = self.client.get_json(url, &[], GEO_JSON_RESPONSE).await?;
        tracing::debug!(
            message = "verified station information",
            station = %station.properties.station_identifier,
            station_name = %station.properties.name,
        );

        Ok(())
    }

    fn station_url(&self, rest: &[&str]) -> Result<Url, ClientError> {
        let mut path = format!("stations/{}", utf8_percent_encode(&self.station, NON_ALPHANUMERIC));
        for segment in rest {
            path.push('/');
            path.push_str(segment);
        }

        self.base_url
            .join(&path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn observation(&self, latest: LatestObservation) -> Observation {
        let props = latest.properties;
        let temp = temperature(&props.temperature);

        let mut obs = Observation::new(props.timestamp, Provider::Noaa, &self.station);
        obs.feels_like = model::feels_like(temp, temperature(&props.heat_index), temperature(&props.wind_chill));
        obs.temperature = temp;
        obs.dew_point = temperature(&props.dewpoint);
        obs.wind_speed = speed(&props.wind_speed);
        obs.wind_gust = speed(&props.wind_gust);
        obs.wind_bearing = unitless(&props.wind_direction, UNIT_DEGREES_ANGLE);
        obs.humidity = unitless(&props.relative_humidity, UNIT_PERCENT);
        obs.abs_pressure = pressure(&props.barometric_pressure);
        obs.rel_pressure = pressure(&props.sea_level_pressure);
        obs.precip_hour = length(&props.precipitation_last_hour).to();
        obs.visibility = length(&props.visibility).to();
        obs.remarks = non_empty(props.raw_message).or(non_empty(props.description));
        obs
    }
}

impl WeatherSource for NoaaStation {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> Provider {
        Provider::Noaa
    }

    async fn current_conditions(&mut self) -> Option<Observation> {
        let url = self.station_url(&["observations", "latest"]).ok()?;
        let latest = self
            .client
            .get_json::<LatestObservation>(url, &[], GEO_JSON_RESPONSE)
            .instrument(tracing::debug_span!("noaa_observation"))
            .await
            .ok()?;

        tracing::debug!(message = "fetched latest observation", observation = %latest.id);
        Some(self.observation(latest))
    }
}

fn unexpected_unit(m: &Measurement) {
    tracing::warn!(message = "unexpected unit for measurement", unit = %m.unit_code);
}

fn temperature(m: &Option<Measurement>) -> Quantity<Fahrenheit> {
    match m {
        Some(m) if m.unit_code == UNIT_DEGREES_C => Quantity::<Celsius>::new(m.value).to(),
        Some(m) if m.unit_code == UNIT_DEGREES_F => Quantity::new(m.value),
        Some(m) => {
            unexpected_unit(m);
            Quantity::unknown()
        }
        None => Quantity::unknown(),
    }
}

fn speed(m: &Option<Measurement>) -> Quantity<MilesPerHour> {
    match m {
        Some(m) if m.unit_code == UNIT_KPH => Quantity::<KilometersPerHour>::new(m.value).to(),
        Some(m) if m.unit_code == UNIT_MPS => Quantity::<MetersPerSecond>::new(m.value).to(),
        Some(m) => {
            unexpected_unit(m);
            Quantity::unknown()
        }
        None => Quantity::unknown(),
    }
}

fn pressure(m: &Option<Measurement>) -> Quantity<InchesMercury> {
    match m {
        Some(m) if m.unit_code == UNIT_PASCALS => Quantity::<Pascal>::new(m.value).to(),
        Some(m) if m.unit_code == UNIT_HECTOPASCALS => Quantity::<Hectopascal>::new(m.value).to(),
        Some(m) => {
            unexpected_unit(m);
            Quantity::unknown()
        }
        None => Quantity::unknown(),
    }
}

fn length(m: &Option<Measurement>) -> Quantity<Meter> {
    match m {
        Some(m) if m.unit_code == UNIT_METERS => Quantity::new(m.value),
        Some(m) if m.unit_code == UNIT_MILLIMETERS => Quantity::<Millimeter>::new(m.value).to(),
        Some(m) if m.unit_code == UNIT_FEET => Quantity::<Foot>::new(m.value).to(),
        Some(m) => {
            unexpected_unit(m);
            Quantity::unknown()
        }
        None => Quantity::unknown(),
    }
}

fn unitless(m: &Option<Measurement>, unit: &str) -> Option<f64> {
    match m {
        Some(m) if m.unit_code == unit => m.value,
        Some(m) => {
            unexpected_unit(m);
            None
        }
        None => None,
    }
}

#[derive(Deserialize, Debug)]
struct StationMetadata {
    #[serde(alias = "properties")]
    properties: StationProperties,
}

#[derive(Deserialize, Debug)]
struct StationProperties {
    #[serde(alias = "stationIdentifier")]
    station_identifier: String,
    #[serde(alias = "name")]
    name: String,
}

#[derive(Deserialize, Debug)]
struct LatestObservation {
    #[serde(alias = "id")]
    id: String,
    #[serde(alias = "properties")]
    properties: ObservationProperties,
}

#[derive(Deserialize, Debug)]
struct ObservationProperties {
    #[serde(alias = "timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(alias = "rawMessage")]
    raw_message: Option<String>,
    #[serde(alias = "textDescription")]
    description: Option<String>,
    #[serde(alias = "temperature")]
    temperature: Option<Measurement>,
    #[serde(alias = "dewpoint")]
    dewpoint: Option<Measurement>,
    #[serde(alias = "windDirection")]
    wind_direction: Option<Measurement>,
    #[serde(alias = "windSpeed")]
    wind_speed: Option<Measurement>,
    #[serde(alias = "windGust")]
    wind_gust: Option<Measurement>,
    #[serde(alias = "barometricPressure")]
    barometric_pressure: Option<Measurement>,
    #[serde(alias = "seaLevelPressure")]
    sea_level_pressure: Option<Measurement>,
    #[serde(alias = "visibility")]
    visibility: Option<Measurement>,
    #[serde(alias = "precipitationLastHour")]
    precipitation_last_hour: Option<Measurement>,
    #[serde(alias = "relativeHumidity")]
    relative_humidity: Option<Measurement>,
    #[serde(alias = "windChill")]
    wind_chill: Option<Measurement>,
    #[serde(alias = "heatIndex")]
    heat_index: Option<Measurement>,
}

#[derive(Deserialize, Debug)]
struct Measurement {
    #[serde(alias = "unitCode")]
    unit_code: String,
    #[serde(alias = "value")]
    value: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::{LatestObservation, NoaaStation, DEFAULT_API_URL};
    use crate::client::{ProviderClient, RateLimiter};
    use crate::metrics::ClientMetrics;
    use crate::model::Provider;
    use crate::units::testing::assert_close;
    use reqwest::Client;
    use std::sync::Arc;

    const LATEST: &str = r#"{
        "id": "https://api.weather.gov/stations/KBOS/observations/2023-06-01T12:54:00+00:00",
        "type": "Feature",
        "properties": {
            "@id": "https://api.weather.gov/stations/KBOS/observations/2023-06-01T12:54:00+00:00",
            "station": "https://api.weather.gov/stations/KBOS",
            "timestamp": "2023-06-01T12:54:00+00:00",
            "rawMessage": "KBOS 011254Z 07010KT 10SM FEW250 12/06 A3012",
            "textDescription": "Mostly Clear",
            "temperature": {"unitCode": "wmoUnit:degC", "value": 12.2, "qualityControl": "V"},
            "dewpoint": {"unitCode": "wmoUnit:degC", "value": 6.1, "qualityControl": "V"},
            "windDirection": {"unitCode": "wmoUnit:degree_(angle)", "value": 70, "qualityControl": "V"},
            "windSpeed": {"unitCode": "wmoUnit:km_h-1", "value": 18.36, "qualityControl": "V"},
            "windGust": {"unitCode": "wmoUnit:km_h-1", "value": null, "qualityControl": "Z"},
            "barometricPressure": {"unitCode": "wmoUnit:Pa", "value": 101990, "qualityControl": "V"},
            "seaLevelPressure": {"unitCode": "wmoUnit:Pa", "value": 101980, "qualityControl": "V"},
            "visibility": {"unitCode": "wmoUnit:m", "value": 16090, "qualityControl": "C"},
            "precipitationLastHour": {"unitCode": "wmoUnit:mm", "value": null, "qualityControl": "Z"},
            "relativeHumidity": {"unitCode": "wmoUnit:percent", "value": 66.21, "qualityControl": "V"},
            "windChill": {"unitCode": "wmoUnit:degC", "value": 10.4, "qualityControl": "V"},
            "heatIndex": {"unitCode": "wmoUnit:degC", "value": null, "qualityControl": "V"}
        }
    }"#;

    fn station() -> NoaaStation {
        let client = ProviderClient::new(
            Client::new(),
            Arc::new(RateLimiter::default()),
            ClientMetrics::detached(Provider::Noaa, "home"),
        );
        NoaaStation::new("home", "KBOS", client, DEFAULT_API_URL).unwrap()
    }

    #[test]
    fn test_observation_conversion() {
        let latest: LatestObservation = serde_json::from_str(LATEST).unwrap();
        let obs = station().observation(latest);

        assert_eq!(Provider::Noaa, obs.provider);
        assert_eq!("KBOS", obs.station_id);
        assert_eq!("2023-06-01T12:54:00+00:00", obs.timestamp.to_rfc3339());
        assert_close(53.96, obs.temperature.value());
        assert_close(42.98, obs.dew_point.value());
        assert_close(11.408375, obs.wind_speed.value());
        assert!(obs.wind_gust.is_unknown());
        assert_eq!(Some(70.0), obs.wind_bearing);
        assert_eq!(Some(66.21), obs.humidity);
        assert_close(30.11763, obs.abs_pressure.value());
        assert_close(30.11468, obs.rel_pressure.value());
        assert_close(9.997862, obs.visibility.value());
        assert!(obs.precip_hour.is_unknown());
        assert_eq!(Some("KBOS 011254Z 07010KT 10SM FEW250 12/06 A3012"), obs.remarks.as_deref());
    }

    #[test]
    fn test_feels_like_uses_wind_chill() {
        let latest: LatestObservation = serde_json::from_str(LATEST).unwrap();
        let obs = station().observation(latest);

        // 12.2°C is below the wind chill threshold, 10.4°C is 50.72°F
        assert_close(50.72, obs.feels_like.value());
    }

    #[test]
    fn test_missing_fields() {
        let body = r#"{
            "id": "obs-1",
            "properties": {
                "timestamp": "2023-06-01T12:54:00+00:00",
                "rawMessage": "",
                "textDescription": "Cloudy",
                "temperature": {"unitCode": "wmoUnit:degF", "value": 75.0}
            }
        }"#;

        let latest: LatestObservation = serde_json::from_str(body).unwrap();
        let obs = station().observation(latest);

        assert_eq!(Some(75.0), obs.temperature.value());
        // above the heat index threshold without a heat index
        assert!(obs.feels_like.is_unknown());
        assert!(obs.wind_speed.is_unknown());
        assert!(obs.abs_pressure.is_unknown());
        assert_eq!(None, obs.humidity);
        assert_eq!(Some("Cloudy"), obs.remarks.as_deref());
    }

    #[test]
    fn test_unexpected_unit() {
        let body = r#"{
            "id": "obs-2",
            "properties": {
                "timestamp": "2023-06-01T12:54:00+00:00",
                "temperature": {"unitCode": "wmoUnit:K", "value": 290.0},
                "windSpeed": {"unitCode": "wmoUnit:m_s-1", "value": 10.0}
            }
        }"#;

        let latest: LatestObservation = serde_json::from_str(body).unwrap();
        let obs = station().observation(latest);

        assert!(obs.temperature.is_unknown());
        assert_close(22.3693629, obs.wind_speed.value());
    }

    #[test]
    fn test_station_url() {
        let url = station().station_url(&["observations", "latest"]).unwrap();
        assert_eq!("https://api.weather.gov/stations/KBOS/observations/latest", url.as_str());
    }
}
