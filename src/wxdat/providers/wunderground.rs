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

//! Weather Underground adapter for personal weather stations (PWS).
//!
//! Observations are requested in imperial ("e") units. The API does not report an
//! apparent temperature so "feels like" is derived from the heat index and wind chill.

use crate::client::{self, ClientError, ProviderClient};
use crate::model::{self, Observation, Provider};
use crate::providers::WeatherSource;
use crate::units::{Fahrenheit, Inch, InchesMercury, InchesPerHour, MilesPerHour, Quantity};
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use tracing::Instrument;

pub const DEFAULT_API_URL: &str = "https://api.weather.com/";

const CURRENT_PATH: &str = "v2/pws/observations/current";

#[derive(Debug)]
pub struct WUndergroundStation {
    name: String,
    station_id: String,
    api_key: String,
    client: ProviderClient,
    base_url: Url,
}

impl WUndergroundStation {
    pub fn new(
        name: &str,
        station_id: &str,
        api_key: &str,
        client: ProviderClient,
        base_url: &str,
    ) -> Result<Self, ClientError> {
        tracing::info!(message = "created WUnderground station", name = %name, station = %station_id);

        Ok(WUndergroundStation {
            name: name.to_owned(),
            station_id: station_id.to_owned(),
            api_key: api_key.to_owned(),
            client,
            base_url: client::base_url(base_url)?,
        })
    }

    async fn fetch_current(&self) -> Result<PwsObservation, ClientError> {
        let url = self
            .base_url
            .join(CURRENT_PATH)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", CURRENT_PATH, e)))?;
        let query = [
            ("apiKey", self.api_key.clone()),
            ("stationId", self.station_id.clone()),
            ("format", "json".to_owned()),
            ("units", "e".to_owned()),
            ("numericPrecision", "decimal".to_owned()),
        ];

        let current: Current = self
            .client
            .get_json(url.clone(), &query, ProviderClient::JSON_RESPONSE)
            .await?;

        current.observations.into_iter().next().ok_or(ClientError::Empty(url))
    }

    fn observation(&self, pws: PwsObservation) -> Observation {
        let imperial = pws.imperial.unwrap_or_default();
        let temperature = Quantity::<Fahrenheit>::new(imperial.temp);

        let mut obs = Observation::new(pws.obs_time_utc, Provider::WUnderground, &self.station_id);
        obs.temperature = temperature;
        obs.feels_like = model::feels_like(
            temperature,
            Quantity::new(imperial.heat_index),
            Quantity::new(imperial.wind_chill),
        );
        obs.dew_point = Quantity::<Fahrenheit>::new(imperial.dewpt);
        obs.wind_speed = Quantity::<MilesPerHour>::new(imperial.wind_speed);
        obs.wind_gust = Quantity::<MilesPerHour>::new(imperial.wind_gust);
        obs.wind_bearing = pws.winddir;
        obs.humidity = pws.humidity;
        obs.rel_pressure = Quantity::<InchesMercury>::new(imperial.pressure);
        obs.precip_rate = Quantity::<InchesPerHour>::new(imperial.precip_rate);
        obs.precip_day = Quantity::<Inch>::new(imperial.precip_total);
        obs.uv_index = pws.uv;
        obs.solar_radiation = pws.solar_radiation;
        obs
    }
}

impl WeatherSource for WUndergroundStation {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> Provider {
        Provider::WUnderground
    }

    async fn current_conditions(&mut self) -> Option<Observation> {
        match self
            .fetch_current()
            .instrument(tracing::debug_span!("wunderground_observation"))
            .await
        {
            Ok(pws) => Some(self.observation(pws)),
            Err(ClientError::Empty(url)) => {
                self.client.metrics().error();
                tracing::warn!(message = "no observations reported for station", url = %url);
                None
            }
            Err(_) => None,
        }
    }
}

#[derive(Deserialize, Debug)]
struct Current {
    #[serde(default)]
    observations: Vec<PwsObservation>,
}

#[derive(Deserialize, Debug)]
struct PwsObservation {
    #[serde(alias = "obsTimeUtc")]
    obs_time_utc: DateTime<Utc>,
    #[serde(alias = "uv")]
    uv: Option<f64>,
    #[serde(alias = "solarRadiation")]
    solar_radiation: Option<f64>,
    #[serde(alias = "humidity")]
    humidity: Option<f64>,
    #[serde(alias = "winddir")]
    winddir: Option<f64>,
    #[serde(alias = "imperial")]
    imperial: Option<Imperial>,
}

#[derive(Deserialize, Debug, Default)]
struct Imperial {
    #[serde(alias = "temp")]
    temp: Option<f64>,
    #[serde(alias = "heatIndex")]
    heat_index: Option<f64>,
    #[serde(alias = "dewpt")]
    dewpt: Option<f64>,
    #[serde(alias = "windChill")]
    wind_chill: Option<f64>,
    #[serde(alias = "windSpeed")]
    wind_speed: Option<f64>,
    #[serde(alias = "windGust")]
    wind_gust: Option<f64>,
    #[serde(alias = "pressure")]
    pressure: Option<f64>,
    #[serde(alias = "precipRate")]
    precip_rate: Option<f64>,
    #[serde(alias = "precipTotal")]
    precip_total: Option<f64>,
}
