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

//! AccuWeather adapter for [current conditions].
//!
//! Every measurement is reported in both metric and imperial units. The imperial
//! values are used since they already match our canonical units.
//!
//! [current conditions]: https://developer.accuweather.com/accuweather-current-conditions-api/apis

use crate::client::{self, ClientError, ProviderClient};
use crate::model::{Observation, Provider};
use crate::providers::{non_empty, WeatherSource};
use crate::units::{Fahrenheit, Inch, InchesMercury, Mile, MilesPerHour, Quantity, Unit};
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Url;
use serde::Deserialize;
use tracing::Instrument;

pub const DEFAULT_API_URL: &str = "https://dataservice.accuweather.com/";

#[derive(Debug)]
pub struct AccuWeatherStation {
    name: String,
    location: String,
    api_key: String,
    client: ProviderClient,
    base_url: Url,
}

impl AccuWeatherStation {
    pub fn new(
        name: &str,
        location: &str,
        api_key: &str,
        client: ProviderClient,
        base_url: &str,
    ) -> Result<Self, ClientError> {
        tracing::info!(message = "created AccuWeather station", name = %name, location = %location);

        Ok(AccuWeatherStation {
            name: name.to_owned(),
            location: location.to_owned(),
            api_key: api_key.to_owned(),
            client,
            base_url: client::base_url(base_url)?,
        })
    }

    async fn fetch_current(&self) -> Result<Conditions, ClientError> {
        let path = format!(
            "currentconditions/v1/{}",
            utf8_percent_encode(&self.location, NON_ALPHANUMERIC)
        );
        let url = self
            .base_url
            .join(&path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))?;
        let query = [
            ("apikey", self.api_key.clone()),
            ("details", "true".to_owned()),
            ("language", "en-US".to_owned()),
        ];

        let conditions: Vec<Conditions> = self
            .client
            .get_json(url.clone(), &query, ProviderClient::JSON_RESPONSE)
            .await?;

        conditions.into_iter().next().ok_or(ClientError::Empty(url))
    }

    fn observation(&self, c: Conditions) -> Observation {
        let mut obs = Observation::new(c.epoch_time, Provider::AccuWeather, &self.location);
        obs.temperature = imperial::<Fahrenheit>(&c.temperature);
        obs.feels_like = imperial::<Fahrenheit>(&c.real_feel_temperature);
        obs.dew_point = imperial::<Fahrenheit>(&c.dew_point);
        obs.wind_speed = imperial::<MilesPerHour>(&c.wind.as_ref().and_then(|w| w.speed.clone()));
        obs.wind_gust = imperial::<MilesPerHour>(&c.wind_gust.as_ref().and_then(|w| w.speed.clone()));
        obs.wind_bearing = c.wind.as_ref().and_then(|w| w.direction.as_ref()).and_then(|d| d.degrees);
        obs.humidity = c.relative_humidity;
        obs.rel_pressure = imperial::<InchesMercury>(&c.pressure);
        obs.precip_hour = imperial::<Inch>(&c.precip_1hr);
        obs.cloud_cover = c.cloud_cover;
        obs.visibility = imperial::<Mile>(&c.visibility);
        obs.uv_index = c.uv_index;
        obs.remarks = non_empty(c.weather_text);
        obs
    }
}

impl WeatherSource for AccuWeatherStation {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> Provider {
        Provider::AccuWeather
    }

    async fn current_conditions(&mut self) -> Option<Observation> {
        match self
            .fetch_current()
            .instrument(tracing::debug_span!("accuweather_observation"))
            .await
        {
            Ok(c) => Some(self.observation(c)),
            Err(ClientError::Empty(url)) => {
                self.client.metrics().error();
                tracing::warn!(message = "no current conditions for location", url = %url);
                None
            }
            Err(_) => None,
        }
    }
}

fn imperial<U: Unit>(m: &Option<Measurements>) -> Quantity<U> {
    Quantity::new(m.as_ref().and_then(|m| m.imperial.value))
}

#[derive(Deserialize, Debug)]
struct Conditions {
    #[serde(alias = "EpochTime", with = "chrono::serde::ts_seconds")]
    epoch_time: DateTime<Utc>,
    #[serde(alias = "WeatherText")]
    weather_text: Option<String>,
    #[serde(alias = "Temperature")]
    temperature: Option<Measurements>,
    #[serde(alias = "RealFeelTemperature")]
    real_feel_temperature: Option<Measurements>,
    #[serde(alias = "DewPoint")]
    dew_point: Option<Measurements>,
    #[serde(alias = "RelativeHumidity")]
    relative_humidity: Option<f64>,
    #[serde(alias = "Wind")]
    wind: Option<Wind>,
    #[serde(alias = "WindGust")]
    wind_gust: Option<Wind>,
    #[serde(alias = "UVIndex")]
    uv_index: Option<f64>,
    #[serde(alias = "Visibility")]
    visibility: Option<Measurements>,
    #[serde(alias = "CloudCover")]
    cloud_cover: Option<f64>,
    #[serde(alias = "Pressure")]
    pressure: Option<Measurements>,
    #[serde(alias = "Precip1hr")]
    precip_1hr: Option<Measurements>,
}

#[derive(Deserialize, Debug, Clone)]
struct Measurements {
    #[serde(alias = "Imperial")]
    imperial: Measurement,
}

#[derive(Deserialize, Debug, Clone)]
struct Measurement {
    #[serde(alias = "Value")]
    value: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct Wind {
    #[serde(alias = "Speed")]
    speed: Option<Measurements>,
    #[serde(alias = "Direction")]
    direction: Option<WindDirection>,
}

#[derive(Deserialize, Debug)]
struct WindDirection {
    #[serde(alias = "Degrees")]
    degrees: Option<f64>,
}
