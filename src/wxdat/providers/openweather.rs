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

//! OpenWeatherMap adapter for [current weather] and the [One Call] hourly forecast.
//!
//! Requests ask for imperial units. Pressure is always reported in hectopascals,
//! visibility in meters, and precipitation in millimeters regardless.
//!
//! [current weather]: https://openweathermap.org/current
//! [One Call]: https://openweathermap.org/api/one-call-3

use crate::client::{self, ClientError, ProviderClient};
use crate::model::{HourlyForecast, Observation, Provider};
use crate::providers::WeatherSource;
use crate::units::{Fahrenheit, Hectopascal, Meter, MilesPerHour, Millimeter, MillimetersPerHour, Quantity};
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use tracing::Instrument;

pub const DEFAULT_API_URL: &str = "https://api.openweathermap.org/";

const CURRENT_PATH: &str = "data/2.5/weather";
const ONE_CALL_PATH: &str = "data/3.0/onecall";

#[derive(Debug)]
pub struct OpenWeatherStation {
    name: String,
    station_id: String,
    api_key: String,
    latitude: f64,
    longitude: f64,
    client: ProviderClient,
    base_url: Url,
}

impl OpenWeatherStation {
    pub fn new(
        name: &str,
        api_key: &str,
        latitude: f64,
        longitude: f64,
        client: ProviderClient,
        base_url: &str,
    ) -> Result<Self, ClientError> {
        tracing::info!(message = "created OpenWeatherMap station", name = %name, latitude, longitude);

        Ok(OpenWeatherStation {
            name: name.to_owned(),
            station_id: format!("{},{}", latitude, longitude),
            api_key: api_key.to_owned(),
            latitude,
            longitude,
            client,
            base_url: client::base_url(base_url)?,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("lat", self.latitude.to_string()),
            ("lon", self.longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "imperial".to_owned()),
        ]
    }

    async fn fetch_current(&self) -> Result<CurrentWeather, ClientError> {
        let url = self.url(CURRENT_PATH)?;
        self.client
            .get_json(url, &self.query(), ProviderClient::JSON_RESPONSE)
            .await
    }

    async fn fetch_hourly(&self) -> Result<OneCall, ClientError> {
        let url = self.url(ONE_CALL_PATH)?;
        let mut query = self.query();
        query.push(("exclude", "current,minutely,daily,alerts".to_owned()));

        self.client
            .get_json(url, &query, ProviderClient::JSON_RESPONSE)
            .await
    }

    fn observation(&self, current: CurrentWeather) -> Observation {
        let main = current.main;
        let wind = current.wind.unwrap_or_default();

        let mut obs = Observation::new(current.dt, Provider::OpenWeatherMap, &self.station_id);
        obs.temperature = Quantity::<Fahrenheit>::new(main.temp);
        obs.feels_like = Quantity::<Fahrenheit>::new(main.feels_like);
        obs.wind_speed = Quantity::<MilesPerHour>::new(wind.speed);
        obs.wind_gust = Quantity::<MilesPerHour>::new(wind.gust);
        obs.wind_bearing = wind.deg;
        obs.humidity = main.humidity;
        obs.abs_pressure = Quantity::<Hectopascal>::new(main.grnd_level).to();
        obs.rel_pressure = Quantity::<Hectopascal>::new(main.sea_level.or(main.pressure)).to();
        obs.precip_hour = Quantity::<Millimeter>::new(precipitation(&current.rain, &current.snow)).to();
        obs.cloud_cover = current.clouds.and_then(|c| c.all);
        obs.visibility = Quantity::<Meter>::new(current.visibility).to();
        obs.remarks = remarks(&current.weather);
        obs
    }

    fn forecast(&self, origin_time: DateTime<Utc>, one_call: OneCall) -> Vec<HourlyForecast> {
        let mut hours: Vec<HourlyForecast> = one_call
            .hourly
            .into_iter()
            .map(|hour| {
                let mut f = HourlyForecast::new(hour.dt, origin_time, Provider::OpenWeatherMap, &self.station_id);
                f.temperature = Quantity::<Fahrenheit>::new(hour.temp);
                f.feels_like = Quantity::<Fahrenheit>::new(hour.feels_like);
                f.dew_point = Quantity::<Fahrenheit>::new(hour.dew_point);
                f.wind_speed = Quantity::<MilesPerHour>::new(hour.wind_speed);
                f.wind_gust = Quantity::<MilesPerHour>::new(hour.wind_gust);
                f.wind_bearing = hour.wind_deg;
                f.humidity = hour.humidity;
                // Accumulation over the hour is the average rate for that hour
                f.precip = Quantity::<MillimetersPerHour>::new(precipitation(&hour.rain, &hour.snow)).to();
                f.precip_probability = hour.pop.map(|p| p * 100.0);
                f.rel_pressure = Quantity::<Hectopascal>::new(hour.pressure).to();
                f.cloud_cover = hour.clouds;
                f.visibility = Quantity::<Meter>::new(hour.visibility).to();
                f.uv_index = hour.uvi;
                f.remarks = remarks(&hour.weather);
                f
            })
            .collect();

        hours.sort_by_key(|f| f.timestamp);
        hours
    }
}

impl WeatherSource for OpenWeatherStation {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> Provider {
        Provider::OpenWeatherMap
    }

    async fn current_conditions(&mut self) -> Option<Observation> {
        self.fetch_current()
            .instrument(tracing::debug_span!("openweather_observation"))
            .await
            .ok()
            .map(|current| self.observation(current))
    }

    fn supports_forecast(&self) -> bool {
        true
    }

    async fn hourly_forecast(&mut self) -> Option<Vec<HourlyForecast>> {
        let origin_time = Utc::now();
        self.fetch_hourly()
            .instrument(tracing::debug_span!("openweather_forecast"))
            .await
            .ok()
            .map(|one_call| self.forecast(origin_time, one_call))
    }
}

/// Combined rain and snow in millimeters, unknown only if neither was reported.
fn precipitation(rain: &Option<Precipitation>, snow: &Option<Precipitation>) -> Option<f64> {
    let rain = rain.as_ref().and_then(|p| p.one_hour);
    let snow = snow.as_ref().and_then(|p| p.one_hour);

    match (rain, snow) {
        (None, None) => None,
        (r, s) => Some(r.unwrap_or(0.0) + s.unwrap_or(0.0)),
    }
}

fn remarks(weather: &[WeatherNote]) -> Option<String> {
    weather
        .first()
        .map(|wx| format!("{}: {} [{}]", wx.main, wx.description, wx.id))
}

#[derive(Deserialize, Debug)]
struct CurrentWeather {
    #[serde(with = "chrono::serde::ts_seconds")]
    dt: DateTime<Utc>,
    main: Main,
    wind: Option<Wind>,
    clouds: Option<Clouds>,
    visibility: Option<f64>,
    rain: Option<Precipitation>,
    snow: Option<Precipitation>,
    #[serde(default)]
    weather: Vec<WeatherNote>,
}

#[derive(Deserialize, Debug)]
struct Main {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
    sea_level: Option<f64>,
    grnd_level: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
struct Wind {
    speed: Option<f64>,
    deg: Option<f64>,
    gust: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct Clouds {
    all: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct Precipitation {
    #[serde(alias = "1h")]
    one_hour: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct WeatherNote {
    id: i64,
    main: String,
    description: String,
}

#[derive(Deserialize, Debug)]
struct OneCall {
    #[serde(default)]
    hourly: Vec<Hour>,
}

#[derive(Deserialize, Debug)]
struct Hour {
    #[serde(with = "chrono::serde::ts_seconds")]
    dt: DateTime<Utc>,
    temp: Option<f64>,
    feels_like: Option<f64>,
    pressure: Option<f64>,
    humidity: Option<f64>,
    dew_point: Option<f64>,
    uvi: Option<f64>,
    clouds: Option<f64>,
    visibility: Option<f64>,
    wind_speed: Option<f64>,
    wind_deg: Option<f64>,
    wind_gust: Option<f64>,
    pop: Option<f64>,
    rain: Option<Precipitation>,
    snow: Option<Precipitation>,
    #[serde(default)]
    weather: Vec<WeatherNote>,
}
