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

//! Ambient Weather Network adapter for personal weather stations.
//!
//! Devices report imperial units, see the [device data specs].
//!
//! [device data specs]: https://github.com/ambient-weather/api-docs/wiki/Device-Data-Specs

use crate::client::{self, ClientError, ProviderClient};
use crate::model::{Observation, Provider};
use crate::providers::WeatherSource;
use crate::units::{Fahrenheit, Inch, InchesMercury, InchesPerHour, MilesPerHour, Quantity};
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Url;
use serde::Deserialize;
use tracing::Instrument;

pub const DEFAULT_API_URL: &str = "https://rt.ambientweather.net/v1/";

#[derive(Debug)]
pub struct AmbientStation {
    name: String,
    device_id: String,
    app_key: String,
    user_key: String,
    client: ProviderClient,
    base_url: Url,
}

impl AmbientStation {
    pub fn new(
        name: &str,
        device_id: &str,
        app_key: &str,
        user_key: &str,
        client: ProviderClient,
        base_url: &str,
    ) -> Result<Self, ClientError> {
        tracing::info!(message = "created AmbientWeather station", name = %name, device = %device_id);

        Ok(AmbientStation {
            name: name.to_owned(),
            device_id: device_id.to_owned(),
            app_key: app_key.to_owned(),
            user_key: user_key.to_owned(),
            client,
            base_url: client::base_url(base_url)?,
        })
    }

    fn device_url(&self) -> Result<Url, ClientError> {
        let path = format!("devices/{}", utf8_percent_encode(&self.device_id, NON_ALPHANUMERIC));
        self.base_url
            .join(&path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn device_data(&self) -> Result<DeviceData, ClientError> {
        let url = self.device_url()?;
        let query = [
            ("apiKey", self.user_key.clone()),
            ("applicationKey", self.app_key.clone()),
            ("limit", "1".to_owned()),
        ];

        let data: Vec<DeviceData> = self
            .client
            .get_json(url.clone(), &query, ProviderClient::JSON_RESPONSE)
            .await?;

        data.into_iter().next().ok_or(ClientError::Empty(url))
    }

    fn observation(&self, data: DeviceData) -> Observation {
        let mut obs = Observation::new(data.date_utc, Provider::AmbientWeather, &self.device_id);
        obs.temperature = Quantity::<Fahrenheit>::new(data.temp_f);
        obs.feels_like = Quantity::<Fahrenheit>::new(data.feels_like);
        obs.dew_point = Quantity::<Fahrenheit>::new(data.dew_point);
        obs.wind_speed = Quantity::<MilesPerHour>::new(data.wind_speed_mph);
        obs.wind_gust = Quantity::<MilesPerHour>::new(data.wind_gust_mph);
        obs.wind_bearing = data.wind_dir;
        obs.humidity = data.humidity;
        obs.rel_pressure = Quantity::<InchesMercury>::new(data.barom_rel_in);
        obs.abs_pressure = Quantity::<InchesMercury>::new(data.barom_abs_in);
        obs.precip_rate = Quantity::<InchesPerHour>::new(data.hourly_rain_in);
        obs.precip_day = Quantity::<Inch>::new(data.daily_rain_in);
        obs.precip_week = Quantity::<Inch>::new(data.weekly_rain_in);
        obs.precip_month = Quantity::<Inch>::new(data.monthly_rain_in);
        obs.precip_year = Quantity::<Inch>::new(data.yearly_rain_in);
        obs.precip_total = Quantity::<Inch>::new(data.total_rain_in);
        obs.uv_index = data.uv;
        obs.solar_radiation = data.solar_radiation;
        obs
    }
}

impl WeatherSource for AmbientStation {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> Provider {
        Provider::AmbientWeather
    }

    async fn current_conditions(&mut self) -> Option<Observation> {
        match self
            .device_data()
            .instrument(tracing::debug_span!("ambient_observation"))
            .await
        {
            Ok(data) => Some(self.observation(data)),
            Err(ClientError::Empty(url)) => {
                self.client.metrics().error();
                tracing::warn!(message = "no data reported for device", url = %url);
                None
            }
            Err(_) => None,
        }
    }
}

#[derive(Deserialize, Debug)]
struct DeviceData {
    #[serde(alias = "dateutc", with = "chrono::serde::ts_milliseconds")]
    date_utc: DateTime<Utc>,
    #[serde(alias = "tempf")]
    temp_f: Option<f64>,
    #[serde(alias = "feelsLike")]
    feels_like: Option<f64>,
    #[serde(alias = "dewPoint")]
    dew_point: Option<f64>,
    #[serde(alias = "humidity")]
    humidity: Option<f64>,
    #[serde(alias = "winddir")]
    wind_dir: Option<f64>,
    #[serde(alias = "windspeedmph")]
    wind_speed_mph: Option<f64>,
    #[serde(alias = "windgustmph")]
    wind_gust_mph: Option<f64>,
    #[serde(alias = "baromrelin")]
    barom_rel_in: Option<f64>,
    #[serde(alias = "baromabsin")]
    barom_abs_in: Option<f64>,
    #[serde(alias = "hourlyrainin")]
    hourly_rain_in: Option<f64>,
    #[serde(alias = "dailyrainin")]
    daily_rain_in: Option<f64>,
    #[serde(alias = "weeklyrainin")]
    weekly_rain_in: Option<f64>,
    #[serde(alias = "monthlyrainin")]
    monthly_rain_in: Option<f64>,
    #[serde(alias = "yearlyrainin")]
    yearly_rain_in: Option<f64>,
    #[serde(alias = "totalrainin")]
    total_rain_in: Option<f64>,
    #[serde(alias = "uv")]
    uv: Option<f64>,
    #[serde(alias = "solarradiation")]
    solar_radiation: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::{AmbientStation, DeviceData, DEFAULT_API_URL};
    use crate::client::{ProviderClient, RateLimiter};
    use crate::metrics::ClientMetrics;
    use crate::model::Provider;
    use reqwest::Client;
    use std::sync::Arc;

    const DEVICE_DATA: &str = r#"[{
        "dateutc": 1685621700000,
        "tempf": 66.2,
        "feelsLike": 66.2,
        "dewPoint": 49.84,
        "humidity": 56,
        "winddir": 215,
        "windspeedmph": 3.4,
        "windgustmph": 6.9,
        "baromrelin": 29.99,
        "baromabsin": 29.52,
        "hourlyrainin": 0.02,
        "dailyrainin": 0.11,
        "weeklyrainin": 0.5,
        "monthlyrainin": 0.5,
        "yearlyrainin": 14.8,
        "totalrainin": 40.15,
        "uv": 3,
        "solarradiation": 412.5,
        "date": "2023-06-01T12:15:00.000Z"
    }]"#;

    fn station() -> AmbientStation {
        let client = ProviderClient::new(
            Client::new(),
            Arc::new(RateLimiter::default()),
            ClientMetrics::detached(Provider::AmbientWeather, "yard"),
        );
        AmbientStation::new("yard", "00:0E:C6:20:0F:7B", "app", "user", client, DEFAULT_API_URL).unwrap()
    }

    #[test]
    fn test_observation() {
        let mut data: Vec<DeviceData> = serde_json::from_str(DEVICE_DATA).unwrap();
        let obs = station().observation(data.remove(0));

        assert_eq!(Provider::AmbientWeather, obs.provider);
        assert_eq!("00:0E:C6:20:0F:7B", obs.station_id);
        assert_eq!("2023-06-01T12:15:00+00:00", obs.timestamp.to_rfc3339());
        assert_eq!(Some(66.2), obs.temperature.value());
        assert_eq!(Some(49.84), obs.dew_point.value());
        assert_eq!(Some(6.9), obs.wind_gust.value());
        assert_eq!(Some(215.0), obs.wind_bearing);
        assert_eq!(Some(29.52), obs.abs_pressure.value());
        assert_eq!(Some(0.02), obs.precip_rate.value());
        assert_eq!(Some(40.15), obs.precip_total.value());
        assert_eq!(Some(412.5), obs.solar_radiation);
        assert!(obs.visibility.is_unknown());
    }

    #[test]
    fn test_missing_gust() {
        let body = r#"[{"dateutc": 1685621700000, "tempf": 40.0, "windspeedmph": 12.0}]"#;
        let mut data: Vec<DeviceData> = serde_json::from_str(body).unwrap();
        let obs = station().observation(data.remove(0));

        assert!(obs.wind_gust.is_unknown());
        assert_eq!(Some(12.0), obs.wind_speed.value());
        assert_eq!(Some(40.0), obs.temperature.value());
    }

    #[test]
    fn test_device_url() {
        let url = station().device_url().unwrap();
        assert_eq!(
            "https://rt.ambientweather.net/v1/devices/00%3A0E%3AC6%3A20%3A0F%3A7B",
            url.as_str()
        );
    }
}
