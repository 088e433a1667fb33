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

use crate::model::{Observation, Provider};
use crate::units::{Quantity, Unit};
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use std::sync::atomic::AtomicU64;

type FloatGauge = Family<StationLabels, Gauge<f64, AtomicU64>>;

#[derive(Debug, Clone, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct StationLabels {
    pub provider: String,
    pub station: String,
}

impl StationLabels {
    pub fn new(provider: Provider, station: &str) -> Self {
        StationLabels {
            provider: provider.as_str().to_owned(),
            station: station.to_owned(),
        }
    }
}

/// Holder for all metrics emitted while recording weather data.
///
/// All metrics are created and registered upon call to `WeatherMetrics::new()`. Metrics
/// share the prefix "wxdat_" and have "provider" and "station" labels. The station label
/// is the configured name of the station, not the provider assigned identifier.
#[derive(Debug, Clone)]
pub struct WeatherMetrics {
    requests: Family<StationLabels, Counter>,
    errors: Family<StationLabels, Counter>,
    readings: Family<StationLabels, Counter>,
    failures: Family<StationLabels, Counter>,
    gauges: ObservationGauges,
}

impl WeatherMetrics {
    pub const PREFIX: &'static str = "wxdat";

    /// Create a new `WeatherMetrics` and register each metric with the provided `Registry`.
    pub fn new(reg: &mut Registry) -> Self {
        let requests = Family::<StationLabels, Counter>::default();
        let errors = Family::<StationLabels, Counter>::default();
        let readings = Family::<StationLabels, Counter>::default();
        let failures = Family::<StationLabels, Counter>::default();

        reg.register("provider_requests", "Requests made to provider APIs", requests.clone());
        reg.register("provider_errors", "Failed requests to provider APIs", errors.clone());
        reg.register("station_readings", "Readings saved for a station", readings.clone());
        reg.register("station_failures", "Readings that could not be saved", failures.clone());

        Self {
            requests,
            errors,
            readings,
            failures,
            gauges: ObservationGauges::new(reg),
        }
    }

    /// Metrics updated by the HTTP client of a single station.
    pub fn client(&self, provider: Provider, station: &str) -> ClientMetrics {
        ClientMetrics {
            labels: StationLabels::new(provider, station),
            requests: self.requests.clone(),
            errors: self.errors.clone(),
        }
    }

    /// Metrics updated by the recorder of a single station.
    pub fn recorder(&self, provider: Provider, station: &str) -> RecorderMetrics {
        RecorderMetrics {
            labels: StationLabels::new(provider, station),
            readings: self.readings.clone(),
            failures: self.failures.clone(),
            gauges: self.gauges.clone(),
        }
    }
}

/// Request and error counters for one station's provider client.
#[derive(Debug, Clone)]
pub struct ClientMetrics {
    labels: StationLabels,
    requests: Family<StationLabels, Counter>,
    errors: Family<StationLabels, Counter>,
}

impl ClientMetrics {
    /// Metrics that aren't registered anywhere, for clients used outside of a recorder.
    pub fn detached(provider: Provider, station: &str) -> Self {
        ClientMetrics {
            labels: StationLabels::new(provider, station),
            requests: Family::default(),
            errors: Family::default(),
        }
    }

    pub fn request(&self) {
        self.requests.get_or_create(&self.labels).inc();
    }

    pub fn error(&self) {
        self.errors.get_or_create(&self.labels).inc();
    }

    pub fn requests(&self) -> u64 {
        self.requests.get_or_create(&self.labels).get()
    }

    pub fn errors(&self) -> u64 {
        self.errors.get_or_create(&self.labels).get()
    }
}

/// Reading counters and last observed values for one station.
#[derive(Debug, Clone)]
pub struct RecorderMetrics {
    labels: StationLabels,
    readings: Family<StationLabels, Counter>,
    failures: Family<StationLabels, Counter>,
    gauges: ObservationGauges,
}

impl RecorderMetrics {
    pub fn detached(provider: Provider, station: &str) -> Self {
        let mut reg = Registry::default();
        WeatherMetrics::new(&mut reg).recorder(provider, station)
    }

    pub fn reading(&self) {
        self.readings.get_or_create(&self.labels).inc();
    }

    pub fn failure(&self) {
        self.failures.get_or_create(&self.labels).inc();
    }

    pub fn readings(&self) -> u64 {
        self.readings.get_or_create(&self.labels).get()
    }

    pub fn failures(&self) -> u64 {
        self.failures.get_or_create(&self.labels).get()
    }

    /// Set gauges from the provided observation if the relevant value exists.
    ///
    /// If the observation doesn't contain a value for a particular field, the gauge
    /// keeps its previous value.
    pub fn observe(&self, obs: &Observation) {
        let g = &self.gauges;
        self.set_quantity(&g.temperature, &obs.temperature);
        self.set_quantity(&g.feels_like, &obs.feels_like);
        self.set_quantity(&g.dew_point, &obs.dew_point);
        self.set_quantity(&g.wind_speed, &obs.wind_speed);
        self.set_quantity(&g.wind_gust, &obs.wind_gust);
        self.set_value(&g.wind_bearing, obs.wind_bearing);
        self.set_value(&g.humidity, obs.humidity);
        self.set_quantity(&g.abs_pressure, &obs.abs_pressure);
        self.set_quantity(&g.rel_pressure, &obs.rel_pressure);
        self.set_quantity(&g.precip_rate, &obs.precip_rate);
        self.set_quantity(&g.precip_hour, &obs.precip_hour);
        self.set_quantity(&g.precip_day, &obs.precip_day);
        self.set_quantity(&g.precip_week, &obs.precip_week);
        self.set_quantity(&g.precip_month, &obs.precip_month);
        self.set_quantity(&g.precip_year, &obs.precip_year);
        self.set_quantity(&g.precip_total, &obs.precip_total);
        self.set_value(&g.cloud_cover, obs.cloud_cover);
        self.set_quantity(&g.visibility, &obs.visibility);
        self.set_value(&g.uv_index, obs.uv_index);
        self.set_value(&g.ozone, obs.ozone);
        self.set_value(&g.solar_radiation, obs.solar_radiation);
        self.set_value(&g.solar_lux, obs.solar_lux);
    }

    /// Last value recorded for the temperature gauge, in Fahrenheit.
    pub fn temperature(&self) -> f64 {
        self.gauges.temperature.get_or_create(&self.labels).get()
    }

    fn set_quantity<U: Unit>(&self, gauge: &FloatGauge, quantity: &Quantity<U>) {
        self.set_value(gauge, quantity.value());
    }

    fn set_value(&self, gauge: &FloatGauge, value: Option<f64>) {
        if let Some(v) = value {
            gauge.get_or_create(&self.labels).set(v);
        }
    }
}

#[derive(Debug, Clone)]
struct ObservationGauges {
    temperature: FloatGauge,
    feels_like: FloatGauge,
    dew_point: FloatGauge,
    wind_speed: FloatGauge,
    wind_gust: FloatGauge,
    wind_bearing: FloatGauge,
    humidity: FloatGauge,
    abs_pressure: FloatGauge,
    rel_pressure: FloatGauge,
    precip_rate: FloatGauge,
    precip_hour: FloatGauge,
    precip_day: FloatGauge,
    precip_week: FloatGauge,
    precip_month: FloatGauge,
    precip_year: FloatGauge,
    precip_total: FloatGauge,
    cloud_cover: FloatGauge,
    visibility: FloatGauge,
    uv_index: FloatGauge,
    ozone: FloatGauge,
    solar_radiation: FloatGauge,
    solar_lux: FloatGauge,
}

impl ObservationGauges {
    fn new(reg: &mut Registry) -> Self {
        let mut gauge = |name: &str, help: &str| {
            let g = FloatGauge::default();
            reg.register(name, help, g.clone());
            g
        };

        Self {
            temperature: gauge("temperature_fahrenheit", "Temperature in fahrenheit"),
            feels_like: gauge("feels_like_fahrenheit", "Apparent temperature in fahrenheit"),
            dew_point: gauge("dew_point_fahrenheit", "Dew point in fahrenheit"),
            wind_speed: gauge("wind_speed_mph", "Wind speed in miles per hour"),
            wind_gust: gauge("wind_gust_mph", "Wind gust speed in miles per hour"),
            wind_bearing: gauge("wind_bearing_degrees", "Wind direction in degrees (0-360)"),
            humidity: gauge("relative_humidity", "Relative humidity (0-100)"),
            abs_pressure: gauge("abs_pressure_inhg", "Absolute (station) pressure in inches of mercury"),
            rel_pressure: gauge("rel_pressure_inhg", "Relative (sea level) pressure in inches of mercury"),
            precip_rate: gauge("precip_rate_inches_per_hour", "Precipitation rate in inches per hour"),
            precip_hour: gauge("precip_hour_inches", "Precipitation in the last hour in inches"),
            precip_day: gauge("precip_day_inches", "Precipitation today in inches"),
            precip_week: gauge("precip_week_inches", "Precipitation this week in inches"),
            precip_month: gauge("precip_month_inches", "Precipitation this month in inches"),
            precip_year: gauge("precip_year_inches", "Precipitation this year in inches"),
            precip_total: gauge("precip_total_inches", "Total precipitation in inches"),
            cloud_cover: gauge("cloud_cover", "Cloud cover (0-100)"),
            visibility: gauge("visibility_miles", "Visibility in miles"),
            uv_index: gauge("uv_index", "UV index"),
            ozone: gauge("ozone", "Ozone in dobson units"),
            solar_radiation: gauge("solar_radiation", "Solar radiation in watts per square meter"),
            solar_lux: gauge("solar_lux", "Solar illuminance in lux"),
        }
    }
}
