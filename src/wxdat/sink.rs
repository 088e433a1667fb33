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

//! Destinations for observations and forecasts produced by recorders.
//!
//! A single sink is shared by every recorder in the process so implementations
//! must be safe to call concurrently.

use crate::model::{HourlyForecast, Observation};
use serde::Serialize;
use std::error;
use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug)]
pub enum SinkError {
    Io(io::Error, PathBuf),
    Serialize(serde_json::Error),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e, path) => write!(f, "unable to write to {}: {}", path.display(), e),
            Self::Serialize(e) => write!(f, "unable to serialize record: {}", e),
        }
    }
}

impl error::Error for SinkError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(e, _) => Some(e),
            Self::Serialize(e) => Some(e),
        }
    }
}

/// Persistence for canonical weather records.
///
/// Returning `Ok` acknowledges that the record was saved. Recorders count readings
/// and failures based on this result.
pub trait Sink: Send + Sync + 'static {
    fn save_observation(&self, obs: &Observation) -> impl Future<Output = Result<(), SinkError>> + Send;

    fn save_forecast(&self, forecast: &HourlyForecast) -> impl Future<Output = Result<(), SinkError>> + Send;
}

#[derive(Serialize, Debug)]
#[serde(tag = "record", rename_all = "snake_case")]
enum Record<'a> {
    Observation(&'a Observation),
    Forecast(&'a HourlyForecast),
}

/// Append each record to a file as a single line of JSON.
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesSink {
    /// Open the file for appending, creating it if it doesn't exist.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| SinkError::Io(e, path.clone()))?;

        tracing::info!(message = "writing records to file", path = %path.display());
        Ok(JsonLinesSink {
            path,
            file: Mutex::new(file),
        })
    }

    async fn write(&self, record: Record<'_>) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(&record).map_err(SinkError::Serialize)?;
        line.push(b'\n');

        // Hold the lock for the whole write so lines from different stations never interleave.
        let mut file = self.file.lock().await;
        file.write_all(&line)
            .await
            .map_err(|e| SinkError::Io(e, self.path.clone()))?;
        file.flush().await.map_err(|e| SinkError::Io(e, self.path.clone()))
    }
}

impl Sink for JsonLinesSink {
    async fn save_observation(&self, obs: &Observation) -> Result<(), SinkError> {
        self.write(Record::Observation(obs)).await
    }

    async fn save_forecast(&self, forecast: &HourlyForecast) -> Result<(), SinkError> {
        self.write(Record::Forecast(forecast)).await
    }
}

/// Emit each record as a log event. Used when no output file is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl Sink for LogSink {
    async fn save_observation(&self, obs: &Observation) -> Result<(), SinkError> {
        tracing::info!(
            message = "observation",
            provider = %obs.provider,
            station = %obs.station_id,
            timestamp = %obs.timestamp,
            temperature = %obs.temperature,
            feels_like = %obs.feels_like,
            dew_point = %obs.dew_point,
            wind_speed = %obs.wind_speed,
            rel_pressure = %obs.rel_pressure,
        );
        Ok(())
    }

    async fn save_forecast(&self, forecast: &HourlyForecast) -> Result<(), SinkError> {
        tracing::debug!(
            message = "forecast",
            provider = %forecast.provider,
            station = %forecast.station_id,
            timestamp = %forecast.timestamp,
            origin_time = %forecast.origin_time,
            temperature = %forecast.temperature,
            precip_probability = ?forecast.precip_probability,
        );
        Ok(())
    }
}

/// Sink selected at startup based on configuration.
#[derive(Debug)]
pub enum Output {
    JsonLines(JsonLinesSink),
    Log(LogSink),
}

impl Sink for Output {
    async fn save_observation(&self, obs: &Observation) -> Result<(), SinkError> {
        match self {
            Self::JsonLines(s) => s.save_observation(obs).await,
            Self::Log(s) => s.save_observation(obs).await,
        }
    }

    async fn save_forecast(&self, forecast: &HourlyForecast) -> Result<(), SinkError> {
        match self {
            Self::JsonLines(s) => s.save_forecast(forecast).await,
            Self::Log(s) => s.save_forecast(forecast).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonLinesSink, LogSink, Sink, SinkError};
    use crate::model::{HourlyForecast, Observation, Provider};
    use crate::units::Quantity;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("wxdat-{}-{}.jsonl", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    fn observation(station: &str) -> Observation {
        let ts = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
        let mut obs = Observation::new(ts, Provider::Noaa, station);
        obs.temperature = Quantity::new(61.5);
        obs
    }

    #[tokio::test]
    async fn test_json_lines_sink() {
        let path = temp_path("lines");
        let sink = JsonLinesSink::open(&path).await.unwrap();

        let ts = Utc.with_ymd_and_hms(2023, 6, 1, 13, 0, 0).unwrap();
        let forecast = HourlyForecast::new(ts, ts, Provider::OpenWeatherMap, "42.1,-70.8");

        sink.save_observation(&observation("KBOS")).await.unwrap();
        sink.save_forecast(&forecast).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(2, lines.len());
        assert_eq!("observation", lines[0]["record"]);
        assert_eq!("NOAA", lines[0]["provider"]);
        assert_eq!("KBOS", lines[0]["station_id"]);
        assert_eq!(61.5, lines[0]["temperature"]);
        assert!(lines[0]["wind_gust"].is_null());
        assert_eq!("forecast", lines[1]["record"]);
    }

    #[tokio::test]
    async fn test_json_lines_sink_concurrent() {
        let path = temp_path("concurrent");
        let sink = Arc::new(JsonLinesSink::open(&path).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..8 {
            let sink = Arc::clone(&sink);
            handles.push(tokio::spawn(async move {
                sink.save_observation(&observation(&format!("S{}", i))).await
            }));
        }

        for h in handles {
            h.await.unwrap().unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(8, contents.lines().count());
        for line in contents.lines() {
            let _: serde_json::Value = serde_json::from_str(line).unwrap();
        }
    }

    #[tokio::test]
    async fn test_json_lines_sink_bad_path() {
        let path = std::env::temp_dir().join("wxdat-missing-dir").join("nested").join("out.jsonl");
        let res = JsonLinesSink::open(&path).await;
        assert!(matches!(res, Err(SinkError::Io(_, _))));
    }

    #[tokio::test]
    async fn test_log_sink() {
        assert!(LogSink.save_observation(&observation("KBOS")).await.is_ok());
    }
}
