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

//! Per-station scheduling of fetches and saves.
//!
//! Each [`Recorder`] binds one [`WeatherSource`] to the shared [`Sink`] and polls it
//! on a fixed interval from its own task. Ticks are started `interval` apart no
//! matter how long the fetch takes. A tick that overruns the interval is followed
//! immediately by the next one. Ticks are never skipped and never run concurrently.

use crate::metrics::RecorderMetrics;
use crate::model::Provider;
use crate::providers::WeatherSource;
use crate::sink::Sink;
use std::error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderError {
    AlreadyStarted,
    Stopped,
}

impl fmt::Display for RecorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyStarted => write!(f, "recorder already started"),
            Self::Stopped => write!(f, "recorder has been stopped and cannot be restarted"),
        }
    }
}

impl error::Error for RecorderError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Poll a single station on an interval and forward results to a sink.
///
/// A recorder can only be started once. Create a new one to resume polling a station
/// after it has been stopped.
#[derive(Debug)]
pub struct Recorder<S, K>
where
    S: WeatherSource,
    K: Sink,
{
    name: String,
    provider: Provider,
    interval: Duration,
    state: RecorderState,
    source: Option<S>,
    sink: Arc<K>,
    metrics: RecorderMetrics,
    stop: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl<S, K> Recorder<S, K>
where
    S: WeatherSource,
    K: Sink,
{
    pub fn new(source: S, sink: Arc<K>, interval: Duration, metrics: RecorderMetrics) -> Self {
        let (stop, _) = watch::channel(false);

        Recorder {
            name: source.name().to_owned(),
            provider: source.provider(),
            interval,
            state: RecorderState::Idle,
            source: Some(source),
            sink,
            metrics,
            stop,
            handle: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn metrics(&self) -> &RecorderMetrics {
        &self.metrics
    }

    /// Spawn the polling task. Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<(), RecorderError> {
        match self.state {
            RecorderState::Idle => {}
            RecorderState::Running => return Err(RecorderError::AlreadyStarted),
            RecorderState::Stopping | RecorderState::Stopped => return Err(RecorderError::Stopped),
        }

        let source = self.source.take().ok_or(RecorderError::Stopped)?;
        let task = Task {
            source,
            sink: Arc::clone(&self.sink),
            metrics: self.metrics.clone(),
            interval: self.interval,
            stop: self.stop.subscribe(),
        };

        let span = tracing::info_span!("recorder", provider = %self.provider, station = %self.name);
        self.handle = Some(tokio::spawn(task.run().instrument(span)));
        self.state = RecorderState::Running;

        tracing::info!(
            message = "started recorder",
            provider = %self.provider,
            station = %self.name,
            interval_secs = self.interval.as_secs_f64(),
        );
        Ok(())
    }

    /// Signal the polling task to exit and wait for it to do so.
    ///
    /// A task sleeping between ticks wakes immediately. A task in the middle of a tick
    /// is allowed to finish it. Waiting is bounded by the polling interval, after which
    /// a warning is logged and the task is left to exit on its own.
    pub async fn stop(&mut self) {
        match self.state {
            RecorderState::Idle => {
                self.source = None;
                self.state = RecorderState::Stopped;
                tracing::debug!(message = "stopped recorder that was never started", station = %self.name);
                return;
            }
            RecorderState::Running => {}
            RecorderState::Stopping | RecorderState::Stopped => return,
        }

        self.state = RecorderState::Stopping;
        // No receivers means the task already exited which is fine.
        let _ = self.stop.send(true);

        if let Some(handle) = self.handle.take() {
            match tokio::time::timeout(self.interval, handle).await {
                Ok(Ok(())) => {
                    tracing::info!(message = "stopped recorder", provider = %self.provider, station = %self.name);
                }
                Ok(Err(e)) => {
                    tracing::warn!(message = "recorder task failed", station = %self.name, error = %e);
                }
                Err(_) => {
                    tracing::warn!(
                        message = "timed out waiting for recorder to stop",
                        station = %self.name,
                        timeout_secs = self.interval.as_secs_f64(),
                    );
                }
            }
        }

        self.state = RecorderState::Stopped;
    }
}

/// State owned by the spawned polling task.
struct Task<S, K> {
    source: S,
    sink: Arc<K>,
    metrics: RecorderMetrics,
    interval: Duration,
    stop: watch::Receiver<bool>,
}

impl<S, K> Task<S, K>
where
    S: WeatherSource,
    K: Sink,
{
    async fn run(mut self) {
        loop {
            if self.should_stop() {
                break;
            }

            let tick_start = Instant::now();
            self.tick().await;

            let elapsed = tick_start.elapsed();
            let sleep = match self.interval.checked_sub(elapsed) {
                Some(d) if !d.is_zero() => d,
                _ => {
                    tracing::warn!(
                        message = "tick took longer than update interval, starting next immediately",
                        elapsed_secs = elapsed.as_secs_f64(),
                        interval_secs = self.interval.as_secs_f64(),
                    );
                    Duration::ZERO
                }
            };

            if self.should_stop() {
                break;
            }

            if !sleep.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(sleep) => {}
                    res = self.stop.changed() => {
                        if res.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        tracing::debug!(message = "recorder loop exited");
    }

    /// Stop when asked to or when the owning recorder has been dropped.
    fn should_stop(&self) -> bool {
        *self.stop.borrow() || self.stop.has_changed().is_err()
    }

    async fn tick(&mut self) {
        match self.source.current_conditions().await {
            Some(obs) => match self.sink.save_observation(&obs).await {
                Ok(()) => {
                    tracing::info!(
                        message = "recorded observation",
                        timestamp = %obs.timestamp,
                        temperature = %obs.temperature,
                    );
                    self.metrics.observe(&obs);
                    self.metrics.reading();
                }
                Err(e) => {
                    tracing::warn!(message = "unable to save observation", error = %e);
                    self.metrics.failure();
                }
            },
            None => {
                tracing::info!(message = "current conditions not available");
                self.metrics.failure();
            }
        }

        if !self.source.supports_forecast() {
            return;
        }

        match self.source.hourly_forecast().await {
            Some(forecasts) => {
                for forecast in forecasts.iter() {
                    match self.sink.save_forecast(forecast).await {
                        Ok(()) => self.metrics.reading(),
                        Err(e) => {
                            tracing::warn!(
                                message = "unable to save forecast",
                                timestamp = %forecast.timestamp,
                                error = %e,
                            );
                            self.metrics.failure();
                        }
                    }
                }

                tracing::debug!(message = "recorded hourly forecast", entries = forecasts.len());
            }
            None => {
                tracing::info!(message = "hourly forecast not available");
                self.metrics.failure();
            }
        }
    }
}
