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

use clap::Parser;
use prometheus_client::registry::Registry;
use reqwest::Client;
use std::error::Error;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal::unix::{self, SignalKind};
use tracing::Level;
use wxdat::client::{ClientError, RateLimiters};
use wxdat::config::AppConfig;
use wxdat::http::RequestContext;
use wxdat::metrics::WeatherMetrics;
use wxdat::model::Provider;
use wxdat::providers::{Station, WeatherSource};
use wxdat::recorder::Recorder;
use wxdat::sink::{JsonLinesSink, LogSink, Output};

const DEFAULT_LOG_LEVEL: Level = Level::INFO;
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 9783);
const DEFAULT_TIMEOUT_MILLIS: u64 = 5000;
const DEFAULT_CONFIG_PATH: &str = "wxdat.yaml";

#[derive(Debug, Parser)]
#[clap(name = "wxdat", version = clap::crate_version!())]
struct WxdatApplication {
    /// Path to the YAML file describing stations to record observations for
    #[clap(long, default_value_t = DEFAULT_CONFIG_PATH.into())]
    config: String,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[clap(long, default_value_t = DEFAULT_LOG_LEVEL)]
    log_level: Level,

    /// Timeout for each request made to a provider API, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_MILLIS)]
    timeout_millis: u64,

    /// File to append observations and forecasts to as JSON lines. Overrides the
    /// WXDAT_OUTPUT environment variable and the config file. Records are logged when
    /// no output is set.
    #[clap(long)]
    output: Option<PathBuf>,

    /// Address to bind to. By default, wxdat will bind to public address since
    /// the purpose is to expose metrics to an external system (Prometheus or another
    /// agent for ingestion)
    #[clap(long, default_value_t = DEFAULT_BIND_ADDR.into())]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let opts = WxdatApplication::parse();
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(opts.log_level)
            .finish(),
    )
    .expect("failed to set tracing subscriber");

    let startup = Instant::now();
    let config = AppConfig::from_file(&opts.config).unwrap_or_else(|e| {
        tracing::error!(message = "unable to load configuration", path = %opts.config, error = %e);
        process::exit(1)
    });

    let timeout = Duration::from_millis(opts.timeout_millis);
    let http_client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        tracing::error!(message = "unable to initialize HTTP client", error = %e);
        process::exit(1)
    });

    let mut registry = Registry::with_prefix(WeatherMetrics::PREFIX);
    let metrics = WeatherMetrics::new(&mut registry);
    let mut limiters = RateLimiters::default();
    let mut stations = Vec::with_capacity(config.stations.len());

    for station_config in config.stations.iter() {
        let station = station_config
            .build(&http_client, &mut limiters, &metrics)
            .unwrap_or_else(|e| {
                tracing::error!(message = "unable to create station", error = %e);
                process::exit(1)
            });

        // Make an initial request for stations that support it. This allows us to verify that
        // the station the user provided is valid before running indefinitely.
        match station.verify().await {
            Err(ClientError::NotFound(url)) => {
                tracing::error!(message = "invalid station provided", station = %station.name(), url = %url);
                process::exit(1)
            }
            Err(e) => {
                tracing::warn!(message = "failed to verify station", station = %station.name(), error = %e);
            }
            Ok(()) => {
                tracing::debug!(message = "verified station", station = %station.name());
            }
        }

        stations.push((station, config.interval(station_config)));
    }

    let sink = match config.output(opts.output.as_deref()) {
        Some(path) => Output::JsonLines(JsonLinesSink::open(&path).await.unwrap_or_else(|e| {
            tracing::error!(message = "unable to open output", error = %e);
            process::exit(1)
        })),
        None => Output::Log(LogSink),
    };

    let sink = Arc::new(sink);
    let mut recorders: Vec<Recorder<Station, Output>> = Vec::with_capacity(stations.len());
    for (station, interval) in stations {
        let recorder_metrics = metrics.recorder(station.provider(), station.name());
        let mut recorder = Recorder::new(station, Arc::clone(&sink), interval, recorder_metrics);
        recorder.start()?;
        recorders.push(recorder);
    }

    let context = Arc::new(RequestContext::new(registry));
    let server = axum::Server::try_bind(&opts.bind).unwrap_or_else(|e| {
        tracing::error!(message = "error binding to address", address = %opts.bind, error = %e);
        process::exit(1)
    });

    tracing::info!(
        message = "server started",
        address = %opts.bind,
        stations = recorders.len(),
        providers = ?providers(&recorders),
    );

    server
        .serve(wxdat::http::router(context).into_make_service())
        .with_graceful_shutdown(async {
            // Wait for either SIGTERM or SIGINT to shutdown
            tokio::select! {
                _ = sigterm() => {}
                _ = sigint() => {}
            }
        })
        .await?;

    let stopping: Vec<_> = recorders
        .into_iter()
        .map(|mut r| tokio::spawn(async move { r.stop().await }))
        .collect();
    for handle in stopping {
        let _ = handle.await;
    }

    tracing::info!(message = "server shutdown", runtime_secs = startup.elapsed().as_secs());
    Ok(())
}

fn providers(recorders: &[Recorder<Station, Output>]) -> Vec<Provider> {
    let mut out: Vec<Provider> = recorders.iter().map(|r| r.provider()).collect();
    out.sort_by_key(|p| p.as_str());
    out.dedup();
    out
}

/// Return after the first SIGTERM signal received by this process
async fn sigterm() -> io::Result<()> {
    unix::signal(SignalKind::terminate())?.recv().await;
    Ok(())
}

/// Return after the first SIGINT signal received by this process
async fn sigint() -> io::Result<()> {
    unix::signal(SignalKind::interrupt())?.recv().await;
    Ok(())
}
