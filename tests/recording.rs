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

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus_client::registry::Registry;
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use wxdat::client::RateLimiters;
use wxdat::config::AppConfig;
use wxdat::http::RequestContext;
use wxdat::metrics::WeatherMetrics;
use wxdat::providers::WeatherSource;
use wxdat::recorder::{Recorder, RecorderState};
use wxdat::sink::JsonLinesSink;

const LATEST: &str = r#"{
    "id": "https://api.weather.gov/stations/KBOS/observations/2023-06-01T12:54:00+00:00",
    "properties": {
        "timestamp": "2023-06-01T12:54:00+00:00",
        "textDescription": "Mostly Clear",
        "temperature": {"unitCode": "wmoUnit:degC", "value": 20.0, "qualityControl": "V"},
        "relativeHumidity": {"unitCode": "wmoUnit:percent", "value": 55.0, "qualityControl": "V"}
    }
}"#;

async fn serve(router: Router) -> SocketAddr {
    let addr: SocketAddr = ([127, 0, 0, 1], 0).into();
    let server = axum::Server::bind(&addr).serve(router.into_make_service());
    let local = server.local_addr();
    tokio::spawn(server);
    local
}

#[tokio::test]
async fn test_record_and_export() {
    let upstream = Router::new()
        .route(
            "/stations/KBOS/observations/latest",
            get(|| async { ([(CONTENT_TYPE, "application/geo+json")], LATEST) }),
        )
        .route(
            "/devices/:mac",
            get(|| async { (StatusCode::UNAUTHORIZED, "{\"error\": \"apiKey\"}") }),
        );
    let upstream = serve(upstream).await;

    let yaml = format!(
        r#"
update_interval: 3600
stations:
  - name: home
    provider: noaa
    station: KBOS
    api_url: "http://{addr}"
  - name: yard
    provider: ambient
    device_id: "AA:BB:CC:DD:EE:FF"
    app_key: app
    user_key: user
    api_url: "http://{addr}"
"#,
        addr = upstream
    );
    let config = AppConfig::parse(&yaml).unwrap();

    let mut registry = Registry::with_prefix(WeatherMetrics::PREFIX);
    let metrics = WeatherMetrics::new(&mut registry);
    let mut limiters = RateLimiters::default();
    let http = Client::new();

    let path = std::env::temp_dir().join(format!("wxdat-recording-{}.jsonl", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let sink = Arc::new(JsonLinesSink::open(&path).await.unwrap());

    let mut recorders = Vec::new();
    for station_config in config.stations.iter() {
        let station = station_config.build(&http, &mut limiters, &metrics).unwrap();
        let recorder_metrics = metrics.recorder(station.provider(), station.name());
        let mut recorder = Recorder::new(station, Arc::clone(&sink), config.interval(station_config), recorder_metrics);
        recorder.start().unwrap();
        recorders.push(recorder);
    }

    // Wait for the first tick of each station to complete.
    for _ in 0..100 {
        if recorders[0].metrics().readings() == 1 && recorders[1].metrics().failures() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    assert_eq!(1, recorders[0].metrics().readings());
    assert_eq!(0, recorders[0].metrics().failures());
    assert_eq!(0, recorders[1].metrics().readings());
    assert_eq!(1, recorders[1].metrics().failures());
    assert_eq!(68.0, recorders[0].metrics().temperature());

    let exporter = serve(wxdat::http::router(Arc::new(RequestContext::new(registry)))).await;
    let res = http.get(format!("http://{}/metrics", exporter)).send().await.unwrap();
    assert_eq!(StatusCode::OK.as_u16(), res.status().as_u16());
    let text = res.text().await.unwrap();
    assert!(text.contains("wxdat_station_readings_total{provider=\"NOAA\",station=\"home\"} 1"));
    assert!(text.contains("wxdat_station_failures_total{provider=\"AmbientWeather\",station=\"yard\"} 1"));
    assert!(text.contains("wxdat_provider_errors_total{provider=\"AmbientWeather\",station=\"yard\"} 1"));
    assert!(text.contains("wxdat_relative_humidity{provider=\"NOAA\",station=\"home\"} 55"));

    let res = http.get(format!("http://{}/other", exporter)).send().await.unwrap();
    assert_eq!(StatusCode::NOT_FOUND.as_u16(), res.status().as_u16());

    let res = http.post(format!("http://{}/metrics", exporter)).send().await.unwrap();
    assert_eq!(StatusCode::METHOD_NOT_ALLOWED.as_u16(), res.status().as_u16());

    for recorder in recorders.iter_mut() {
        recorder.stop().await;
        assert_eq!(RecorderState::Stopped, recorder.state());
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    let lines: Vec<serde_json::Value> = contents.lines().map(|l| serde_json::from_str(l).unwrap()).collect();

    assert_eq!(1, lines.len());
    assert_eq!("KBOS", lines[0]["station_id"]);
    assert_eq!(68.0, lines[0]["temperature"]);
    assert!(lines[0]["wind_gust"].is_null());
}
