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

use crate::metrics::ClientMetrics;
use crate::model::Provider;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
pub enum ClientError {
    Internal(reqwest::Error),
    NotFound(Url),
    Unexpected(StatusCode, Url),
    Parse(serde_json::Error, Url),
    Empty(Url),
    InvalidUrl(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal(e) => write!(f, "{}", e),
            Self::NotFound(url) => write!(f, "not found {}", url),
            Self::Unexpected(status, url) => write!(f, "unexpected status {} for {}", status, url),
            Self::Parse(e, url) => write!(f, "unable to parse response from {}: {}", url, e),
            Self::Empty(url) => write!(f, "no data in response from {}", url),
            Self::InvalidUrl(msg) => write!(f, "invalid URL {}", msg),
        }
    }
}

impl error::Error for ClientError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Internal(e) => Some(e),
            Self::Parse(e, _) => Some(e),
            _ => None,
        }
    }
}

/// Enforce a minimum amount of time between requests.
///
/// Callers are served one at a time: `acquire()` holds a lock while waiting for the
/// period to elapse, so a limiter shared by several adapters serializes them.
#[derive(Debug)]
pub struct RateLimiter {
    period: Duration,
    next: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

    pub fn new(period: Duration) -> Self {
        RateLimiter {
            period,
            next: Mutex::new(None),
        }
    }

    /// Wait until a request is allowed to be made.
    pub async fn acquire(&self) {
        let mut next = self.next.lock().await;
        if let Some(at) = *next {
            tokio::time::sleep_until(at).await;
        }

        *next = Some(Instant::now() + self.period);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD)
    }
}

/// One rate limiter per provider, shared by every station using that provider.
#[derive(Debug, Default)]
pub struct RateLimiters {
    limiters: HashMap<Provider, Arc<RateLimiter>>,
}

impl RateLimiters {
    pub fn get(&mut self, provider: Provider) -> Arc<RateLimiter> {
        self.limiters.entry(provider).or_default().clone()
    }
}

/// HTTP client used by provider adapters.
///
/// Every request waits on the rate limiter and is counted. Failed requests (transport
/// errors, non-2xx responses, and bodies that can't be parsed) are logged and counted
/// as errors exactly once before being returned to the adapter.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: Client,
    limiter: Arc<RateLimiter>,
    metrics: ClientMetrics,
}

impl ProviderClient {
    const USER_AGENT: &'static str = concat!(
        "wxdat/",
        env!("CARGO_PKG_VERSION"),
        " (+https://github.com/56quarters/wxdat)"
    );
    pub const JSON_RESPONSE: &'static str = "application/json";

    pub fn new(client: Client, limiter: Arc<RateLimiter>, metrics: ClientMetrics) -> Self {
        ProviderClient {
            client,
            limiter,
            metrics,
        }
    }

    pub fn metrics(&self) -> &ClientMetrics {
        &self.metrics
    }

    /// Make a GET request and parse the body as JSON.
    ///
    /// Query parameters are not included in logs or errors since they often
    /// contain API keys. Transport errors have their URL removed for the same reason.
    pub async fn get_json<T>(&self, url: Url, query: &[(&str, String)], accept: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        self.limiter.acquire().await;
        tracing::debug!(message = "making provider request", url = %url);

        self.metrics.request();
        let res = self.make_request(url, query, accept).await;
        if let Err(e) = &res {
            self.metrics.error();
            tracing::warn!(message = "unable to download data", error = %e);
        }

        res
    }

    async fn make_request<T>(&self, url: Url, query: &[(&str, String)], accept: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let res = self
            .client
            .get(url.clone())
            .query(query)
            .header(USER_AGENT, Self::USER_AGENT)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(|e| ClientError::Internal(e.without_url()))?;

        let status = res.status();
        tracing::debug!(message = "provider response", status = %status);

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(url));
        } else if !status.is_success() {
            return Err(ClientError::Unexpected(status, url));
        }

        let body = res.bytes().await.map_err(|e| ClientError::Internal(e.without_url()))?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Parse(e, url))
    }
}

/// Parse a base URL for a provider API, making sure it ends with a slash so that
/// relative paths are appended instead of replacing the last segment.
pub fn base_url(url: &str) -> Result<Url, ClientError> {
    let res = if url.ends_with('/') {
        Url::parse(url)
    } else {
        Url::parse(&format!("{}/", url))
    };

    res.map_err(|e| ClientError::InvalidUrl(format!("{}: {}", url, e)))
}

#[cfg(test)]
mod tests {
    use super::{base_url, ClientError, ProviderClient, RateLimiter, RateLimiters};
    use crate::metrics::ClientMetrics;
    use crate::model::Provider;
    use reqwest::Client;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_spacing() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        let start = Instant::now();

        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(10));

        limiter.acquire().await;
        limiter.acquire().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(2100), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_elapsed_period() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[test]
    fn test_rate_limiters_shared_per_provider() {
        let mut limiters = RateLimiters::default();
        let a = limiters.get(Provider::Noaa);
        let b = limiters.get(Provider::Noaa);
        let c = limiters.get(Provider::AmbientWeather);

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let url = base_url("https://api.weather.gov").unwrap();
        assert_eq!("https://api.weather.gov/", url.as_str());
        assert_eq!(
            "https://example.com/v1/devices",
            base_url("https://example.com/v1").unwrap().join("devices").unwrap().as_str()
        );
    }

    #[test]
    fn test_base_url_invalid() {
        assert!(matches!(base_url("not a url"), Err(ClientError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let metrics = ClientMetrics::detached(Provider::WUnderground, "pws");
        let client = ProviderClient::new(Client::new(), Arc::new(RateLimiter::default()), metrics.clone());
        // Nothing listens on port 1 so the connection is refused.
        let url = base_url("http://127.0.0.1:1/").unwrap().join("v2/pws/observations/current").unwrap();

        let res: Result<serde_json::Value, ClientError> = client
            .get_json(url, &[("apiKey", "SECRETKEY".to_owned())], ProviderClient::JSON_RESPONSE)
            .await;

        let err = res.unwrap_err();
        assert!(matches!(err, ClientError::Internal(_)));
        assert!(!err.to_string().contains("SECRETKEY"), "error {}", err);
        assert!(!format!("{:?}", err).contains("SECRETKEY"), "error {:?}", err);
        assert_eq!(1, metrics.errors());
    }
}
