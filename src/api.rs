//! OpenWeatherMap HTTP client
//!
//! Thin async client for the geocoding and 5 day / 3 hour forecast endpoints,
//! with a client-side rate limiter and status-code classification. Failed
//! requests are reported to the caller as-is; nothing here retries.

use crate::config::ProviderConfig;
use crate::models::{Location, Units};
use crate::{Result, WeatherDbError};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

const USER_AGENT: &str = concat!("weatherdb/", env!("CARGO_PKG_VERSION"));
const GEOCODING_PATH: &str = "/geo/1.0/direct";
const FORECAST_PATH: &str = "/data/2.5/forecast";
const GEOCODING_LIMIT: u8 = 5;

/// Sliding-window rate limiter for outgoing requests
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    request_times: VecDeque<Instant>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: (max_requests as usize).max(1),
            window,
            request_times: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Record a request at `now` if the window has room; otherwise return how long
    /// until the oldest request leaves the window.
    pub fn try_acquire(&mut self, now: Instant) -> std::result::Result<(), Duration> {
        while let Some(&oldest) = self.request_times.front() {
            if now.duration_since(oldest) >= self.window {
                self.request_times.pop_front();
            } else {
                break;
            }
        }

        match self.request_times.front() {
            Some(&oldest) if self.request_times.len() >= self.max_requests => {
                Err(self.window - now.duration_since(oldest))
            }
            _ => {
                self.request_times.push_back(now);
                Ok(())
            }
        }
    }
}

/// Geocoding candidate returned by `/geo/1.0/direct`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeocodingResult {
    pub name: String,
    /// Local names in different languages
    pub local_names: Option<HashMap<String, String>>,
    pub lat: f64,
    pub lon: f64,
    /// Country code
    #[serde(default)]
    pub country: String,
    /// State or region, when the provider knows one
    pub state: Option<String>,
}

impl From<GeocodingResult> for Location {
    fn from(geocoding: GeocodingResult) -> Self {
        Location::new(geocoding.name, geocoding.country, geocoding.lat, geocoding.lon)
    }
}

/// Body of `/data/2.5/forecast`
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastEntry>,
}

/// One 3-hour slot of the forecast
#[derive(Debug, Deserialize)]
pub struct ForecastEntry {
    /// Slot start as `YYYY-MM-DD hh:mm:ss`, no offset
    pub dt_txt: String,
    pub main: MainReadings,
    pub weather: Vec<WeatherCondition>,
    pub wind: WindReading,
}

#[derive(Debug, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Deserialize)]
pub struct WeatherCondition {
    pub main: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct WindReading {
    pub speed: f64,
}

/// Async client for the OpenWeatherMap API
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: Mutex<RateLimiter>,
}

impl OpenWeatherClient {
    /// Create a client from provider settings. An API key is required.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                WeatherDbError::config(
                    "An OpenWeatherMap API key is required. Set provider.api_key or WEATHERDB_PROVIDER__API_KEY.",
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherDbError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter: Mutex::new(RateLimiter::per_minute(config.requests_per_minute)),
        })
    }

    /// Look up candidate places for a free-text name, best match first
    #[instrument(skip(self))]
    pub async fn geocode(&self, location_name: &str) -> Result<Vec<GeocodingResult>> {
        let location_name = location_name.trim();
        if location_name.is_empty() {
            return Err(WeatherDbError::validation("Location name cannot be empty"));
        }

        let url = format!(
            "{}{}?q={}&limit={}&appid={}",
            self.base_url,
            GEOCODING_PATH,
            urlencoding::encode(location_name),
            GEOCODING_LIMIT,
            urlencoding::encode(&self.api_key)
        );

        let results: Vec<GeocodingResult> = self.get_json(&url).await?;

        debug!(
            "Geocoding results: {:?}",
            results
                .iter()
                .map(|r| format!("{}, {} ({:.4}, {:.4})", r.name, r.country, r.lat, r.lon))
                .collect::<Vec<_>>()
        );

        Ok(results)
    }

    /// Fetch the raw 5 day / 3 hour forecast for a coordinate pair
    #[instrument(skip(self))]
    pub async fn forecast(&self, lat: f64, lon: f64, units: Units) -> Result<ForecastResponse> {
        let url = format!(
            "{}{}?lat={}&lon={}&units={}&appid={}",
            self.base_url,
            FORECAST_PATH,
            lat,
            lon,
            units.as_str(),
            urlencoding::encode(&self.api_key)
        );

        let response: ForecastResponse = self.get_json(&url).await?;
        debug!("Forecast response holds {} entries", response.list.len());
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.make_request(url).await?;
        response.json::<T>().await.map_err(|e| {
            let e = e.without_url();
            warn!(url = redact(url), "Failed to parse provider response: {}", e);
            WeatherDbError::invalid_response(format!("Failed to parse provider response: {e}"))
        })
    }

    /// Send a GET once the rate limiter allows it and classify the status
    async fn make_request(&self, url: &str) -> Result<Response> {
        self.wait_for_slot().await;

        let request_start = Instant::now();
        debug!(url = redact(url), "Sending provider request");

        // reqwest errors carry the request URL, and with it the API key
        let response = self.client.get(url).send().await.map_err(|e| {
            let e = e.without_url();
            warn!(url = redact(url), "Network error: {}", e);
            WeatherDbError::api(format!("Network error: {e}"))
        })?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            request_start.elapsed().as_secs_f64()
        );

        if status.is_success() {
            return Ok(response);
        }

        let code = status.as_u16();
        let message = match code {
            401 => "Invalid API key. Please check your OpenWeatherMap API key.".to_string(),
            404 => "Requested resource not found (HTTP 404).".to_string(),
            429 => "Provider rate limit exceeded (HTTP 429).".to_string(),
            _ => format!(
                "API request failed with status: {} - {}",
                code,
                status.canonical_reason().unwrap_or("Unknown error")
            ),
        };
        warn!(url = redact(url), status = code, "{}", message);
        Err(WeatherDbError::api_status(message, code))
    }

    async fn wait_for_slot(&self) {
        loop {
            let wait = match self.rate_limiter.lock().await.try_acquire(Instant::now()) {
                Ok(()) => return,
                Err(wait) => wait,
            };
            warn!("Rate limit reached, waiting {:.1}s", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }
    }
}

/// Strip the API key from a request URL before it is logged
fn redact(url: &str) -> &str {
    url.split("appid=").next().unwrap_or(url)
}
