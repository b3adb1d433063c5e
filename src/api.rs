//! Provider clients for geocoding (OpenCage) and weather (OpenWeather One Call)
//!
//! Each provider sits behind a small trait so the acquisition pipeline can be
//! driven by mock providers in tests. Both clients treat any non-2xx answer as
//! a hard failure of that call; retrying is the caller's business.

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::config::InsightsConfig;
use crate::error::{InsightsError, ProviderError};
use crate::models::{Coordinates, RawGeocodeResult, WeatherRecord};

pub const GEOCODING_PROVIDER: &str = "OpenCage";
pub const WEATHER_PROVIDER: &str = "OpenWeather";

const USER_AGENT: &str = concat!("weather-insights/", env!("CARGO_PKG_VERSION"));

/// Forward and reverse geocoding
pub trait GeocodingProvider {
    /// Resolve free text to candidate places, best match first
    fn forward(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<RawGeocodeResult>, ProviderError>> + Send;

    /// Resolve coordinates to candidate places, best match first
    fn reverse(
        &self,
        coordinates: Coordinates,
    ) -> impl Future<Output = Result<Vec<RawGeocodeResult>, ProviderError>> + Send;
}

/// Current, hourly and daily weather for a position
pub trait WeatherProvider {
    fn fetch_weather(
        &self,
        coordinates: Coordinates,
    ) -> impl Future<Output = Result<WeatherRecord, ProviderError>> + Send;
}

/// Geocoding response envelope
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<RawGeocodeResult>,
}

pub(crate) fn build_http_client(timeout_seconds: u32) -> Result<Client, InsightsError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| InsightsError::config(format!("Failed to create HTTP client: {e}")))
}

fn require_api_key(key: Option<&String>, provider: &str) -> Result<String, InsightsError> {
    match key {
        Some(key) if !key.trim().is_empty() => Ok(key.clone()),
        _ => Err(InsightsError::config(format!(
            "{provider} API key is required. Set it in the config file or the environment."
        ))),
    }
}

/// GET `url` and decode a JSON body; `redacted` is what ends up in the logs
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    redacted: &str,
    provider: &'static str,
) -> Result<T, ProviderError> {
    let start = Instant::now();
    debug!("{} request: {}", provider, redacted);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;

    let status = response.status();
    if !status.is_success() {
        warn!("{} returned HTTP {}", provider, status);
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;

    let parsed = serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
        provider,
        message: e.to_string(),
    })?;

    debug!(
        "{} answered in {:.3}s",
        provider,
        start.elapsed().as_secs_f64()
    );
    Ok(parsed)
}

/// OpenCage geocoding client
#[derive(Debug, Clone)]
pub struct OpenCageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenCageClient {
    /// Create a client from the `geocoding` section of the configuration
    pub fn new(config: &InsightsConfig) -> Result<Self, InsightsError> {
        let api_key = require_api_key(config.geocoding.api_key.as_ref(), GEOCODING_PROVIDER)?;
        Self::with_base_url(&api_key, &config.geocoding.base_url, config.http.timeout_seconds)
    }

    /// Create a client against a custom base URL (for testing with wiremock)
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        timeout_seconds: u32,
    ) -> Result<Self, InsightsError> {
        Ok(Self {
            client: build_http_client(timeout_seconds)?,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn query(&self, q: &str) -> Result<Vec<RawGeocodeResult>, ProviderError> {
        let url = format!(
            "{}/json?q={}&key={}",
            self.base_url,
            q,
            urlencoding::encode(&self.api_key)
        );
        let redacted = format!("{}/json?q={}", self.base_url, q);

        let response: GeocodeResponse =
            get_json(&self.client, &url, &redacted, GEOCODING_PROVIDER).await?;
        Ok(response.results)
    }
}

impl GeocodingProvider for OpenCageClient {
    #[instrument(skip(self))]
    async fn forward(&self, query: &str) -> Result<Vec<RawGeocodeResult>, ProviderError> {
        let results = self.query(&urlencoding::encode(query)).await?;

        if results.is_empty() {
            warn!("No results found for location '{}'", query);
        } else {
            info!("Found {} geocoding results for '{}'", results.len(), query);
        }
        Ok(results)
    }

    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn reverse(
        &self,
        coordinates: Coordinates,
    ) -> Result<Vec<RawGeocodeResult>, ProviderError> {
        // "lat+lng": the plus is an encoded space
        let q = format!("{}+{}", coordinates.latitude, coordinates.longitude);
        let results = self.query(&q).await?;
        debug!("Reverse geocoding returned {} results", results.len());
        Ok(results)
    }
}

/// OpenWeather One Call client (metric units, minutely data excluded)
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherClient {
    /// Create a client from the `weather` section of the configuration
    pub fn new(config: &InsightsConfig) -> Result<Self, InsightsError> {
        let api_key = require_api_key(config.weather.api_key.as_ref(), WEATHER_PROVIDER)?;
        Self::with_base_url(&api_key, &config.weather.base_url, config.http.timeout_seconds)
    }

    /// Create a client against a custom base URL (for testing with wiremock)
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        timeout_seconds: u32,
    ) -> Result<Self, InsightsError> {
        Ok(Self {
            client: build_http_client(timeout_seconds)?,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn fetch_weather(&self, coordinates: Coordinates) -> Result<WeatherRecord, ProviderError> {
        let params = format!(
            "lat={}&lon={}&exclude=minutely&units=metric",
            coordinates.latitude, coordinates.longitude
        );
        let redacted = format!("{}/onecall?{}", self.base_url, params);
        let url = format!("{}&appid={}", redacted, urlencoding::encode(&self.api_key));

        let record: WeatherRecord = get_json(&self.client, &url, &redacted, WEATHER_PROVIDER).await?;
        info!(
            "Retrieved weather for {} ({} hourly, {} daily entries)",
            coordinates,
            record.hourly.len(),
            record.daily.len()
        );
        Ok(record)
    }
}
