//! Acquisition pipeline
//!
//! One cycle fetches weather and location details for a position concurrently.
//! Each branch is retried on its own; the cycle succeeds only when both do.

use tracing::{debug, info, instrument};

use crate::api::{GEOCODING_PROVIDER, GeocodingProvider, OpenCageClient, OpenWeatherClient, WeatherProvider};
use crate::config::InsightsConfig;
use crate::error::{InsightsError, ProviderError};
use crate::location_resolver::Resolution;
use crate::models::{Coordinates, Insights, LocationRecord, RawGeocodeResult, WeatherRecord};
use crate::normalizer::normalize_location;
use crate::retry::RetryPolicy;

/// Pipeline wired to the real providers
pub type LivePipeline = AcquisitionPipeline<OpenCageClient, OpenWeatherClient>;

#[derive(Debug, Clone, Copy)]
enum Branch {
    Weather,
    Location,
}

/// Map a branch failure onto the user-facing taxonomy
fn classify(branch: Branch, source: ProviderError) -> InsightsError {
    if !source.is_network() {
        return InsightsError::data(source.to_string());
    }
    match branch {
        Branch::Weather => InsightsError::WeatherFetch { source },
        Branch::Location => InsightsError::LocationFetch { source },
    }
}

pub struct AcquisitionPipeline<G, W> {
    geocoder: G,
    weather: W,
    retry: RetryPolicy,
}

impl LivePipeline {
    /// Build both provider clients; fails when either API key is missing
    pub fn from_config(config: &InsightsConfig) -> Result<Self, InsightsError> {
        Ok(Self::new(
            OpenCageClient::new(config)?,
            OpenWeatherClient::new(config)?,
            config.retry_policy(),
        ))
    }
}

impl<G, W> AcquisitionPipeline<G, W>
where
    G: GeocodingProvider + Sync,
    W: WeatherProvider + Sync,
{
    pub fn new(geocoder: G, weather: W, retry: RetryPolicy) -> Self {
        Self {
            geocoder,
            weather,
            retry,
        }
    }

    /// The geocoder, shared with the location resolver
    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Acquire insights for a resolved location
    pub async fn run(&self, resolution: Resolution) -> Result<Insights, InsightsError> {
        self.acquire(resolution.coordinates, resolution.geocode)
            .await
    }

    /// Fetch weather and location details for `coordinates`.
    ///
    /// A pre-fetched `geocode` candidate is normalized directly instead of
    /// reverse-geocoding. Either branch failing after its retries fails the
    /// whole cycle; no partial result is returned.
    #[instrument(skip(self, geocode), fields(prefetched = geocode.is_some()))]
    pub async fn acquire(
        &self,
        coordinates: Coordinates,
        geocode: Option<RawGeocodeResult>,
    ) -> Result<Insights, InsightsError> {
        info!("Acquiring insights for {}", coordinates);

        let (weather, location) = futures::try_join!(
            self.fetch_weather(coordinates),
            self.fetch_location(coordinates, geocode.as_ref()),
        )?;

        info!(
            "Acquired insights for {}, {} ({})",
            location.name, location.country, coordinates
        );

        Ok(Insights {
            coordinates,
            location,
            weather,
        })
    }

    async fn fetch_weather(&self, coordinates: Coordinates) -> Result<WeatherRecord, InsightsError> {
        self.retry
            .run(move || self.weather.fetch_weather(coordinates))
            .await
            .map_err(|e| classify(Branch::Weather, e))
    }

    async fn fetch_location(
        &self,
        coordinates: Coordinates,
        geocode: Option<&RawGeocodeResult>,
    ) -> Result<LocationRecord, InsightsError> {
        if let Some(raw) = geocode {
            debug!("Using pre-fetched geocoding result");
            return Ok(normalize_location(raw));
        }

        self.retry
            .run(move || async move {
                let candidates = self.geocoder.reverse(coordinates).await?;
                candidates
                    .first()
                    .map(normalize_location)
                    .ok_or(ProviderError::NoResults {
                        provider: GEOCODING_PROVIDER,
                    })
            })
            .await
            .map_err(|e| classify(Branch::Location, e))
    }
}
