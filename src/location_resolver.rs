//! Location Resolution Module
//!
//! Decides which coordinates an acquisition cycle runs for: the device position
//! (with a fixed fallback) or the best match of a free-text search.

use crate::api::GeocodingProvider;
use crate::error::InsightsError;
use crate::geolocation::Geolocator;
use crate::models::{Coordinates, RawGeocodeResult};
use tracing::{debug, info, warn};

/// What the user asked for
#[derive(Debug, Clone, PartialEq)]
pub enum LocationRequest {
    /// "Use my location"
    Device,
    /// Free-text place search
    Search(String),
}

/// Coordinates chosen for a cycle
#[derive(Debug)]
pub struct Resolution {
    pub coordinates: Coordinates,
    /// Candidate from a forward search; reused so the pipeline skips reverse geocoding
    pub geocode: Option<RawGeocodeResult>,
    /// Recoverable problem the user should hear about (geolocation fallback)
    pub notice: Option<InsightsError>,
}

/// Service for resolving location requests into coordinates
pub struct LocationResolver<'a, G> {
    geocoder: &'a G,
    fallback: Coordinates,
}

impl<'a, G: GeocodingProvider + Sync> LocationResolver<'a, G> {
    pub fn new(geocoder: &'a G, fallback: Coordinates) -> Self {
        Self { geocoder, fallback }
    }

    /// Run exactly one resolution path for `request`
    pub async fn resolve<L: Geolocator + Sync>(
        &self,
        request: &LocationRequest,
        locator: &L,
    ) -> Result<Resolution, InsightsError> {
        debug!("Resolving location request: {:?}", request);

        match request {
            LocationRequest::Device => Ok(self.resolve_device(locator).await),
            LocationRequest::Search(query) => self.resolve_search(query).await,
        }
    }

    /// Device position, or the fallback position with a notice when it is unavailable
    pub async fn resolve_device<L: Geolocator + Sync>(&self, locator: &L) -> Resolution {
        match locator.current_position().await {
            Ok(coordinates) => {
                info!("Using device position {}", coordinates);
                Resolution {
                    coordinates,
                    geocode: None,
                    notice: None,
                }
            }
            Err(e) => {
                warn!(
                    "Device position unavailable ({}), falling back to {}",
                    e, self.fallback
                );
                Resolution {
                    coordinates: self.fallback,
                    geocode: None,
                    notice: Some(e.into()),
                }
            }
        }
    }

    /// Forward-geocode `query` and take the best candidate
    pub async fn resolve_search(&self, query: &str) -> Result<Resolution, InsightsError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(InsightsError::validation("search query is empty"));
        }

        let candidates = self
            .geocoder
            .forward(query)
            .await
            .map_err(|source| InsightsError::Search {
                query: query.to_string(),
                source,
            })?;

        let Some(best) = candidates.into_iter().next() else {
            return Err(InsightsError::not_found(query));
        };

        let coordinates = Coordinates::from(best.geometry);
        debug!(
            "Search '{}' resolved to {} ({})",
            query,
            coordinates,
            best.formatted.as_deref().unwrap_or("no description")
        );

        Ok(Resolution {
            coordinates,
            geocode: Some(best),
            notice: None,
        })
    }
}
