//! Device position sources
//!
//! A terminal has no positioning hardware, so the "device" position comes from
//! either an explicit `lat,lon` given by the user or an IP-based lookup.

use std::future::Future;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::api::build_http_client;
use crate::config::InsightsConfig;
use crate::error::{GeolocationError, InsightsError};
use crate::models::Coordinates;

/// Anything that can report the current position of the user
pub trait Geolocator {
    fn current_position(
        &self,
    ) -> impl Future<Output = Result<Coordinates, GeolocationError>> + Send;
}

/// A position known up front, or a fixed failure
#[derive(Debug, Clone)]
pub struct FixedGeolocator {
    outcome: Result<Coordinates, GeolocationError>,
}

impl FixedGeolocator {
    #[must_use]
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            outcome: Ok(coordinates),
        }
    }

    /// No position source available at all
    #[must_use]
    pub fn unsupported() -> Self {
        Self::failing(GeolocationError::Unsupported)
    }

    #[must_use]
    pub fn failing(error: GeolocationError) -> Self {
        Self { outcome: Err(error) }
    }
}

impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.outcome.clone()
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
}

/// Approximate position from the public IP address (ip-api.com style endpoint)
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    client: Client,
    url: String,
}

impl IpGeolocator {
    pub fn new(config: &InsightsConfig) -> Result<Self, InsightsError> {
        Self::with_url(&config.geolocation.ip_lookup_url, config.http.timeout_seconds)
    }

    pub fn with_url(url: &str, timeout_seconds: u32) -> Result<Self, InsightsError> {
        Ok(Self {
            client: build_http_client(timeout_seconds)?,
            url: url.to_string(),
        })
    }
}

impl Geolocator for IpGeolocator {
    #[instrument(skip(self))]
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        debug!("IP position lookup: {}", self.url);

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                GeolocationError::Timeout
            } else {
                GeolocationError::Other(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            warn!("IP lookup returned HTTP {}", response.status());
            return Err(GeolocationError::Other(format!(
                "lookup returned HTTP {}",
                response.status()
            )));
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| GeolocationError::Other(format!("invalid lookup response: {e}")))?;

        if body.status != "success" {
            return Err(GeolocationError::Other(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        let (Some(lat), Some(lon)) = (body.lat, body.lon) else {
            return Err(GeolocationError::Other(
                "lookup response has no position".to_string(),
            ));
        };

        let coordinates = Coordinates::new(lat, lon);
        if !coordinates.is_valid() {
            return Err(GeolocationError::Other(format!(
                "lookup returned an invalid position {coordinates}"
            )));
        }

        info!(
            "IP lookup placed us at {} ({})",
            coordinates,
            body.city.as_deref().unwrap_or("unknown city")
        );
        Ok(coordinates)
    }
}

/// Position source picked at runtime from command-line flags
#[derive(Debug, Clone)]
pub enum DeviceLocator {
    Fixed(FixedGeolocator),
    Ip(IpGeolocator),
}

impl Geolocator for DeviceLocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        match self {
            DeviceLocator::Fixed(locator) => locator.current_position().await,
            DeviceLocator::Ip(locator) => locator.current_position().await,
        }
    }
}

/// Parse coordinates from strings like "46.8182,8.2275" or "46.8182 8.2275"
pub fn parse_coordinates(input: &str) -> Result<Coordinates, InsightsError> {
    let parts: Vec<&str> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    let [lat, lon] = parts.as_slice() else {
        return Err(InsightsError::validation(
            "Coordinates must be in format 'lat,lon'",
        ));
    };

    let lat = lat
        .parse::<f64>()
        .map_err(|_| InsightsError::validation(format!("Invalid latitude: {lat}")))?;
    let lon = lon
        .parse::<f64>()
        .map_err(|_| InsightsError::validation(format!("Invalid longitude: {lon}")))?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(InsightsError::validation(format!(
            "Latitude must be between -90 and 90, got: {lat}"
        )));
    }

    if !(-180.0..=180.0).contains(&lon) {
        return Err(InsightsError::validation(format!(
            "Longitude must be between -180 and 180, got: {lon}"
        )));
    }

    Ok(Coordinates::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("46.8182,8.2275", 46.8182, 8.2275)]
    #[case("46.8182 8.2275", 46.8182, 8.2275)]
    #[case("-46.8182, -8.2275", -46.8182, -8.2275)]
    #[case("  40.7128,-74.0060  ", 40.7128, -74.006)]
    fn test_parse_coordinates(#[case] input: &str, #[case] lat: f64, #[case] lon: f64) {
        assert_eq!(parse_coordinates(input).unwrap(), Coordinates::new(lat, lon));
    }

    #[rstest]
    #[case("91.0,8.0")]
    #[case("46.0,-181.0")]
    #[case("46.0")]
    #[case("46.0,8.0,0.0")]
    #[case("north,east")]
    #[case("")]
    fn test_parse_coordinates_rejects(#[case] input: &str) {
        let err = parse_coordinates(input).unwrap_err();
        assert!(matches!(err, InsightsError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_fixed_geolocator() {
        let paris = Coordinates::new(48.8566, 2.3522);
        assert_eq!(
            FixedGeolocator::at(paris).current_position().await,
            Ok(paris)
        );
        assert_eq!(
            FixedGeolocator::unsupported().current_position().await,
            Err(GeolocationError::Unsupported)
        );
        assert_eq!(
            FixedGeolocator::failing(GeolocationError::PermissionDenied)
                .current_position()
                .await,
            Err(GeolocationError::PermissionDenied)
        );
    }

    #[test]
    fn test_ip_lookup_failure_body() {
        let body: IpLookupResponse =
            serde_json::from_str(r#"{"status":"fail","message":"reserved range","query":"127.0.0.1"}"#)
                .unwrap();
        assert_eq!(body.status, "fail");
        assert_eq!(body.message.as_deref(), Some("reserved range"));
        assert!(body.lat.is_none());
    }
}
