//! Data models for the weather insights application
//!
//! This module contains the core domain models organized by concern:
//! - Location: coordinates, raw geocoder candidates and the canonical record
//! - Weather: the provider's current/hourly/daily snapshot
//! - Forecast: chart series derived from the daily forecast

pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{ChartSlot, ForecastChart};
pub use location::{
    CallingCode, Coordinates, FormattedCoordinates, GeocodeAnnotations, GeocodeComponents,
    GeocodeGeometry, LocationRecord, RawGeocodeResult,
};
pub use weather::WeatherRecord;

/// Fallback for any name-like field the geocoder did not supply
pub const UNKNOWN: &str = "Unknown";

/// The geocoder never reports population
pub const POPULATION_NOT_AVAILABLE: &str = "Data not available";

/// Output of one successful acquisition cycle
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct Insights {
    pub coordinates: Coordinates,
    pub location: LocationRecord,
    pub weather: WeatherRecord,
}
