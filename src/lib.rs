//! `weather-insights` - current weather, forecast and geographic context for a place
//!
//! A location is resolved either from the device position or from a free-text
//! search, then weather and location details are fetched concurrently, each
//! with bounded retries, and normalized into one [`Insights`] record.

pub mod api;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod location_resolver;
pub mod map;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod render;
pub mod retry;
pub mod session;
pub mod sun;
pub mod time_format;
pub mod web;

// Re-export core types for public API
pub use api::{GeocodingProvider, OpenCageClient, OpenWeatherClient, WeatherProvider};
pub use config::InsightsConfig;
pub use error::{GeolocationError, InsightsError, ProviderError};
pub use geolocation::{DeviceLocator, FixedGeolocator, Geolocator, IpGeolocator};
pub use location_resolver::{LocationRequest, LocationResolver, Resolution};
pub use map::{MapSession, MapStyle};
pub use models::{Coordinates, Insights, LocationRecord, RawGeocodeResult, WeatherRecord};
pub use pipeline::{AcquisitionPipeline, LivePipeline};
pub use retry::{RetryPolicy, retry_fetch};
pub use session::{Completion, CycleState, InsightsSession};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, InsightsError>;
