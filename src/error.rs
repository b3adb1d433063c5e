//! Error types and handling for the weather insights application

use thiserror::Error;

/// Main error type for the weather insights application
#[derive(Error, Debug)]
pub enum InsightsError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors (e.g. an empty search query)
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The device position could not be obtained
    #[error("Geolocation error: {source}")]
    Geolocation {
        #[from]
        source: GeolocationError,
    },

    /// The weather branch of an acquisition cycle failed at the network level
    #[error("Failed to fetch weather data: {source}")]
    WeatherFetch { source: ProviderError },

    /// The location-detail branch of an acquisition cycle failed at the network level
    #[error("Failed to fetch location details: {source}")]
    LocationFetch { source: ProviderError },

    /// Forward geocoding produced no candidate
    #[error("Location not found: {query}")]
    NotFound { query: String },

    /// Forward geocoding failed before producing a candidate list
    #[error("Location search for '{query}' failed: {source}")]
    Search { query: String, source: ProviderError },

    /// Anything else that goes wrong while acquiring data
    #[error("Data error: {message}")]
    Data { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl InsightsError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new data error
    pub fn data<S: Into<String>>(message: S) -> Self {
        Self::Data {
            message: message.into(),
        }
    }

    /// Create a not-found error for a search query
    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            InsightsError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            InsightsError::Validation { .. } => "Please enter a location to search".to_string(),
            InsightsError::Geolocation {
                source: GeolocationError::Unsupported,
            } => "Geolocation is not supported by your device. Please try searching for a location instead."
                .to_string(),
            InsightsError::Geolocation { .. } => {
                "Unable to get your location. Please try searching for a location instead."
                    .to_string()
            }
            InsightsError::WeatherFetch { .. } => {
                "Unable to fetch weather data. Please check your API key or try again later."
                    .to_string()
            }
            InsightsError::LocationFetch { .. } => {
                "Unable to fetch location details. Please check your API key or try again later."
                    .to_string()
            }
            InsightsError::NotFound { .. } | InsightsError::Search { .. } => {
                "Unable to find the location. Please try a different search term.".to_string()
            }
            InsightsError::Data { .. } => {
                "Unable to fetch data for this location. Please try again later.".to_string()
            }
            InsightsError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }

    /// Whether the current cycle can continue after this error
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, InsightsError::Geolocation { .. })
    }
}

/// Failure of a single call to an external provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The request never produced a response
    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-2xx status
    #[error("{provider} returned HTTP {status}")]
    Status { provider: &'static str, status: u16 },

    /// The response body did not have the expected shape
    #[error("invalid {provider} response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    /// The provider answered successfully but without any result
    #[error("{provider} returned no results")]
    NoResults { provider: &'static str },
}

impl ProviderError {
    /// Transport failures and non-2xx answers; everything else is a data problem
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ProviderError::Transport { .. } | ProviderError::Status { .. }
        )
    }
}

/// Device position errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    Unsupported,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}
