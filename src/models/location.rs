//! Location model: coordinates, raw geocoder results and the canonical location record

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic coordinates in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside the WGS84 ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_coordinates())
    }
}

/// One candidate returned by the geocoding provider (forward or reverse).
///
/// Every nested field is optional except the geometry; a candidate without a
/// position is not a usable result.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RawGeocodeResult {
    #[serde(default)]
    pub components: GeocodeComponents,
    pub geometry: GeocodeGeometry,
    #[serde(default)]
    pub annotations: GeocodeAnnotations,
    /// Provider's one-line description of the place
    pub formatted: Option<String>,
}

/// Free-form place-name fields
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct GeocodeComponents {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub province: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeocodeGeometry {
    pub lat: f64,
    pub lng: f64,
}

impl From<GeocodeGeometry> for Coordinates {
    fn from(geometry: GeocodeGeometry) -> Self {
        Coordinates::new(geometry.lat, geometry.lng)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct GeocodeAnnotations {
    pub timezone: Option<TimezoneAnnotation>,
    pub currency: Option<CurrencyAnnotation>,
    pub flag: Option<String>,
    pub callingcode: Option<CallingCode>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TimezoneAnnotation {
    pub name: Option<String>,
    pub offset_string: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct CurrencyAnnotation {
    pub name: Option<String>,
    pub symbol: Option<String>,
}

/// International dialing prefix; the provider sends a number, older payloads a string
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum CallingCode {
    Number(u32),
    Text(String),
}

impl fmt::Display for CallingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallingCode::Number(code) => write!(f, "{code}"),
            CallingCode::Text(code) => f.write_str(code),
        }
    }
}

/// Coordinates rendered for display, always with four decimals
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FormattedCoordinates {
    pub latitude: String,
    pub longitude: String,
}

/// Canonical location record consumed by every presentation surface.
///
/// Every field carries a value: either extracted from the geocoder or a literal
/// fallback, so consumers never branch on absence.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LocationRecord {
    pub name: String,
    pub country: String,
    pub region: String,
    pub coordinates: FormattedCoordinates,
    pub timezone: String,
    pub timezone_offset: String,
    pub currency: String,
    pub currency_symbol: String,
    pub flag: String,
    pub calling_code: String,
    pub population: String,
}

impl LocationRecord {
    /// "Name, Country" or just the name when the country is unknown
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.country == super::UNKNOWN || self.country == self.name {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_validity() {
        assert!(Coordinates::new(48.8566, 2.3522).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_coordinates_display() {
        let coords = Coordinates::new(40.7128, -74.006);
        assert_eq!(coords.to_string(), "40.7128, -74.0060");
    }

    #[test]
    fn test_raw_geocode_result_tolerates_missing_sections() {
        let raw: RawGeocodeResult =
            serde_json::from_str(r#"{"geometry": {"lat": 1.5, "lng": 2.5}}"#).unwrap();
        assert_eq!(raw.components, GeocodeComponents::default());
        assert_eq!(raw.annotations, GeocodeAnnotations::default());
        assert_eq!(Coordinates::from(raw.geometry), Coordinates::new(1.5, 2.5));
    }

    #[test]
    fn test_calling_code_accepts_number_and_string() {
        let numeric: GeocodeAnnotations = serde_json::from_str(r#"{"callingcode": 33}"#).unwrap();
        assert_eq!(numeric.callingcode.unwrap().to_string(), "33");

        let text: GeocodeAnnotations = serde_json::from_str(r#"{"callingcode": "+1"}"#).unwrap();
        assert_eq!(text.callingcode.unwrap().to_string(), "+1");
    }
}
