//! Location normalization
//!
//! Maps a raw geocoder candidate onto the canonical [`LocationRecord`]. The
//! mapping is total: every missing or empty field is replaced by a literal
//! fallback, so nothing downstream needs to handle absence.

use crate::models::{
    FormattedCoordinates, LocationRecord, POPULATION_NOT_AVAILABLE, RawGeocodeResult, UNKNOWN,
};

/// First candidate that is present and not blank
fn first_present<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .filter_map(Option::as_deref)
        .find(|value| !value.trim().is_empty())
}

fn or_unknown(value: Option<&str>) -> String {
    value.unwrap_or(UNKNOWN).to_string()
}

fn or_empty(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// Format a coordinate component with exactly four decimals
#[must_use]
pub fn format_coordinate(value: f64) -> String {
    format!("{value:.4}")
}

/// Build the canonical location record for a geocoder candidate
#[must_use]
pub fn normalize_location(raw: &RawGeocodeResult) -> LocationRecord {
    let components = &raw.components;
    let annotations = &raw.annotations;
    let timezone = annotations.timezone.as_ref();
    let currency = annotations.currency.as_ref();

    LocationRecord {
        name: or_unknown(first_present(&[
            &components.city,
            &components.town,
            &components.village,
            &components.county,
        ])),
        country: or_unknown(first_present(&[&components.country])),
        region: or_unknown(first_present(&[
            &components.state,
            &components.province,
            &components.region,
        ])),
        coordinates: FormattedCoordinates {
            latitude: format_coordinate(raw.geometry.lat),
            longitude: format_coordinate(raw.geometry.lng),
        },
        timezone: or_unknown(timezone.and_then(|tz| first_present(&[&tz.name]))),
        timezone_offset: or_unknown(timezone.and_then(|tz| first_present(&[&tz.offset_string]))),
        currency: or_unknown(currency.and_then(|c| first_present(&[&c.name]))),
        currency_symbol: or_empty(currency.and_then(|c| first_present(&[&c.symbol]))),
        flag: or_empty(first_present(&[&annotations.flag])),
        calling_code: annotations
            .callingcode
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        population: POPULATION_NOT_AVAILABLE.to_string(),
    }
}

impl From<&RawGeocodeResult> for LocationRecord {
    fn from(raw: &RawGeocodeResult) -> Self {
        normalize_location(raw)
    }
}
