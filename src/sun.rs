//! Sun schedule and day-progress calculations

use crate::models::{Coordinates, WeatherRecord};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sunrise::{SolarDay, SolarEvent};
use tracing::debug;

/// Percentage of the daylight interval that has elapsed at `current`.
///
/// 0 before sunrise, 100 after sunset, linear in between.
#[must_use]
pub fn day_progress(current: i64, sunrise: i64, sunset: i64) -> f64 {
    if current < sunrise {
        return 0.0;
    }
    if current > sunset {
        return 100.0;
    }

    let day_length = sunset - sunrise;
    if day_length <= 0 {
        // sunrise == sunset == current
        return 100.0;
    }

    let fraction = (current - sunrise) as f64 / day_length as f64;
    fraction * 100.0
}

/// Sunrise and sunset for the observation day
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SunSchedule {
    pub sunrise: i64,
    pub sunset: i64,
    /// True when computed locally because the provider omitted the times
    pub estimated: bool,
}

impl SunSchedule {
    /// Provider times when present, otherwise an astronomical estimate.
    ///
    /// Returns `None` during polar day or night, when the sun does not cross the horizon.
    #[must_use]
    pub fn for_weather(weather: &WeatherRecord, coordinates: Coordinates) -> Option<Self> {
        if let (Some(sunrise), Some(sunset)) = (weather.current.sunrise, weather.current.sunset) {
            return Some(Self {
                sunrise,
                sunset,
                estimated: false,
            });
        }

        let date = DateTime::<Utc>::from_timestamp(weather.current.dt, 0)?
            .with_timezone(&crate::time_format::resolve_timezone(&weather.timezone))
            .date_naive();

        match estimate_sun_times(coordinates, date) {
            Ok(Some((sunrise, sunset))) => Some(Self {
                sunrise: sunrise.timestamp(),
                sunset: sunset.timestamp(),
                estimated: true,
            }),
            Ok(None) => None,
            Err(e) => {
                debug!("Sun time estimate unavailable: {}", e);
                None
            }
        }
    }

    /// Day progress at `current`, see [`day_progress`]
    #[must_use]
    pub fn progress(&self, current: i64) -> f64 {
        day_progress(current, self.sunrise, self.sunset)
    }
}

/// Astronomical sunrise and sunset for a date, `None` when either event does not occur
pub fn estimate_sun_times(
    coordinates: Coordinates,
    date: NaiveDate,
) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>> {
    let solar_coordinates = sunrise::Coordinates::new(coordinates.latitude, coordinates.longitude)
        .with_context(|| {
            format!(
                "Invalid coordinates: lat={}, lng={}",
                coordinates.latitude, coordinates.longitude
            )
        })?;

    let solar_day = SolarDay::new(solar_coordinates, date);
    let sunrise = solar_day.event_time(SolarEvent::Sunrise);
    let sunset = solar_day.event_time(SolarEvent::Sunset);

    Ok(sunrise.zip(sunset))
}
