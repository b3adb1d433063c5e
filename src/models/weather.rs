//! Weather data model and display methods
//!
//! Mirrors the weather provider's one-call response. Fields the provider may
//! omit (sunrise/sunset near the poles, visibility, wind direction) are `Option`.

use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Weather snapshot for one location: current conditions plus hourly and daily forecasts
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherRecord {
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    /// IANA timezone name used for every displayed time
    pub timezone: String,
    /// Offset from UTC in seconds
    #[serde(default)]
    pub timezone_offset: i64,
    pub current: CurrentWeather,
    #[serde(default)]
    pub hourly: Vec<HourlyWeather>,
    #[serde(default)]
    pub daily: Vec<DailyWeather>,
}

/// Weather condition as reported by the provider
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherCondition {
    pub id: u32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

impl WeatherCondition {
    /// Large icon URL for the current conditions
    #[must_use]
    pub fn icon_url(&self) -> String {
        format!("{ICON_BASE_URL}/{}@2x.png", self.icon)
    }

    /// Small icon URL used for forecast entries
    #[must_use]
    pub fn small_icon_url(&self) -> String {
        format!("{ICON_BASE_URL}/{}.png", self.icon)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentWeather {
    /// Observation time, epoch seconds
    pub dt: i64,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    /// Temperature in Celsius
    pub temp: f64,
    pub feels_like: f64,
    /// Atmospheric pressure in hPa
    pub pressure: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    /// Visibility in metres
    pub visibility: Option<f64>,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_deg: Option<u16>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
}

impl CurrentWeather {
    /// Primary condition, if the provider sent one
    #[must_use]
    pub fn condition(&self) -> Option<&WeatherCondition> {
        self.weather.first()
    }

    #[must_use]
    pub fn description(&self) -> &str {
        describe(&self.weather)
    }

    /// Format temperature rounded to whole degrees
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", round_temperature(self.temp))
    }

    #[must_use]
    pub fn format_feels_like(&self) -> String {
        format!("Feels like: {}°C", round_temperature(self.feels_like))
    }

    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        match self.wind_deg {
            Some(degrees) => format!(
                "{} m/s {}",
                self.wind_speed,
                wind_direction_to_cardinal(degrees)
            ),
            None => format!("{} m/s", self.wind_speed),
        }
    }

    /// Visibility in kilometres with one decimal
    #[must_use]
    pub fn format_visibility(&self) -> String {
        match self.visibility {
            Some(metres) => format!("{:.1} km", metres / 1000.0),
            None => "n/a".to_string(),
        }
    }

    #[must_use]
    pub fn format_pressure(&self) -> String {
        format!("{} hPa", self.pressure)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlyWeather {
    pub dt: i64,
    pub temp: f64,
    /// Probability of precipitation, 0.0-1.0
    pub pop: Option<f64>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
}

impl HourlyWeather {
    #[must_use]
    pub fn description(&self) -> &str {
        describe(&self.weather)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyWeather {
    pub dt: i64,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    pub temp: DailyTemperature,
    pub pop: Option<f64>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
}

impl DailyWeather {
    #[must_use]
    pub fn description(&self) -> &str {
        describe(&self.weather)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct DailyTemperature {
    pub min: f64,
    pub max: f64,
}

fn describe(conditions: &[WeatherCondition]) -> &str {
    conditions
        .first()
        .map_or("Unknown", |condition| condition.description.as_str())
}

/// Round a temperature to whole degrees, halves away from zero
#[must_use]
pub fn round_temperature(celsius: f64) -> i64 {
    // Values outside i64 saturate; no real temperature gets close.
    celsius.round() as i64
}

/// Convert wind direction from degrees to cardinal direction
#[must_use]
pub fn wind_direction_to_cardinal(degrees: u16) -> &'static str {
    match degrees {
        0..=11 | 349..=360 => "N",
        12..=33 => "NNE",
        34..=56 => "NE",
        57..=78 => "ENE",
        79..=101 => "E",
        102..=123 => "ESE",
        124..=146 => "SE",
        147..=168 => "SSE",
        169..=191 => "S",
        192..=213 => "SSW",
        214..=236 => "SW",
        237..=258 => "WSW",
        259..=281 => "W",
        282..=303 => "WNW",
        304..=326 => "NW",
        327..=348 => "NNW",
        _ => "Unknown",
    }
}
