//! Seven-day temperature chart series and the slot that holds the chart on screen

use super::weather::{WeatherRecord, round_temperature};
use crate::time_format::format_day;
use serde::{Deserialize, Serialize};

/// Number of daily entries plotted in the temperature chart
pub const CHART_DAYS: usize = 7;

/// Parallel arrays consumed by the charting collaborator
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ForecastChart {
    /// Weekday abbreviations in the forecast timezone
    pub labels: Vec<String>,
    /// Rounded daily maxima in Celsius
    pub max_temperatures: Vec<i64>,
    /// Rounded daily minima in Celsius
    pub min_temperatures: Vec<i64>,
}

impl ForecastChart {
    /// Build the series from the first [`CHART_DAYS`] daily entries
    #[must_use]
    pub fn from_weather(weather: &WeatherRecord) -> Self {
        let days = weather.daily.iter().take(CHART_DAYS);
        let mut chart = Self {
            labels: Vec::with_capacity(CHART_DAYS),
            max_temperatures: Vec::with_capacity(CHART_DAYS),
            min_temperatures: Vec::with_capacity(CHART_DAYS),
        };

        for day in days {
            chart.labels.push(format_day(day.dt, &weather.timezone));
            chart.max_temperatures.push(round_temperature(day.temp.max));
            chart.min_temperatures.push(round_temperature(day.temp.min));
        }
        chart
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Mount point for the chart; drawing a new chart discards the previous one
#[derive(Debug, Default)]
pub struct ChartSlot {
    chart: Option<ForecastChart>,
}

impl ChartSlot {
    /// Replace the current chart, returning the discarded one
    pub fn replace(&mut self, chart: ForecastChart) -> Option<ForecastChart> {
        self.chart.replace(chart)
    }

    #[must_use]
    pub fn current(&self) -> Option<&ForecastChart> {
        self.chart.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::weather::{CurrentWeather, DailyTemperature, DailyWeather};

    fn record_with_days(days: usize) -> WeatherRecord {
        // 2024-01-15 12:00 UTC is a Monday
        let start = 1_705_320_000;
        WeatherRecord {
            lat: 0.0,
            lon: 0.0,
            timezone: "UTC".to_string(),
            timezone_offset: 0,
            current: CurrentWeather {
                dt: start,
                sunrise: None,
                sunset: None,
                temp: 0.0,
                feels_like: 0.0,
                pressure: 1000.0,
                humidity: 50,
                visibility: None,
                wind_speed: 0.0,
                wind_deg: None,
                weather: Vec::new(),
            },
            hourly: Vec::new(),
            daily: (0..days)
                .map(|i| DailyWeather {
                    dt: start + i64::try_from(i).unwrap() * 86_400,
                    sunrise: None,
                    sunset: None,
                    temp: DailyTemperature {
                        min: 1.4,
                        max: 10.6,
                    },
                    pop: None,
                    weather: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_chart_uses_first_seven_days() {
        let chart = ForecastChart::from_weather(&record_with_days(8));
        assert_eq!(chart.len(), CHART_DAYS);
        assert_eq!(chart.labels[0], "Mon");
        assert_eq!(chart.labels[6], "Sun");
        assert_eq!(chart.max_temperatures, vec![11; CHART_DAYS]);
        assert_eq!(chart.min_temperatures, vec![1; CHART_DAYS]);
    }

    #[test]
    fn test_chart_slot_discards_previous_chart() {
        let mut slot = ChartSlot::default();
        assert!(slot.replace(ForecastChart::from_weather(&record_with_days(3))).is_none());

        let previous = slot.replace(ForecastChart::from_weather(&record_with_days(2)));
        assert_eq!(previous.map(|chart| chart.len()), Some(3));
        assert_eq!(slot.current().map(ForecastChart::len), Some(2));
    }
}
