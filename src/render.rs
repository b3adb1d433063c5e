//! Presentation of a finished cycle: terminal report and JSON view

use std::fmt::{self, Display};

use serde::Serialize;

use crate::map::MapSession;
use crate::models::weather::round_temperature;
use crate::models::{ForecastChart, Insights, LocationRecord, WeatherRecord};
use crate::sun::SunSchedule;
use crate::time_format::{TimeComponent, TimeFormatOptions, format_date, format_day, format_time};

/// Daily entries shown in the forecast list (today is skipped)
const FORECAST_DAYS: usize = 5;
/// Hourly entries considered, and the stride between shown entries
const HOURLY_WINDOW: usize = 24;
const HOURLY_STEP: usize = 3;
const PROGRESS_WIDTH: usize = 20;

/// Text progress bar, e.g. `[#####---------------]  25%`
#[must_use]
pub fn progress_bar(percent: f64, width: usize) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        percent
    )
}

/// Everything the front end needs for one location
#[derive(Debug, Serialize)]
pub struct InsightsView<'a> {
    pub location: &'a LocationRecord,
    pub weather: &'a WeatherRecord,
    pub chart: &'a ForecastChart,
    pub map: &'a MapSession,
    pub sun: Option<SunView>,
    /// Recoverable problem met while resolving the position, e.g. the fallback was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SunView {
    pub sunrise: String,
    pub sunset: String,
    pub progress: f64,
    pub estimated: bool,
}

impl SunView {
    /// Times in `timezone`, progress at the observation instant `observed_at`
    #[must_use]
    pub fn new(schedule: SunSchedule, timezone: &str, observed_at: i64) -> Self {
        Self {
            sunrise: format_time(schedule.sunrise, timezone, TimeFormatOptions::default()),
            sunset: format_time(schedule.sunset, timezone, TimeFormatOptions::default()),
            progress: schedule.progress(observed_at),
            estimated: schedule.estimated,
        }
    }
}

/// Terminal report for a finished cycle
pub struct InsightsReport<'a> {
    pub insights: &'a Insights,
    pub chart: &'a ForecastChart,
    pub map: &'a MapSession,
    /// Wall clock for the local time line, epoch seconds
    pub now: i64,
}

impl InsightsReport<'_> {
    fn write_current(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = &self.insights.weather.current;

        writeln!(
            f,
            "🌡️  {}  ({})",
            current.format_temperature(),
            current.format_feels_like()
        )?;
        writeln!(f, "   {}", current.description())?;
        if let Some(condition) = current.condition() {
            writeln!(f, "   {}", condition.icon_url())?;
        }
        writeln!(f, "   💨 Wind: {}", current.format_wind())?;
        writeln!(f, "   💧 Humidity: {}%", current.humidity)?;
        writeln!(f, "   🔽 Pressure: {}", current.format_pressure())?;
        writeln!(f, "   👁️  Visibility: {}", current.format_visibility())
    }

    fn write_forecast(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let weather = &self.insights.weather;

        writeln!(f, "📅 {FORECAST_DAYS}-Day Forecast")?;
        for day in weather.daily.iter().skip(1).take(FORECAST_DAYS) {
            writeln!(
                f,
                "   {:<4} {:>4}°C / {:>4}°C  {}",
                format_day(day.dt, &weather.timezone),
                round_temperature(day.temp.max),
                round_temperature(day.temp.min),
                day.description()
            )?;
        }
        Ok(())
    }

    fn write_hourly(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let weather = &self.insights.weather;

        writeln!(f, "🕒 Next {HOURLY_WINDOW} Hours")?;
        for hour in weather.hourly.iter().take(HOURLY_WINDOW).step_by(HOURLY_STEP) {
            let time = TimeFormatOptions::hour(TimeComponent::TwoDigit);
            write!(
                f,
                "   {}  {:>4}°C  {}",
                format_time(hour.dt, &weather.timezone, time),
                round_temperature(hour.temp),
                hour.description()
            )?;
            if let Some(pop) = hour.pop {
                write!(f, "  ☔ {:.0}%", pop * 100.0)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }

    fn write_sun(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let weather = &self.insights.weather;

        writeln!(f, "🌅 Sun")?;
        match SunSchedule::for_weather(weather, self.insights.coordinates) {
            Some(schedule) => {
                let sun = SunView::new(schedule, &weather.timezone, weather.current.dt);
                writeln!(
                    f,
                    "   Sunrise {}  Sunset {}{}",
                    sun.sunrise,
                    sun.sunset,
                    if sun.estimated { "  (estimated)" } else { "" }
                )?;
                writeln!(f, "   {}", progress_bar(sun.progress, PROGRESS_WIDTH))
            }
            None => writeln!(f, "   The sun does not rise or set here today"),
        }
    }

    fn write_location(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = &self.insights.location;
        let timezone = &self.insights.weather.timezone;

        writeln!(f, "🌍 Location")?;
        writeln!(f, "   Country:      {} {}", location.country, location.flag)?;
        writeln!(f, "   Region:       {}", location.region)?;
        writeln!(
            f,
            "   Coordinates:  {}, {}",
            location.coordinates.latitude, location.coordinates.longitude
        )?;
        writeln!(
            f,
            "   Timezone:     {} ({})",
            location.timezone, location.timezone_offset
        )?;
        writeln!(
            f,
            "   Local time:   {}",
            format_time(self.now, timezone, TimeFormatOptions::default())
        )?;
        writeln!(
            f,
            "   Currency:     {} {}",
            location.currency, location.currency_symbol
        )?;
        if !location.calling_code.is_empty() {
            writeln!(f, "   Calling code: +{}", location.calling_code)?;
        }
        writeln!(f, "   Population:   {}", location.population)
    }

    fn write_chart(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📈 Temperature Trend")?;
        let row = |values: &[i64]| {
            values
                .iter()
                .map(|v| format!("{v:>5}"))
                .collect::<String>()
        };
        let labels: String = self.chart.labels.iter().map(|l| format!("{l:>5}")).collect();

        writeln!(f, "   {:<4}{}", "", labels)?;
        writeln!(f, "   {:<4}{}", "max", row(&self.chart.max_temperatures))?;
        writeln!(f, "   {:<4}{}", "min", row(&self.chart.min_temperatures))
    }

    fn write_map(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🗺️  Map ({})", self.map.style)?;
        if let Some(url) = self.map.view_url() {
            writeln!(f, "   {url}")?;
        }
        if let Some(tile) = self.map.center_tile_url() {
            writeln!(f, "   Tile: {tile}")?;
        }
        writeln!(f, "   {}", self.map.style.attribution())
    }
}

impl Display for InsightsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let weather = &self.insights.weather;

        writeln!(f, "📍 {}", self.insights.location.display_name())?;
        writeln!(f, "   {}", format_date(weather.current.dt, &weather.timezone))?;
        writeln!(f)?;
        self.write_current(f)?;
        writeln!(f)?;
        self.write_forecast(f)?;
        writeln!(f)?;
        self.write_hourly(f)?;
        writeln!(f)?;
        self.write_sun(f)?;
        writeln!(f)?;
        self.write_location(f)?;
        writeln!(f)?;
        self.write_chart(f)?;
        writeln!(f)?;
        self.write_map(f)
    }
}
