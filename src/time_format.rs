//! Display formatting for provider timestamps
//!
//! All timestamps are epoch seconds and are rendered in the timezone the weather
//! provider reports for the location, not the machine's local zone.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

const INVALID_DATE: &str = "Invalid Date";

/// How a time component is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeComponent {
    Hidden,
    Numeric,
    TwoDigit,
}

/// Overrides merged onto the default time format (2-digit hour, 2-digit minute, 12-hour clock)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeFormatOptions {
    pub hour: Option<TimeComponent>,
    pub minute: Option<TimeComponent>,
    pub hour12: Option<bool>,
}

impl TimeFormatOptions {
    /// Override only the hour component; minute and clock keep their defaults
    #[must_use]
    pub fn hour(hour: TimeComponent) -> Self {
        Self {
            hour: Some(hour),
            ..Self::default()
        }
    }

    fn pattern(self) -> String {
        let mut hour = self.hour.unwrap_or(TimeComponent::TwoDigit);
        let mut minute = self.minute.unwrap_or(TimeComponent::TwoDigit);
        let hour12 = self.hour12.unwrap_or(true);

        if hour == TimeComponent::Hidden && minute == TimeComponent::Hidden {
            hour = TimeComponent::TwoDigit;
            minute = TimeComponent::TwoDigit;
        }

        let hour_spec = match (hour, hour12) {
            (TimeComponent::Hidden, _) => None,
            (TimeComponent::Numeric, true) => Some("%-I"),
            (TimeComponent::TwoDigit, true) => Some("%I"),
            (TimeComponent::Numeric, false) => Some("%-H"),
            (TimeComponent::TwoDigit, false) => Some("%H"),
        };
        let minute_spec = match (minute, hour_spec.is_some()) {
            (TimeComponent::Hidden, _) => None,
            // Next to an hour the minute is always zero-padded
            (_, true) | (TimeComponent::TwoDigit, false) => Some("%M"),
            (TimeComponent::Numeric, false) => Some("%-M"),
        };

        let mut pattern = [hour_spec, minute_spec]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(":");
        if hour12 && hour_spec.is_some() {
            pattern.push_str(" %p");
        }
        pattern
    }
}

/// Resolve an IANA timezone name, falling back to UTC for names chrono-tz does not know
#[must_use]
pub fn resolve_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        warn!("Unknown timezone '{}', formatting in UTC", name);
        Tz::UTC
    })
}

fn localize(timestamp: i64, timezone: &str) -> Option<DateTime<Tz>> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).map(|utc| utc.with_timezone(&resolve_timezone(timezone)))
}

/// Long date, e.g. "Monday, January 15, 2024"
#[must_use]
pub fn format_date(timestamp: i64, timezone: &str) -> String {
    localize(timestamp, timezone).map_or_else(
        || INVALID_DATE.to_string(),
        |local| local.format("%A, %B %-d, %Y").to_string(),
    )
}

/// Weekday abbreviation, e.g. "Mon"
#[must_use]
pub fn format_day(timestamp: i64, timezone: &str) -> String {
    localize(timestamp, timezone).map_or_else(
        || INVALID_DATE.to_string(),
        |local| local.format("%a").to_string(),
    )
}

/// Clock time, "03:45 PM" by default; `options` override individual components
#[must_use]
pub fn format_time(timestamp: i64, timezone: &str, options: TimeFormatOptions) -> String {
    localize(timestamp, timezone).map_or_else(
        || INVALID_DATE.to_string(),
        |local| local.format(&options.pattern()).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // 2024-01-15 12:00:00 UTC, a Monday
    const NOON_UTC: i64 = 1_705_320_000;
    // 2024-01-15 00:00:00 UTC
    const MIDNIGHT_UTC: i64 = 1_705_276_800;

    #[rstest]
    #[case(NOON_UTC, "Europe/Paris", "Monday, January 15, 2024")]
    #[case(MIDNIGHT_UTC, "America/New_York", "Sunday, January 14, 2024")]
    #[case(MIDNIGHT_UTC, "Asia/Tokyo", "Monday, January 15, 2024")]
    fn test_format_date(#[case] timestamp: i64, #[case] timezone: &str, #[case] expected: &str) {
        assert_eq!(format_date(timestamp, timezone), expected);
    }

    #[rstest]
    #[case(NOON_UTC, "UTC", "Mon")]
    #[case(MIDNIGHT_UTC, "America/Los_Angeles", "Sun")]
    fn test_format_day(#[case] timestamp: i64, #[case] timezone: &str, #[case] expected: &str) {
        assert_eq!(format_day(timestamp, timezone), expected);
    }

    #[rstest]
    #[case("Europe/Paris", "01:00 PM")]
    #[case("America/New_York", "07:00 AM")]
    #[case("Asia/Tokyo", "09:00 PM")]
    #[case("Asia/Kolkata", "05:30 PM")]
    fn test_format_time_defaults(#[case] timezone: &str, #[case] expected: &str) {
        assert_eq!(
            format_time(NOON_UTC, timezone, TimeFormatOptions::default()),
            expected
        );
    }

    #[test]
    fn test_format_time_options_are_merged() {
        assert_eq!(
            format_time(
                NOON_UTC,
                "Europe/Paris",
                TimeFormatOptions::hour(TimeComponent::TwoDigit)
            ),
            "01:00 PM"
        );

        let hour_only = TimeFormatOptions {
            minute: Some(TimeComponent::Hidden),
            ..TimeFormatOptions::default()
        };
        assert_eq!(format_time(NOON_UTC, "Europe/Paris", hour_only), "01 PM");

        let twenty_four = TimeFormatOptions {
            hour12: Some(false),
            ..TimeFormatOptions::default()
        };
        assert_eq!(format_time(NOON_UTC, "Europe/Paris", twenty_four), "13:00");

        let numeric_hour = TimeFormatOptions {
            hour: Some(TimeComponent::Numeric),
            ..TimeFormatOptions::default()
        };
        assert_eq!(format_time(NOON_UTC, "Europe/Paris", numeric_hour), "1:00 PM");
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_utc() {
        assert_eq!(resolve_timezone("Mars/Olympus_Mons"), Tz::UTC);
        assert_eq!(
            format_time(NOON_UTC, "Mars/Olympus_Mons", TimeFormatOptions::default()),
            "12:00 PM"
        );
    }

    #[test]
    fn test_out_of_range_timestamp() {
        assert_eq!(format_date(i64::MAX, "UTC"), INVALID_DATE);
    }
}
