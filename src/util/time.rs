//! Relative time labels for cards.

use chrono::{DateTime, Utc};

/// Expiries this close (or closer) are highlighted.
pub const EXPIRING_WINDOW_SECS: i64 = 60 * 60;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    fn short_suffix(self) -> &'static str {
        match self {
            Self::Second | Self::Minute => "m",
            Self::Hour => "h",
            Self::Day => "d",
            Self::Week => "w",
            Self::Month => "mo",
            Self::Year => "y",
        }
    }

    fn long_name(self) -> &'static str {
        match self {
            Self::Second | Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// Split an interval into its largest whole unit. Negative intervals count
/// as zero.
pub fn largest_unit(seconds: i64) -> (i64, TimeUnit) {
    let s = seconds.max(0);
    match s {
        s if s < MINUTE => (s, TimeUnit::Second),
        s if s < HOUR => (s / MINUTE, TimeUnit::Minute),
        s if s < DAY => (s / HOUR, TimeUnit::Hour),
        s if s < WEEK => (s / DAY, TimeUnit::Day),
        s if s < MONTH => (s / WEEK, TimeUnit::Week),
        s if s < YEAR => (s / MONTH, TimeUnit::Month),
        s => (s / YEAR, TimeUnit::Year),
    }
}

/// Compact age label: `1m`, `5m`, `3h`, `2d`, `1w`, `4mo`, `1y`.
///
/// Anything under a minute reads as `1m`.
pub fn short_age(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let (value, unit) = largest_unit((now - created).num_seconds());
    match unit {
        TimeUnit::Second => "1m".to_string(),
        _ => format!("{}{}", value, unit.short_suffix()),
    }
}

/// Spelled-out interval: `a minute`, `1 hour`, `3 days`.
pub fn long_interval(seconds: i64) -> String {
    let (value, unit) = largest_unit(seconds);
    match unit {
        TimeUnit::Second => "a minute".to_string(),
        _ if value == 1 => format!("1 {}", unit.long_name()),
        _ => format!("{} {}s", value, unit.long_name()),
    }
}

/// Label and urgency of an expiry badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryLabel {
    pub text: String,
    pub expiring: bool,
}

pub fn expiry_label(expiry: DateTime<Utc>, now: DateTime<Utc>) -> ExpiryLabel {
    let remaining = (expiry - now).num_seconds();
    let when = if remaining <= 0 {
        "a minute".to_string()
    } else {
        long_interval(remaining)
    };
    ExpiryLabel {
        text: format!("Expires in {}", when),
        expiring: remaining <= EXPIRING_WINDOW_SECS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_short_age_units() {
        let cases = [
            (Duration::seconds(5), "1m"),
            (Duration::minutes(5), "5m"),
            (Duration::hours(3), "3h"),
            (Duration::days(2), "2d"),
            (Duration::days(15), "2w"),
            (Duration::days(125), "4mo"),
            (Duration::days(400), "1y"),
        ];
        for (age, expected) in cases {
            assert_eq!(short_age(now() - age, now()), expected, "age {:?}", age);
        }
    }

    #[test]
    fn test_short_age_future_is_one_minute() {
        assert_eq!(short_age(now() + Duration::hours(1), now()), "1m");
    }

    #[test]
    fn test_long_interval_plurals() {
        assert_eq!(long_interval(30), "a minute");
        assert_eq!(long_interval(60), "1 minute");
        assert_eq!(long_interval(150), "2 minutes");
        assert_eq!(long_interval(2 * DAY), "2 days");
    }

    #[test]
    fn test_expiry_label() {
        let far = expiry_label(now() + Duration::hours(5), now());
        assert_eq!(far.text, "Expires in 5 hours");
        assert!(!far.expiring);

        let soon = expiry_label(now() + Duration::minutes(60), now());
        assert!(soon.expiring);

        let passed = expiry_label(now() - Duration::minutes(1), now());
        assert_eq!(passed.text, "Expires in a minute");
        assert!(passed.expiring);
    }
}
