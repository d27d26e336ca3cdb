//! Business calendar.
//!
//! "Today" and "this month" are evaluated in the company's time zone, not in
//! UTC: an upload at 01:00 local time on the first of the month belongs to
//! the new month even though UTC still reports the previous one.

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Error returned for an unknown IANA zone name.
#[derive(Debug, Error)]
#[error("unknown time zone: {0}")]
pub struct UnknownTimeZone(pub String);

/// Clock that answers calendar questions in the business time zone.
#[derive(Debug, Clone, Copy)]
pub struct BusinessClock {
    tz: Tz,
    pinned: Option<NaiveDate>,
}

impl BusinessClock {
    /// Creates a clock for the given time zone.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz, pinned: None }
    }

    /// Creates a clock from an IANA zone name such as `Africa/Cairo`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTimeZone` if the name is not a known zone.
    pub fn from_name(name: &str) -> Result<Self, UnknownTimeZone> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| UnknownTimeZone(name.to_string()))
    }

    /// Creates a clock whose "today" never moves.
    #[must_use]
    pub const fn pinned(today: NaiveDate) -> Self {
        Self {
            tz: Tz::UTC,
            pinned: Some(today),
        }
    }

    /// Returns the current date in the business time zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.pinned
            .unwrap_or_else(|| Utc::now().with_timezone(&self.tz).date_naive())
    }

    /// Returns the first day of the current month.
    #[must_use]
    pub fn current_month(&self) -> NaiveDate {
        first_of_month(self.today())
    }
}

impl Default for BusinessClock {
    fn default() -> Self {
        Self::new(chrono_tz::Africa::Cairo)
    }
}

/// Returns the first day of the month containing `date`.
#[must_use]
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_clock() {
        let day = NaiveDate::from_ymd_opt(2025, 9, 17).unwrap();
        let clock = BusinessClock::pinned(day);

        assert_eq!(clock.today(), day);
        assert_eq!(
            clock.current_month(),
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
        );
    }

    #[test]
    fn test_from_name() {
        assert!(BusinessClock::from_name("Africa/Cairo").is_ok());
        assert!(BusinessClock::from_name("Mars/Olympus").is_err());
    }

    #[test]
    fn test_first_of_month_is_idempotent() {
        let first = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(first_of_month(first), first);
        assert_eq!(
            first_of_month(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
            first
        );
    }
}
