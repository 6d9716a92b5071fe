//! Request window for the Agile unit rates endpoint
//!
//! Agile prices change every half hour. The window asks for the period
//! before now through the period after now, with each boundary floored to
//! the half hour it falls in:
//!
//! ```text
//! now = 2024-01-15T10:47
//! ?period_from=2024-1-15T10:00Z&period_to=2024-1-15T11:30Z
//! ```
//!
//! Month, day and hour are written without zero padding; the API accepts it.

use core::fmt::{self, Write as FmtWrite};

use chrono::{DateTime, Datelike, NaiveDateTime, TimeDelta, Timelike};
use heapless::String;
use log::warn;

/// Capacity of a full request URL (base URL plus query)
pub const MAX_URL_LEN: usize = 256;

/// Capacity of the query string alone
pub const MAX_QUERY_LEN: usize = 64;

/// The three instants a price request is built around
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub last: NaiveDateTime,
    pub current: NaiveDateTime,
    pub next: NaiveDateTime,
}

impl TimeWindow {
    /// Build the window around `now`, truncated to the minute
    pub fn at(now: NaiveDateTime) -> Self {
        let current = now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);

        Self {
            last: current - TimeDelta::minutes(30),
            current,
            next: current + TimeDelta::hours(1),
        }
    }

    /// Build the window from a unix timestamp (UTC)
    pub fn from_unix(secs: u64) -> Option<Self> {
        let secs = i64::try_from(secs).ok()?;
        let now = DateTime::from_timestamp(secs, 0)?.naive_utc();
        // `next` must stay representable
        now.checked_add_signed(TimeDelta::hours(1))?;
        Some(Self::at(now))
    }

    /// Query string with `period_from` and `period_to`
    ///
    /// `None` if it does not fit in [`MAX_QUERY_LEN`].
    pub fn query(&self) -> Option<String<MAX_QUERY_LEN>> {
        let mut query = String::new();
        if write!(
            query,
            "?period_from={}&period_to={}",
            PeriodStamp(self.last),
            PeriodStamp(self.next)
        )
        .is_err()
        {
            warn!("Query for {} does not fit in {} bytes", self.current, MAX_QUERY_LEN);
            return None;
        }
        Some(query)
    }

    /// Full request URL for `base`
    ///
    /// `None` if it does not fit in [`MAX_URL_LEN`].
    pub fn request_url(&self, base: &str) -> Option<String<MAX_URL_LEN>> {
        let query = self.query()?;
        let mut url = String::new();
        if url.push_str(base).and_then(|_| url.push_str(&query)).is_err() {
            warn!("Request URL for {} does not fit in {} bytes", base, MAX_URL_LEN);
            return None;
        }
        Some(url)
    }
}

/// A window boundary formatted for the API (`YYYY-M-DTH:MMZ`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodStamp(pub NaiveDateTime);

impl PeriodStamp {
    /// Minute floored to the half hour
    pub fn half_hour(&self) -> u32 {
        if self.0.minute() <= 29 { 0 } else { 30 }
    }
}

impl fmt::Display for PeriodStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}T{}:{:02}Z",
            self.0.year(),
            self.0.month(),
            self.0.day(),
            self.0.hour(),
            self.half_hour()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_window_periods() {
        let window = TimeWindow::at(at(2024, 1, 15, 10, 47));
        assert_eq!(window.last, at(2024, 1, 15, 10, 17));
        assert_eq!(window.current, at(2024, 1, 15, 10, 47));
        assert_eq!(window.next, at(2024, 1, 15, 11, 47));

        assert_eq!(PeriodStamp(window.last).half_hour(), 0);
        assert_eq!(PeriodStamp(window.next).half_hour(), 30);
    }

    #[test]
    fn test_window_truncates_seconds() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_milli_opt(10, 47, 59, 999)
            .unwrap();
        let window = TimeWindow::at(now);
        assert_eq!(window.current, at(2024, 1, 15, 10, 47));
    }

    #[test]
    fn test_query_format() {
        let window = TimeWindow::at(at(2024, 1, 15, 10, 47));
        assert_eq!(
            window.query().unwrap().as_str(),
            "?period_from=2024-1-15T10:00Z&period_to=2024-1-15T11:30Z"
        );
    }

    #[test]
    fn test_half_hour_boundaries() {
        assert_eq!(PeriodStamp(at(2024, 3, 5, 7, 0)).half_hour(), 0);
        assert_eq!(PeriodStamp(at(2024, 3, 5, 7, 29)).half_hour(), 0);
        assert_eq!(PeriodStamp(at(2024, 3, 5, 7, 30)).half_hour(), 30);
        assert_eq!(PeriodStamp(at(2024, 3, 5, 7, 59)).half_hour(), 30);
    }

    #[test]
    fn test_window_crosses_midnight() {
        let window = TimeWindow::at(at(2024, 1, 1, 0, 10));
        assert_eq!(
            window.query().unwrap().as_str(),
            "?period_from=2023-12-31T23:30Z&period_to=2024-1-1T1:00Z"
        );

        let window = TimeWindow::at(at(2024, 2, 29, 23, 40));
        assert_eq!(
            window.query().unwrap().as_str(),
            "?period_from=2024-2-29T23:00Z&period_to=2024-3-1T0:30Z"
        );
    }

    #[test]
    fn test_from_unix() {
        // 2024-01-15T10:47:30Z
        let window = TimeWindow::from_unix(1_705_315_650).unwrap();
        assert_eq!(window.current, at(2024, 1, 15, 10, 47));
    }

    #[test]
    fn test_request_url() {
        let window = TimeWindow::at(at(2024, 1, 15, 10, 47));
        let url = window.request_url(crate::config::API_URL).unwrap();
        assert!(url.starts_with("https://api.octopus.energy/"));
        assert!(url.ends_with("standard-unit-rates/?period_from=2024-1-15T10:00Z&period_to=2024-1-15T11:30Z"));
    }

    #[test]
    fn test_request_url_too_long() {
        let window = TimeWindow::at(at(2024, 1, 15, 10, 47));
        let base = "https://example.com/".repeat(12);
        assert!(base.len() + 56 > MAX_URL_LEN);
        assert_eq!(window.request_url(&base), None);
    }

    #[test]
    fn test_query_fits_six_digit_years() {
        let window = TimeWindow::from_unix(6_000_000_000_000).unwrap();
        assert!(window.current.year() > 99_999);
        assert!(window.query().is_some());
    }

    #[test]
    fn test_from_unix_out_of_range() {
        assert_eq!(TimeWindow::from_unix(u64::MAX), None);
        assert_eq!(TimeWindow::from_unix(i64::MAX as u64), None);
    }
}
