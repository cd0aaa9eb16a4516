//! Trading-day price lookup.
//!
//! Statement period ends often fall on weekends or holidays, so the price for
//! a period is the close of the first trading day at or after the period end,
//! searched within [`PRICE_WINDOW_DAYS`] calendar days.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Width of the search window in calendar days, starting at the target date.
pub const PRICE_WINDOW_DAYS: i64 = 4;

/// A single daily closing price.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    /// Trading day.
    pub date: NaiveDate,
    /// Closing price.
    pub close: f64,
}

impl DailyClose {
    /// Creates a new daily close.
    #[must_use]
    pub const fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Returns the exclusive end of the search window for `target`.
#[must_use]
pub fn window_end(target: NaiveDate) -> NaiveDate {
    target + Duration::days(PRICE_WINDOW_DAYS)
}

/// Finds the close of the earliest trading day in `[target, target + window)`.
///
/// Bars may be in any order. Non-finite closes are ignored.
#[must_use]
pub fn first_close_on_or_after(bars: &[DailyClose], target: NaiveDate) -> Option<f64> {
    let end = window_end(target);
    bars.iter()
        .filter(|bar| bar.date >= target && bar.date < end && bar.close.is_finite())
        .min_by_key(|bar| bar.date)
        .map(|bar| bar.close)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekend_rolls_forward() {
        // 2023-12-30 is a Saturday
        let bars = vec![
            DailyClose::new(date(2024, 1, 3), 103.0),
            DailyClose::new(date(2024, 1, 2), 102.0),
            DailyClose::new(date(2023, 12, 29), 99.0),
        ];
        assert_eq!(first_close_on_or_after(&bars, date(2023, 12, 30)), Some(102.0));
    }

    #[test]
    fn test_exact_date() {
        let bars = vec![DailyClose::new(date(2023, 6, 30), 50.0)];
        assert_eq!(first_close_on_or_after(&bars, date(2023, 6, 30)), Some(50.0));
    }

    #[test]
    fn test_outside_window() {
        let bars = vec![DailyClose::new(date(2024, 1, 4), 104.0)];
        assert_eq!(first_close_on_or_after(&bars, date(2023, 12, 31)), None);
        assert_eq!(first_close_on_or_after(&[], date(2023, 12, 31)), None);
    }
}
