//! Calendar month type used as the canonical budget key.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Errors that can occur when parsing a `YYYY-MM` month string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseMonthError {
    /// Input is not of the form `YYYY-MM`.
    #[error("invalid month format, expected YYYY-MM")]
    Format,

    /// A component is outside its valid range.
    #[error("month component out of range")]
    Range,
}

/// A calendar month such as `2025-03`.
///
/// Budgets are keyed by `(user, category, month)`; the month also derives the
/// default `[first_day, last_day]` budget window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Creates a month, validating the components.
    ///
    /// # Errors
    ///
    /// Returns `ParseMonthError::Range` if `month` is not 1-12 or `year` is
    /// outside 0-9999.
    pub fn new(year: i32, month: u32) -> Result<Self, ParseMonthError> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(ParseMonthError::Range);
        }
        Ok(Self { year, month })
    }

    /// Returns the month a date falls in.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns the first day of the month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("components are validated")
    }

    /// Returns the last day of the month.
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.pred_opt())
            .expect("components are validated")
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s.split_once('-').ok_or(ParseMonthError::Format)?;
        let year: i32 = year.parse().map_err(|_| ParseMonthError::Format)?;
        let month: u32 = month.parse().map_err(|_| ParseMonthError::Format)?;
        Self::new(year, month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2025-03", 2025, 3)]
    #[case("2025-12", 2025, 12)]
    #[case("1999-01", 1999, 1)]
    fn test_parse_valid(#[case] input: &str, #[case] year: i32, #[case] month: u32) {
        let parsed: Month = input.parse().unwrap();
        assert_eq!(parsed, Month::new(year, month).unwrap());
    }

    #[rstest]
    #[case("2025")]
    #[case("2025/03")]
    #[case("march 2025")]
    #[case("2025-xx")]
    #[case("")]
    fn test_parse_invalid_format(#[case] input: &str) {
        assert_eq!(input.parse::<Month>(), Err(ParseMonthError::Format));
    }

    #[rstest]
    #[case("2025-00")]
    #[case("2025-13")]
    #[case("99999-01")]
    fn test_parse_out_of_range(#[case] input: &str) {
        assert_eq!(input.parse::<Month>(), Err(ParseMonthError::Range));
    }

    #[test]
    fn test_display_zero_pads() {
        let month = Month::new(2025, 3).unwrap();
        assert_eq!(month.to_string(), "2025-03");
    }

    #[test]
    fn test_month_window() {
        let month: Month = "2025-03".parse().unwrap();
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
    }

    #[test]
    fn test_december_window_crosses_year() {
        let month: Month = "2025-12".parse().unwrap();
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn test_leap_february() {
        let month: Month = "2024-02".parse().unwrap();
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let month: Month = "2025-02".parse().unwrap();
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }

    #[test]
    fn test_of_date() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 27).unwrap();
        assert_eq!(Month::of(date), Month::new(2025, 2).unwrap());
    }
}
