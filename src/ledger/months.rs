use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar month used as the lookup key of a subscription ledger.
///
/// Ordering is chronological: fields compare year first, then month.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// Builds a key, rejecting months outside 1..=12 and years chrono cannot represent.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month, wrapping December into January of the next year.
    pub fn succ(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Months elapsed since year zero, handy for span arithmetic.
    fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Iterator over the calendar months touched by a closed date interval.
#[derive(Debug, Clone)]
pub struct MonthSpan {
    next: Option<MonthKey>,
    last: MonthKey,
}

impl MonthSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        let last = MonthKey::from_date(end);
        let next = (start <= end).then(|| MonthKey::from_date(start));
        Self { next, last }
    }

    /// Continues after `previous` (exclusive) up to the month of `end`.
    pub fn after(previous: MonthKey, end: NaiveDate) -> Self {
        let last = MonthKey::from_date(end);
        let first = previous.succ();
        let next = (first <= last).then_some(first);
        Self { next, last }
    }
}

impl Iterator for MonthSpan {
    type Item = MonthKey;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current < self.last {
            Some(current.succ())
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(current) => {
                let remaining = (self.last.ordinal() - current.ordinal() + 1).max(0) as usize;
                (remaining, Some(remaining))
            }
            None => (0, Some(0)),
        }
    }
}

impl ExactSizeIterator for MonthSpan {}

/// Enumerates the months between `start` and `end`, both months included.
///
/// A start date after the end date is a degenerate interval and yields nothing.
pub fn enumerate_months(start: NaiveDate, end: NaiveDate) -> Vec<MonthKey> {
    MonthSpan::new(start, end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key(y: i32, m: u32) -> MonthKey {
        MonthKey::new(y, m).unwrap()
    }

    #[test]
    fn full_calendar_year() {
        let months = enumerate_months(date(2023, 1, 15), date(2023, 12, 31));
        assert_eq!(months.len(), 12);
        assert_eq!(months.first(), Some(&key(2023, 1)));
        assert_eq!(months.last(), Some(&key(2023, 12)));
    }

    #[test]
    fn rolls_over_year_boundary() {
        let months = enumerate_months(date(2023, 11, 1), date(2024, 2, 1));
        assert_eq!(
            months,
            vec![key(2023, 11), key(2023, 12), key(2024, 1), key(2024, 2)]
        );
    }

    #[test]
    fn start_after_end_is_empty() {
        assert!(enumerate_months(date(2024, 3, 1), date(2024, 2, 28)).is_empty());
        assert!(enumerate_months(date(2024, 3, 20), date(2024, 3, 10)).is_empty());
    }

    #[test]
    fn single_day_interval_yields_one_month() {
        let months = enumerate_months(date(2024, 2, 29), date(2024, 2, 29));
        assert_eq!(months, vec![key(2024, 2)]);
    }

    #[test]
    fn sequence_is_strictly_increasing_and_gap_free() {
        let months = enumerate_months(date(2019, 6, 30), date(2025, 3, 2));
        for pair in months.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].succ(), pair[1]);
        }
        assert_eq!(months.len(), 70);
    }

    #[test]
    fn size_hint_matches_length() {
        let span = MonthSpan::new(date(2022, 10, 5), date(2023, 3, 1));
        assert_eq!(span.len(), 6);
        assert_eq!(span.count(), 6);
    }

    #[test]
    fn span_after_previous_month() {
        let months: Vec<_> = MonthSpan::after(key(2023, 12), date(2024, 2, 10)).collect();
        assert_eq!(months, vec![key(2024, 1), key(2024, 2)]);
        assert_eq!(MonthSpan::after(key(2024, 2), date(2024, 2, 10)).count(), 0);
    }

    #[test]
    fn rejects_invalid_months() {
        assert!(MonthKey::new(2024, 0).is_none());
        assert!(MonthKey::new(2024, 13).is_none());
        assert_eq!(key(2024, 7).to_string(), "2024-07");
    }
}
