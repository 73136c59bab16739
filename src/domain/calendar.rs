//! Daily calendar generation and month keys.

use chrono::{Datelike, NaiveDate};

/// Calendar month, used to join monthly data onto days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

/// Every day in `[start, end]`, inclusive. Empty when `start > end`.
pub fn daily_calendar(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    start.iter_days().take_while(|d| *d <= end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn calendar_is_contiguous_and_inclusive() {
        let days = daily_calendar(date(2024, 2, 27), date(2024, 3, 2));
        assert_eq!(
            days,
            vec![
                date(2024, 2, 27),
                date(2024, 2, 28),
                date(2024, 2, 29),
                date(2024, 3, 1),
                date(2024, 3, 2),
            ]
        );
    }

    #[test]
    fn calendar_single_day() {
        let days = daily_calendar(date(2024, 1, 1), date(2024, 1, 1));
        assert_eq!(days, vec![date(2024, 1, 1)]);
    }

    #[test]
    fn calendar_reversed_range_is_empty() {
        assert!(daily_calendar(date(2024, 1, 2), date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn month_key_orders_across_years() {
        assert!(MonthKey::of(date(2023, 12, 31)) < MonthKey::of(date(2024, 1, 1)));
        assert_eq!(MonthKey::of(date(2024, 5, 1)), MonthKey::of(date(2024, 5, 31)));
    }
}
