//! Business-day timestamp and period ranges.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::period::{Frequency, Period, is_weekend};

/// Returns `periods` consecutive business days starting at `start`, normalized
/// to midnight. A weekend start rolls forward to the next Monday.
pub fn bdate_range(start: NaiveDateTime, periods: usize) -> Vec<NaiveDateTime> {
    let mut day = start.date();
    let mut result = Vec::with_capacity(periods);
    while result.len() < periods {
        if !is_weekend(day) {
            result.push(day.and_time(NaiveTime::MIN));
        }
        day += Duration::days(1);
    }
    result
}

/// Returns `periods` consecutive periods of frequency `freq`, starting with
/// the period that contains `start`.
pub fn period_range(start: NaiveDate, periods: usize, freq: Frequency) -> Vec<Period> {
    let first = Period::from_date(start, freq);
    (0..periods as i64).map(|i| first.shift(i)).collect()
}
