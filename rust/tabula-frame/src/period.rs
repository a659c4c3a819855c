//! Fixed-frequency periods (calendar days and business days).

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};

/// Period frequency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Frequency {
    /// Calendar day.
    Day,
    /// Monday through Friday.
    BusinessDay,
}

impl Frequency {
    /// Frequency code, as it appears in period dtype names.
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::Day => "D",
            Frequency::BusinessDay => "B",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A span of time identified by its frequency and its ordinal, counted from
/// the period containing 1970-01-01.
///
/// Business-day ordinals count weekdays only; a weekend date belongs to the
/// following Monday's period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    freq: Frequency,
    ordinal: i64,
}

/// 1970-01-01 is a Thursday, three days after the Monday that starts its week.
const EPOCH_WEEKDAY_OFFSET: i64 = 3;

impl Period {
    pub fn new(freq: Frequency, ordinal: i64) -> Period {
        Period { freq, ordinal }
    }

    /// Returns the period of frequency `freq` containing `date`.
    pub fn from_date(date: NaiveDate, freq: Frequency) -> Period {
        let days = (date - NaiveDate::default()).num_days();
        let ordinal = match freq {
            Frequency::Day => days,
            Frequency::BusinessDay => {
                let shifted = days + EPOCH_WEEKDAY_OFFSET;
                let mut weeks = shifted.div_euclid(7);
                let mut weekday = shifted.rem_euclid(7);
                if weekday >= 5 {
                    weeks += 1;
                    weekday = 0;
                }
                weeks * 5 + weekday - EPOCH_WEEKDAY_OFFSET
            }
        };
        Period { freq, ordinal }
    }

    pub fn freq(&self) -> Frequency {
        self.freq
    }

    pub fn ordinal(&self) -> i64 {
        self.ordinal
    }

    /// First calendar day covered by this period.
    pub fn start_date(&self) -> NaiveDate {
        let days = match self.freq {
            Frequency::Day => self.ordinal,
            Frequency::BusinessDay => {
                let shifted = self.ordinal + EPOCH_WEEKDAY_OFFSET;
                shifted.div_euclid(5) * 7 + shifted.rem_euclid(5) - EPOCH_WEEKDAY_OFFSET
            }
        };
        NaiveDate::default() + Duration::days(days)
    }

    /// Returns the period `n` steps after this one.
    pub fn shift(&self, n: i64) -> Period {
        Period {
            freq: self.freq,
            ordinal: self.ordinal + n,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start_date().format("%Y-%m-%d"))
    }
}

/// Returns `true` for Saturday and Sunday.
pub(crate) fn is_weekend(date: NaiveDate) -> bool {
    date.weekday().num_days_from_monday() >= 5
}
