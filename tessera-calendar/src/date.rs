//! Day-precision calendar dates and month anchors.
//!
//! ## Usage
//!
//! Every comparison and step in the calendar goes through these helpers so the
//! picker never has to reason about time-of-day.
use std::{
    cmp::Ordering,
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

/// Days of the week in Monday-first order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    /// Monday.
    Monday,
    /// Tuesday.
    Tuesday,
    /// Wednesday.
    Wednesday,
    /// Thursday.
    Thursday,
    /// Friday.
    Friday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
}

impl Weekday {
    pub(crate) fn index_from_monday(self) -> i32 {
        match self {
            Weekday::Monday => 0,
            Weekday::Tuesday => 1,
            Weekday::Wednesday => 2,
            Weekday::Thursday => 3,
            Weekday::Friday => 4,
            Weekday::Saturday => 5,
            Weekday::Sunday => 6,
        }
    }

    pub(crate) fn from_monday_index(index: i32) -> Self {
        match index.rem_euclid(7) {
            0 => Weekday::Monday,
            1 => Weekday::Tuesday,
            2 => Weekday::Wednesday,
            3 => Weekday::Thursday,
            4 => Weekday::Friday,
            5 => Weekday::Saturday,
            _ => Weekday::Sunday,
        }
    }
}

/// A calendar date expressed as year, month, and day.
///
/// Ordering is chronological, so `a < b` means `a` is an earlier day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    year: i32,
    month: u8,
    day: u8,
}

impl CalendarDate {
    /// Creates a calendar date if the values are valid.
    pub fn new(year: i32, month: u8, day: u8) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        if day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }

    /// Returns the year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month (1-12).
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Returns the day of the month (1-31).
    pub fn day(&self) -> u8 {
        self.day
    }

    /// Returns the current date.
    ///
    /// The day boundary is taken from the system clock in UTC.
    pub fn today() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self::from_days_since_epoch((duration.as_secs() / 86_400) as i64)
    }

    /// Returns the date `days` after 1970-01-01.
    pub fn from_days_since_epoch(days: i64) -> Self {
        let (year, month, day) = civil_from_days(days);
        Self { year, month, day }
    }

    /// Returns the number of days between 1970-01-01 and this date.
    pub fn days_since_epoch(&self) -> i64 {
        days_from_civil(self.year, self.month, self.day)
    }

    /// Returns the following day.
    pub fn next_day(&self) -> Self {
        if self.day < days_in_month(self.year, self.month) {
            Self {
                day: self.day + 1,
                ..*self
            }
        } else if self.month < 12 {
            Self {
                year: self.year,
                month: self.month + 1,
                day: 1,
            }
        } else {
            Self {
                year: self.year.saturating_add(1),
                month: 1,
                day: 1,
            }
        }
    }

    /// Returns the preceding day.
    pub fn previous_day(&self) -> Self {
        if self.day > 1 {
            Self {
                day: self.day - 1,
                ..*self
            }
        } else if self.month > 1 {
            let month = self.month - 1;
            Self {
                year: self.year,
                month,
                day: days_in_month(self.year, month),
            }
        } else {
            let year = self.year.saturating_sub(1);
            Self {
                year,
                month: 12,
                day: 31,
            }
        }
    }

    /// Returns the month this date belongs to.
    pub fn anchor(&self) -> MonthAnchor {
        MonthAnchor {
            year: self.year,
            month: self.month,
        }
    }

    /// Returns the day of the week.
    pub fn weekday(&self) -> Weekday {
        let days = self.days_since_epoch();
        // 1970-01-01 was a Thursday.
        Weekday::from_monday_index((days + 3).rem_euclid(7) as i32)
    }

    /// Clamps the date into `[lo, hi]`.
    ///
    /// The lower bound wins when `lo > hi`.
    pub fn clamp_to(self, lo: CalendarDate, hi: CalendarDate) -> Self {
        if lo > hi || self < lo {
            lo
        } else if self > hi {
            hi
        } else {
            self
        }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// A month identified by year and month, standing for its first day.
///
/// The scroll list holds one anchor per rendered month block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthAnchor {
    year: i32,
    month: u8,
}

impl MonthAnchor {
    /// Creates a month anchor if the month is valid.
    pub fn new(year: i32, month: u8) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    /// Returns the year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month (1-12).
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Returns the first day of the month.
    pub fn first_day(&self) -> CalendarDate {
        CalendarDate {
            year: self.year,
            month: self.month,
            day: 1,
        }
    }

    /// Returns the last day of the month.
    pub fn last_day(&self) -> CalendarDate {
        CalendarDate {
            year: self.year,
            month: self.month,
            day: self.days(),
        }
    }

    /// Returns the date for this month at the provided day.
    pub fn to_date(&self, day: u8) -> Option<CalendarDate> {
        CalendarDate::new(self.year, self.month, day)
    }

    /// Returns the number of days in the month.
    pub fn days(&self) -> u8 {
        days_in_month(self.year, self.month)
    }

    /// Adds or subtracts months, adjusting the year as needed.
    ///
    /// Saturates at the first and last representable months.
    pub fn add_months(&self, delta: i32) -> Self {
        let total = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(delta);
        match i32::try_from(total.div_euclid(12)) {
            Ok(year) => Self {
                year,
                month: (total.rem_euclid(12) + 1) as u8,
            },
            Err(_) if total < 0 => Self {
                year: i32::MIN,
                month: 1,
            },
            Err(_) => Self {
                year: i32::MAX,
                month: 12,
            },
        }
    }

    /// Returns true when `date` falls in this month.
    pub fn contains(&self, date: CalendarDate) -> bool {
        date.year == self.year && date.month == self.month
    }
}

impl From<CalendarDate> for MonthAnchor {
    fn from(date: CalendarDate) -> Self {
        date.anchor()
    }
}

impl fmt::Display for MonthAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Compares two dates by calendar day.
pub fn compare_by_day(a: CalendarDate, b: CalendarDate) -> Ordering {
    a.cmp(&b)
}

/// Compares two dates by year and month, ignoring the day.
pub fn compare_by_year_month(a: CalendarDate, b: CalendarDate) -> Ordering {
    a.anchor().cmp(&b.anchor())
}

/// Returns the day after `date`.
pub fn next_day(date: CalendarDate) -> CalendarDate {
    date.next_day()
}

/// Returns the day before `date`.
pub fn previous_day(date: CalendarDate) -> CalendarDate {
    date.previous_day()
}

pub(crate) fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn days_from_civil(year: i32, month: u8, day: u8) -> i64 {
    let m = month as i64;
    let d = day as i64;
    let y = year as i64 - if m <= 2 { 1 } else { 0 };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = m + if m > 2 { -3 } else { 9 };
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i32, u8, u8) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = mp + if mp < 10 { 3 } else { -9 };
    let year = y + if month <= 2 { 1 } else { 0 };
    (year as i32, month as u8, day as u8)
}

#[cfg(test)]
pub(crate) fn date(year: i32, month: u8, day: u8) -> CalendarDate {
    CalendarDate::new(year, month, day).expect("valid test date")
}
