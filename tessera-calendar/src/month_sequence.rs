//! Selectable bounds and the month list derived from them.
use std::cmp::Ordering;

use tracing::warn;

use crate::{
    date::{CalendarDate, MonthAnchor, compare_by_year_month},
    error::CalendarError,
};

/// Inclusive `[min, max]` window limiting both scrollable months and
/// selectable days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    min: CalendarDate,
    max: CalendarDate,
}

impl Bounds {
    /// Creates bounds, failing when `min` lies after `max`.
    pub fn try_new(min: CalendarDate, max: CalendarDate) -> Result<Self, CalendarError> {
        if min > max {
            return Err(CalendarError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Returns the lower bound.
    pub fn min(&self) -> CalendarDate {
        self.min
    }

    /// Returns the upper bound.
    pub fn max(&self) -> CalendarDate {
        self.max
    }

    /// Returns true when `date` lies inside the bounds.
    pub fn contains(&self, date: CalendarDate) -> bool {
        self.min <= date && date <= self.max
    }

    /// Clamps `date` into the bounds.
    pub fn clamp(&self, date: CalendarDate) -> CalendarDate {
        date.clamp_to(self.min, self.max)
    }

    /// Returns the month anchors covered by the bounds.
    pub fn months(&self) -> Vec<MonthAnchor> {
        build_month_sequence(self.min, self.max)
    }
}

/// Builds the ordered month anchors from `min`'s month through `max`'s month.
///
/// Returns an empty list when `min > max`.
pub fn build_month_sequence(min: CalendarDate, max: CalendarDate) -> Vec<MonthAnchor> {
    if min > max {
        warn!("Refusing to build months for inverted range {min}..={max}");
        return Vec::new();
    }

    let mut months = Vec::new();
    let mut cursor = min.anchor().first_day();
    while compare_by_year_month(cursor, max) != Ordering::Greater {
        months.push(cursor.anchor());
        let next = cursor.anchor().add_months(1);
        if next == cursor.anchor() {
            break;
        }
        cursor = next.first_day();
    }
    months
}
