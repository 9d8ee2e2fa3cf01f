//! Selection state machine for single, multiple and range picking.
//!
//! ## Usage
//!
//! [`SelectionEngine::apply_tap`] turns a tap on a day cell into the next
//! selection value, and [`SelectionEngine::normalize`] coerces whatever value
//! the owner handed over into a shape that fits the current mode and bounds.
use tracing::trace;

use crate::{date::CalendarDate, month_sequence::Bounds};

/// How taps mutate the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum SelectionMode {
    /// One date at a time.
    #[default]
    Single,
    /// Any set of dates, toggled one by one.
    Multiple,
    /// A contiguous span between two dates.
    Range,
}

/// A range selection, possibly still waiting for its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: CalendarDate,
    end: Option<CalendarDate>,
}

impl DateRange {
    /// A range with only its start picked.
    pub fn started(start: CalendarDate) -> Self {
        Self { start, end: None }
    }

    /// A completed range. The endpoints are swapped when given out of order.
    pub fn between(a: CalendarDate, b: CalendarDate) -> Self {
        if a <= b {
            Self {
                start: a,
                end: Some(b),
            }
        } else {
            Self {
                start: b,
                end: Some(a),
            }
        }
    }

    /// Returns the first day of the range.
    pub fn start(&self) -> CalendarDate {
        self.start
    }

    /// Returns the last day of the range, if picked.
    pub fn end(&self) -> Option<CalendarDate> {
        self.end
    }

    /// Returns true when both endpoints are picked.
    pub fn is_complete(&self) -> bool {
        self.end.is_some()
    }

    /// Returns true when `date` lies within the picked span.
    pub fn contains(&self, date: CalendarDate) -> bool {
        match self.end {
            Some(end) => self.start <= date && date <= end,
            None => self.start == date,
        }
    }
}

/// The current selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub enum SelectionValue {
    /// Nothing is selected.
    #[default]
    None,
    /// A single date.
    Single(CalendarDate),
    /// Dates in the order they were picked.
    Multiple(Vec<CalendarDate>),
    /// A range, complete or in progress.
    Range(DateRange),
}

impl SelectionValue {
    /// Returns true when no date is selected.
    pub fn is_empty(&self) -> bool {
        match self {
            SelectionValue::None => true,
            SelectionValue::Multiple(dates) => dates.is_empty(),
            SelectionValue::Single(_) | SelectionValue::Range(_) => false,
        }
    }

    /// Returns the date the calendar should scroll to for this value.
    pub fn focus_date(&self) -> Option<CalendarDate> {
        match self {
            SelectionValue::None => None,
            SelectionValue::Single(date) => Some(*date),
            SelectionValue::Multiple(dates) => dates.first().copied(),
            SelectionValue::Range(range) => Some(range.start),
        }
    }

    /// Returns true when `date` is part of the selection.
    pub fn contains(&self, date: CalendarDate) -> bool {
        match self {
            SelectionValue::None => false,
            SelectionValue::Single(selected) => *selected == date,
            SelectionValue::Multiple(dates) => dates.contains(&date),
            SelectionValue::Range(range) => range.contains(date),
        }
    }

    fn range(&self) -> Option<DateRange> {
        match self {
            SelectionValue::Range(range) => Some(*range),
            _ => None,
        }
    }
}

/// A value as the owner hands it over, before it is checked against the mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub enum RawValue {
    /// No value was provided; defaults apply.
    #[default]
    Absent,
    /// The owner explicitly asked for an empty selection.
    Cleared,
    /// One date.
    Date(CalendarDate),
    /// A sequence of dates.
    Dates(Vec<CalendarDate>),
}

impl From<&SelectionValue> for RawValue {
    fn from(value: &SelectionValue) -> Self {
        match value {
            SelectionValue::None => RawValue::Cleared,
            SelectionValue::Single(date) => RawValue::Date(*date),
            SelectionValue::Multiple(dates) => RawValue::Dates(dates.clone()),
            SelectionValue::Range(range) => match range.end {
                Some(end) => RawValue::Dates(vec![range.start, end]),
                None => RawValue::Dates(vec![range.start]),
            },
        }
    }
}

impl From<CalendarDate> for RawValue {
    fn from(date: CalendarDate) -> Self {
        RawValue::Date(date)
    }
}

impl From<Vec<CalendarDate>> for RawValue {
    fn from(dates: Vec<CalendarDate>) -> Self {
        RawValue::Dates(dates)
    }
}

/// Answers whether a day can be picked.
pub trait DisabledLookup {
    /// Returns true when `date` is disabled.
    fn is_disabled(&self, date: CalendarDate) -> bool;
}

impl<F> DisabledLookup for F
where
    F: Fn(CalendarDate) -> bool,
{
    fn is_disabled(&self, date: CalendarDate) -> bool {
        self(date)
    }
}

/// A lookup under which every day is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDisabledDays;

impl DisabledLookup for NoDisabledDays {
    fn is_disabled(&self, _date: CalendarDate) -> bool {
        false
    }
}

/// Result of a tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// The selection stays as it is.
    Unchanged,
    /// The selection moved to a new value.
    Changed(SelectionValue),
}

/// Applies taps and normalizes owner-provided values for one mode and bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionEngine {
    mode: SelectionMode,
    bounds: Bounds,
    readonly: bool,
}

impl SelectionEngine {
    /// Creates an engine.
    pub fn new(mode: SelectionMode, bounds: Bounds) -> Self {
        Self {
            mode,
            bounds,
            readonly: false,
        }
    }

    /// Makes every tap a no-op.
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Returns the selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Returns the bounds.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Computes the selection after a tap on `tapped`.
    ///
    /// `tapped` is `None` for filler cells, which never change anything.
    pub fn apply_tap(
        &self,
        current: &SelectionValue,
        tapped: Option<CalendarDate>,
        disabled: &impl DisabledLookup,
    ) -> TapOutcome {
        let Some(tapped) = tapped else {
            return TapOutcome::Unchanged;
        };
        if self.readonly {
            return TapOutcome::Unchanged;
        }
        let tapped = self.bounds.clamp(tapped);

        let next = match self.mode {
            SelectionMode::Single => SelectionValue::Single(tapped),
            SelectionMode::Multiple => toggle_multiple(current, tapped),
            SelectionMode::Range => {
                SelectionValue::Range(extend_range(current.range(), tapped, disabled))
            }
        };

        if &next == current {
            TapOutcome::Unchanged
        } else {
            trace!(?next, "Tap on {tapped} changed selection");
            TapOutcome::Changed(next)
        }
    }

    /// Coerces `raw` into a value of the current mode, inside the bounds.
    pub fn normalize(&self, raw: &RawValue, today: CalendarDate) -> SelectionValue {
        let bounds = self.bounds;
        match (self.mode, raw) {
            (_, RawValue::Cleared) => SelectionValue::None,
            (SelectionMode::Range, raw) => {
                let (start, end) = match raw {
                    RawValue::Dates(dates) if dates.len() == 2 => (dates[0], dates[1]),
                    _ => (today, today),
                };
                let start = start
                    .clamp_to(bounds.min(), bounds.max().previous_day())
                    .clamp_to(bounds.min(), bounds.max());
                let end = end
                    .clamp_to(bounds.min().next_day(), bounds.max())
                    .clamp_to(bounds.min(), bounds.max());
                SelectionValue::Range(DateRange::between(start, end))
            }
            (SelectionMode::Multiple, RawValue::Dates(dates)) => {
                let mut picked: Vec<CalendarDate> = Vec::with_capacity(dates.len());
                for date in dates.iter().map(|date| bounds.clamp(*date)) {
                    if !picked.contains(&date) {
                        picked.push(date);
                    }
                }
                SelectionValue::Multiple(picked)
            }
            (SelectionMode::Multiple, _) => SelectionValue::Multiple(vec![bounds.clamp(today)]),
            (SelectionMode::Single, RawValue::Date(date)) => {
                SelectionValue::Single(bounds.clamp(*date))
            }
            (SelectionMode::Single, _) => SelectionValue::Single(bounds.clamp(today)),
        }
    }
}

fn toggle_multiple(current: &SelectionValue, tapped: CalendarDate) -> SelectionValue {
    let mut dates = match current {
        SelectionValue::Multiple(dates) => dates.clone(),
        _ => Vec::new(),
    };
    match dates.iter().position(|date| *date == tapped) {
        Some(index) => {
            dates.remove(index);
        }
        None => dates.push(tapped),
    }
    SelectionValue::Multiple(dates)
}

fn extend_range(
    current: Option<DateRange>,
    tapped: CalendarDate,
    disabled: &impl DisabledLookup,
) -> DateRange {
    let Some(range) = current else {
        return DateRange::started(tapped);
    };
    if range.is_complete() {
        return DateRange::started(tapped);
    }

    let start = range.start;
    if tapped > start {
        let end = match first_disabled_between(start, tapped, disabled) {
            Some(blocked) => blocked.previous_day(),
            None => tapped,
        };
        DateRange {
            start,
            end: Some(end),
        }
    } else if tapped < start {
        DateRange::started(tapped)
    } else {
        DateRange {
            start,
            end: Some(start),
        }
    }
}

/// First disabled day in the open interval `(start, end)`.
fn first_disabled_between(
    start: CalendarDate,
    end: CalendarDate,
    disabled: &impl DisabledLookup,
) -> Option<CalendarDate> {
    let mut day = start.next_day();
    while day < end {
        if disabled.is_disabled(day) {
            return Some(day);
        }
        day = day.next_day();
    }
    None
}
