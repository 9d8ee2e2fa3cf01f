//! Day cells of one month block, ready for a rendering layer.
use crate::{
    date::{CalendarDate, MonthAnchor, Weekday},
    label::DayFormatter,
    month_sequence::Bounds,
    selection::{DisabledLookup, SelectionValue},
};

/// Columns in a week row.
pub const DATE_COLUMNS: usize = 7;

/// How a day cell relates to the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum DayKind {
    /// Selectable, not selected.
    #[default]
    Normal,
    /// Selected in single or multiple mode.
    Selected,
    /// First day of a range.
    Start,
    /// Inside a range, excluding the endpoints.
    Middle,
    /// Last day of a range.
    End,
    /// Both endpoints of a zero-length range.
    StartEnd,
    /// Outside the bounds or rejected by the disabled lookup.
    Disabled,
}

/// One day cell of a month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    /// The date shown in the cell.
    pub date: CalendarDate,
    /// Selection state of the cell.
    pub kind: DayKind,
    /// Whether the cell is today.
    pub is_today: bool,
    /// Main text, the day number unless a formatter replaces it.
    pub text: String,
    /// Optional text above the day number.
    pub top_info: Option<String>,
    /// Optional text below the day number.
    pub bottom_info: Option<String>,
}

/// Inputs needed to classify the cells of a month.
pub struct CellContext<'a, D: DisabledLookup> {
    /// The selectable window.
    pub bounds: Bounds,
    /// Current selection.
    pub value: &'a SelectionValue,
    /// Per-day disabled lookup.
    pub disabled: &'a D,
    /// The date to flag as today.
    pub today: CalendarDate,
    /// First column of each week row.
    pub first_day_of_week: Weekday,
    /// Applied to every produced cell.
    pub formatter: &'a DayFormatter,
}

/// Number of week rows `anchor` occupies.
pub fn week_rows(anchor: MonthAnchor, first_day_of_week: Weekday) -> usize {
    let offset = leading_blanks(anchor, first_day_of_week);
    (offset + anchor.days() as usize).div_ceil(DATE_COLUMNS)
}

/// Builds the cells of `anchor`, `None` marking filler positions.
///
/// The result always holds `week_rows * 7` entries.
pub fn month_cells<D: DisabledLookup>(
    anchor: MonthAnchor,
    ctx: &CellContext<'_, D>,
) -> Vec<Option<DayCell>> {
    let offset = leading_blanks(anchor, ctx.first_day_of_week);
    let mut cells = vec![None; week_rows(anchor, ctx.first_day_of_week) * DATE_COLUMNS];
    for day in 1..=anchor.days() {
        let Some(date) = anchor.to_date(day) else {
            continue;
        };
        let cell = DayCell {
            date,
            kind: day_kind(date, ctx),
            is_today: date == ctx.today,
            text: day.to_string(),
            top_info: None,
            bottom_info: None,
        };
        cells[offset + day as usize - 1] = Some((ctx.formatter)(cell));
    }
    cells
}

/// Classifies `date` against bounds, disabled days and the selection.
pub fn day_kind<D: DisabledLookup>(date: CalendarDate, ctx: &CellContext<'_, D>) -> DayKind {
    if !ctx.bounds.contains(date) || ctx.disabled.is_disabled(date) {
        return DayKind::Disabled;
    }
    match ctx.value {
        SelectionValue::None => DayKind::Normal,
        SelectionValue::Single(selected) => {
            if *selected == date {
                DayKind::Selected
            } else {
                DayKind::Normal
            }
        }
        SelectionValue::Multiple(dates) => {
            if dates.contains(&date) {
                DayKind::Selected
            } else {
                DayKind::Normal
            }
        }
        SelectionValue::Range(range) => match range.end() {
            None if range.start() == date => DayKind::Start,
            None => DayKind::Normal,
            Some(end) if range.start() == date && end == date => DayKind::StartEnd,
            Some(_) if range.start() == date => DayKind::Start,
            Some(end) if end == date => DayKind::End,
            Some(end) if range.start() < date && date < end => DayKind::Middle,
            Some(_) => DayKind::Normal,
        },
    }
}

fn leading_blanks(anchor: MonthAnchor, first_day_of_week: Weekday) -> usize {
    let first_weekday = anchor.first_day().weekday();
    (first_weekday.index_from_monday() - first_day_of_week.index_from_monday()).rem_euclid(7)
        as usize
}
