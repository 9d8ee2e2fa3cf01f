//! Scrolling month-list calendar core for Tessera.
//!
//! # Usage
//!
//! The crate holds everything a month-list date picker needs except drawing:
//! the month list derived from `[min, max]`, tap handling for single, multiple
//! and range selection, and the bookkeeping that keeps the "current month" in
//! step with the scroll position.
//!
//! A rendering layer implements [`Viewport`] for its scroll container and
//! [`MonthView`] for each month block, then drives a [`CalendarController`]:
//!
//! ```rust,ignore
//! use tessera_calendar::{CalendarArgs, CalendarController, CalendarEvent, SelectionMode};
//!
//! let controller = CalendarController::new(
//!     CalendarArgs::default()
//!         .mode(SelectionMode::Range)
//!         .on_event(|event| {
//!             if let CalendarEvent::ValueChanged(value) = event {
//!                 println!("picked {value:?}");
//!             }
//!         }),
//!     viewport,
//! );
//! let views = controller
//!     .month_anchors()
//!     .into_iter()
//!     .map(|anchor| render_month(anchor))
//!     .collect();
//! controller.attach_month_views(views);
//! controller.initialize().await?;
//! ```
//!
//! The building blocks ([`SelectionEngine`], [`ScrollSync`], [`month_cells`])
//! are usable on their own.

pub mod controller;
pub mod date;
pub mod error;
pub mod grid;
pub mod host;
pub mod label;
pub mod month_sequence;
pub mod scroll_sync;
pub mod selection;

pub use controller::{
    CalendarArgs, CalendarController, CalendarEvent, EventHandler, NavigationOutcome,
};
pub use date::{CalendarDate, MonthAnchor, Weekday, compare_by_day, compare_by_year_month};
pub use error::{CalendarError, MeasureError};
pub use grid::{CellContext, DATE_COLUMNS, DayCell, DayKind, month_cells, week_rows};
pub use host::{MonthView, Viewport, ViewportRect};
pub use label::{DayFormatter, SubtitleOption, default_month_label, identity_formatter};
pub use month_sequence::{Bounds, build_month_sequence};
pub use scroll_sync::{ScrollApplyPolicy, ScrollSync, SyncOutcome, navigation_offset};
pub use selection::{
    DateRange, DisabledLookup, NoDisabledDays, RawValue, SelectionEngine, SelectionMode,
    SelectionValue, TapOutcome,
};
