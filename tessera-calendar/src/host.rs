//! Collaborators the host rendering layer provides.
//!
//! Measurement queries are asynchronous: a host typically answers them after
//! its next layout pass.
use std::future::Future;

use crate::{date::CalendarDate, date::MonthAnchor, error::MeasureError};

/// Position and height of the scroll container on screen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportRect {
    /// Top edge in the same coordinate space month views report in.
    pub top: f32,
    /// Visible height.
    pub height: f32,
}

/// The scrollable container holding the month list.
pub trait Viewport: Send + Sync {
    /// Current scroll offset of the container.
    fn scroll_top(&self) -> impl Future<Output = Result<f32, MeasureError>> + Send;

    /// Bounding box of the container.
    fn bounding_rect(&self) -> impl Future<Output = Result<ViewportRect, MeasureError>> + Send;

    /// Moves the container to `offset`.
    fn set_scroll_top(&self, offset: f32);
}

/// One rendered month block.
pub trait MonthView: Send + Sync {
    /// The month this view renders.
    fn anchor(&self) -> MonthAnchor;

    /// Rendered height of the whole block.
    fn height(&self) -> f32;

    /// Whether the view renders `date` as disabled.
    fn is_day_disabled(&self, date: CalendarDate) -> bool;

    /// Top edge of the cell for `date`, in viewport coordinates.
    ///
    /// Views may return a position that leaves the list where it is when the
    /// cell is already visible.
    fn scroll_top(
        &self,
        date: CalendarDate,
    ) -> impl Future<Output = Result<f32, MeasureError>> + Send;
}
