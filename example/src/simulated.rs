//! A headless host that lays out month blocks the way a renderer would.
use std::sync::Arc;

use parking_lot::Mutex;
use tessera_calendar::{
    CalendarDate, MeasureError, MonthAnchor, MonthView, Viewport, ViewportRect, Weekday,
    week_rows,
};

pub const HEADER_HEIGHT: f32 = 40.0;
pub const ROW_HEIGHT: f32 = 64.0;
pub const VIEWPORT_TOP: f32 = 96.0;
pub const VIEWPORT_HEIGHT: f32 = 560.0;

/// Scroll container shared by the viewport and its month blocks.
#[derive(Clone, Default)]
pub struct SimulatedViewport {
    scroll: Arc<Mutex<f32>>,
}

impl SimulatedViewport {
    pub fn scroll(&self) -> f32 {
        *self.scroll.lock()
    }

    /// Lays out one block per anchor, stacked from the top of the content.
    pub fn layout(&self, anchors: &[MonthAnchor], first_day_of_week: Weekday) -> Vec<SimulatedMonth> {
        let mut content_top = 0.0;
        anchors
            .iter()
            .map(|anchor| {
                let month = SimulatedMonth {
                    anchor: *anchor,
                    content_top,
                    first_day_of_week,
                    scroll: self.scroll.clone(),
                };
                content_top += month.height();
                month
            })
            .collect()
    }
}

impl Viewport for SimulatedViewport {
    async fn scroll_top(&self) -> Result<f32, MeasureError> {
        Ok(*self.scroll.lock())
    }

    async fn bounding_rect(&self) -> Result<ViewportRect, MeasureError> {
        Ok(ViewportRect {
            top: VIEWPORT_TOP,
            height: VIEWPORT_HEIGHT,
        })
    }

    fn set_scroll_top(&self, offset: f32) {
        tracing::debug!("Viewport scrolled to {offset}");
        *self.scroll.lock() = offset;
    }
}

/// One month block: a header followed by week rows. Weekends are disabled.
pub struct SimulatedMonth {
    anchor: MonthAnchor,
    content_top: f32,
    first_day_of_week: Weekday,
    scroll: Arc<Mutex<f32>>,
}

impl MonthView for SimulatedMonth {
    fn anchor(&self) -> MonthAnchor {
        self.anchor
    }

    fn height(&self) -> f32 {
        HEADER_HEIGHT + week_rows(self.anchor, self.first_day_of_week) as f32 * ROW_HEIGHT
    }

    fn is_day_disabled(&self, date: CalendarDate) -> bool {
        matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
    }

    async fn scroll_top(&self, date: CalendarDate) -> Result<f32, MeasureError> {
        if !self.anchor.contains(date) {
            return Err(MeasureError::Other(format!(
                "{date} is not rendered by {}",
                self.anchor
            )));
        }
        let blanks = column(self.anchor.first_day().weekday(), self.first_day_of_week);
        let row = (blanks + usize::from(date.day()) - 1) / 7;
        let scroll = *self.scroll.lock();
        Ok(VIEWPORT_TOP + self.content_top + HEADER_HEIGHT + row as f32 * ROW_HEIGHT - scroll)
    }
}

fn column(weekday: Weekday, first_day_of_week: Weekday) -> usize {
    const ORDER: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];
    let position = |day: Weekday| ORDER.iter().position(|d| *d == day).unwrap_or(0);
    (position(weekday) + 7 - position(first_day_of_week)) % 7
}
