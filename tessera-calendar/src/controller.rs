//! Composition root wiring selection and scroll sync to host collaborators.
//!
//! ## Usage
//!
//! The rendering layer creates a [`CalendarController`], renders one month view
//! per entry of [`CalendarController::month_anchors`], attaches them with
//! [`CalendarController::attach_month_views`], calls
//! [`CalendarController::initialize`], and from then on forwards taps, scroll
//! samples and owner value changes. Everything the owner needs to observe is
//! delivered through the [`CalendarEvent`] callback.
//!
//! Navigation requests are numbered when they are issued. Measurements are
//! awaited without holding any lock, and a request only scrolls the viewport if
//! no newer request was issued in the meantime.
use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use derive_setters::Setters;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::{
    date::{CalendarDate, MonthAnchor, Weekday},
    error::{CalendarError, MeasureError},
    grid::{CellContext, DayCell, month_cells},
    host::{MonthView, Viewport},
    label::{DayFormatter, SubtitleOption, identity_formatter},
    month_sequence::Bounds,
    scroll_sync::{ScrollApplyPolicy, ScrollSync, SyncOutcome, navigation_offset},
    selection::{RawValue, SelectionEngine, SelectionMode, SelectionValue, TapOutcome},
};

/// Callback receiving [`CalendarEvent`]s.
pub type EventHandler = Arc<dyn Fn(CalendarEvent) + Send + Sync>;

/// Notifications for the owner and the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum CalendarEvent {
    /// A tap changed the selection.
    ValueChanged(SelectionValue),
    /// The subtitle for the current month changed.
    SubtitleChanged(Option<String>),
    /// The month list was rebuilt; month views must be attached again.
    MonthsChanged(Vec<MonthAnchor>),
    /// A disabled or out-of-bounds day was tapped.
    DisabledDayTapped(CalendarDate),
    /// The user confirmed the selection.
    Confirm(SelectionValue),
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationOutcome {
    /// The list was scrolled to this offset.
    Applied {
        /// Container scroll offset that was applied.
        offset: f32,
    },
    /// There was no date to scroll to; the current month was derived from the
    /// viewport instead.
    Synced(SyncOutcome),
    /// A newer request was issued before this one finished.
    Superseded,
    /// The target date has no month in the list.
    OutOfRange,
    /// The request needed no work.
    Skipped,
}

/// Configuration for [`CalendarController`].
#[derive(Clone, Setters)]
pub struct CalendarArgs {
    /// How taps mutate the selection.
    pub mode: SelectionMode,
    /// First selectable day.
    pub min: CalendarDate,
    /// Last selectable day.
    pub max: CalendarDate,
    /// Value used when the calendar initializes.
    #[setters(into)]
    pub default_value: RawValue,
    /// Ignore taps.
    pub readonly: bool,
    /// Subtitle shown for the current month.
    #[setters(into)]
    pub subtitle: SubtitleOption,
    /// Applied to every day cell.
    pub day_formatter: DayFormatter,
    /// First column of each week row.
    pub first_day_of_week: Weekday,
    /// Overrides the system date used for defaults and the today marker.
    #[setters(strip_option)]
    pub today: Option<CalendarDate>,
    /// How navigation offsets are pushed to the viewport.
    pub scroll_policy: ScrollApplyPolicy,
    /// Receives calendar events.
    #[setters(skip)]
    pub on_event: Option<EventHandler>,
}

impl Default for CalendarArgs {
    fn default() -> Self {
        let today = CalendarDate::today();
        Self {
            mode: SelectionMode::Single,
            min: today,
            max: six_months_after(today),
            default_value: RawValue::Absent,
            readonly: false,
            subtitle: SubtitleOption::Default,
            day_formatter: identity_formatter(),
            first_day_of_week: Weekday::Sunday,
            today: None,
            scroll_policy: ScrollApplyPolicy::Reapply,
            on_event: None,
        }
    }
}

impl CalendarArgs {
    /// Sets the event callback.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(CalendarEvent) + Send + Sync + 'static,
    {
        self.on_event = Some(Arc::new(f));
        self
    }

    /// Sets the event callback using a shared handler.
    pub fn on_event_shared(mut self, f: EventHandler) -> Self {
        self.on_event = Some(f);
        self
    }
}

fn six_months_after(date: CalendarDate) -> CalendarDate {
    let anchor = date.anchor().add_months(6);
    anchor
        .to_date(date.day())
        .unwrap_or_else(|| anchor.last_day())
}

struct NavigationRequest {
    seq: u64,
    focus: Option<CalendarDate>,
}

struct ControllerState {
    args: CalendarArgs,
    bounds: Option<Bounds>,
    months: Vec<MonthAnchor>,
    /// Latest value handed over by the owner, or echoed from a tap.
    source: RawValue,
    value: SelectionValue,
    last_published: Option<SelectionValue>,
    scroll: ScrollSync,
    subtitle: Option<String>,
    initialized: bool,
}

impl ControllerState {
    fn new(args: CalendarArgs) -> Self {
        let bounds = resolve_bounds(&args);
        let months = bounds.map(|bounds| bounds.months()).unwrap_or_default();
        Self {
            scroll: ScrollSync::new(args.scroll_policy),
            source: args.default_value.clone(),
            bounds,
            months,
            value: SelectionValue::None,
            last_published: None,
            subtitle: None,
            initialized: false,
            args,
        }
    }

    fn today(&self) -> CalendarDate {
        self.args.today.unwrap_or_else(CalendarDate::today)
    }

    fn engine(&self) -> Option<SelectionEngine> {
        self.bounds
            .map(|bounds| SelectionEngine::new(self.args.mode, bounds).readonly(self.args.readonly))
    }

    /// Re-derives the value from `source` and returns the date to scroll to.
    fn renormalize(&mut self) -> Option<CalendarDate> {
        self.value = match self.engine() {
            Some(engine) => engine.normalize(&self.source, self.today()),
            None => SelectionValue::None,
        };
        self.value.focus_date()
    }

    fn refresh_subtitle(&mut self, index: usize, events: &mut Vec<CalendarEvent>) {
        let Some(anchor) = self.months.get(index).copied() else {
            return;
        };
        let label = self.args.subtitle.label(anchor);
        if label != self.subtitle {
            self.subtitle = label.clone();
            events.push(CalendarEvent::SubtitleChanged(label));
        }
    }
}

fn resolve_bounds(args: &CalendarArgs) -> Option<Bounds> {
    match Bounds::try_new(args.min, args.max) {
        Ok(bounds) => Some(bounds),
        Err(err) => {
            warn!("{err}; the calendar renders no months");
            None
        }
    }
}

fn emit(handler: Option<&EventHandler>, events: Vec<CalendarEvent>) {
    let Some(handler) = handler else {
        return;
    };
    for event in events {
        handler(event);
    }
}

/// Drives a scrolling month-list calendar.
pub struct CalendarController<V, M> {
    viewport: V,
    views: RwLock<Vec<Arc<M>>>,
    state: Mutex<ControllerState>,
    navigation_seq: AtomicU64,
}

impl<V, M> CalendarController<V, M>
where
    V: Viewport,
    M: MonthView,
{
    /// Creates a controller and derives the month list from `args`.
    pub fn new(args: CalendarArgs, viewport: V) -> Self {
        let state = ControllerState::new(args);
        debug!(
            "Calendar created with {} months ({:?} mode)",
            state.months.len(),
            state.args.mode
        );
        Self {
            viewport,
            views: RwLock::new(Vec::new()),
            state: Mutex::new(state),
            navigation_seq: AtomicU64::new(0),
        }
    }

    /// Returns the viewport collaborator.
    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    /// Months the rendering layer must render, in list order.
    pub fn month_anchors(&self) -> Vec<MonthAnchor> {
        self.state.lock().months.clone()
    }

    /// Replaces the mounted month views. They must follow
    /// [`month_anchors`](Self::month_anchors) order.
    pub fn attach_month_views(&self, views: Vec<M>) {
        debug!("Attaching {} month views", views.len());
        *self.views.write() = views.into_iter().map(Arc::new).collect();
    }

    /// Returns the current selection.
    pub fn value(&self) -> SelectionValue {
        self.state.lock().value.clone()
    }

    /// Returns the subtitle of the current month.
    pub fn subtitle(&self) -> Option<String> {
        self.state.lock().subtitle.clone()
    }

    /// Returns the month at the top of the visible band.
    pub fn current_month(&self) -> Option<MonthAnchor> {
        let state = self.state.lock();
        state
            .scroll
            .current_index()
            .and_then(|index| state.months.get(index).copied())
    }

    /// Returns the selectable bounds, or `None` when they are inverted.
    pub fn bounds(&self) -> Option<Bounds> {
        self.state.lock().bounds
    }

    /// Normalizes the default value and scrolls to it, or derives the current
    /// month from the viewport when there is nothing to scroll to.
    ///
    /// Only the first call does any work.
    pub fn initialize(
        &self,
    ) -> impl Future<Output = Result<NavigationOutcome, CalendarError>> + '_ {
        let request = {
            let mut state = self.state.lock();
            if state.initialized {
                None
            } else {
                state.initialized = true;
                let focus = state.renormalize();
                debug!(value = ?state.value, "Calendar initialized");
                Some(self.begin_navigation(focus))
            }
        };
        self.run(request)
    }

    /// Applies a tap on a day cell; `None` stands for a filler cell.
    pub fn handle_tap(&self, day: Option<CalendarDate>) -> TapOutcome {
        let (outcome, events, handler) = {
            let mut state = self.state.lock();
            let Some(engine) = state.engine() else {
                return TapOutcome::Unchanged;
            };
            if state.args.readonly {
                return TapOutcome::Unchanged;
            }
            let handler = state.args.on_event.clone();
            let views = self.views.read();
            let disabled = |date: CalendarDate| views_disable(views.as_slice(), date);

            let mut events = Vec::new();
            if let Some(date) = day
                && (!engine.bounds().contains(date) || disabled(date))
            {
                debug!("Ignoring tap on disabled day {date}");
                events.push(CalendarEvent::DisabledDayTapped(date));
                (TapOutcome::Unchanged, events, handler)
            } else {
                let outcome = engine.apply_tap(&state.value, day, &disabled);
                if let TapOutcome::Changed(value) = &outcome {
                    debug!(?value, "Selection changed by tap");
                    state.value = value.clone();
                    state.source = RawValue::from(value);
                    state.last_published = Some(value.clone());
                    events.push(CalendarEvent::ValueChanged(value.clone()));
                }
                (outcome, events, handler)
            }
        };
        emit(handler.as_ref(), events);
        outcome
    }

    /// Derives the current month from a scroll sample.
    ///
    /// A sample still measuring when a newer navigation is issued resolves to
    /// [`SyncOutcome::Stale`] and leaves the current month alone.
    pub async fn handle_scroll(&self, offset: f32) -> Result<SyncOutcome, CalendarError> {
        let seq = self.navigation_seq.load(Ordering::Acquire);
        let rect = match self.viewport.bounding_rect().await {
            Ok(rect) => rect,
            Err(err) => {
                warn!("Scroll sync at {offset} abandoned: {err}");
                return Err(err.into());
            }
        };

        let (outcome, events, handler) = {
            let mut state = self.state.lock();
            if !self.is_latest(seq) {
                trace!("Dropping scroll sample at {offset} taken before a newer navigation");
                return Ok(SyncOutcome::Stale);
            }
            let heights = self.month_heights();
            let outcome = state.scroll.sync(offset, rect.height, &heights);
            let mut events = Vec::new();
            if let SyncOutcome::Changed(index) = outcome {
                trace!("Current month moved to index {index}");
                state.refresh_subtitle(index, &mut events);
            }
            (outcome, events, state.args.on_event.clone())
        };
        emit(handler.as_ref(), events);
        Ok(outcome)
    }

    /// Accepts a value from the owner.
    ///
    /// A value equal to the one last published by a tap is the owner echoing
    /// it back and is ignored; anything else replaces the selection and
    /// scrolls to it.
    pub fn handle_external_value_change(
        &self,
        raw: RawValue,
    ) -> impl Future<Output = Result<NavigationOutcome, CalendarError>> + '_ {
        let request = {
            let mut state = self.state.lock();
            let echoed = state
                .last_published
                .as_ref()
                .is_some_and(|published| RawValue::from(published) == raw);
            if echoed {
                trace!("Owner echoed the published value");
                None
            } else {
                state.source = raw;
                state.last_published = None;
                let focus = state.renormalize();
                debug!(value = ?state.value, "Selection replaced by owner");
                Some(self.begin_navigation(focus))
            }
        };
        self.run(request)
    }

    /// Applies new configuration.
    ///
    /// New bounds rebuild the month list, detach the month views and emit
    /// [`CalendarEvent::MonthsChanged`]; new bounds or a new mode re-derive the
    /// selection and scroll to it. Attach the new views before awaiting the
    /// returned future.
    pub fn update_args(
        &self,
        args: CalendarArgs,
    ) -> impl Future<Output = Result<NavigationOutcome, CalendarError>> + '_ {
        let (request, events, handler) = {
            let mut state = self.state.lock();
            let bounds_changed = (state.args.min, state.args.max) != (args.min, args.max);
            let mode_changed = state.args.mode != args.mode;
            state.scroll.set_policy(args.scroll_policy);
            state.args = args;

            let mut events = Vec::new();
            if bounds_changed {
                state.bounds = resolve_bounds(&state.args);
                state.months = state
                    .bounds
                    .map(|bounds| bounds.months())
                    .unwrap_or_default();
                state.scroll.reset();
                self.views.write().clear();
                debug!("Month list rebuilt with {} months", state.months.len());
                events.push(CalendarEvent::MonthsChanged(state.months.clone()));
            }

            let request = if state.initialized && (bounds_changed || mode_changed) {
                if mode_changed {
                    state.source = state.args.default_value.clone();
                }
                let focus = state.renormalize();
                Some(self.begin_navigation(focus))
            } else {
                if let Some(index) = state.scroll.current_index() {
                    state.refresh_subtitle(index, &mut events);
                }
                None
            };
            (request, events, state.args.on_event.clone())
        };
        emit(handler.as_ref(), events);
        self.run(request)
    }

    /// Scrolls the list so that `date` comes into view.
    pub fn scroll_to_date(
        &self,
        date: CalendarDate,
    ) -> impl Future<Output = Result<NavigationOutcome, CalendarError>> + '_ {
        let request = self.begin_navigation(Some(date));
        self.run(Some(request))
    }

    /// Forwards the user's confirmation with the current selection.
    pub fn confirm(&self) {
        let (value, handler) = {
            let state = self.state.lock();
            (state.value.clone(), state.args.on_event.clone())
        };
        emit(handler.as_ref(), vec![CalendarEvent::Confirm(value)]);
    }

    /// Day cells for `anchor`, classified against the current selection.
    pub fn month_cells(&self, anchor: MonthAnchor) -> Vec<Option<DayCell>> {
        let state = self.state.lock();
        let Some(bounds) = state.bounds else {
            return Vec::new();
        };
        let views = self.views.read();
        let disabled = |date: CalendarDate| views_disable(views.as_slice(), date);
        let ctx = CellContext {
            bounds,
            value: &state.value,
            disabled: &disabled,
            today: state.today(),
            first_day_of_week: state.args.first_day_of_week,
            formatter: &state.args.day_formatter,
        };
        month_cells(anchor, &ctx)
    }

    fn begin_navigation(&self, focus: Option<CalendarDate>) -> NavigationRequest {
        let seq = self.navigation_seq.fetch_add(1, Ordering::AcqRel) + 1;
        NavigationRequest { seq, focus }
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.navigation_seq.load(Ordering::Acquire) == seq
    }

    fn month_heights(&self) -> Vec<f32> {
        self.views.read().iter().map(|view| view.height()).collect()
    }

    async fn run(
        &self,
        request: Option<NavigationRequest>,
    ) -> Result<NavigationOutcome, CalendarError> {
        match request {
            None => Ok(NavigationOutcome::Skipped),
            Some(NavigationRequest {
                seq,
                focus: Some(date),
            }) => self.navigate(seq, date).await,
            Some(NavigationRequest { seq, focus: None }) => self.sync_from_viewport(seq).await,
        }
    }

    async fn navigate(
        &self,
        seq: u64,
        date: CalendarDate,
    ) -> Result<NavigationOutcome, CalendarError> {
        let view = {
            let state = self.state.lock();
            let Some(anchor) = state
                .months
                .iter()
                .copied()
                .find(|anchor| anchor.contains(date))
            else {
                debug!("Navigation target {date} has no month in the list");
                return Ok(NavigationOutcome::OutOfRange);
            };
            self.views
                .read()
                .iter()
                .find(|view| view.anchor() == anchor)
                .cloned()
                .ok_or(CalendarError::MonthNotMounted(anchor))?
        };

        let measured = async {
            let rect = self.viewport.bounding_rect().await?;
            let current = self.viewport.scroll_top().await?;
            let item_top = view.scroll_top(date).await?;
            Ok::<_, MeasureError>((rect, current, item_top))
        }
        .await;
        let (rect, current, item_top) = match measured {
            Ok(measured) => measured,
            Err(_) if !self.is_latest(seq) => return Ok(NavigationOutcome::Superseded),
            Err(err) => {
                warn!("Navigation to {date} abandoned: {err}");
                return Err(err.into());
            }
        };

        let (plan, offset, events, handler) = {
            let mut state = self.state.lock();
            if !self.is_latest(seq) {
                trace!(seq, "Dropping superseded navigation to {date}");
                return Ok(NavigationOutcome::Superseded);
            }
            let offset = navigation_offset(item_top, rect.top, current);
            let plan = state.scroll.plan_application(offset);
            let heights = self.month_heights();
            let mut events = Vec::new();
            if let SyncOutcome::Changed(index) = state.scroll.sync(offset, rect.height, &heights) {
                state.refresh_subtitle(index, &mut events);
            }
            (plan, offset, events, state.args.on_event.clone())
        };

        for step in plan {
            self.viewport.set_scroll_top(step);
        }
        debug!("Scrolled to {date} at offset {offset}");
        emit(handler.as_ref(), events);
        Ok(NavigationOutcome::Applied { offset })
    }

    async fn sync_from_viewport(&self, seq: u64) -> Result<NavigationOutcome, CalendarError> {
        let measured = async {
            let rect = self.viewport.bounding_rect().await?;
            let current = self.viewport.scroll_top().await?;
            Ok::<_, MeasureError>((rect, current))
        }
        .await;
        let (rect, current) = match measured {
            Ok(measured) => measured,
            Err(_) if !self.is_latest(seq) => return Ok(NavigationOutcome::Superseded),
            Err(err) => {
                warn!("Viewport sync abandoned: {err}");
                return Err(err.into());
            }
        };

        let (outcome, events, handler) = {
            let mut state = self.state.lock();
            if !self.is_latest(seq) {
                trace!(seq, "Dropping superseded viewport sync");
                return Ok(NavigationOutcome::Superseded);
            }
            let heights = self.month_heights();
            let outcome = state.scroll.sync(current, rect.height, &heights);
            let mut events = Vec::new();
            if let SyncOutcome::Changed(index) = outcome {
                state.refresh_subtitle(index, &mut events);
            }
            (outcome, events, state.args.on_event.clone())
        };
        emit(handler.as_ref(), events);
        Ok(NavigationOutcome::Synced(outcome))
    }
}

fn views_disable<M: MonthView>(views: &[Arc<M>], date: CalendarDate) -> bool {
    views
        .iter()
        .find(|view| view.anchor().contains(date))
        .is_some_and(|view| view.is_day_disabled(date))
}

#[cfg(test)]
mod tests {
    use std::{
        future::poll_fn,
        pin::pin,
        sync::atomic::AtomicBool,
        task::{Context, Poll, Waker},
    };

    use pollster::block_on;

    use super::*;
    use crate::{date::date, grid::DayKind, host::ViewportRect, selection::DateRange};

    const VIEWPORT_TOP: f32 = 40.0;
    const VIEWPORT_HEIGHT: f32 = 400.0;
    const MONTH_HEIGHT: f32 = 300.0;
    const ROW_HEIGHT: f32 = 40.0;

    #[derive(Default)]
    struct Screen {
        scroll: Mutex<f32>,
        applied: Mutex<Vec<f32>>,
        failing: AtomicBool,
        hold_next_rect: AtomicBool,
        rect_released: AtomicBool,
    }

    #[derive(Clone, Default)]
    struct FakeViewport {
        screen: Arc<Screen>,
    }

    impl Viewport for FakeViewport {
        async fn scroll_top(&self) -> Result<f32, MeasureError> {
            Ok(*self.screen.scroll.lock())
        }

        async fn bounding_rect(&self) -> Result<ViewportRect, MeasureError> {
            if self.screen.failing.load(Ordering::SeqCst) {
                return Err(MeasureError::TimedOut);
            }
            if self.screen.hold_next_rect.swap(false, Ordering::SeqCst) {
                poll_fn(|_| {
                    if self.screen.rect_released.load(Ordering::SeqCst) {
                        Poll::Ready(())
                    } else {
                        Poll::Pending
                    }
                })
                .await;
            }
            Ok(ViewportRect {
                top: VIEWPORT_TOP,
                height: VIEWPORT_HEIGHT,
            })
        }

        fn set_scroll_top(&self, offset: f32) {
            *self.screen.scroll.lock() = offset;
            self.screen.applied.lock().push(offset);
        }
    }

    struct FakeMonth {
        anchor: MonthAnchor,
        content_top: f32,
        disabled: Vec<CalendarDate>,
        screen: Arc<Screen>,
    }

    impl MonthView for FakeMonth {
        fn anchor(&self) -> MonthAnchor {
            self.anchor
        }

        fn height(&self) -> f32 {
            MONTH_HEIGHT
        }

        fn is_day_disabled(&self, date: CalendarDate) -> bool {
            self.disabled.contains(&date)
        }

        async fn scroll_top(&self, date: CalendarDate) -> Result<f32, MeasureError> {
            let row = ((date.day() - 1) / 7) as f32;
            let scroll = *self.screen.scroll.lock();
            Ok(VIEWPORT_TOP + self.content_top + row * ROW_HEIGHT - scroll)
        }
    }

    type Controller = CalendarController<FakeViewport, FakeMonth>;

    struct Harness {
        controller: Controller,
        screen: Arc<Screen>,
        events: Arc<Mutex<Vec<CalendarEvent>>>,
        handler: EventHandler,
    }

    impl Harness {
        fn new(args: CalendarArgs) -> Self {
            Self::with_disabled(args, Vec::new())
        }

        fn with_disabled(args: CalendarArgs, disabled: Vec<CalendarDate>) -> Self {
            let events = Arc::new(Mutex::new(Vec::new()));
            let sink = events.clone();
            let handler: EventHandler = Arc::new(move |event: CalendarEvent| sink.lock().push(event));
            let args = args.on_event_shared(handler.clone());
            let viewport = FakeViewport::default();
            let screen = viewport.screen.clone();
            let harness = Self {
                controller: CalendarController::new(args, viewport),
                screen,
                events,
                handler,
            };
            harness.mount(&disabled);
            harness
        }

        fn mount(&self, disabled: &[CalendarDate]) {
            let views = self
                .controller
                .month_anchors()
                .into_iter()
                .enumerate()
                .map(|(index, anchor)| FakeMonth {
                    anchor,
                    content_top: index as f32 * MONTH_HEIGHT,
                    disabled: disabled
                        .iter()
                        .copied()
                        .filter(|day| anchor.contains(*day))
                        .collect(),
                    screen: self.screen.clone(),
                })
                .collect();
            self.controller.attach_month_views(views);
        }

        fn applied(&self) -> Vec<f32> {
            self.screen.applied.lock().clone()
        }

        fn take_events(&self) -> Vec<CalendarEvent> {
            std::mem::take(&mut *self.events.lock())
        }
    }

    fn q1_args() -> CalendarArgs {
        CalendarArgs::default()
            .min(date(2024, 1, 1))
            .max(date(2024, 3, 31))
            .today(date(2024, 2, 14))
    }

    #[test]
    fn initialize_scrolls_to_normalized_value() {
        let harness = Harness::new(q1_args());
        let outcome = block_on(harness.controller.initialize());

        assert_eq!(outcome, Ok(NavigationOutcome::Applied { offset: 340.0 }));
        assert_eq!(
            harness.controller.value(),
            SelectionValue::Single(date(2024, 2, 14))
        );
        assert_eq!(harness.applied(), vec![340.0]);
        assert_eq!(harness.controller.subtitle().as_deref(), Some("2024年2月"));
        assert_eq!(
            harness.controller.current_month(),
            MonthAnchor::new(2024, 2)
        );
        assert_eq!(
            harness.take_events(),
            vec![CalendarEvent::SubtitleChanged(Some("2024年2月".to_string()))]
        );

        assert_eq!(
            block_on(harness.controller.initialize()),
            Ok(NavigationOutcome::Skipped)
        );
        assert_eq!(harness.applied(), vec![340.0]);
    }

    #[test]
    fn cleared_value_falls_back_to_viewport_sync() {
        let harness = Harness::new(q1_args().default_value(RawValue::Cleared));
        let outcome = block_on(harness.controller.initialize());
        assert_eq!(
            outcome,
            Ok(NavigationOutcome::Synced(SyncOutcome::Changed(0)))
        );
        assert_eq!(harness.controller.value(), SelectionValue::None);
        assert_eq!(harness.controller.subtitle().as_deref(), Some("2024年1月"));
        assert!(harness.applied().is_empty());
    }

    #[test]
    fn range_taps_stop_before_disabled_day() {
        let harness = Harness::with_disabled(
            q1_args()
                .mode(SelectionMode::Range)
                .default_value(RawValue::Cleared),
            vec![date(2024, 1, 15)],
        );
        block_on(harness.controller.initialize()).unwrap();
        harness.take_events();

        let started = SelectionValue::Range(DateRange::started(date(2024, 1, 10)));
        assert_eq!(
            harness.controller.handle_tap(Some(date(2024, 1, 10))),
            TapOutcome::Changed(started.clone())
        );
        let completed =
            SelectionValue::Range(DateRange::between(date(2024, 1, 10), date(2024, 1, 14)));
        assert_eq!(
            harness.controller.handle_tap(Some(date(2024, 1, 20))),
            TapOutcome::Changed(completed.clone())
        );
        assert_eq!(
            harness.take_events(),
            vec![
                CalendarEvent::ValueChanged(started),
                CalendarEvent::ValueChanged(completed),
            ]
        );
    }

    #[test]
    fn disabled_filler_and_readonly_taps_do_nothing() {
        let harness = Harness::with_disabled(q1_args(), vec![date(2024, 2, 2)]);
        block_on(harness.controller.initialize()).unwrap();
        harness.take_events();

        assert_eq!(
            harness.controller.handle_tap(Some(date(2024, 2, 2))),
            TapOutcome::Unchanged
        );
        assert_eq!(
            harness.take_events(),
            vec![CalendarEvent::DisabledDayTapped(date(2024, 2, 2))]
        );
        assert_eq!(harness.controller.handle_tap(None), TapOutcome::Unchanged);
        assert_eq!(
            harness.controller.handle_tap(Some(date(2024, 4, 1))),
            TapOutcome::Unchanged
        );

        let readonly = Harness::new(q1_args().readonly(true));
        block_on(readonly.controller.initialize()).unwrap();
        assert_eq!(
            readonly.controller.handle_tap(Some(date(2024, 2, 20))),
            TapOutcome::Unchanged
        );
    }

    #[test]
    fn echoed_value_does_not_navigate_again() {
        let harness = Harness::new(q1_args().mode(SelectionMode::Multiple));
        block_on(harness.controller.initialize()).unwrap();
        assert_eq!(harness.applied(), vec![340.0]);

        let TapOutcome::Changed(published) = harness.controller.handle_tap(Some(date(2024, 3, 5)))
        else {
            panic!("tap should change the selection");
        };
        assert_eq!(
            published,
            SelectionValue::Multiple(vec![date(2024, 2, 14), date(2024, 3, 5)])
        );

        let echo = block_on(
            harness
                .controller
                .handle_external_value_change(RawValue::from(&published)),
        );
        assert_eq!(echo, Ok(NavigationOutcome::Skipped));
        assert_eq!(harness.applied(), vec![340.0]);

        let replaced = block_on(
            harness
                .controller
                .handle_external_value_change(RawValue::Dates(vec![date(2024, 3, 5)])),
        );
        assert_eq!(replaced, Ok(NavigationOutcome::Applied { offset: 600.0 }));
        assert_eq!(
            harness.controller.value(),
            SelectionValue::Multiple(vec![date(2024, 3, 5)])
        );
        assert_eq!(harness.applied(), vec![340.0, 340.0, 600.0]);
        assert_eq!(harness.controller.subtitle().as_deref(), Some("2024年3月"));
    }

    #[test]
    fn superseded_navigation_is_discarded() {
        let harness = Harness::new(q1_args());
        let first = harness.controller.scroll_to_date(date(2024, 1, 10));
        let second = harness.controller.scroll_to_date(date(2024, 3, 5));

        assert_eq!(
            block_on(second),
            Ok(NavigationOutcome::Applied { offset: 600.0 })
        );
        assert_eq!(block_on(first), Ok(NavigationOutcome::Superseded));
        assert_eq!(harness.applied(), vec![600.0]);
        assert_eq!(harness.controller.current_month(), MonthAnchor::new(2024, 3));
    }

    #[test]
    fn navigation_outside_months_is_reported() {
        let harness = Harness::new(q1_args());
        assert_eq!(
            block_on(harness.controller.scroll_to_date(date(2024, 7, 1))),
            Ok(NavigationOutcome::OutOfRange)
        );
    }

    #[test]
    fn measurement_failure_abandons_navigation() {
        let harness = Harness::new(q1_args());
        harness.screen.failing.store(true, Ordering::SeqCst);
        assert_eq!(
            block_on(harness.controller.initialize()),
            Err(CalendarError::Measurement(MeasureError::TimedOut))
        );
        assert!(harness.applied().is_empty());
        assert_eq!(harness.controller.subtitle(), None);
        assert_eq!(
            block_on(harness.controller.handle_scroll(10.0)),
            Err(CalendarError::Measurement(MeasureError::TimedOut))
        );
    }

    #[test]
    fn scroll_publishes_subtitle_only_on_month_change() {
        let harness = Harness::new(q1_args());
        block_on(harness.controller.initialize()).unwrap();
        harness.take_events();

        assert_eq!(
            block_on(harness.controller.handle_scroll(400.0)),
            Ok(SyncOutcome::Unchanged(1))
        );
        assert!(harness.take_events().is_empty());

        assert_eq!(
            block_on(harness.controller.handle_scroll(10.0)),
            Ok(SyncOutcome::Changed(0))
        );
        assert_eq!(
            harness.take_events(),
            vec![CalendarEvent::SubtitleChanged(Some("2024年1月".to_string()))]
        );
    }

    #[test]
    fn scroll_sample_older_than_navigation_is_dropped() {
        let harness = Harness::new(q1_args());
        harness.screen.hold_next_rect.store(true, Ordering::SeqCst);

        let mut cx = Context::from_waker(Waker::noop());
        let mut scroll = pin!(harness.controller.handle_scroll(10.0));
        assert!(scroll.as_mut().poll(&mut cx).is_pending());

        assert_eq!(
            block_on(harness.controller.scroll_to_date(date(2024, 3, 5))),
            Ok(NavigationOutcome::Applied { offset: 600.0 })
        );
        assert_eq!(harness.controller.current_month(), MonthAnchor::new(2024, 3));

        harness.screen.rect_released.store(true, Ordering::SeqCst);
        assert_eq!(
            scroll.as_mut().poll(&mut cx),
            Poll::Ready(Ok(SyncOutcome::Stale))
        );
        assert_eq!(harness.controller.current_month(), MonthAnchor::new(2024, 3));
        assert_eq!(harness.controller.subtitle().as_deref(), Some("2024年3月"));

        assert_eq!(
            block_on(harness.controller.handle_scroll(10.0)),
            Ok(SyncOutcome::Changed(0))
        );
    }

    #[test]
    fn mode_change_rederives_from_default_value() {
        let harness = Harness::new(q1_args());
        block_on(harness.controller.initialize()).unwrap();
        harness.controller.handle_tap(Some(date(2024, 2, 20)));
        assert_eq!(
            harness.controller.value(),
            SelectionValue::Single(date(2024, 2, 20))
        );
        harness.take_events();

        let outcome = block_on(
            harness.controller.update_args(
                q1_args()
                    .mode(SelectionMode::Range)
                    .on_event_shared(harness.handler.clone()),
            ),
        );
        assert_eq!(outcome, Ok(NavigationOutcome::Applied { offset: 340.0 }));
        assert_eq!(
            harness.controller.value(),
            SelectionValue::Range(DateRange::between(date(2024, 2, 14), date(2024, 2, 14)))
        );
        assert_eq!(harness.applied(), vec![340.0, 340.0]);
        assert!(harness.take_events().is_empty());
    }

    #[test]
    fn display_only_changes_do_not_navigate() {
        let harness = Harness::new(q1_args());
        block_on(harness.controller.initialize()).unwrap();
        harness.take_events();

        let outcome = block_on(
            harness.controller.update_args(
                q1_args()
                    .subtitle("Pick a day")
                    .on_event_shared(harness.handler.clone()),
            ),
        );
        assert_eq!(outcome, Ok(NavigationOutcome::Skipped));
        assert_eq!(
            harness.take_events(),
            vec![CalendarEvent::SubtitleChanged(Some("Pick a day".to_string()))]
        );

        let outcome = block_on(
            harness.controller.update_args(
                q1_args()
                    .subtitle("Pick a day")
                    .readonly(true)
                    .on_event_shared(harness.handler.clone()),
            ),
        );
        assert_eq!(outcome, Ok(NavigationOutcome::Skipped));
        assert!(harness.take_events().is_empty());
        assert_eq!(harness.applied(), vec![340.0]);
        assert_eq!(
            harness.controller.handle_tap(Some(date(2024, 2, 20))),
            TapOutcome::Unchanged
        );
        assert_eq!(
            harness.controller.value(),
            SelectionValue::Single(date(2024, 2, 14))
        );
    }

    #[test]
    fn new_bounds_rebuild_months_and_renavigate() {
        let harness = Harness::new(q1_args());
        block_on(harness.controller.initialize()).unwrap();
        harness.take_events();

        let navigation = harness
            .controller
            .update_args(
                q1_args()
                    .min(date(2024, 2, 1))
                    .max(date(2024, 5, 31))
                    .on_event_shared(harness.handler.clone()),
            );
        let months = harness.controller.month_anchors();
        assert_eq!(months.first().copied(), MonthAnchor::new(2024, 2));
        assert_eq!(months.len(), 4);
        harness.mount(&[]);

        assert_eq!(
            block_on(navigation),
            Ok(NavigationOutcome::Applied { offset: 40.0 })
        );
        assert_eq!(harness.applied(), vec![340.0, 340.0, 40.0]);
        assert_eq!(harness.controller.current_month(), MonthAnchor::new(2024, 2));
        // February stays the current month, so the subtitle is not re-published.
        assert_eq!(
            harness.take_events(),
            vec![CalendarEvent::MonthsChanged(months)]
        );
    }

    #[test]
    fn inverted_bounds_render_nothing() {
        let harness = Harness::new(q1_args().min(date(2024, 4, 1)));
        assert!(harness.controller.month_anchors().is_empty());
        assert_eq!(harness.controller.bounds(), None);
        assert_eq!(
            block_on(harness.controller.initialize()),
            Ok(NavigationOutcome::Synced(SyncOutcome::NoMatch))
        );
        assert_eq!(harness.controller.value(), SelectionValue::None);
        assert_eq!(
            harness.controller.handle_tap(Some(date(2024, 4, 1))),
            TapOutcome::Unchanged
        );
        assert!(
            harness
                .controller
                .month_cells(MonthAnchor::new(2024, 4).unwrap())
                .is_empty()
        );
    }

    #[test]
    fn cells_and_confirm_reflect_selection() {
        let harness = Harness::new(q1_args().subtitle(false));
        block_on(harness.controller.initialize()).unwrap();
        assert_eq!(harness.controller.subtitle(), None);

        let cells = harness
            .controller
            .month_cells(MonthAnchor::new(2024, 2).unwrap());
        let selected: Vec<_> = cells
            .iter()
            .flatten()
            .filter(|cell| cell.kind == DayKind::Selected)
            .map(|cell| cell.date)
            .collect();
        assert_eq!(selected, vec![date(2024, 2, 14)]);

        harness.take_events();
        harness.controller.confirm();
        assert_eq!(
            harness.take_events(),
            vec![CalendarEvent::Confirm(SelectionValue::Single(date(
                2024, 2, 14
            )))]
        );
    }
}
