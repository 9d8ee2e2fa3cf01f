//! Drives the calendar core against a simulated host and logs what a renderer
//! would see.
//!
//! Run with `RUST_LOG=debug` to follow the controller's bookkeeping.
mod simulated;

use std::{error::Error, fmt::Write as _};

use pollster::block_on;
use tessera_calendar::{
    CalendarArgs, CalendarController, CalendarDate, CalendarEvent, DATE_COLUMNS,
    DayKind, MonthAnchor, RawValue, SelectionMode, Weekday,
};
use tracing::{info, warn};

use simulated::{SimulatedMonth, SimulatedViewport};

type Controller = CalendarController<SimulatedViewport, SimulatedMonth>;

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    init_deadlock_detection();

    let day = |year, month, day| CalendarDate::new(year, month, day).ok_or("invalid demo date");

    let first_day_of_week = Weekday::Monday;
    let viewport = SimulatedViewport::default();
    let controller: Controller = CalendarController::new(
        CalendarArgs::default()
            .mode(SelectionMode::Range)
            .min(day(2024, 1, 1)?)
            .max(day(2024, 6, 30)?)
            .today(day(2024, 2, 14)?)
            .first_day_of_week(first_day_of_week)
            .on_event(log_event),
        viewport.clone(),
    );

    let months = controller.month_anchors();
    controller.attach_month_views(viewport.layout(&months, first_day_of_week));
    let outcome = block_on(controller.initialize())?;
    info!(?outcome, "Initialized at scroll {}", viewport.scroll());

    controller.handle_tap(Some(day(2024, 3, 4)?));
    controller.handle_tap(Some(day(2024, 3, 9)?));
    controller.handle_tap(Some(day(2024, 3, 12)?));
    controller.handle_tap(Some(day(2024, 3, 20)?));

    for offset in [0.0, 450.0, 900.0, 1400.0] {
        let outcome = block_on(controller.handle_scroll(offset))?;
        info!(?outcome, "Scroll sample {offset}: {:?}", controller.subtitle());
    }

    let outcome = block_on(
        controller.handle_external_value_change(RawValue::Dates(vec![
            day(2024, 5, 31)?,
            day(2024, 5, 27)?,
        ])),
    )?;
    info!(?outcome, "Owner replaced the value");

    if let Some(anchor) = controller.current_month() {
        print_month(&controller, anchor);
    }
    controller.confirm();
    Ok(())
}

fn log_event(event: CalendarEvent) {
    match event {
        CalendarEvent::ValueChanged(value) => info!(?value, "Selection changed"),
        CalendarEvent::SubtitleChanged(subtitle) => info!(?subtitle, "Subtitle changed"),
        CalendarEvent::MonthsChanged(months) => info!("Month list rebuilt: {} months", months.len()),
        CalendarEvent::DisabledDayTapped(date) => warn!("{date} cannot be selected"),
        CalendarEvent::Confirm(value) => info!(?value, "Confirmed"),
    }
}

fn print_month(controller: &Controller, anchor: MonthAnchor) {
    let mut out = format!("{anchor}\n");
    for week in controller.month_cells(anchor).chunks(DATE_COLUMNS) {
        for cell in week {
            let text = match cell {
                None => "    ".to_string(),
                Some(cell) => {
                    let mark = match cell.kind {
                        DayKind::Start | DayKind::End | DayKind::StartEnd | DayKind::Selected => '*',
                        DayKind::Middle => '-',
                        DayKind::Disabled => 'x',
                        DayKind::Normal => ' ',
                    };
                    format!("{:>3}{mark}", cell.text)
                }
            };
            out.push_str(&text);
        }
        out.push('\n');
    }
    let _ = write!(out, "value: {:?}", controller.value());
    info!("\n{out}");
}

fn init_deadlock_detection() {
    #[cfg(debug_assertions)]
    {
        use std::{sync::Once, thread, time::Duration};

        static INIT: Once = Once::new();
        INIT.call_once(|| {
            thread::spawn(|| {
                loop {
                    thread::sleep(Duration::from_secs(10));
                    let deadlocks = parking_lot::deadlock::check_deadlock();
                    if deadlocks.is_empty() {
                        continue;
                    }

                    eprintln!("{} deadlocks detected", deadlocks.len());
                    for threads in &deadlocks {
                        for thread in threads {
                            eprintln!("Thread Id {:#?}", thread.thread_id());
                        }
                    }
                }
            });
        });
    }
}

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new("error,example=info,tessera_calendar=info") {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .try_init();
}
