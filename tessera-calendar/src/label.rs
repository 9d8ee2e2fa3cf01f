//! Pluggable labels for the month subtitle and the day cells.
use std::{fmt, sync::Arc};

use crate::{date::MonthAnchor, grid::DayCell};

/// Controls the subtitle shown for the month currently at the top of the list.
#[derive(Clone, Default)]
pub enum SubtitleOption {
    /// The built-in `"2024年1月"` label.
    #[default]
    Default,
    /// No subtitle.
    Hidden,
    /// A caller-provided label.
    Custom(Arc<dyn Fn(MonthAnchor) -> String + Send + Sync>),
    /// The same text for every month.
    Static(String),
}

impl SubtitleOption {
    /// Wraps a closure as a custom subtitle.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(MonthAnchor) -> String + Send + Sync + 'static,
    {
        SubtitleOption::Custom(Arc::new(f))
    }

    /// Returns the subtitle for `anchor`, or `None` when hidden.
    pub fn label(&self, anchor: MonthAnchor) -> Option<String> {
        match self {
            SubtitleOption::Default => Some(default_month_label(anchor)),
            SubtitleOption::Hidden => None,
            SubtitleOption::Custom(f) => Some(f(anchor)),
            SubtitleOption::Static(text) => Some(text.clone()),
        }
    }
}

impl fmt::Debug for SubtitleOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubtitleOption::Default => f.write_str("Default"),
            SubtitleOption::Hidden => f.write_str("Hidden"),
            SubtitleOption::Custom(_) => f.write_str("Custom(..)"),
            SubtitleOption::Static(text) => f.debug_tuple("Static").field(text).finish(),
        }
    }
}

impl From<bool> for SubtitleOption {
    fn from(show: bool) -> Self {
        if show {
            SubtitleOption::Default
        } else {
            SubtitleOption::Hidden
        }
    }
}

impl From<&str> for SubtitleOption {
    fn from(text: &str) -> Self {
        SubtitleOption::Static(text.to_string())
    }
}

impl From<String> for SubtitleOption {
    fn from(text: String) -> Self {
        SubtitleOption::Static(text)
    }
}

/// The built-in month label, e.g. `"2024年1月"`.
pub fn default_month_label(anchor: MonthAnchor) -> String {
    format!("{}年{}月", anchor.year(), anchor.month())
}

/// Transforms every day cell before it reaches the rendering layer.
pub type DayFormatter = Arc<dyn Fn(DayCell) -> DayCell + Send + Sync>;

/// The formatter that leaves cells untouched.
pub fn identity_formatter() -> DayFormatter {
    Arc::new(|cell| cell)
}
