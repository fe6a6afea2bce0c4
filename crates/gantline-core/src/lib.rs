//! # gantline-core
//!
//! Core domain model for gantline milestone timelines.
//!
//! This crate provides:
//! - The `Task` type and its derived fields (finish date, progress)
//! - Zoom presets and visible-range computation (`window`)
//! - Daily/weekly report buckets (`digest`)
//! - Category colour assignment (`palette`)
//! - Chart data assembly (`timeline`)
//! - The `Renderer` trait and error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use gantline_core::Task;
//!
//! let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let task = Task::new("Kickoff", start, 10).category("Planning & Preparation");
//!
//! let today = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
//! assert_eq!(task.finish(), NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
//! assert_eq!(task.progress_on(today), 50.0);
//! ```

pub mod digest;
pub mod palette;
pub mod timeline;
pub mod window;

pub use digest::{Bucket, Digest, Section, WeekSpan};
pub use palette::ColorMap;
pub use timeline::{ChartRow, ProgressSource, Timeline};
pub use window::{DateRange, Preset, ProjectSpan};

use chrono::{Days, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category assigned to rows that carry no category label
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Name assigned to rows that carry no task description
pub const UNNAMED_TASK: &str = "Unnamed Task";

// ============================================================================
// Task
// ============================================================================

/// One milestone row of the input sheet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task description
    pub name: String,
    /// Grouping label, used for row grouping and bar colour
    pub category: String,
    /// First day of the task
    pub start: NaiveDate,
    /// Length in calendar days (0 or negative means no progress possible)
    pub duration_days: i64,
    /// Progress recorded in the sheet itself (0-100), if any
    pub sheet_progress: Option<f64>,
}

impl Task {
    /// Create a task in the default category
    pub fn new(name: impl Into<String>, start: NaiveDate, duration_days: i64) -> Self {
        Self {
            name: name.into(),
            category: UNCATEGORIZED.into(),
            start,
            duration_days,
            sheet_progress: None,
        }
    }

    /// Set the category
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the progress recorded in the sheet
    pub fn sheet_progress(mut self, pct: f64) -> Self {
        self.sheet_progress = Some(pct.clamp(0.0, 100.0));
        self
    }

    /// Last day of the task (inclusive)
    pub fn finish(&self) -> NaiveDate {
        finish_date(self.start, self.duration_days)
    }

    /// Completion percentage as of `today`
    pub fn progress_on(&self, today: NaiveDate) -> f64 {
        progress(self.start, self.duration_days, today)
    }

    /// Whether the task covers `date`
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.finish()
    }
}

/// Compute the inclusive finish date of a task.
///
/// A task of `n` days starting on day `s` occupies `s ..= s + (n - 1)`.
/// Zero and negative durations collapse to the start day, so the result is
/// never earlier than `start`.
pub fn finish_date(start: NaiveDate, duration_days: i64) -> NaiveDate {
    let span = duration_days.saturating_sub(1).max(0) as u64;
    start.checked_add_days(Days::new(span)).unwrap_or(NaiveDate::MAX)
}

/// Move `date` by `days`, saturating at the calendar bounds
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Completion percentage in `[0, 100]` for a task as of `today`.
///
/// The start day counts as day one, so a task is already partially complete
/// on its first day.
pub fn progress(start: NaiveDate, duration_days: i64, today: NaiveDate) -> f64 {
    if today < start || duration_days <= 0 {
        return 0.0;
    }
    let days_passed = (today - start).num_days() + 1;
    let ratio = (days_passed as f64 / duration_days as f64).min(1.0);
    ratio * 100.0
}

/// Round a percentage for display, ties to even
pub fn round_percent(pct: f64) -> i64 {
    pct.round_ties_even() as i64
}

/// Normalise a raw task description
pub fn normalize_name(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNNAMED_TASK.to_string(),
    }
}

/// Normalise a raw category label: newlines become spaces, edges are trimmed
pub fn normalize_category(raw: Option<&str>) -> String {
    let cleaned = raw
        .map(|s| s.replace("\r\n", " ").replace(['\n', '\r'], " "))
        .unwrap_or_default();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        cleaned.to_string()
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering for chart timelines
pub trait Renderer {
    type Output;

    /// Render a timeline to the output format
    fn render(&self, timeline: &Timeline) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn progress_midway() {
        assert_eq!(progress(date(2025, 1, 1), 10, date(2025, 1, 5)), 50.0);
    }

    #[test]
    fn progress_counts_start_day() {
        let p = progress(date(2025, 3, 1), 4, date(2025, 3, 1));
        assert_eq!(p, 25.0);
        assert!(progress(date(2025, 3, 1), 1, date(2025, 3, 1)) > 0.0);
    }

    #[test]
    fn progress_before_start_is_zero() {
        assert_eq!(progress(date(2025, 3, 10), 5, date(2025, 3, 9)), 0.0);
    }

    #[test]
    fn progress_non_positive_duration_is_zero() {
        for days in [-3, -1, 0] {
            assert_eq!(progress(date(2025, 1, 1), days, date(2025, 2, 1)), 0.0);
        }
    }

    #[test]
    fn progress_monotonic_and_capped() {
        let start = date(2025, 1, 1);
        let mut last = 0.0;
        for offset in 0..40 {
            let today = start + chrono::Duration::days(offset);
            let p = progress(start, 14, today);
            assert!(p >= last, "progress decreased at offset {}", offset);
            assert!(p <= 100.0);
            last = p;
        }
        assert_eq!(last, 100.0);
    }

    #[test]
    fn finish_is_inclusive_last_day() {
        assert_eq!(finish_date(date(2025, 1, 1), 10), date(2025, 1, 10));
        assert_eq!(finish_date(date(2025, 1, 1), 1), date(2025, 1, 1));
    }

    #[test]
    fn finish_never_before_start() {
        for days in [-5, 0, 1] {
            assert_eq!(finish_date(date(2025, 6, 9), days), date(2025, 6, 9));
        }
    }

    #[test]
    fn progress_reaches_full_on_finish_day() {
        let task = Task::new("build", date(2025, 2, 3), 5);
        assert_eq!(task.progress_on(task.finish()), 100.0);
    }

    #[test]
    fn round_percent_ties_to_even() {
        assert_eq!(round_percent(12.5), 12);
        assert_eq!(round_percent(13.5), 14);
        assert_eq!(round_percent(33.333), 33);
    }

    #[test]
    fn normalize_category_rules() {
        assert_eq!(normalize_category(None), UNCATEGORIZED);
        assert_eq!(normalize_category(Some("   ")), UNCATEGORIZED);
        assert_eq!(
            normalize_category(Some(" Planning &\nPreparation ")),
            "Planning & Preparation"
        );
    }

    #[test]
    fn normalize_name_falls_back() {
        assert_eq!(normalize_name(None), UNNAMED_TASK);
        assert_eq!(normalize_name(Some("")), UNNAMED_TASK);
        assert_eq!(normalize_name(Some(" Kickoff ")), "Kickoff");
    }

    #[test]
    fn sheet_progress_is_clamped() {
        let task = Task::new("x", date(2025, 1, 1), 3).sheet_progress(140.0);
        assert_eq!(task.sheet_progress, Some(100.0));
    }

    #[test]
    fn shift_days_saturates() {
        assert_eq!(shift_days(date(2025, 6, 10), -1), date(2025, 6, 9));
        assert_eq!(shift_days(NaiveDate::MAX, 15), NaiveDate::MAX);
        assert_eq!(shift_days(NaiveDate::MIN, -7), NaiveDate::MIN);
        assert_eq!(shift_days(date(2025, 1, 1), i64::MAX), NaiveDate::MAX);
    }

    #[test]
    fn huge_duration_finishes_at_calendar_end() {
        let task = Task::new("Forever", date(2025, 1, 1), 100_000_000);
        assert_eq!(task.finish(), NaiveDate::MAX);
        assert!(task.progress_on(date(2025, 6, 1)) < 1.0);
    }
}
