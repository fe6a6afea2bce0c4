//! Zoom presets and date windows
//!
//! A [`Preset`] names a fixed view of the timeline. [`visible_range`] turns
//! a preset into concrete chart bounds, and [`DateRange`] filters tasks down
//! to the ones that overlap a window.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{shift_days, Task};

/// Days shown before today in the zoomed presets
pub const DAYS_BEFORE_TODAY: i64 = 1;

/// Margin before the first project month in the `All` view
pub const ALL_LEAD_DAYS: i64 = 7;

/// Margin after the project end in the `All` view
pub const ALL_TRAIL_DAYS: i64 = 15;

/// Named chart view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// One week ahead of today
    Week,
    /// Thirty days ahead of today
    Month,
    /// Ninety days ahead of today
    Quarter,
    /// The whole project with fixed margins
    #[default]
    All,
}

impl Preset {
    /// Every preset, in the order the zoom buttons are laid out
    pub const ALL: [Preset; 4] = [Preset::All, Preset::Quarter, Preset::Month, Preset::Week];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Week => "week",
            Preset::Month => "month",
            Preset::Quarter => "quarter",
            Preset::All => "all",
        }
    }

    /// Short button caption
    pub fn caption(&self) -> &'static str {
        match self {
            Preset::Week => "1W",
            Preset::Month => "1M",
            Preset::Quarter => "3M",
            Preset::All => "All",
        }
    }

    /// Days shown after today, or `None` for the whole-project view
    pub fn lookahead_days(&self) -> Option<i64> {
        match self {
            Preset::Week => Some(7),
            Preset::Month => Some(30),
            Preset::Quarter => Some(90),
            Preset::All => None,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unknown preset name
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown preset '{0}' (expected all, quarter, month or week)")]
pub struct ParsePresetError(pub String);

impl FromStr for Preset {
    type Err = ParsePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "1w" => Ok(Preset::Week),
            "month" | "1m" => Ok(Preset::Month),
            "quarter" | "3m" => Ok(Preset::Quarter),
            // "restart" resets the view to the whole project
            "all" | "restart" => Ok(Preset::All),
            _ => Err(ParsePresetError(s.to_string())),
        }
    }
}

/// Inclusive date interval
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether `[start, finish]` intersects this range
    pub fn overlaps(&self, start: NaiveDate, finish: NaiveDate) -> bool {
        start <= self.end && finish >= self.start
    }

    /// Number of days between the bounds (at least 1)
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days().max(1)
    }
}

/// Overall extent of a task set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpan {
    /// Earliest start truncated to the first of its month
    pub start_month: NaiveDate,
    /// Latest finish
    pub end: NaiveDate,
}

impl ProjectSpan {
    /// Compute the span, or `None` for an empty task set
    pub fn from_tasks(tasks: &[Task]) -> Option<Self> {
        let start = tasks.iter().map(|t| t.start).min()?;
        let end = tasks.iter().map(Task::finish).max()?;
        Some(Self {
            start_month: first_of_month(start),
            end,
        })
    }
}

/// Truncate a date to the first day of its month
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Chart bounds for a preset
pub fn visible_range(
    preset: Preset,
    today: NaiveDate,
    project_start_month: NaiveDate,
    project_end: NaiveDate,
) -> DateRange {
    match preset.lookahead_days() {
        Some(ahead) => DateRange::new(
            shift_days(today, -DAYS_BEFORE_TODAY),
            shift_days(today, ahead),
        ),
        None => DateRange::new(
            shift_days(project_start_month, -ALL_LEAD_DAYS),
            shift_days(project_end, ALL_TRAIL_DAYS),
        ),
    }
}

/// The window from today through the next `n` days
pub fn next_days(today: NaiveDate, n: u32) -> DateRange {
    DateRange::new(today, shift_days(today, i64::from(n)))
}

/// Tasks overlapping `range`, in input order
pub fn tasks_in_range<'a>(tasks: &'a [Task], range: &DateRange) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| range.overlaps(t.start, t.finish()))
        .collect()
}
