//! Daily and weekly report buckets
//!
//! A [`Digest`] sorts the task list into six independent [`Bucket`]s for a
//! given day. Weeks are Monday-anchored. A task may land in several buckets.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{shift_days, Task};

/// Monday-to-Sunday week
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekSpan {
    /// The week containing `day`
    pub fn containing(day: NaiveDate) -> Self {
        let start = shift_days(day, -i64::from(day.weekday().num_days_from_monday()));
        Self {
            start,
            end: shift_days(start, 6),
        }
    }
}

/// Named report section
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    StartingToday,
    EndingToday,
    ActiveToday,
    StartingThisWeek,
    EndingThisWeek,
    ActiveThisWeek,
}

impl Bucket {
    /// Buckets of the daily section, in display order
    pub const DAILY: [Bucket; 3] = [Bucket::StartingToday, Bucket::EndingToday, Bucket::ActiveToday];

    /// Buckets of the weekly section, in display order
    pub const WEEKLY: [Bucket; 3] = [
        Bucket::StartingThisWeek,
        Bucket::EndingThisWeek,
        Bucket::ActiveThisWeek,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Bucket::StartingToday => "Tasks Starting Today",
            Bucket::EndingToday => "Tasks Ending Today",
            Bucket::ActiveToday => "All Tasks Active Today (Ongoing)",
            Bucket::StartingThisWeek => "Tasks Starting This Week",
            Bucket::EndingThisWeek => "Tasks Ending This Week",
            Bucket::ActiveThisWeek => "All Tasks Active This Week (Ongoing)",
        }
    }

    /// Whether `task` belongs to this bucket
    pub fn matches(&self, task: &Task, today: NaiveDate, week: &WeekSpan) -> bool {
        let finish = task.finish();
        match self {
            Bucket::StartingToday => task.start == today,
            Bucket::EndingToday => finish == today,
            Bucket::ActiveToday => task.start <= today && today <= finish,
            Bucket::StartingThisWeek => week.start <= task.start && task.start <= week.end,
            Bucket::EndingThisWeek => week.start <= finish && finish <= week.end,
            Bucket::ActiveThisWeek => task.start <= week.end && finish >= week.start,
        }
    }
}

/// Tasks of one bucket, ordered by start date
#[derive(Clone, Debug, Serialize)]
pub struct Section {
    pub bucket: Bucket,
    pub tasks: Vec<Task>,
}

impl Section {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// All report buckets for one day
#[derive(Clone, Debug, Serialize)]
pub struct Digest {
    pub today: NaiveDate,
    pub week: WeekSpan,
    sections: Vec<Section>,
}

impl Digest {
    pub fn build(tasks: &[Task], today: NaiveDate) -> Self {
        let week = WeekSpan::containing(today);
        let sections = Bucket::DAILY
            .iter()
            .chain(Bucket::WEEKLY.iter())
            .map(|&bucket| {
                let mut matching: Vec<Task> = tasks
                    .iter()
                    .filter(|t| bucket.matches(t, today, &week))
                    .cloned()
                    .collect();
                matching.sort_by_key(|t| t.start);
                Section {
                    bucket,
                    tasks: matching,
                }
            })
            .collect();

        Self {
            today,
            week,
            sections,
        }
    }

    pub fn section(&self, bucket: Bucket) -> &Section {
        // sections are built in declaration order
        &self.sections[bucket as usize]
    }

    pub fn daily(&self) -> impl Iterator<Item = &Section> {
        Bucket::DAILY.iter().map(|&b| self.section(b))
    }

    pub fn weekly(&self) -> impl Iterator<Item = &Section> {
        Bucket::WEEKLY.iter().map(|&b| self.section(b))
    }

    /// Number of distinct tasks active at some point this week
    pub fn active_this_week(&self) -> usize {
        self.section(Bucket::ActiveThisWeek).tasks.len()
    }
}
