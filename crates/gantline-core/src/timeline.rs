//! Chart data assembly
//!
//! A [`Timeline`] is everything a chart renderer needs: one row per task
//! with derived finish date and progress, the visible range for the
//! selected preset, today's date, and the category colours.

use chrono::NaiveDate;
use serde::Serialize;

use crate::window::{visible_range, DateRange, Preset, ProjectSpan};
use crate::{round_percent, ColorMap, RenderError, Task};

/// Where a chart row takes its progress from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressSource {
    /// Always compute progress from today's date
    #[default]
    Derived,
    /// Prefer the sheet's own progress value, deriving it when absent
    Sheet,
}

/// One bar of the chart
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartRow {
    pub name: String,
    pub category: String,
    pub start: NaiveDate,
    pub finish: NaiveDate,
    pub progress: f64,
    /// Task name annotated with its rounded progress, e.g. `Design (40%)`
    pub label: String,
}

impl ChartRow {
    fn from_task(task: &Task, today: NaiveDate, source: ProgressSource) -> Self {
        let progress = match (source, task.sheet_progress) {
            (ProgressSource::Sheet, Some(pct)) => pct,
            _ => task.progress_on(today),
        };
        Self {
            name: task.name.clone(),
            category: task.category.clone(),
            start: task.start,
            finish: task.finish(),
            progress,
            label: format!("{} ({}%)", task.name, round_percent(progress)),
        }
    }
}

/// Chart-ready view of a task set
#[derive(Clone, Debug, Serialize)]
pub struct Timeline {
    pub today: NaiveDate,
    pub preset: Preset,
    pub span: ProjectSpan,
    pub range: DateRange,
    pub rows: Vec<ChartRow>,
    pub colors: ColorMap,
}

impl Timeline {
    /// Build the chart data for `tasks` as seen on `today`.
    ///
    /// Rows are grouped by category in order of first appearance, and by
    /// start date within a category.
    pub fn build(
        tasks: &[Task],
        today: NaiveDate,
        preset: Preset,
        source: ProgressSource,
        mut colors: ColorMap,
    ) -> Result<Self, RenderError> {
        let span = ProjectSpan::from_tasks(tasks)
            .ok_or_else(|| RenderError::InvalidData("No tasks to chart".into()))?;
        let range = visible_range(preset, today, span.start_month, span.end);

        let categories = categories_in_order(tasks);
        colors.assign(categories.iter().copied());

        let mut rows: Vec<ChartRow> = tasks
            .iter()
            .map(|t| ChartRow::from_task(t, today, source))
            .collect();
        rows.sort_by_key(|r| {
            let group = categories
                .iter()
                .position(|c| *c == r.category)
                .unwrap_or(categories.len());
            (group, r.start)
        });

        Ok(Self {
            today,
            preset,
            span,
            range,
            rows,
            colors,
        })
    }

    /// Rows whose bars intersect the visible range
    pub fn visible_rows(&self) -> impl Iterator<Item = &ChartRow> {
        self.rows
            .iter()
            .filter(|r| self.range.overlaps(r.start, r.finish))
    }

    /// Whether the today marker falls inside the visible range
    pub fn today_visible(&self) -> bool {
        self.range.contains(self.today)
    }

    /// Distinct categories in row order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.category.as_str()) {
                seen.push(&row.category);
            }
        }
        seen
    }
}

fn categories_in_order(tasks: &[Task]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for task in tasks {
        if !seen.contains(&task.category.as_str()) {
            seen.push(&task.category);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::new("Write report", date(2025, 1, 20), 5).category("Documentation"),
            Task::new("Kickoff", date(2025, 1, 1), 10).category("Planning & Preparation"),
            Task::new("Manual", date(2025, 1, 6), 4).category("Documentation"),
            Task::new("Procure", date(2025, 2, 1), 3).category("Site Visits"),
        ]
    }

    #[test]
    fn rows_grouped_by_category_then_start() {
        let timeline = Timeline::build(
            &sample_tasks(),
            date(2025, 1, 5),
            Preset::All,
            ProgressSource::Derived,
            ColorMap::default(),
        )
        .unwrap();

        let names: Vec<_> = timeline.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Manual", "Write report", "Kickoff", "Procure"]);
        assert_eq!(
            timeline.categories(),
            vec!["Documentation", "Planning & Preparation", "Site Visits"]
        );
    }

    #[test]
    fn labels_carry_rounded_progress() {
        let timeline = Timeline::build(
            &sample_tasks(),
            date(2025, 1, 5),
            Preset::All,
            ProgressSource::Derived,
            ColorMap::default(),
        )
        .unwrap();
        let kickoff = timeline.rows.iter().find(|r| r.name == "Kickoff").unwrap();
        assert_eq!(kickoff.label, "Kickoff (50%)");
        assert_eq!(kickoff.finish, date(2025, 1, 10));
        let procure = timeline.rows.iter().find(|r| r.name == "Procure").unwrap();
        assert_eq!(procure.label, "Procure (0%)");
    }

    #[test]
    fn sheet_progress_preferred_when_requested() {
        let tasks = vec![
            Task::new("A", date(2025, 1, 1), 10).sheet_progress(80.0),
            Task::new("B", date(2025, 1, 1), 10),
        ];
        let timeline = Timeline::build(
            &tasks,
            date(2025, 1, 5),
            Preset::All,
            ProgressSource::Sheet,
            ColorMap::default(),
        )
        .unwrap();
        assert_eq!(timeline.rows[0].progress, 80.0);
        assert_eq!(timeline.rows[1].progress, 50.0);
    }

    #[test]
    fn range_follows_preset_and_span() {
        let tasks = sample_tasks();
        let all = Timeline::build(&tasks, date(2025, 1, 5), Preset::All, ProgressSource::Derived, ColorMap::default()).unwrap();
        assert_eq!(all.range, DateRange::new(date(2024, 12, 25), date(2025, 2, 18)));
        assert!(all.today_visible());

        let week = Timeline::build(&tasks, date(2025, 1, 5), Preset::Week, ProgressSource::Derived, ColorMap::default()).unwrap();
        let visible: Vec<_> = week.visible_rows().map(|r| r.name.as_str()).collect();
        assert_eq!(visible, vec!["Manual", "Kickoff"]);
    }

    #[test]
    fn unknown_category_gets_fallback_color() {
        let timeline = Timeline::build(
            &sample_tasks(),
            date(2025, 1, 5),
            Preset::All,
            ProgressSource::Derived,
            ColorMap::default(),
        )
        .unwrap();
        assert_eq!(timeline.colors.color_for("Site Visits"), "#808080");
        assert_eq!(timeline.colors.color_for("Documentation"), "#4E76E0");
    }

    #[test]
    fn empty_task_set_is_rejected() {
        let result = Timeline::build(&[], date(2025, 1, 5), Preset::All, ProgressSource::Derived, ColorMap::default());
        assert!(matches!(result, Err(RenderError::InvalidData(_))));
    }

    #[test]
    fn unbounded_task_builds_for_every_preset() {
        let tasks = vec![
            Task::new("Kickoff", date(2025, 1, 1), 10),
            Task::new("Forever", date(2025, 1, 1), 100_000_000),
        ];
        for preset in Preset::ALL {
            let timeline =
                Timeline::build(&tasks, date(2025, 6, 10), preset, ProgressSource::Derived, ColorMap::default())
                    .unwrap();
            assert!(timeline.range.start <= timeline.range.end);
            assert!(timeline.visible_rows().any(|r| r.name == "Forever"));
        }
    }
}
