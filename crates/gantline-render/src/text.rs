//! Plain-text task table for console output

use gantline_core::{round_percent, ChartRow, RenderError, Renderer, Timeline};

use crate::truncate;

/// Fixed-width table of chart rows
#[derive(Clone, Debug)]
pub struct TextRenderer {
    /// Only list rows that intersect the visible range
    pub visible_only: bool,
    /// Maximum characters of the task column
    pub name_width: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            visible_only: false,
            name_width: 36,
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible_only(mut self) -> Self {
        self.visible_only = true;
        self
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, timeline: &Timeline) -> Result<String, RenderError> {
        let rows: Vec<&ChartRow> = if self.visible_only {
            timeline.visible_rows().collect()
        } else {
            timeline.rows.iter().collect()
        };

        let w = self.name_width;
        let mut out = format!(
            "{:<w$}  {:<28}  {:<10}  {:<10}  {:>5}\n",
            "Task", "Category", "Start", "Finish", "Done"
        );
        out.push_str(&format!("{}\n", "-".repeat(w + 63)));
        for row in &rows {
            out.push_str(&format!(
                "{:<w$}  {:<28}  {}  {}  {:>4}%\n",
                truncate(&row.name, w),
                truncate(&row.category, 28),
                row.start.format("%Y-%m-%d"),
                row.finish.format("%Y-%m-%d"),
                round_percent(row.progress),
            ));
        }
        out.push_str(&format!(
            "\n{} task(s), today {}, view {} ({} .. {})\n",
            rows.len(),
            timeline.today.format("%Y-%m-%d"),
            timeline.preset,
            timeline.range.start.format("%Y-%m-%d"),
            timeline.range.end.format("%Y-%m-%d"),
        ));
        Ok(out)
    }
}
