//! # gantline-render
//!
//! Rendering backends for gantline timelines and digests.
//!
//! This crate provides:
//! - SVG timeline chart with a "today" marker (`SvgRenderer`)
//! - Standalone HTML page wrapping the chart (`HtmlChartRenderer`)
//! - HTML daily/weekly digest document (`HtmlDigestRenderer`)
//! - Plain-text task table (`TextRenderer`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use gantline_core::{ColorMap, Preset, ProgressSource, Renderer, Timeline};
//! use gantline_render::SvgRenderer;
//!
//! let timeline = Timeline::build(&tasks, today, Preset::Month, ProgressSource::Derived, ColorMap::default())?;
//! let svg = SvgRenderer::default().render(&timeline)?;
//! std::fs::write("timeline.svg", svg)?;
//! ```

pub mod digest;
pub mod page;
pub mod text;

pub use digest::HtmlDigestRenderer;
pub use page::HtmlChartRenderer;
pub use text::TextRenderer;

use chrono::{Days, NaiveDate};
use gantline_core::{shift_days, ChartRow, DateRange, RenderError, Renderer, Timeline};
use svg::node::element::{Group, Line, Rectangle, Text};
use svg::Document;

/// SVG timeline renderer configuration
#[derive(Clone, Debug)]
pub struct SvgRenderer {
    /// Width of the chart area (excluding labels) in pixels
    pub chart_width: u32,
    /// Height per task row in pixels
    pub row_height: u32,
    /// Width of the label column in pixels
    pub label_width: u32,
    /// Header height in pixels
    pub header_height: u32,
    /// Padding around the chart
    pub padding: u32,
    /// Chart title
    pub title: String,
    /// Background color
    pub background_color: String,
    /// Grid line color
    pub grid_color: String,
    /// Text color
    pub text_color: String,
    /// Color of the today marker
    pub today_color: String,
    /// Font family
    pub font_family: String,
    /// Font size in pixels
    pub font_size: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            chart_width: 900,
            row_height: 28,
            label_width: 260,
            header_height: 50,
            padding: 20,
            title: "Project Timeline".into(),
            background_color: "#ffffff".into(),
            grid_color: "#ecf0f1".into(),
            text_color: "#2c3e50".into(),
            today_color: "red".into(),
            font_family: "'Open Sans Hebrew', sans-serif".into(),
            font_size: 12,
        }
    }
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure chart width
    pub fn chart_width(mut self, width: u32) -> Self {
        self.chart_width = width;
        self
    }

    /// Configure row height
    pub fn row_height(mut self, height: u32) -> Self {
        self.row_height = height;
        self
    }

    /// Configure the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Calculate the total width of the SVG
    fn total_width(&self) -> u32 {
        self.padding * 2 + self.label_width + self.chart_width
    }

    /// Calculate the total height based on number of rows
    fn total_height(&self, row_count: usize) -> u32 {
        self.padding * 2 + self.header_height + self.body_height(row_count)
    }

    /// Height of the row area; an empty chart keeps one row
    fn body_height(&self, row_count: usize) -> u32 {
        row_count.max(1) as u32 * self.row_height
    }

    fn pixels_per_day(&self, range: &DateRange) -> f64 {
        self.chart_width as f64 / range.days() as f64
    }

    /// Convert a date to x position, clamped to the chart area
    fn date_to_x(&self, date: NaiveDate, range: &DateRange, px_per_day: f64) -> f64 {
        let days = (date - range.start).num_days() as f64;
        let x = (days * px_per_day).clamp(0.0, self.chart_width as f64);
        self.padding as f64 + self.label_width as f64 + x
    }

    fn chart_top(&self) -> u32 {
        self.padding + self.header_height
    }

    /// Create the header with date labels
    fn render_header(&self, range: &DateRange, px_per_day: f64) -> Group {
        let mut group = Group::new().set("class", "header");

        let header_bg = Rectangle::new()
            .set("x", self.padding)
            .set("y", self.padding)
            .set("width", self.label_width + self.chart_width)
            .set("height", self.header_height)
            .set("fill", "#f8f9fa");
        group = group.add(header_bg);

        let interval_days = tick_interval(range.days());
        for current in tick_dates(*range, interval_days) {
            let x = self.date_to_x(current, range, px_per_day);

            let tick = Line::new()
                .set("x1", x)
                .set("y1", self.chart_top() - 10)
                .set("x2", x)
                .set("y2", self.chart_top())
                .set("stroke", self.text_color.as_str())
                .set("stroke-width", 1);
            group = group.add(tick);

            let label = match interval_days {
                1 => current.format("%d").to_string(),
                2..=31 => current.format("%b %d").to_string(),
                _ => current.format("%b %Y").to_string(),
            };
            let text = Text::new(label)
                .set("x", x)
                .set("y", self.chart_top() - 15)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size - 1)
                .set("fill", self.text_color.as_str())
                .set("text-anchor", "middle");
            group = group.add(text);
        }

        let caption = Text::new("Timeline")
            .set("x", self.padding + self.label_width + self.chart_width / 2)
            .set("y", self.padding + 18)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size + 1)
            .set("font-weight", "bold")
            .set("fill", self.text_color.as_str())
            .set("text-anchor", "middle");
        group.add(caption)
    }

    /// Render grid lines
    fn render_grid(&self, row_count: usize, range: &DateRange, px_per_day: f64) -> Group {
        let mut group = Group::new().set("class", "grid");

        let chart_top = self.chart_top();
        let chart_bottom = chart_top + self.body_height(row_count);

        for i in 0..=row_count.max(1) {
            let y = chart_top + (i as u32 * self.row_height);
            let line = Line::new()
                .set("x1", self.padding)
                .set("y1", y)
                .set("x2", self.padding + self.label_width + self.chart_width)
                .set("y2", y)
                .set("stroke", self.grid_color.as_str())
                .set("stroke-width", 1);
            group = group.add(line);
        }

        for current in tick_dates(*range, tick_interval(range.days())) {
            let x = self.date_to_x(current, range, px_per_day);
            let line = Line::new()
                .set("x1", x)
                .set("y1", chart_top)
                .set("x2", x)
                .set("y2", chart_bottom)
                .set("stroke", self.grid_color.as_str())
                .set("stroke-width", 1);
            group = group.add(line);
        }

        group
    }

    /// Render a single task bar, clipped to the visible range
    fn render_row(
        &self,
        row: &ChartRow,
        index: usize,
        color: &str,
        range: &DateRange,
        px_per_day: f64,
    ) -> Group {
        let mut group = Group::new().set("class", "task");

        let y = self.chart_top() + (index as u32 * self.row_height);
        let bar_height = (self.row_height as f64 * 0.6) as u32;
        let bar_y = y + (self.row_height - bar_height) / 2;

        let label = Text::new(truncate(&row.label, 40))
            .set("x", self.padding + 8)
            .set("y", y + self.row_height / 2 + 4)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size)
            .set("fill", self.text_color.as_str());
        group = group.add(label);

        // The finish day is inclusive, so the bar runs to the end of it
        let x_start = self.date_to_x(row.start, range, px_per_day);
        let x_end = self.date_to_x(shift_days(row.finish, 1), range, px_per_day);
        let bar_width = (x_end - x_start).max(4.0);

        let bar = Rectangle::new()
            .set("x", x_start)
            .set("y", bar_y)
            .set("width", bar_width)
            .set("height", bar_height)
            .set("rx", 3)
            .set("ry", 3)
            .set("fill", color);
        group = group.add(bar);

        if row.progress > 0.0 {
            let done = Rectangle::new()
                .set("x", x_start)
                .set("y", bar_y + bar_height - 4)
                .set("width", bar_width * row.progress / 100.0)
                .set("height", 4)
                .set("fill", "rgba(0,0,0,0.35)");
            group = group.add(done);
        }

        group
    }

    /// Dashed vertical marker for today
    fn render_today(&self, today: NaiveDate, row_count: usize, range: &DateRange, px_per_day: f64) -> Group {
        let x = self.date_to_x(today, range, px_per_day);
        let chart_bottom = self.chart_top() + self.body_height(row_count);

        let line = Line::new()
            .set("x1", x)
            .set("y1", self.chart_top())
            .set("x2", x)
            .set("y2", chart_bottom)
            .set("stroke", self.today_color.as_str())
            .set("stroke-width", 2)
            .set("stroke-dasharray", "6,4");
        let label = Text::new("Today")
            .set("x", x)
            .set("y", self.chart_top() - 30)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size)
            .set("fill", self.today_color.as_str())
            .set("text-anchor", "middle");

        Group::new().set("class", "today").add(line).add(label)
    }

    /// Category legend
    fn render_legend(&self, timeline: &Timeline, y_offset: u32) -> Group {
        let mut group = Group::new().set("class", "legend");
        let box_size = 12.0;
        let spacing = 230.0;
        let per_line = ((self.label_width + self.chart_width) as f64 / spacing).max(1.0) as usize;

        for (i, category) in timeline.categories().into_iter().enumerate() {
            let x = self.padding as f64 + (i % per_line) as f64 * spacing;
            let y = y_offset as f64 + 15.0 + (i / per_line) as f64 * 20.0;

            let swatch = Rectangle::new()
                .set("x", x)
                .set("y", y - box_size + 2.0)
                .set("width", box_size)
                .set("height", box_size)
                .set("rx", 2)
                .set("fill", timeline.colors.color_for(category));
            group = group.add(swatch);

            let label = Text::new(truncate(category, 32))
                .set("x", x + box_size + 5.0)
                .set("y", y)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size - 1)
                .set("fill", self.text_color.as_str());
            group = group.add(label);
        }

        group
    }

    fn legend_height(&self, category_count: usize) -> u32 {
        let per_line = ((self.label_width + self.chart_width) / 230).max(1) as usize;
        (category_count.div_ceil(per_line) as u32) * 20 + 10
    }
}

impl Renderer for SvgRenderer {
    type Output = String;

    fn render(&self, timeline: &Timeline) -> Result<String, RenderError> {
        let rows: Vec<&ChartRow> = timeline.visible_rows().collect();
        let range = &timeline.range;
        let px_per_day = self.pixels_per_day(range);
        let row_count = rows.len();
        let category_count = timeline.categories().len();

        let width = self.total_width();
        let height = self.total_height(row_count) + self.legend_height(category_count);

        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height))
            .set("xmlns", "http://www.w3.org/2000/svg");

        let background = Rectangle::new()
            .set("width", "100%")
            .set("height", "100%")
            .set("fill", self.background_color.as_str());
        document = document.add(background);

        let title = Text::new(self.title.as_str())
            .set("x", self.padding)
            .set("y", self.padding + 15)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size + 4)
            .set("font-weight", "bold")
            .set("fill", self.text_color.as_str());
        document = document.add(title);

        document = document.add(self.render_grid(row_count, range, px_per_day));
        document = document.add(self.render_header(range, px_per_day));

        if rows.is_empty() {
            let empty = Text::new("No tasks in this window")
                .set("x", self.padding + self.label_width + self.chart_width / 2)
                .set("y", self.chart_top() + self.row_height / 2 + 4)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size)
                .set("fill", self.text_color.as_str())
                .set("text-anchor", "middle");
            document = document.add(empty);
        }

        for (index, row) in rows.iter().enumerate() {
            let color = timeline.colors.color_for(&row.category);
            document = document.add(self.render_row(row, index, color, range, px_per_day));
        }

        if timeline.today_visible() {
            document = document.add(self.render_today(timeline.today, row_count, range, px_per_day));
        }

        let legend_y = self.total_height(row_count) - self.padding + 10;
        document = document.add(self.render_legend(timeline, legend_y));

        let mut output = Vec::new();
        svg::write(&mut output, &document)
            .map_err(|e| RenderError::Format(format!("Failed to write SVG: {}", e)))?;

        String::from_utf8(output).map_err(|e| RenderError::Format(format!("Invalid UTF-8: {}", e)))
    }
}

/// Days between header ticks for a range of `total_days`
fn tick_interval(total_days: i64) -> i64 {
    if total_days <= 14 {
        1
    } else if total_days <= 60 {
        7
    } else if total_days <= 180 {
        14
    } else if total_days <= 730 {
        30
    } else {
        // keep roughly two dozen ticks on long spans
        (total_days + 23) / 24
    }
}

/// Tick dates from the start of `range`, `interval` days apart
fn tick_dates(range: DateRange, interval: i64) -> impl Iterator<Item = NaiveDate> {
    let step = Days::new(interval.max(1).unsigned_abs());
    std::iter::successors(Some(range.start), move |d| d.checked_add_days(step))
        .take_while(move |d| *d <= range.end)
}

/// Truncate a string with ellipsis
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!(
            "{}…",
            s.chars().take(max.saturating_sub(1)).collect::<String>()
        )
    }
}

/// HTML-escape a string
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
