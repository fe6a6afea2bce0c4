//! HTML daily/weekly task digest
//!
//! Produces a self-contained document suitable as an HTML mail body: an
//! inline stylesheet, a daily section and a weekly section, each with three
//! task tables. Empty buckets keep their heading and show a placeholder.

use gantline_core::{Digest, RenderError, Section};

use crate::html_escape;

const STYLE: &str = r#"<style>
    body { font-family: 'Arial', sans-serif; margin: 20px; background-color: #f9f9f9; color: #333; }
    h1 { color: #005A9C; border-bottom: 2px solid #005A9C; padding-bottom: 5px; }
    h2 { color: #333; margin-top: 30px; border-bottom: 1px solid #ccc; padding-bottom: 3px; }
    table { width: 90%; border-collapse: collapse; margin-top: 10px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); }
    th, td { padding: 10px 15px; border: 1px solid #ddd; text-align: left; }
    th { background-color: #f2f2f2; color: #333; font-weight: bold; }
    tr:nth-child(even) { background-color: #fcfcfc; }
    p { font-style: italic; color: #777; }
</style>"#;

/// Placeholder shown for an empty bucket
pub const EMPTY_SECTION: &str = "No tasks found for this period.";

/// HTML digest renderer
#[derive(Clone, Debug, Default)]
pub struct HtmlDigestRenderer;

impl HtmlDigestRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Mail subject line for a digest
    pub fn subject(&self, digest: &Digest) -> String {
        format!("Gantt Task Summary - {}", digest.today.format("%Y-%m-%d"))
    }

    pub fn render(&self, digest: &Digest) -> Result<String, RenderError> {
        let mut html = String::new();
        html.push_str("<html>\n<head><meta charset=\"UTF-8\">");
        html.push_str(STYLE);
        html.push_str("</head>\n<body>\n");

        html.push_str(&format!(
            "<h1>Daily Task Summary: {}</h1>\n",
            digest.today.format("%A, %B %d, %Y")
        ));
        for section in digest.daily() {
            html.push_str(&render_section(section));
        }

        html.push_str(&format!(
            "<h1 style=\"margin-top: 40px;\">Weekly Summary: {} - {}</h1>\n",
            digest.week.start.format("%b %d"),
            digest.week.end.format("%b %d, %Y")
        ));
        for section in digest.weekly() {
            html.push_str(&render_section(section));
        }

        html.push_str("</body>\n</html>\n");
        Ok(html)
    }
}

fn render_section(section: &Section) -> String {
    let title = section.bucket.title();
    if section.is_empty() {
        return format!("<h2>{}</h2><p>{}</p>\n", title, EMPTY_SECTION);
    }

    let mut html = format!("<h2>{}</h2>\n<table>\n", title);
    html.push_str("<tr><th>Task</th><th>Start Date</th><th>End Date</th></tr>\n");
    for task in &section.tasks {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&task.name),
            task.start.format("%Y-%m-%d"),
            task.finish().format("%Y-%m-%d"),
        ));
    }
    html.push_str("</table>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gantline_core::Task;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn headings_use_long_dates() {
        let digest = Digest::build(&[], date(2025, 6, 12));
        let html = HtmlDigestRenderer::new().render(&digest).unwrap();

        assert!(html.contains("Daily Task Summary: Thursday, June 12, 2025"));
        assert!(html.contains("Weekly Summary: Jun 09 - Jun 15, 2025"));
    }

    #[test]
    fn empty_buckets_keep_placeholder() {
        let digest = Digest::build(&[], date(2025, 6, 12));
        let html = HtmlDigestRenderer::new().render(&digest).unwrap();
        assert_eq!(html.matches(EMPTY_SECTION).count(), 6);
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn tasks_listed_with_inclusive_end_date() {
        let tasks = vec![Task::new("Review <draft>", date(2025, 6, 9), 3)];
        let digest = Digest::build(&tasks, date(2025, 6, 12));
        let html = HtmlDigestRenderer::new().render(&digest).unwrap();

        assert!(html.contains("<tr><td>Review &lt;draft&gt;</td><td>2025-06-09</td><td>2025-06-11</td></tr>"));
        // starting/ending/active this week, nothing today
        assert_eq!(html.matches("<table>").count(), 3);
    }

    #[test]
    fn subject_line() {
        let digest = Digest::build(&[], date(2025, 6, 12));
        assert_eq!(HtmlDigestRenderer::new().subject(&digest), "Gantt Task Summary - 2025-06-12");
    }
}
