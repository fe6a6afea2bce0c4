//! Standalone HTML page around the SVG timeline
//!
//! The page shows the zoom presets as a caption strip with the active one
//! highlighted; switching presets means re-rendering with another preset.

use gantline_core::{Preset, RenderError, Renderer, Timeline};

use crate::{html_escape, SvgRenderer};

/// HTML chart page renderer
#[derive(Clone, Debug, Default)]
pub struct HtmlChartRenderer {
    pub svg: SvgRenderer,
}

impl HtmlChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_svg(svg: SvgRenderer) -> Self {
        Self { svg }
    }

    fn preset_strip(&self, active: Preset) -> String {
        Preset::ALL
            .iter()
            .map(|p| {
                let class = if *p == active { "preset active" } else { "preset" };
                format!(r#"<span class="{}">{}</span>"#, class, p.caption())
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

impl Renderer for HtmlChartRenderer {
    type Output = String;

    fn render(&self, timeline: &Timeline) -> Result<String, RenderError> {
        let chart = self.svg.render(timeline)?;
        let title = html_escape(&self.svg.title);

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
  body {{ font-family: {font}; margin: 20px; color: #2c3e50; }}
  h1 {{ text-align: center; font-size: 40px; }}
  .presets {{ text-align: center; margin-bottom: 12px; }}
  .preset {{ display: inline-block; width: 60px; font-size: 12px; margin: 0 1px; padding: 2px 0; border: 1px solid #ccc; border-radius: 4px; }}
  .preset.active {{ background: #2c3e50; color: #fff; }}
  .axis {{ font-size: 12px; color: #777; }}
</style>
</head>
<body>
<h1>{title}</h1>
<div class="presets">{presets}</div>
<div class="axis">Tasks (Grouped by Category)</div>
{chart}
</body>
</html>
"#,
            title = title,
            font = self.svg.font_family,
            presets = self.preset_strip(timeline.preset),
            chart = chart,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gantline_core::{ColorMap, ProgressSource, Task};

    #[test]
    fn page_embeds_chart_and_marks_active_preset() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let tasks = vec![Task::new("Kickoff", start, 10)];
        let timeline =
            Timeline::build(&tasks, start, Preset::Month, ProgressSource::Derived, ColorMap::default()).unwrap();

        let html = HtmlChartRenderer::with_svg(SvgRenderer::new().title("SmarTriage Gantt"))
            .render(&timeline)
            .unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>SmarTriage Gantt</title>"));
        assert!(html.contains(r#"<span class="preset active">1M</span>"#));
        assert!(html.contains(r#"<span class="preset">All</span>"#));
        assert!(html.contains("<svg"));
    }
}
