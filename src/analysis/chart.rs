use std::fmt::Write as _;
use std::str::FromStr;

use super::format::{bar, format_percent, format_value};
use crate::api::{ChartAnalysis, DataPoint, StatPoint};

const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartTab {
    #[default]
    Overview,
    Data,
    Insights,
    Facts,
}

impl ChartTab {
    pub const ALL: [ChartTab; 4] = [
        ChartTab::Overview,
        ChartTab::Data,
        ChartTab::Insights,
        ChartTab::Facts,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartTab::Overview => "Overview",
            ChartTab::Data => "Data",
            ChartTab::Insights => "Insights",
            ChartTab::Facts => "Facts",
        }
    }
}

impl FromStr for ChartTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(ChartTab::Overview),
            "data" => Ok(ChartTab::Data),
            "insights" => Ok(ChartTab::Insights),
            "facts" => Ok(ChartTab::Facts),
            other => Err(format!(
                "unknown chart tab '{}' (expected overview, data, insights or facts)",
                other
            )),
        }
    }
}

/// Read-only tabbed view over one backend chart analysis.
pub struct ChartView<'a> {
    analysis: &'a ChartAnalysis,
}

impl<'a> ChartView<'a> {
    pub fn new(analysis: &'a ChartAnalysis) -> Self {
        Self { analysis }
    }

    /// Data points, largest value first.
    pub fn sorted_data_points(&self) -> Vec<&'a DataPoint> {
        let mut points: Vec<&DataPoint> = self.analysis.data_insights.data_points.iter().collect();
        points.sort_by(|a, b| b.value.total_cmp(&a.value));
        points
    }

    pub fn headline(&self) -> String {
        format!(
            "{} chart ({} confidence)",
            capitalize(&self.analysis.chart_type),
            format_percent(self.analysis.confidence)
        )
    }

    pub fn render(&self, tab: ChartTab) -> String {
        match tab {
            ChartTab::Overview => self.render_overview(),
            ChartTab::Data => self.render_data(),
            ChartTab::Insights => self.render_insights(),
            ChartTab::Facts => self.render_facts(),
        }
    }

    /// Every tab, each under its own heading.
    pub fn render_all(&self) -> String {
        ChartTab::ALL
            .iter()
            .map(|tab| format!("== {} ==\n{}", tab.title(), self.render(*tab)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_overview(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.headline());
        let description = self.analysis.text_description.trim();
        if description.is_empty() {
            let _ = writeln!(out, "No description available.");
        } else {
            let _ = writeln!(out, "\n{}", description);
        }
        let insights = &self.analysis.data_insights;
        let _ = writeln!(
            out,
            "\n{} data points, {} trends, {} insights, {} facts",
            insights.data_points.len(),
            insights.trends.len(),
            insights.insights.len(),
            self.analysis.queryable_facts.len()
        );
        out
    }

    fn render_data(&self) -> String {
        let points = self.sorted_data_points();
        if points.is_empty() {
            return match &self.analysis.data_insights.raw_analysis {
                Some(raw) => format!("No structured data points. Raw analysis:\n{}\n", raw),
                None => "No data points extracted.\n".to_string(),
            };
        }

        let max = points.iter().map(|p| p.value).fold(f64::MIN, f64::max);
        let label_width = points
            .iter()
            .map(|p| point_label(p).chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for point in points {
            let label = point_label(point);
            let _ = writeln!(
                out,
                "{:<width$}  {:>12}  {}",
                label,
                format_value(point.value),
                bar(point.value, max, BAR_WIDTH),
                width = label_width
            );
        }
        out
    }

    fn render_insights(&self) -> String {
        let insights = &self.analysis.data_insights;
        let mut out = String::new();

        if !insights.trends.is_empty() {
            let _ = writeln!(out, "Trends:");
            for trend in &insights.trends {
                let _ = writeln!(out, "  - {}", trend);
            }
        }

        let stats = &insights.key_statistics;
        if !stats.is_empty() {
            let _ = writeln!(out, "Key statistics:");
            if let Some(highest) = &stats.highest {
                let _ = writeln!(out, "  Highest: {}", stat_label(highest));
            }
            if let Some(lowest) = &stats.lowest {
                let _ = writeln!(out, "  Lowest:  {}", stat_label(lowest));
            }
            if let Some(average) = stats.average {
                let _ = writeln!(out, "  Average: {}", format_value(average));
            }
            if let Some(total) = stats.total {
                let _ = writeln!(out, "  Total:   {}", format_value(total));
            }
        }

        if !insights.insights.is_empty() {
            let _ = writeln!(out, "Insights:");
            for insight in &insights.insights {
                let _ = writeln!(out, "  - {}", insight);
            }
        }

        if out.is_empty() {
            out.push_str("No insights available.\n");
        }
        out
    }

    fn render_facts(&self) -> String {
        if self.analysis.queryable_facts.is_empty() {
            return "No queryable facts.\n".to_string();
        }
        let mut out = String::new();
        for (index, fact) in self.analysis.queryable_facts.iter().enumerate() {
            let _ = writeln!(out, "{:>3}. {}", index + 1, fact);
        }
        out
    }
}

fn point_label(point: &DataPoint) -> String {
    match &point.series {
        Some(series) => format!("{} [{}]", point.category, series),
        None => point.category.clone(),
    }
}

fn stat_label(stat: &StatPoint) -> String {
    match &stat.category {
        Some(category) => format!("{} ({})", format_value(stat.value), category),
        None => format_value(stat.value),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
