use std::fmt;

use serde::{Deserialize, Serialize};

const PDF_MIME: &str = "application/pdf";
const CHART_HINTS: [&str; 3] = ["chart", "graph", "plot"];

/// Processing category a dropped file is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Document,
    Chart,
    Image,
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileCategory::Document => write!(f, "document"),
            FileCategory::Chart => write!(f, "chart"),
            FileCategory::Image => write!(f, "image"),
        }
    }
}

/// Filename heuristic, not content inspection: `figure1.png` holding a bar
/// chart is still an [`FileCategory::Image`].
pub fn classify(content_type: &str, filename: &str) -> FileCategory {
    let content_type = content_type.trim().to_ascii_lowercase();
    if content_type == PDF_MIME {
        return FileCategory::Document;
    }

    if content_type.starts_with("image/") {
        let name = filename.to_lowercase();
        if CHART_HINTS.iter().any(|hint| name.contains(hint)) {
            return FileCategory::Chart;
        }
        return FileCategory::Image;
    }

    FileCategory::Document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_is_document_regardless_of_name() {
        assert_eq!(classify("application/pdf", "report.pdf"), FileCategory::Document);
        assert_eq!(classify("application/pdf", "sales_chart.pdf"), FileCategory::Document);
        assert_eq!(classify("application/pdf", "PLOT.png"), FileCategory::Document);
    }

    #[test]
    fn images_with_chart_hints_are_charts() {
        assert_eq!(classify("image/png", "revenue_chart.png"), FileCategory::Chart);
        assert_eq!(classify("image/jpeg", "Growth-GRAPH.JPG"), FileCategory::Chart);
        assert_eq!(classify("image/svg+xml", "scatterPlot.svg"), FileCategory::Chart);
    }

    #[test]
    fn other_images_stay_images() {
        assert_eq!(classify("image/png", "figure1.png"), FileCategory::Image);
        assert_eq!(classify("image/webp", "diagram.webp"), FileCategory::Image);
    }

    #[test]
    fn everything_else_falls_back_to_document() {
        assert_eq!(classify("text/plain", "chart_notes.txt"), FileCategory::Document);
        assert_eq!(classify("application/octet-stream", "graph.bin"), FileCategory::Document);
        assert_eq!(classify("", "plot.png"), FileCategory::Document);
    }

    #[test]
    fn content_type_case_is_ignored() {
        assert_eq!(classify("Application/PDF", "a.pdf"), FileCategory::Document);
        assert_eq!(classify("IMAGE/PNG", "bar_chart.png"), FileCategory::Chart);
    }
}
