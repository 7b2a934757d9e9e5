use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::str::FromStr;

use super::format::{format_percent, truncate};
use crate::api::VisualTextLink;

const SNIPPET_PREVIEW_CHARS: usize = 120;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LinkFilter {
    #[default]
    All,
    Relationship(String),
}

impl LinkFilter {
    pub fn matches(&self, link: &VisualTextLink) -> bool {
        match self {
            LinkFilter::All => true,
            LinkFilter::Relationship(name) => link.relationship == *name,
        }
    }
}

impl FromStr for LinkFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("relationship filter cannot be empty".to_string());
        }
        if s.eq_ignore_ascii_case("all") {
            Ok(LinkFilter::All)
        } else {
            Ok(LinkFilter::Relationship(s.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkSort {
    /// Highest confidence first.
    #[default]
    Confidence,
    /// Lexicographic by relationship name.
    Relationship,
}

impl FromStr for LinkSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confidence" => Ok(LinkSort::Confidence),
            "relationship" | "type" => Ok(LinkSort::Relationship),
            other => Err(format!(
                "unknown sort '{}' (expected confidence or relationship)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            ConfidenceLevel::High
        } else if confidence >= 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipSummary {
    pub relationship: String,
    pub count: usize,
    pub average_confidence: f64,
}

/// Filter, sort and summary statistics over visual-text links.
#[derive(Debug, Clone, Default)]
pub struct LinkBoard {
    links: Vec<VisualTextLink>,
}

impl LinkBoard {
    pub fn new(links: Vec<VisualTextLink>) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &[VisualTextLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn replace(&mut self, links: Vec<VisualTextLink>) {
        self.links = links;
    }

    pub fn extend(&mut self, links: impl IntoIterator<Item = VisualTextLink>) {
        self.links.extend(links);
    }

    /// Distinct relationship names, sorted.
    pub fn relationships(&self) -> Vec<String> {
        self.links
            .iter()
            .map(|link| link.relationship.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn filter(&self, filter: &LinkFilter) -> Vec<&VisualTextLink> {
        self.links.iter().filter(|link| filter.matches(link)).collect()
    }

    pub fn sort(&self, sort: LinkSort) -> Vec<&VisualTextLink> {
        self.view(&LinkFilter::All, sort)
    }

    pub fn view(&self, filter: &LinkFilter, sort: LinkSort) -> Vec<&VisualTextLink> {
        let mut links = self.filter(filter);
        sort_links(&mut links, sort);
        links
    }

    pub fn summary(&self, relationship: &str) -> Option<RelationshipSummary> {
        let members: Vec<&VisualTextLink> = self
            .links
            .iter()
            .filter(|link| link.relationship == relationship)
            .collect();
        if members.is_empty() {
            return None;
        }
        let total: f64 = members.iter().map(|link| link.confidence).sum();
        Some(RelationshipSummary {
            relationship: relationship.to_string(),
            count: members.len(),
            average_confidence: total / members.len() as f64,
        })
    }

    /// One summary per distinct relationship, ordered by name.
    pub fn summaries(&self) -> Vec<RelationshipSummary> {
        self.relationships()
            .iter()
            .filter_map(|relationship| self.summary(relationship))
            .collect()
    }

    pub fn render(&self, filter: &LinkFilter, sort: LinkSort) -> String {
        let links = self.view(filter, sort);
        let mut out = String::new();

        if links.is_empty() {
            out.push_str("No visual-text links.\n");
        }
        for link in &links {
            let _ = writeln!(
                out,
                "{}  [{}]  {} ({})",
                link.visual_id,
                link.relationship,
                format_percent(link.confidence),
                ConfidenceLevel::from_confidence(link.confidence).label()
            );
            for snippet in &link.text_snippets {
                let _ = writeln!(out, "    \"{}\"", truncate(snippet, SNIPPET_PREVIEW_CHARS));
            }
        }

        let summaries = self.summaries();
        if !summaries.is_empty() {
            let _ = writeln!(out, "\nBy relationship:");
            for summary in summaries {
                let _ = writeln!(
                    out,
                    "  {:<16} {:>3} links, avg {}",
                    summary.relationship,
                    summary.count,
                    format_percent(summary.average_confidence)
                );
            }
        }
        out
    }
}

pub fn sort_links(links: &mut [&VisualTextLink], sort: LinkSort) {
    match sort {
        LinkSort::Confidence => links.sort_by(|a, b| b.confidence.total_cmp(&a.confidence)),
        LinkSort::Relationship => links.sort_by(|a, b| a.relationship.cmp(&b.relationship)),
    }
}
