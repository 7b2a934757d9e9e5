use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::{lenient_f64, null_as_default};
use crate::core::config::QueryOptions;

/// Which query endpoint a question is sent to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    #[default]
    Plain,
    /// Ask the backend to fold chart and visual context into retrieval.
    MultiModal,
}

impl QueryMode {
    pub fn from_flag(multimodal: bool) -> Self {
        if multimodal {
            QueryMode::MultiModal
        } else {
            QueryMode::Plain
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            QueryMode::Plain => "/query",
            QueryMode::MultiModal => "/multimodal/query",
        }
    }

    pub fn is_multimodal(self) -> bool {
        matches!(self, QueryMode::MultiModal)
    }

    pub fn toggled(self) -> Self {
        match self {
            QueryMode::Plain => QueryMode::MultiModal,
            QueryMode::MultiModal => QueryMode::Plain,
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryMode::Plain => write!(f, "plain"),
            QueryMode::MultiModal => write!(f, "multimodal"),
        }
    }
}

impl FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(QueryMode::Plain),
            "multimodal" | "multi-modal" | "enhanced" => Ok(QueryMode::MultiModal),
            other => Err(format!("unknown query mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub num_results: u32,
    pub include_web_search: bool,
    pub include_drive_search: bool,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, options: &QueryOptions) -> Self {
        Self {
            query: query.into(),
            num_results: options.num_results,
            include_web_search: options.include_web_search,
            include_drive_search: options.include_drive_search,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub citations: Vec<Citation>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence_score: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub processing_time_ms: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Map<String, Value>,
}

/// A source fragment backing part of an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default, alias = "confidence", deserialize_with = "lenient_f64")]
    pub confidence_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Map<String, Value>,
}

impl Citation {
    /// One-line label: title, page and location when known.
    pub fn label(&self) -> String {
        let title = if self.title.is_empty() {
            self.id.as_deref().unwrap_or("untitled source")
        } else {
            self.title.as_str()
        };
        let mut label = title.to_string();
        if let Some(page) = self.page_number {
            label.push_str(&format!(" (p. {})", page));
        }
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            label.push_str(&format!(" <{}>", url));
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mode_selects_endpoint() {
        assert_eq!(QueryMode::Plain.path(), "/query");
        assert_eq!(QueryMode::MultiModal.path(), "/multimodal/query");
        assert_eq!(QueryMode::Plain.toggled(), QueryMode::MultiModal);
        assert_eq!(QueryMode::from_flag(true), QueryMode::MultiModal);
    }

    #[test]
    fn mode_parses_aliases() {
        assert_eq!("Enhanced".parse::<QueryMode>().unwrap(), QueryMode::MultiModal);
        assert_eq!("plain".parse::<QueryMode>().unwrap(), QueryMode::Plain);
        assert!("fast".parse::<QueryMode>().is_err());
    }

    #[test]
    fn request_carries_options() {
        let options = QueryOptions {
            num_results: 8,
            include_web_search: false,
            include_drive_search: true,
        };
        let body = serde_json::to_value(QueryRequest::new("what is RAG?", &options)).unwrap();
        assert_eq!(
            body,
            json!({
                "query": "what is RAG?",
                "num_results": 8,
                "include_web_search": false,
                "include_drive_search": true
            })
        );
    }

    #[test]
    fn response_defaults_missing_optional_fields() {
        let response: QueryResponse = serde_json::from_value(json!({
            "answer": "RAG combines retrieval with generation.",
            "citations": null,
            "metadata": null
        }))
        .unwrap();
        assert!(response.citations.is_empty());
        assert!(response.metadata.is_empty());
        assert_eq!(response.confidence_score, 0.0);
    }

    #[test]
    fn citation_label_includes_page_and_url() {
        let citation: Citation = serde_json::from_value(json!({
            "title": "rag.pdf",
            "page_number": 3,
            "url": "https://example.com/rag.pdf",
            "confidence": 0.7
        }))
        .unwrap();
        assert_eq!(citation.label(), "rag.pdf (p. 3) <https://example.com/rag.pdf>");
        assert_eq!(citation.confidence_score, 0.7);
    }
}
