use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::{lenient_f64, null_as_default, ChartAnalysis, VisualTextLink};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: BTreeMap<String, ServiceState>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.to_ascii_lowercase().as_str(), "ok" | "healthy")
    }
}

/// Per-service health: some backends report booleans, others status strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceState {
    Flag(bool),
    Text(String),
}

impl ServiceState {
    pub fn is_up(&self) -> bool {
        match self {
            ServiceState::Flag(up) => *up,
            ServiceState::Text(text) => matches!(
                text.to_ascii_lowercase().as_str(),
                "ok" | "up" | "healthy" | "available" | "connected" | "true"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentUploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pages_processed: Option<u32>,
    #[serde(default)]
    pub images_extracted: Option<u32>,
    #[serde(default)]
    pub text_chunks: Option<u32>,
    #[serde(default)]
    pub processing_time_ms: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Map<String, Value>,
}

/// Captions generated for a technical image (technical, keywords, functional...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub captions: BTreeMap<String, String>,
}

impl ImageAnalysis {
    /// The backend reports captioning failures as a lone `error` caption.
    pub fn caption_error(&self) -> Option<&str> {
        match self.captions.get("error") {
            Some(message) if self.captions.len() == 1 => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Backend result of one classified upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum UploadResponse {
    Document(DocumentUploadResponse),
    Chart(ChartAnalysis),
    Image(ImageAnalysis),
}

impl UploadResponse {
    pub fn chart_analysis(&self) -> Option<&ChartAnalysis> {
        match self {
            UploadResponse::Chart(analysis) => Some(analysis),
            _ => None,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            UploadResponse::Document(doc) => {
                let mut parts = Vec::new();
                if let Some(id) = &doc.document_id {
                    parts.push(format!("id {}", id));
                }
                if let Some(chunks) = doc.text_chunks {
                    parts.push(format!("{} chunks", chunks));
                }
                if let Some(images) = doc.images_extracted {
                    parts.push(format!("{} images", images));
                }
                if parts.is_empty() {
                    doc.message.clone().unwrap_or_else(|| "indexed".to_string())
                } else {
                    parts.join(", ")
                }
            }
            UploadResponse::Chart(analysis) => format!(
                "{} chart, {} facts",
                analysis.chart_type,
                analysis.queryable_facts.len()
            ),
            UploadResponse::Image(image) => format!("{} captions", image.captions.len()),
        }
    }
}

/// One entry of `GET /documents`: bare ids or records, depending on the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentEntry {
    pub id: String,
    pub filename: Option<String>,
    pub raw: Value,
}

impl DocumentEntry {
    pub fn from_value(value: Value) -> Option<Self> {
        match &value {
            Value::String(id) => Some(Self {
                id: id.clone(),
                filename: None,
                raw: value,
            }),
            Value::Object(map) => {
                let id = ["document_id", "id"]
                    .iter()
                    .find_map(|key| map.get(*key))
                    .and_then(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })?;
                let filename = ["filename", "name", "title"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
                    .map(str::to_string);
                Some(Self {
                    id,
                    filename,
                    raw: value,
                })
            }
            _ => None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Result of `DELETE /documents/{id}`.
///
/// A 2xx status already means the delete went through, so a body without
/// `success` counts as successful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualLinksResponse {
    #[serde(default)]
    pub document_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visual_text_links: Vec<VisualTextLink>,
    #[serde(default)]
    pub total_links: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSummary {
    pub id: String,
    #[serde(rename = "type", default)]
    pub chart_type: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: f64,
    #[serde(default)]
    pub facts_count: usize,
    #[serde(default)]
    pub description_preview: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub charts: Vec<ChartSummary>,
    #[serde(default)]
    pub total_count: usize,
}

/// Unwraps `[..]` or `{"<key>": [..]}` into a list.
pub(crate) fn unwrap_list(payload: Value, key: &str) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
