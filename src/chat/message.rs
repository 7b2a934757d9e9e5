use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{ChartAnalysis, Citation, MultiModalMetadata, QueryResponse, VisualTextLink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Multi-modal extras shown under an assistant reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageAttachment {
    pub chart_analysis: Option<ChartAnalysis>,
    pub visual_links: Vec<VisualTextLink>,
    pub enhanced: bool,
}

impl From<MultiModalMetadata> for MessageAttachment {
    fn from(meta: MultiModalMetadata) -> Self {
        Self {
            chart_analysis: meta.chart_analysis,
            visual_links: meta.visual_links,
            enhanced: meta.enhanced,
        }
    }
}

/// One transcript entry. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub attachment: Option<MessageAttachment>,
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn build(role: Role, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            attachment: None,
            citations: Vec::new(),
            confidence: None,
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::build(Role::User, content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::build(Role::Assistant, content.into())
    }

    /// Assistant reply; the attachment is only read in multi-modal mode.
    pub fn from_response(response: QueryResponse, multimodal: bool) -> Self {
        let attachment = multimodal
            .then(|| MessageAttachment::from(MultiModalMetadata::from_metadata(&response.metadata)));
        Self {
            attachment,
            citations: response.citations,
            confidence: Some(response.confidence_score),
            ..Self::build(Role::Assistant, response.answer)
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response() -> QueryResponse {
        serde_json::from_value(json!({
            "answer": "Revenue peaked in Q2.",
            "citations": [{"title": "report.pdf", "confidence_score": 0.9}],
            "confidence_score": 0.82,
            "processing_time_ms": 120,
            "metadata": {
                "multimodal_enhancement": true,
                "visual_links": [{"visual_id": "img1", "relationship": "explains", "confidence": 0.8}]
            }
        }))
        .unwrap()
    }

    #[test]
    fn plain_reply_ignores_metadata() {
        let message = Message::from_response(response(), false);
        assert_eq!(message.role, Role::Assistant);
        assert!(message.attachment.is_none());
        assert_eq!(message.citations.len(), 1);
        assert_eq!(message.confidence, Some(0.82));
    }

    #[test]
    fn multimodal_reply_carries_attachment() {
        let message = Message::from_response(response(), true);
        let attachment = message.attachment.unwrap();
        assert!(attachment.enhanced);
        assert_eq!(attachment.visual_links.len(), 1);
        assert!(attachment.chart_analysis.is_none());
    }

    #[test]
    fn message_ids_are_unique() {
        assert_ne!(Message::user("a").id, Message::user("a").id);
    }
}
