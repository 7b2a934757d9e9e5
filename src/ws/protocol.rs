use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::QueryRequest;

pub const STT_PATH: &str = "/ws/stt";
pub const CHAT_PATH: &str = "/ws/chat";

pub const FRAME_TRANSCRIPTION: &str = "transcription";
pub const FRAME_QUERY: &str = "query";
pub const FRAME_RESPONSE: &str = "response";
pub const FRAME_ERROR: &str = "error";

/// One speech-to-text result. Partial transcripts are superseded by later ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub is_partial: bool,
}

/// Any JSON frame pushed by the backend. Unknown fields are ignored.
#[derive(Debug, Deserialize, Default)]
pub struct WsIncomingFrame {
    #[serde(rename = "type")]
    pub frame_type: Option<String>,
    pub text: Option<String>,
    pub confidence: Option<f64>,
    pub is_partial: Option<bool>,
    pub data: Option<Value>,
    pub message: Option<String>,
}

impl WsIncomingFrame {
    pub fn is(&self, frame_type: &str) -> bool {
        self.frame_type.as_deref() == Some(frame_type)
    }

    pub fn into_transcript(self) -> Transcript {
        Transcript {
            text: self.text.unwrap_or_default(),
            confidence: self.confidence.unwrap_or_default(),
            is_partial: self.is_partial.unwrap_or(false),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WsQueryFrame<'a> {
    #[serde(rename = "type")]
    pub frame_type: &'static str,
    pub message: &'a str,
    pub session_id: &'a str,
    pub data: &'a QueryRequest,
}

impl<'a> WsQueryFrame<'a> {
    pub fn new(session_id: &'a str, request: &'a QueryRequest) -> Self {
        Self {
            frame_type: FRAME_QUERY,
            message: &request.query,
            session_id,
            data: request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::QueryOptions;
    use serde_json::json;

    #[test]
    fn query_frame_carries_request_under_data() {
        let request = QueryRequest::new("what changed?", &QueryOptions::default());
        let frame = serde_json::to_value(WsQueryFrame::new("s-1", &request)).unwrap();
        assert_eq!(frame["type"], "query");
        assert_eq!(frame["message"], "what changed?");
        assert_eq!(frame["session_id"], "s-1");
        assert_eq!(frame["data"]["num_results"], 5);
    }

    #[test]
    fn transcription_frame_defaults_missing_fields() {
        let frame: WsIncomingFrame =
            serde_json::from_value(json!({"type": "transcription", "text": "hello"})).unwrap();
        assert!(frame.is(FRAME_TRANSCRIPTION));
        let transcript = frame.into_transcript();
        assert_eq!(transcript.text, "hello");
        assert!(!transcript.is_partial);
        assert_eq!(transcript.confidence, 0.0);
    }
}
