use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-success HTTP status. Displays the backend's message verbatim.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response payload: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("websocket error: {0}")]
    WebSocket(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("{0}")]
    Upload(String),
}

impl ClientError {
    pub fn decode<E: std::fmt::Display>(err: E) -> Self {
        ClientError::Decode(err.to_string())
    }

    pub fn websocket<E: std::fmt::Display>(err: E) -> Self {
        ClientError::WebSocket(err.to_string())
    }

    /// Builds the uniform error for a failed response.
    ///
    /// Prefers the body's `detail` field, then `message`, and falls back to a
    /// status-derived text when neither is usable.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|payload| backend_message(&payload))
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn backend_message(payload: &Value) -> Option<String> {
    if let Some(detail) = payload.get("detail") {
        match detail {
            Value::String(text) if !text.trim().is_empty() => return Some(text.clone()),
            // FastAPI validation errors: [{"loc": [...], "msg": "...", "type": "..."}]
            Value::Array(items) => {
                let joined = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect::<Vec<_>>()
                    .join("; ");
                if !joined.is_empty() {
                    return Some(joined);
                }
            }
            _ => {}
        }
    }

    payload
        .get("message")
        .and_then(|v| v.as_str())
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}
