use futures_util::SinkExt;
use tokio_tungstenite::tungstenite::Message;

use super::protocol::{WsIncomingFrame, WsQueryFrame, CHAT_PATH, FRAME_ERROR, FRAME_RESPONSE};
use super::{close, next_text, open, WsStream};
use crate::api::{QueryRequest, QueryResponse};
use crate::core::errors::ClientError;

/// Real-time chat over `/ws/chat`. One response frame per query frame.
pub struct ChatChannel {
    socket: WsStream,
}

impl ChatChannel {
    pub async fn connect(ws_base_url: &str) -> Result<Self, ClientError> {
        let socket = open(ws_base_url, CHAT_PATH).await?;
        Ok(Self { socket })
    }

    pub async fn send_query(
        &mut self,
        session_id: &str,
        request: &QueryRequest,
    ) -> Result<(), ClientError> {
        let payload = serde_json::to_string(&WsQueryFrame::new(session_id, request))
            .map_err(ClientError::decode)?;
        self.socket
            .send(Message::text(payload))
            .await
            .map_err(ClientError::websocket)
    }

    /// Waits for the next `response` frame, skipping anything else.
    pub async fn next_response(&mut self) -> Result<Option<QueryResponse>, ClientError> {
        while let Some(text) = next_text(&mut self.socket).await? {
            let frame: WsIncomingFrame = match serde_json::from_str(&text) {
                Ok(frame) => frame,
                Err(err) => {
                    tracing::warn!(error = %err, "Ignoring malformed chat frame");
                    continue;
                }
            };
            if frame.is(FRAME_ERROR) {
                return Err(ClientError::WebSocket(
                    frame.message.unwrap_or_else(|| "chat channel error".to_string()),
                ));
            }
            if !frame.is(FRAME_RESPONSE) {
                tracing::debug!(frame_type = ?frame.frame_type, "Skipping chat frame");
                continue;
            }
            let data = frame.data.unwrap_or_default();
            let response = serde_json::from_value(data).map_err(ClientError::decode)?;
            return Ok(Some(response));
        }
        Ok(None)
    }

    /// Sends one question and waits for its answer.
    pub async fn ask(
        &mut self,
        session_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, ClientError> {
        self.send_query(session_id, request).await?;
        self.next_response()
            .await?
            .ok_or_else(|| ClientError::WebSocket("connection closed before a response".into()))
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        close(&mut self.socket).await
    }
}
