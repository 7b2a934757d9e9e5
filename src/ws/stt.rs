use futures_util::SinkExt;
use tokio_tungstenite::tungstenite::Message;

use super::protocol::{Transcript, WsIncomingFrame, FRAME_TRANSCRIPTION, STT_PATH};
use super::{close, next_text, open, WsStream};
use crate::core::errors::ClientError;

/// Streams audio chunks to the backend and yields transcripts as they arrive.
pub struct SttStream {
    socket: WsStream,
}

impl SttStream {
    pub async fn connect(ws_base_url: &str) -> Result<Self, ClientError> {
        let socket = open(ws_base_url, STT_PATH).await?;
        Ok(Self { socket })
    }

    pub async fn send_audio(&mut self, chunk: Vec<u8>) -> Result<(), ClientError> {
        tracing::trace!(bytes = chunk.len(), "Sending audio chunk");
        self.socket
            .send(Message::binary(chunk))
            .await
            .map_err(ClientError::websocket)
    }

    /// Next transcription frame, or `None` when the stream has ended.
    pub async fn next_transcript(&mut self) -> Result<Option<Transcript>, ClientError> {
        while let Some(text) = next_text(&mut self.socket).await? {
            let frame: WsIncomingFrame = match serde_json::from_str(&text) {
                Ok(frame) => frame,
                Err(err) => {
                    tracing::warn!(error = %err, "Ignoring malformed STT frame");
                    continue;
                }
            };
            if frame.is(FRAME_TRANSCRIPTION) {
                return Ok(Some(frame.into_transcript()));
            }
            tracing::debug!(frame_type = ?frame.frame_type, "Skipping non-transcription frame");
        }
        Ok(None)
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        close(&mut self.socket).await
    }
}
