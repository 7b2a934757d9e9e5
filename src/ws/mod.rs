//! WebSocket channels exposed by the backend: streaming speech-to-text and
//! real-time chat. No reconnection; a dropped socket ends the channel.

pub mod chat;
pub mod protocol;
pub mod stt;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::core::errors::ClientError;

pub use chat::ChatChannel;
pub use protocol::Transcript;
pub use stt::SttStream;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Joins a `ws://` or `wss://` base with an endpoint path.
pub fn endpoint_url(ws_base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        ws_base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub(crate) async fn open(ws_base_url: &str, path: &str) -> Result<WsStream, ClientError> {
    let url = endpoint_url(ws_base_url, path);
    let (socket, _) = connect_async(url.as_str())
        .await
        .map_err(ClientError::websocket)?;
    tracing::info!(%url, "WebSocket connected");
    Ok(socket)
}

/// Next text payload, or `None` once the peer closes normally.
///
/// Binary frames are skipped. A close frame with an error code becomes an
/// error carrying the peer's reason.
pub(crate) async fn next_text(socket: &mut WsStream) -> Result<Option<String>, ClientError> {
    while let Some(frame) = socket.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => return Ok(None),
            Err(err) => return Err(ClientError::websocket(err)),
        };
        match frame {
            Message::Text(text) => return Ok(Some(text.as_str().to_string())),
            Message::Close(Some(close)) if close.code != CloseCode::Normal => {
                let reason = close.reason.as_str();
                tracing::warn!(code = u16::from(close.code), %reason, "WebSocket closed by peer");
                return Err(ClientError::WebSocket(if reason.is_empty() {
                    format!("connection closed with code {}", u16::from(close.code))
                } else {
                    reason.to_string()
                }));
            }
            Message::Close(_) => return Ok(None),
            _ => continue,
        }
    }
    Ok(None)
}

pub(crate) async fn close(socket: &mut WsStream) -> Result<(), ClientError> {
    match socket.close(None).await {
        Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
        Err(err) => Err(ClientError::websocket(err)),
    }
}
