//! Frames exchanged with the server.

use std::fmt;

use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, Message};

/// One WebSocket frame, detached from the tungstenite types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebSocketMessage {
    /// UTF-8 data frame.
    Text(String),
    /// Binary data frame; Gremlin requests and responses travel this way.
    Binary(Vec<u8>),
    /// Heartbeat request.
    Ping(Vec<u8>),
    /// Heartbeat answer.
    Pong(Vec<u8>),
    /// Close handshake, with the peer's status if it sent one.
    Close(Option<CloseReason>),
}

/// Status carried by a close frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReason {
    /// RFC 6455 close code, 1000 for a normal close.
    pub code: u16,
    /// Free-form text from the peer.
    pub reason: String,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "code {}", self.code)
        } else {
            write!(f, "code {}: {}", self.code, self.reason)
        }
    }
}

impl WebSocketMessage {
    /// Text frame.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Binary frame.
    #[must_use]
    pub fn binary(data: impl Into<Vec<u8>>) -> Self {
        Self::Binary(data.into())
    }

    /// Close frame with a status.
    #[must_use]
    pub fn close(code: u16, reason: impl Into<String>) -> Self {
        Self::Close(Some(CloseReason {
            code,
            reason: reason.into(),
        }))
    }

    /// Converts a received frame; raw partial frames yield `None`.
    pub(crate) fn from_frame(frame: Message) -> Option<Self> {
        Some(match frame {
            Message::Text(text) => Self::Text(text),
            Message::Binary(bytes) => Self::Binary(bytes),
            Message::Ping(bytes) => Self::Ping(bytes),
            Message::Pong(bytes) => Self::Pong(bytes),
            Message::Close(close) => Self::Close(close.map(|c| CloseReason {
                code: c.code.into(),
                reason: c.reason.into_owned(),
            })),
            Message::Frame(_) => return None,
        })
    }

    /// Payload of a data frame; `None` for control frames.
    #[must_use]
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Self::Text(text) => Some(text.as_bytes()),
            Self::Binary(bytes) => Some(bytes),
            Self::Ping(_) | Self::Pong(_) | Self::Close(_) => None,
        }
    }
}

impl From<WebSocketMessage> for Message {
    fn from(message: WebSocketMessage) -> Self {
        match message {
            WebSocketMessage::Text(text) => Self::Text(text),
            WebSocketMessage::Binary(bytes) => Self::Binary(bytes),
            WebSocketMessage::Ping(bytes) => Self::Ping(bytes),
            WebSocketMessage::Pong(bytes) => Self::Pong(bytes),
            WebSocketMessage::Close(reason) => Self::Close(reason.map(|r| CloseFrame {
                code: CloseCode::from(r.code),
                reason: r.reason.into(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_data_frames_have_payload() {
        assert_eq!(WebSocketMessage::text("g.V()").data(), Some(&b"g.V()"[..]));
        assert_eq!(WebSocketMessage::binary(vec![0x10]).data(), Some(&[0x10][..]));
        assert!(WebSocketMessage::Ping(vec![1]).data().is_none());
        assert!(WebSocketMessage::close(1000, "done").data().is_none());
    }

    #[test]
    fn test_close_frame_keeps_code_and_reason() {
        let frame = Message::from(WebSocketMessage::close(1001, "going away"));
        assert!(matches!(frame, Message::Close(Some(ref c)) if c.code == CloseCode::Away));

        let back = WebSocketMessage::from_frame(frame).unwrap();
        assert_eq!(back, WebSocketMessage::close(1001, "going away"));
        assert_eq!(
            WebSocketMessage::from_frame(Message::Binary(vec![1, 2])),
            Some(WebSocketMessage::binary(vec![1, 2]))
        );
    }

    #[test]
    fn test_close_reason_display() {
        let reason = CloseReason {
            code: 1011,
            reason: "internal error".to_string(),
        };
        assert_eq!(reason.to_string(), "code 1011: internal error");

        let bare = CloseReason {
            code: 1000,
            reason: String::new(),
        };
        assert_eq!(bare.to_string(), "code 1000");
    }
}
