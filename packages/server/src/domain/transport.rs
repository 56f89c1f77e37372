//! Transport seam between a connection and its duplex socket.
//!
//! The hub only sees framed text in both directions. The WebSocket
//! implementation lives in `infrastructure::transport`.

use std::pin::Pin;

use async_trait::async_trait;
use axum::extract::ws::Utf8Bytes;
use futures_util::Stream;

use super::error::TransportError;

/// Inbound frame read from a socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Close,
    /// Binary, ping and pong frames. Ignored by the read loop.
    Other,
}

/// Stream of inbound frames of one socket
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame, TransportError>> + Send>>;

/// Write half of one socket
#[async_trait]
pub trait FrameSink: Send {
    /// Write one text frame.
    async fn send_text(&mut self, text: Utf8Bytes) -> Result<(), TransportError>;

    /// Close the socket. Further writes fail.
    async fn close(&mut self) -> Result<(), TransportError>;
}
