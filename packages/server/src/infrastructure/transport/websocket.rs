//! axum WebSocket を使ったトランスポート実装
//!
//! WebSocket の受付は UI 層（`ui/handler/websocket.rs`）で行われます。
//! ここではアップグレード済みのソケットを書き込み側と読み込み側に分割し、
//! Hub が扱う `FrameSink` / `FrameStream` に変換します。

use async_trait::async_trait;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};

use crate::domain::{Frame, FrameSink, FrameStream, TransportError};

/// Write half of an axum WebSocket
pub struct WebSocketSink {
    sender: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl FrameSink for WebSocketSink {
    async fn send_text(&mut self, text: Utf8Bytes) -> Result<(), TransportError> {
        self.sender
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::new(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sender
            .close()
            .await
            .map_err(|e| TransportError::new(e.to_string()))
    }
}

/// Split an upgraded socket into the halves a connection works with.
pub fn split_socket(socket: WebSocket) -> (Box<dyn FrameSink>, FrameStream) {
    let (sender, receiver) = socket.split();
    let frames = receiver.map(|msg| match msg {
        Ok(Message::Text(text)) => Ok(Frame::Text(text.to_string())),
        Ok(Message::Close(_)) => Ok(Frame::Close),
        Ok(_) => Ok(Frame::Other),
        Err(e) => Err(TransportError::new(e.to_string())),
    });
    (Box::new(WebSocketSink { sender }), Box::pin(frames))
}
