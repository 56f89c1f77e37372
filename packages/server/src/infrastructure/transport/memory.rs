//! In-process transport used by unit tests.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::extract::ws::Utf8Bytes;
use tokio::sync::mpsc;

use crate::domain::{Frame, FrameSink, FrameStream, TransportError};

pub struct MemorySink {
    outbound: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
    fail_writes: bool,
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send_text(&mut self, text: Utf8Bytes) -> Result<(), TransportError> {
        if self.fail_writes || self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::new("Write error 420"));
        }
        self.outbound
            .send(text.to_string())
            .map_err(|e| TransportError::new(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Test side of an in-memory socket
pub struct MemoryPeer {
    outbound: mpsc::UnboundedReceiver<String>,
    inbound: mpsc::UnboundedSender<Result<Frame, TransportError>>,
    closed: Arc<AtomicBool>,
}

impl MemoryPeer {
    /// Next text frame written by the server, or `None` after one second.
    pub async fn recv(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(1), self.outbound.recv())
            .await
            .ok()
            .flatten()
    }

    /// Next frame decoded as JSON.
    pub async fn recv_json(&mut self) -> Option<serde_json::Value> {
        let text = self.recv().await?;
        serde_json::from_str(&text).ok()
    }

    /// Whether nothing is written within `wait`.
    pub async fn is_silent(&mut self, wait: Duration) -> bool {
        tokio::time::timeout(wait, self.outbound.recv()).await.is_err()
    }

    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.inbound.send(Ok(Frame::Text(text.into())));
    }

    pub fn send_close(&self) {
        let _ = self.inbound.send(Ok(Frame::Close));
    }

    pub fn send_error(&self, detail: &str) {
        let _ = self.inbound.send(Err(TransportError::new(detail)));
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// An in-memory socket: the server halves and the test peer.
pub fn memory_socket() -> (Box<dyn FrameSink>, FrameStream, MemoryPeer) {
    build(false)
}

/// Like [`memory_socket`] but every write fails.
pub fn failing_socket() -> (Box<dyn FrameSink>, FrameStream, MemoryPeer) {
    build(true)
}

fn build(fail_writes: bool) -> (Box<dyn FrameSink>, FrameStream, MemoryPeer) {
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let closed = Arc::new(AtomicBool::new(false));

    let sink = MemorySink {
        outbound: out_tx,
        closed: closed.clone(),
        fail_writes,
    };
    let stream = futures_util::stream::unfold(in_rx, |mut rx| async move {
        rx.recv().await.map(|frame| (frame, rx))
    });
    let peer = MemoryPeer {
        outbound: out_rx,
        inbound: in_tx,
        closed,
    };
    (Box::new(sink), Box::pin(stream), peer)
}
