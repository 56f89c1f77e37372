//! One client connection: a locked socket writer and a read loop.

use std::sync::Arc;

use axum::extract::ws::Utf8Bytes;
use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock, mpsc, watch};

use crate::{
    cancel::{CancelReceiver, CancelSender, cancelled},
    domain::{ClientId, ConnStatus, ConnectionError, Frame, FrameSink, FrameStream},
    infrastructure::dto::websocket::{ClientMsg, extract_request_id},
};

/// Envelope read from a connection, annotated with its owner
#[derive(Debug)]
pub(crate) enum Inbound {
    Message {
        client_id: ClientId,
        msg: ClientMsg,
    },
    /// A request frame that could not be decoded but carries a request ID
    Malformed {
        client_id: ClientId,
        request_id: String,
        reason: String,
    },
}

/// A server envelope encoded once and shared by every broadcast recipient
#[derive(Debug, Clone)]
pub struct PreparedMessage(Utf8Bytes);

impl PreparedMessage {
    pub fn encode<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_string(value).map(|text| Self(text.into()))
    }
}

pub struct Connection {
    client_id: ClientId,
    sink: Mutex<Box<dyn FrameSink>>,
    status: RwLock<ConnStatus>,
    /// Unix milliseconds
    connected_at: i64,
    error_tx: mpsc::UnboundedSender<ConnectionError>,
    cancel: CancelSender,
}

impl Connection {
    /// Register the socket halves and start the read loop.
    ///
    /// The loop stops on peer close, read error, `shutdown` or the `parent` signal.
    pub(crate) fn spawn(
        client_id: ClientId,
        sink: Box<dyn FrameSink>,
        stream: FrameStream,
        connected_at: i64,
        inbound_tx: mpsc::UnboundedSender<Inbound>,
        error_tx: mpsc::UnboundedSender<ConnectionError>,
        parent: CancelReceiver,
    ) -> Arc<Self> {
        let (cancel, own) = watch::channel(false);
        let conn = Arc::new(Self {
            client_id: client_id.clone(),
            sink: Mutex::new(sink),
            status: RwLock::new(ConnStatus::Connected),
            connected_at,
            error_tx: error_tx.clone(),
            cancel,
        });

        tokio::spawn(read_loop(
            client_id, stream, inbound_tx, error_tx, own, parent,
        ));
        conn
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn connected_at(&self) -> i64 {
        self.connected_at
    }

    pub async fn status(&self) -> ConnStatus {
        *self.status.read().await
    }

    pub async fn change_status(&self, status: ConnStatus) {
        let mut current = self.status.write().await;
        tracing::debug!(
            "Connection {} status {:?} -> {:?}",
            self.client_id,
            *current,
            status
        );
        *current = status;
    }

    /// Write a raw text frame.
    pub async fn send(&self, text: String) {
        self.write("Write Raw", text.into()).await;
    }

    /// Encode `value` as JSON and write it. Encoding failures are logged and nothing is written.
    pub async fn send_json<T: Serialize + Sync>(&self, value: &T) {
        match serde_json::to_string(value) {
            Ok(text) => self.write("Write JSON", text.into()).await,
            Err(e) => tracing::error!(
                "Failed to encode message for connection {}: {}",
                self.client_id,
                e
            ),
        }
    }

    pub async fn send_prepared(&self, prepared: &PreparedMessage) {
        self.write("Write Prepared Message", prepared.0.clone())
            .await;
    }

    /// Stop the read loop and close the socket.
    pub async fn shutdown(&self) {
        self.cancel.send_replace(true);
        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.close().await {
            tracing::debug!("Failed to close connection {}: {}", self.client_id, e);
        }
    }

    async fn write(&self, action: &str, text: Utf8Bytes) {
        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.send_text(text).await {
            let error = ConnectionError::new(
                self.client_id.as_str(),
                action,
                ConnectionError::WRITE_FAILED,
                [e],
            );
            let _ = self.error_tx.send(error);
        }
    }
}

async fn read_loop(
    client_id: ClientId,
    mut stream: FrameStream,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    error_tx: mpsc::UnboundedSender<ConnectionError>,
    mut own: CancelReceiver,
    mut parent: CancelReceiver,
) {
    loop {
        tokio::select! {
            _ = cancelled(&mut own) => {
                tracing::debug!("Read loop of {} stopped", client_id);
                return;
            }
            _ = cancelled(&mut parent) => {
                tracing::debug!("Read loop of {} stopped by shutdown", client_id);
                return;
            }
            frame = stream.next() => {
                match frame {
                    Some(Ok(Frame::Text(text))) => handle_text(&client_id, &text, &inbound_tx),
                    Some(Ok(Frame::Other)) => {}
                    Some(Ok(Frame::Close)) | None => {
                        let _ = error_tx.send(ConnectionError::new(
                            client_id.as_str(),
                            "Read Message",
                            ConnectionError::CLOSED,
                            ["Connection closed by peer"],
                        ));
                        return;
                    }
                    Some(Err(e)) => {
                        let _ = error_tx.send(ConnectionError::new(
                            client_id.as_str(),
                            "Read Message",
                            ConnectionError::READ_FAILED,
                            [e],
                        ));
                        return;
                    }
                }
            }
        }
    }
}

fn handle_text(client_id: &ClientId, text: &str, inbound_tx: &mpsc::UnboundedSender<Inbound>) {
    tracing::debug!("Received from {}: {}", client_id, text);
    let inbound = match serde_json::from_str::<ClientMsg>(text) {
        Ok(msg) => Inbound::Message {
            client_id: client_id.clone(),
            msg,
        },
        Err(e) => match extract_request_id(text) {
            Some(request_id) => Inbound::Malformed {
                client_id: client_id.clone(),
                request_id,
                reason: format!("Invalid ClientMsg JSON: {e}"),
            },
            None => {
                let error = ConnectionError::new(
                    client_id.as_str(),
                    "Unmarshal Message",
                    ConnectionError::DECODE_FAILED,
                    [e],
                );
                tracing::warn!("{}", error);
                return;
            }
        },
    };
    let _ = inbound_tx.send(inbound);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        cancel::cancel_channel,
        infrastructure::transport::memory::{failing_socket, memory_socket},
    };

    struct Fixture {
        conn: Arc<Connection>,
        inbound_rx: mpsc::UnboundedReceiver<Inbound>,
        error_rx: mpsc::UnboundedReceiver<ConnectionError>,
        shutdown: CancelSender,
    }

    fn spawn_with(sink: Box<dyn FrameSink>, stream: FrameStream) -> Fixture {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();
        let (shutdown, parent) = cancel_channel();
        let client_id = ClientId::new("c1".to_string()).unwrap();
        let conn = Connection::spawn(
            client_id, sink, stream, 1000, inbound_tx, error_tx, parent,
        );
        Fixture {
            conn,
            inbound_rx,
            error_rx,
            shutdown,
        }
    }

    async fn recv<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Option<T> {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn test_new_connection_is_connected() {
        // テスト項目: 新しい接続のステータスは Connected
        // given (前提条件):
        let (sink, stream, _peer) = memory_socket();

        // when (操作):
        let fixture = spawn_with(sink, stream);

        // then (期待する結果):
        assert_eq!(fixture.conn.status().await, ConnStatus::Connected);
        assert_eq!(fixture.conn.connected_at(), 1000);
        fixture.conn.change_status(ConnStatus::InGame).await;
        assert_eq!(fixture.conn.status().await, ConnStatus::InGame);
    }

    #[tokio::test]
    async fn test_send_variants_write_frames() {
        // テスト項目: send / send_json / send_prepared がフレームを書き込む
        // given (前提条件):
        let (sink, stream, mut peer) = memory_socket();
        let fixture = spawn_with(sink, stream);
        let prepared = PreparedMessage::encode(&serde_json::json!({"k": 1})).unwrap();

        // when (操作):
        fixture.conn.send("raw".to_string()).await;
        fixture.conn.send_json(&serde_json::json!(["a"])).await;
        fixture.conn.send_prepared(&prepared).await;

        // then (期待する結果):
        assert_eq!(peer.recv().await.as_deref(), Some("raw"));
        assert_eq!(peer.recv().await.as_deref(), Some(r#"["a"]"#));
        assert_eq!(peer.recv().await.as_deref(), Some(r#"{"k":1}"#));
    }

    #[tokio::test]
    async fn test_write_failure_reported_as_error() {
        // テスト項目: 書き込み失敗はエラーチャネルに -1 として通知される
        // given (前提条件):
        let (sink, stream, _peer) = failing_socket();
        let mut fixture = spawn_with(sink, stream);

        // when (操作):
        fixture.conn.send("hello".to_string()).await;

        // then (期待する結果):
        let error = recv(&mut fixture.error_rx).await.unwrap();
        assert_eq!(error.code(), ConnectionError::WRITE_FAILED);
        assert_eq!(error.action(), "Write Raw");
        assert_eq!(error.conn_id(), "c1");
        assert_eq!(error.text(), "Write error 420");
    }

    #[tokio::test]
    async fn test_text_frame_published_as_inbound() {
        // テスト項目: 受信したテキストフレームがクライアント ID 付きで通知される
        // given (前提条件):
        let (sink, stream, peer) = memory_socket();
        let mut fixture = spawn_with(sink, stream);

        // when (操作):
        peer.send_text(
            r#"{"msg_type":"notify","notify":{"notify_type":"chat","chat":{"channel":"g","message":"hi"}}}"#,
        );

        // then (期待する結果):
        match recv(&mut fixture.inbound_rx).await.unwrap() {
            Inbound::Message { client_id, msg } => {
                assert_eq!(client_id.as_str(), "c1");
                assert!(matches!(msg, ClientMsg::Notify { .. }));
            }
            other => panic!("unexpected inbound {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_request_keeps_request_id() {
        // テスト項目: デコードできないリクエストは request_id 付きで通知され、接続は継続する
        // given (前提条件):
        let (sink, stream, peer) = memory_socket();
        let mut fixture = spawn_with(sink, stream);

        // when (操作):
        peer.send_text(r#"{"msg_type":"request","request":{"request_id":"r1"}}"#);
        peer.send_text("garbage");
        peer.send_text(r#"{"msg_type":"request","request":{"request_id":"r2","request_type":"login"}}"#);

        // then (期待する結果):
        match recv(&mut fixture.inbound_rx).await.unwrap() {
            Inbound::Malformed { request_id, .. } => assert_eq!(request_id, "r1"),
            other => panic!("unexpected inbound {other:?}"),
        }
        match recv(&mut fixture.inbound_rx).await.unwrap() {
            Inbound::Message { msg, .. } => assert!(matches!(msg, ClientMsg::Request { .. })),
            other => panic!("unexpected inbound {other:?}"),
        }
        assert!(fixture.error_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_peer_close_and_read_error() {
        // テスト項目: 切断は -4、読み込みエラーは -2 として通知される
        // given (前提条件):
        let (sink_a, stream_a, peer_a) = memory_socket();
        let (sink_b, stream_b, peer_b) = memory_socket();
        let mut closed = spawn_with(sink_a, stream_a);
        let mut failed = spawn_with(sink_b, stream_b);

        // when (操作):
        peer_a.send_close();
        peer_b.send_error("boom");

        // then (期待する結果):
        let error = recv(&mut closed.error_rx).await.unwrap();
        assert_eq!(error.code(), ConnectionError::CLOSED);
        let error = recv(&mut failed.error_rx).await.unwrap();
        assert_eq!(error.code(), ConnectionError::READ_FAILED);
        assert_eq!(error.text(), "boom");
    }

    #[tokio::test]
    async fn test_shutdown_stops_read_loop_and_closes_sink() {
        // テスト項目: shutdown で読み込みループが止まりソケットが閉じられる
        // given (前提条件):
        let (sink, stream, peer) = memory_socket();
        let mut fixture = spawn_with(sink, stream);

        // when (操作):
        fixture.conn.shutdown().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        peer.send_text(r#"{"msg_type":"notify","notify":{"notify_type":"chat","chat":{"channel":"g","message":"late"}}}"#);

        // then (期待する結果):
        assert!(peer.is_closed());
        assert!(recv(&mut fixture.inbound_rx).await.is_none());
        assert!(fixture.error_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_parent_cancellation_stops_read_loop() {
        // テスト項目: 親のキャンセルで読み込みループが止まる
        // given (前提条件):
        let (sink, stream, peer) = memory_socket();
        let mut fixture = spawn_with(sink, stream);

        // when (操作):
        fixture.shutdown.send_replace(true);
        tokio::time::sleep(Duration::from_millis(20)).await;
        peer.send_close();

        // then (期待する結果):
        assert!(recv(&mut fixture.error_rx).await.is_none());
    }
}
