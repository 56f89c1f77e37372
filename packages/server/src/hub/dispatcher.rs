//! Connection registry and the single dispatch task.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bounce_shared::time::{Clock, SystemClock};
use tokio::sync::{RwLock, mpsc};

use super::{
    ClientGateway, HubListener,
    connection::{Connection, Inbound, PreparedMessage},
    responder::{ClientRequest, Responder},
};
use crate::{
    cancel::{CancelReceiver, cancelled},
    domain::{ClientId, ConnStatus, ConnectionError, FrameSink, FrameStream, HubError, ResponseStatus},
    infrastructure::dto::websocket::{ClientMsg, ClientNotify, ServerMsg},
};

/// Statuses that receive chat broadcasts
pub const CHAT_AUDIENCE: [ConnStatus; 2] = [ConnStatus::Authenticated, ConnStatus::InGame];

/// Debug view of one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub client_id: ClientId,
    pub status: ConnStatus,
    pub connected_at: i64,
}

/// Connection Hub
///
/// Cheap to clone; every clone shares the same registry.
#[derive(Clone)]
pub struct Hub {
    connections: Arc<RwLock<HashMap<ClientId, Arc<Connection>>>>,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    error_tx: mpsc::UnboundedSender<ConnectionError>,
    listener: Arc<dyn HubListener>,
    shutdown: CancelReceiver,
    clock: Arc<dyn Clock>,
}

/// The hub's dispatch loop. Run it on exactly one task.
pub struct HubDispatcher {
    hub: Hub,
    inbound_rx: mpsc::UnboundedReceiver<Inbound>,
    error_rx: mpsc::UnboundedReceiver<ConnectionError>,
}

impl Hub {
    pub fn new(listener: Arc<dyn HubListener>, shutdown: CancelReceiver) -> (Self, HubDispatcher) {
        Self::with_clock(listener, shutdown, Arc::new(SystemClock))
    }

    pub fn with_clock(
        listener: Arc<dyn HubListener>,
        shutdown: CancelReceiver,
        clock: Arc<dyn Clock>,
    ) -> (Self, HubDispatcher) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();
        let hub = Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            inbound_tx,
            error_tx,
            listener,
            shutdown,
            clock,
        };
        let dispatcher = HubDispatcher {
            hub: hub.clone(),
            inbound_rx,
            error_rx,
        };
        (hub, dispatcher)
    }

    /// Register a new connection with status Connected and start reading from it.
    pub async fn connect(
        &self,
        client_id: ClientId,
        sink: Box<dyn FrameSink>,
        stream: FrameStream,
    ) -> Result<(), HubError> {
        let mut connections = self.connections.write().await;
        if connections.contains_key(&client_id) {
            return Err(HubError::DuplicateClientId(client_id.into_string()));
        }

        let conn = Connection::spawn(
            client_id.clone(),
            sink,
            stream,
            self.clock.now_millis(),
            self.inbound_tx.clone(),
            self.error_tx.clone(),
            self.shutdown.clone(),
        );
        connections.insert(client_id.clone(), conn);
        tracing::info!(
            "Client '{}' connected ({} connections)",
            client_id,
            connections.len()
        );
        Ok(())
    }

    pub async fn contains(&self, client_id: &ClientId) -> bool {
        self.connections.read().await.contains_key(client_id)
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Snapshot of every connection, ordered by client ID.
    pub async fn connections(&self) -> Vec<ConnectionInfo> {
        let conns = self.snapshot().await;
        let mut infos = Vec::with_capacity(conns.len());
        for conn in conns {
            infos.push(ConnectionInfo {
                client_id: conn.client_id().clone(),
                status: conn.status().await,
                connected_at: conn.connected_at(),
            });
        }
        infos.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        infos
    }

    /// Returns `false` when the client is not connected.
    pub async fn change_status(&self, client_id: &ClientId, status: ConnStatus) -> bool {
        match self.get(client_id).await {
            Some(conn) => {
                conn.change_status(status).await;
                true
            }
            None => false,
        }
    }

    /// Send `msg` to one client on a separate task.
    pub async fn unicast(&self, client_id: &ClientId, msg: ServerMsg) {
        let Some(conn) = self.get(client_id).await else {
            tracing::debug!("Unicast to unknown client '{}' dropped", client_id);
            return;
        };
        tokio::spawn(async move {
            conn.send_json(&msg).await;
        });
    }

    /// Encode `msg` once and send it to every connection whose status is in
    /// `statuses` (empty selects all). Each write runs on its own task.
    pub async fn broadcast(&self, msg: &ServerMsg, statuses: &[ConnStatus]) -> usize {
        let prepared = match PreparedMessage::encode(msg) {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::error!("Failed to encode broadcast message: {}", e);
                return 0;
            }
        };

        let mut recipients = 0;
        for conn in self.snapshot().await {
            if !conn.status().await.matches_any(statuses) {
                continue;
            }
            recipients += 1;
            let prepared = prepared.clone();
            tokio::spawn(async move {
                conn.send_prepared(&prepared).await;
            });
        }
        recipients
    }

    async fn get(&self, client_id: &ClientId) -> Option<Arc<Connection>> {
        self.connections.read().await.get(client_id).cloned()
    }

    async fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.connections.read().await.values().cloned().collect()
    }

    async fn remove(&self, client_id: &ClientId) -> Option<Arc<Connection>> {
        self.connections.write().await.remove(client_id)
    }

    async fn handle_inbound(&self, inbound: Inbound) {
        match inbound {
            Inbound::Message { client_id, msg } => match msg {
                ClientMsg::Notify {
                    notify: ClientNotify::Chat { chat },
                } => {
                    let recipients = self.broadcast(&ServerMsg::chat(chat), &CHAT_AUDIENCE).await;
                    tracing::debug!("Chat from '{}' sent to {} clients", client_id, recipients);
                }
                ClientMsg::Notify {
                    notify: ClientNotify::Control { control },
                } => {
                    self.listener.on_control(&client_id, control).await;
                }
                ClientMsg::Request { request } => {
                    let responder =
                        Responder::new(Arc::new(self.clone()), client_id.clone(), &request.request_id);
                    let request = ClientRequest {
                        client_id,
                        request_id: request.request_id,
                        request_type: request.request_type,
                        request_body: request.request_body,
                        responder,
                    };
                    self.listener.on_request(request).await;
                }
            },
            Inbound::Malformed {
                client_id,
                request_id,
                reason,
            } => {
                tracing::warn!(
                    "Malformed request {} from '{}': {}",
                    request_id,
                    client_id,
                    reason
                );
                Responder::new(Arc::new(self.clone()), client_id, request_id)
                    .respond_text(ResponseStatus::BadRequest, reason)
                    .await;
            }
        }
    }

    async fn handle_error(&self, error: ConnectionError) {
        if error.code() == ConnectionError::CLOSED {
            tracing::info!("{}", error);
        } else {
            tracing::error!("{}", error);
        }

        let Ok(client_id) = ClientId::new(error.conn_id().to_string()) else {
            return;
        };
        let Some(conn) = self.remove(&client_id).await else {
            return;
        };
        conn.shutdown().await;
        tracing::info!("Client '{}' disconnected", client_id);
        self.listener.on_logout(&client_id).await;
    }

    async fn shutdown_all(&self) {
        let conns: Vec<Arc<Connection>> = self
            .connections
            .write()
            .await
            .drain()
            .map(|(_, conn)| conn)
            .collect();
        tracing::info!("Closing {} connections", conns.len());
        for conn in conns {
            conn.shutdown().await;
        }
    }
}

#[async_trait]
impl ClientGateway for Hub {
    async fn unicast(&self, client_id: &ClientId, msg: ServerMsg) {
        Hub::unicast(self, client_id, msg).await;
    }

    async fn broadcast(&self, msg: &ServerMsg, statuses: &[ConnStatus]) -> usize {
        Hub::broadcast(self, msg, statuses).await
    }

    async fn change_status(&self, client_id: &ClientId, status: ConnStatus) -> bool {
        Hub::change_status(self, client_id, status).await
    }
}

impl HubDispatcher {
    /// Handle connection errors and inbound envelopes until shutdown.
    ///
    /// Inbound envelopes are handled in arrival order and before pending
    /// errors, so a request read before a close reaches the listener before
    /// the logout. On shutdown every connection is closed.
    pub async fn run(mut self) {
        let mut shutdown = self.hub.shutdown.clone();
        loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut shutdown) => {
                    self.hub.shutdown_all().await;
                    tracing::info!("Hub dispatcher stopped");
                    return;
                }
                Some(inbound) = self.inbound_rx.recv() => {
                    self.hub.handle_inbound(inbound).await;
                }
                Some(error) = self.error_rx.recv() => {
                    self.hub.handle_error(error).await;
                }
            }
        }
    }
}
