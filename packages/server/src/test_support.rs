//! Test doubles shared by unit tests.

use std::{
    collections::HashSet,
    future::Future,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{
    domain::{ClientId, ConnStatus},
    hub::ClientGateway,
    infrastructure::dto::websocket::ServerMsg,
};

/// One call made on a [`RecordingGateway`]
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Unicast {
        client_id: ClientId,
        msg: ServerMsg,
    },
    Broadcast {
        msg: ServerMsg,
        statuses: Vec<ConnStatus>,
    },
    ChangeStatus {
        client_id: ClientId,
        status: ConnStatus,
    },
}

/// ClientGateway that records every call
///
/// Every client counts as connected until [`RecordingGateway::disconnect`] is called.
pub struct RecordingGateway {
    tx: mpsc::UnboundedSender<GatewayEvent>,
    disconnected: Mutex<HashSet<ClientId>>,
}

impl RecordingGateway {
    pub fn new() -> (Arc<Self>, GatewayEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        let gateway = Self {
            tx,
            disconnected: Mutex::new(HashSet::new()),
        };
        (Arc::new(gateway), GatewayEvents { rx })
    }

    pub fn disconnect(&self, client_id: &ClientId) {
        self.disconnected.lock().unwrap().insert(client_id.clone());
    }
}

#[async_trait]
impl ClientGateway for RecordingGateway {
    async fn unicast(&self, client_id: &ClientId, msg: ServerMsg) {
        let _ = self.tx.send(GatewayEvent::Unicast {
            client_id: client_id.clone(),
            msg,
        });
    }

    async fn broadcast(&self, msg: &ServerMsg, statuses: &[ConnStatus]) -> usize {
        let _ = self.tx.send(GatewayEvent::Broadcast {
            msg: msg.clone(),
            statuses: statuses.to_vec(),
        });
        0
    }

    async fn change_status(&self, client_id: &ClientId, status: ConnStatus) -> bool {
        let _ = self.tx.send(GatewayEvent::ChangeStatus {
            client_id: client_id.clone(),
            status,
        });
        !self.disconnected.lock().unwrap().contains(client_id)
    }
}

pub struct GatewayEvents {
    rx: mpsc::UnboundedReceiver<GatewayEvent>,
}

impl GatewayEvents {
    /// Next recorded call, or `None` after one second.
    pub async fn next(&mut self) -> Option<GatewayEvent> {
        tokio::time::timeout(Duration::from_secs(1), self.rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Next recorded call that is not a broadcast.
    pub async fn next_direct(&mut self) -> Option<GatewayEvent> {
        loop {
            match self.next().await? {
                GatewayEvent::Broadcast { .. } => continue,
                other => return Some(other),
            }
        }
    }

    /// Whether nothing is recorded within 100ms.
    pub async fn is_silent(&mut self) -> bool {
        tokio::time::timeout(Duration::from_millis(100), self.rx.recv())
            .await
            .is_err()
    }
}

/// Poll `check` for up to one second.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
