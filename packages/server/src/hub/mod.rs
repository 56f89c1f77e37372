//! Connection Hub
//!
//! Owns every client connection, routes inbound envelopes to a
//! [`HubListener`] and fans outbound envelopes out to connections.
//!
//! ## 依存関係
//!
//! - Hub → HubListener: リクエスト・ログアウト・操作通知を渡す
//! - Game → ClientGateway: 送信とステータス変更だけを Hub に依頼する

mod connection;
mod dispatcher;
mod responder;

use async_trait::async_trait;

use crate::{
    domain::{ClientId, ConnStatus},
    infrastructure::dto::websocket::{ControlNotify, ServerMsg},
};

pub use connection::{Connection, PreparedMessage};
pub use dispatcher::{ConnectionInfo, Hub, HubDispatcher};
pub use responder::{ClientRequest, Responder};

/// Receiver of the events the hub does not handle itself
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HubListener: Send + Sync {
    /// A client sent a request. The listener must answer it through `request.responder`.
    ///
    /// Called on the dispatch task, so it must not block.
    async fn on_request(&self, request: ClientRequest);

    /// A connection that was registered with the hub is gone.
    async fn on_logout(&self, client_id: &ClientId);

    /// A client sent a control notify. Best effort.
    async fn on_control(&self, client_id: &ClientId, control: ControlNotify);
}

/// Outbound operations the game loop and responders need from the hub
#[async_trait]
pub trait ClientGateway: Send + Sync {
    /// Send one envelope to one client. Unknown clients are ignored.
    async fn unicast(&self, client_id: &ClientId, msg: ServerMsg);

    /// Send one envelope to every connection whose status is in `statuses`
    /// (empty selects all). Returns the number of recipients.
    async fn broadcast(&self, msg: &ServerMsg, statuses: &[ConnStatus]) -> usize;

    /// Change the status of a connection. Returns `false` when the client is
    /// no longer connected.
    async fn change_status(&self, client_id: &ClientId, status: ConnStatus) -> bool;
}
