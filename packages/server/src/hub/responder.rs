//! One-shot reply handle bound to a client request.

use std::{fmt, sync::Arc};

use serde::Serialize;
use serde_json::Value;

use super::ClientGateway;
use crate::{
    domain::{ClientId, ResponseStatus},
    infrastructure::dto::websocket::ServerMsg,
};

pub const JSON_MARSHAL_ERROR: &str = "JSON Marshal error";
pub const DROPPED_WITHOUT_RESPONSE: &str = "Request dropped without response";

/// A decoded client request together with its responder
#[derive(Debug)]
pub struct ClientRequest {
    pub client_id: ClientId,
    pub request_id: String,
    pub request_type: String,
    pub request_body: String,
    pub responder: Responder,
}

/// Sends the single response of a request.
///
/// Both `respond_*` methods consume the responder. A responder dropped
/// without answering sends a ServerError response instead.
pub struct Responder {
    gateway: Arc<dyn ClientGateway>,
    client_id: ClientId,
    request_id: String,
    responded: bool,
}

impl Responder {
    pub fn new(
        gateway: Arc<dyn ClientGateway>,
        client_id: ClientId,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            client_id,
            request_id: request_id.into(),
            responded: false,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Respond with `text` as the payload.
    pub async fn respond_text(mut self, status: ResponseStatus, text: impl Into<String>) {
        self.send(status, Value::String(text.into())).await;
    }

    /// Respond with `value` encoded as JSON.
    ///
    /// If `value` cannot be encoded the response is a ServerError with the
    /// payload `"JSON Marshal error"`.
    pub async fn respond_json<T: Serialize + Sync>(mut self, status: ResponseStatus, value: &T) {
        match serde_json::to_value(value) {
            Ok(payload) => self.send(status, payload).await,
            Err(e) => {
                tracing::error!(
                    "Failed to encode response to request {}: {}",
                    self.request_id,
                    e
                );
                self.send(
                    ResponseStatus::ServerError,
                    Value::String(JSON_MARSHAL_ERROR.to_string()),
                )
                .await;
            }
        }
    }

    async fn send(&mut self, status: ResponseStatus, payload: Value) {
        self.responded = true;
        let msg = ServerMsg::response(self.request_id.clone(), status, payload);
        self.gateway.unicast(&self.client_id, msg).await;
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("client_id", &self.client_id)
            .field("request_id", &self.request_id)
            .field("responded", &self.responded)
            .finish()
    }
}

impl Drop for Responder {
    fn drop(&mut self) {
        if self.responded {
            return;
        }
        tracing::warn!(
            "Request {} of {} dropped without response",
            self.request_id,
            self.client_id
        );
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let gateway = self.gateway.clone();
        let client_id = self.client_id.clone();
        let msg = ServerMsg::response(
            std::mem::take(&mut self.request_id),
            ResponseStatus::ServerError,
            Value::String(DROPPED_WITHOUT_RESPONSE.to_string()),
        );
        handle.spawn(async move {
            gateway.unicast(&client_id, msg).await;
        });
    }
}
