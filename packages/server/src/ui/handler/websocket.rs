//! WebSocket upgrade handler.

use std::sync::Arc;

use axum::{
    extract::{Query, State, ws::WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{domain::ClientId, infrastructure::transport::split_socket, ui::state::AppState};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub client_id: Option<String>,
}

/// `GET /ws?client_id=...`
///
/// The socket is handed to the hub after the upgrade; from then on the hub
/// owns it until either side closes.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let Some(client_id_str) = query.client_id else {
        tracing::warn!("Connection without client_id rejected");
        return Err(StatusCode::BAD_REQUEST);
    };

    // Convert String -> ClientId (Domain Model)
    let client_id = match ClientId::try_from(client_id_str.clone()) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Invalid client_id format: '{}' ({})", client_id_str, e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    if state.hub.contains(&client_id).await {
        tracing::warn!(
            "Client with ID '{}' is already connected. Rejecting connection.",
            client_id
        );
        return Err(StatusCode::CONFLICT);
    }

    Ok(ws.on_upgrade(move |socket| async move {
        let (sink, stream) = split_socket(socket);
        // 同じ client_id が同時にアップグレードした場合は後着を切断する
        if let Err(e) = state.hub.connect(client_id, sink, stream).await {
            tracing::warn!("Dropping upgraded socket: {}", e);
        }
    }))
}
