//! WebSocket envelopes.
//!
//! Every frame is a JSON object whose `msg_type` field selects the payload.

use serde::{Deserialize, Serialize};

use crate::domain::{
    ResponseStatus,
    world::{WorldMap, WorldRules},
};

// ========================================
// Client → Server
// ========================================

/// Envelope sent by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "msg_type", rename_all = "lowercase")]
pub enum ClientMsg {
    Notify { notify: ClientNotify },
    Request { request: ClientRequestDto },
}

/// Fire-and-forget message from a client. Never answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notify_type", rename_all = "lowercase")]
pub enum ClientNotify {
    Chat { chat: ChatNotify },
    Control { control: ControlNotify },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatNotify {
    pub channel: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlNotify {
    /// `keydown` or `keyup`
    pub control_type: String,
    /// `left`, `right`, `up` or `jump`
    pub control_key: String,
}

/// Request from a client. Answered by exactly one response with the same `request_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRequestDto {
    pub request_id: String,
    pub request_type: String,
    /// Request specific body, usually JSON encoded
    #[serde(default)]
    pub request_body: String,
}

/// Pull `request.request_id` out of a frame that failed to decode as a [`ClientMsg`].
pub fn extract_request_id(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    match value.get("request")?.get("request_id")? {
        serde_json::Value::String(id) => Some(id.clone()),
        serde_json::Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

// ========================================
// Server → Client
// ========================================

/// Envelope sent by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg_type", rename_all = "lowercase")]
pub enum ServerMsg {
    Chat { chat: ChatNotify },
    Update { world_update: WorldUpdate },
    Response { response: ServerResponse },
}

impl ServerMsg {
    pub fn chat(chat: ChatNotify) -> Self {
        ServerMsg::Chat { chat }
    }

    pub fn update(
        frame: u64,
        players: Vec<PlayerSnapshot>,
        world_objects: Vec<ObjectSnapshot>,
    ) -> Self {
        ServerMsg::Update {
            world_update: WorldUpdate {
                frame,
                players,
                world_objects,
            },
        }
    }

    pub fn response(
        request_id: impl Into<String>,
        status: ResponseStatus,
        payload: serde_json::Value,
    ) -> Self {
        ServerMsg::Response {
            response: ServerResponse {
                request_id: request_id.into(),
                status,
                status_text: status.status_text().to_string(),
                payload,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldUpdate {
    pub frame: u64,
    pub players: Vec<PlayerSnapshot>,
    pub world_objects: Vec<ObjectSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse {
    pub request_id: String,
    pub status: ResponseStatus,
    pub status_text: String,
    pub payload: serde_json::Value,
}

/// Public view of a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub name: String,
    pub color: String,
    pub round_wins: u32,
    pub round_score: u32,
    pub total_score: u32,
}

/// Public view of a world object. Coordinates are rounded to whole pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub id: String,
    pub obj_type: String,
    pub anim: u8,
    pub effect: String,
    pub x: i64,
    pub y: i64,
    pub flip_x: bool,
    pub flip_y: bool,
}

/// Full world state, sent with a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldDump {
    pub world_rules: WorldRules,
    pub world_map: WorldMap,
    pub players: Vec<PlayerSnapshot>,
    pub world_objects: Vec<ObjectSnapshot>,
}
