//! Shared application state.

use std::sync::Arc;

use crate::{config::Config, domain::KeyValueStore, game::Game, hub::Hub};

/// State handed to every HTTP / WebSocket handler
pub struct AppState {
    /// Connection Hub（接続の登録・送信）
    pub hub: Hub,
    /// Simulation Loop（ワールドの読み出し）
    pub game: Arc<Game>,
    /// 起動時に確定した設定
    pub config: Arc<Config>,
    pub store: Arc<dyn KeyValueStore>,
    /// Server start time (Unix milliseconds)
    pub started_at: i64,
}
