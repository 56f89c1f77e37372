//! Request handlers.

mod http;
mod websocket;

pub use http::{get_config, get_connections, get_store_tree, get_store_value, get_world, health_check};
pub use websocket::websocket_handler;
