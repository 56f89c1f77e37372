//! Socket implementations of the `FrameSink` / `FrameStream` seam.
//!
//! - `websocket`: axum WebSocket
//! - `memory`: in-process channels for tests

#[cfg(test)]
pub mod memory;
pub mod websocket;

pub use websocket::{WebSocketSink, split_socket};
