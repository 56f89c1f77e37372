//! Data Transfer Objects (DTOs) for the game server.
//!
//! - `websocket`: envelopes exchanged over the WebSocket
//! - `http`: HTTP API response DTOs
//! - `conversion`: domain model → DTO conversions

pub mod conversion;
pub mod http;
pub mod websocket;
