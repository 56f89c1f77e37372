//! HTTP / WebSocket surface of the game server.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, router};
pub use signal::shutdown_signal;
