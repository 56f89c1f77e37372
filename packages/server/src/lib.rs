//! Bounce: real-time multiplayer arena game server.
//!
//! Clients connect over WebSocket, log in to the shared world and receive a
//! world update every tick.

// layers
pub mod domain;
pub mod game;
pub mod hub;
pub mod infrastructure;
pub mod ui;

// wiring
pub mod app;
pub mod cancel;
pub mod config;

#[cfg(test)]
mod test_support;
