//! Infrastructure layer: wire DTOs, socket transports and store implementations.

pub mod dto;
pub mod store;
pub mod transport;
