//! Utilities shared by the Bounce server library and binaries.

pub mod logger;
pub mod time;
