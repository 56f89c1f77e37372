//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::ConnStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    /// Server start time (RFC 3339)
    pub started_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDto {
    pub client_id: String,
    pub status: ConnStatus,
    /// Connection time (RFC 3339)
    pub connected_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}
