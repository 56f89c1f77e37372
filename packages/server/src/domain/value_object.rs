//! Value objects shared by the hub, the game loop and the wire layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

/// Maximum length of a client identifier, in characters.
pub const CLIENT_ID_MAX_LEN: usize = 64;

/// Identifier chosen by the client for its session.
///
/// Unique among the currently registered connections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyClientId);
        }
        let len = value.chars().count();
        if len > CLIENT_ID_MAX_LEN {
            return Err(ValueObjectError::ClientIdTooLong {
                max: CLIENT_ID_MAX_LEN,
                actual: len,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ClientId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of a connection.
///
/// Gates which broadcasts a connection receives. `Authenticated` is reserved
/// for an auth flow that sits between connecting and joining the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnStatus {
    Connected,
    Authenticated,
    InGame,
}

impl ConnStatus {
    /// Whether this status is selected by `statuses`. An empty selection
    /// matches every status.
    pub fn matches_any(self, statuses: &[ConnStatus]) -> bool {
        statuses.is_empty() || statuses.contains(&self)
    }
}

/// HTTP-status-like code attached to every response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum ResponseStatus {
    Ok,
    Accepted,
    BadRequest,
    Unauthorized,
    NotAcceptable,
    ServerError,
}

impl ResponseStatus {
    pub fn code(self) -> u16 {
        match self {
            ResponseStatus::Ok => 200,
            ResponseStatus::Accepted => 202,
            ResponseStatus::BadRequest => 400,
            ResponseStatus::Unauthorized => 401,
            ResponseStatus::NotAcceptable => 406,
            ResponseStatus::ServerError => 500,
        }
    }

    /// Human readable text sent alongside the numeric code.
    pub fn status_text(self) -> &'static str {
        match self {
            ResponseStatus::Ok => "Response Status: OK",
            ResponseStatus::Accepted => "Response Status: Accepted",
            ResponseStatus::BadRequest => "Response Status: Bad Request",
            ResponseStatus::Unauthorized => "Response Status: Unauthorized",
            ResponseStatus::NotAcceptable => "Response Status: Not Acceptable",
            ResponseStatus::ServerError => "Response Status: Server Error",
        }
    }
}

impl From<ResponseStatus> for u16 {
    fn from(status: ResponseStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u16> for ResponseStatus {
    type Error = ValueObjectError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            200 => Ok(ResponseStatus::Ok),
            202 => Ok(ResponseStatus::Accepted),
            400 => Ok(ResponseStatus::BadRequest),
            401 => Ok(ResponseStatus::Unauthorized),
            406 => Ok(ResponseStatus::NotAcceptable),
            500 => Ok(ResponseStatus::ServerError),
            other => Err(ValueObjectError::UnknownResponseStatus(other)),
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status_text())
    }
}
