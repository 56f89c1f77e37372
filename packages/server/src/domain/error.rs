//! Error types of the game server core.

use std::fmt;

use thiserror::Error;

use super::value_object::ResponseStatus;

/// Errors raised while constructing value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("client ID must not be empty")]
    EmptyClientId,

    #[error("client ID is too long (max {max} characters, got {actual})")]
    ClientIdTooLong { max: usize, actual: usize },

    #[error("unknown response status code {0}")]
    UnknownResponseStatus(u16),
}

/// Failure of the underlying duplex socket
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(String);

impl TransportError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// Error raised by a single connection and reported to the hub.
///
/// Displays as `ConnID: <id> Action: <action> ErrorCode: <code> Error: <text>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ConnID: {conn_id} Action: {action} ErrorCode: {code} Error: {text}")]
pub struct ConnectionError {
    conn_id: String,
    action: String,
    code: i32,
    text: String,
}

impl ConnectionError {
    /// Writing a frame to the socket failed.
    pub const WRITE_FAILED: i32 = -1;
    /// Reading a frame from the socket failed.
    pub const READ_FAILED: i32 = -2;
    /// A text frame could not be decoded as a client envelope.
    pub const DECODE_FAILED: i32 = -3;
    /// The peer closed the connection.
    pub const CLOSED: i32 = -4;

    /// Create a new error. The `details` are joined with `": "`.
    pub fn new<I, D>(
        conn_id: impl Into<String>,
        action: impl Into<String>,
        code: i32,
        details: I,
    ) -> Self
    where
        I: IntoIterator<Item = D>,
        D: fmt::Display,
    {
        let text = details
            .into_iter()
            .map(|detail| detail.to_string())
            .collect::<Vec<_>>()
            .join(": ");
        Self {
            conn_id: conn_id.into(),
            action: action.into(),
            code,
            text,
        }
    }

    pub fn conn_id(&self) -> &str {
        &self.conn_id
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Errors raised by the connection hub
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("client ID '{0}' is already connected")]
    DuplicateClientId(String),
}

/// Errors raised by the world model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("there is no player in the game with client ID {0}")]
    PlayerNotFound(String),

    #[error("no safe spawn place found after {attempts} attempts")]
    SpawnFailed { attempts: usize },
}

/// Reasons a login request is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Invalid LoginRequest JSON: {0}")]
    Malformed(String),

    #[error("Invalid LoginRequest: {0}")]
    Invalid(String),

    #[error("Client {0} is already in the game")]
    AlreadyInGame(String),

    #[error("The game is full ({max} players)")]
    ServerFull { max: usize },

    #[error("Someone is already connected with the name {0}")]
    NameTaken(String),

    #[error("Failed to join the game: {0}")]
    World(#[from] WorldError),
}

impl LoginError {
    /// Status of the response that answers the rejected request.
    pub fn status(&self) -> ResponseStatus {
        match self {
            LoginError::Malformed(_) | LoginError::Invalid(_) | LoginError::AlreadyInGame(_) => {
                ResponseStatus::BadRequest
            }
            LoginError::ServerFull { .. } => ResponseStatus::NotAcceptable,
            LoginError::NameTaken(_) => ResponseStatus::Unauthorized,
            LoginError::World(_) => ResponseStatus::ServerError,
        }
    }
}

/// Errors reported by the simulation loop while serving requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Unknown request type {0}")]
    UnknownRequest(String),

    #[error("login rejected: {0}")]
    Login(#[from] LoginError),

    #[error("client {0} disconnected before the login completed")]
    Disconnected(String),

    #[error(transparent)]
    World(#[from] WorldError),
}

/// Errors raised by the key-value store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid key path '{0}'")]
    InvalidKeyPath(String),

    #[error("bucket '{bucket}' does not exist in key path '{key_path}'")]
    BucketNotFound { key_path: String, bucket: String },

    #[error("key '{0}' not found")]
    KeyNotFound(String),

    #[error("'{0}' is a bucket, not a value")]
    NotAValue(String),

    #[error("'{0}' is a value, not a bucket")]
    NotABucket(String),
}
