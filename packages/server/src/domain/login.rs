//! Login request body and its validation rules.

use serde::{Deserialize, Serialize};

use super::error::LoginError;

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 16;

/// Body of a `login` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub color: String,
}

impl LoginRequest {
    /// Decode the request body sent by the client.
    pub fn parse(body: &str) -> Result<Self, LoginError> {
        serde_json::from_str(body).map_err(|e| LoginError::Malformed(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), LoginError> {
        let name_len = self.name.chars().count();
        if self.name.trim().is_empty() {
            return Err(LoginError::Invalid("name: cannot be blank".to_string()));
        }
        if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&name_len) {
            return Err(LoginError::Invalid(format!(
                "name: the length must be between {NAME_MIN_LEN} and {NAME_MAX_LEN}"
            )));
        }
        if self.color.trim().is_empty() {
            return Err(LoginError::Invalid("color: cannot be blank".to_string()));
        }
        Ok(())
    }
}
