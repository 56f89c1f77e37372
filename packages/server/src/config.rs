//! Process configuration.
//!
//! 優先順位: デフォルト値 < JSON 設定ファイル < CLI フラグ / `BNJ_*` 環境変数。
//! 読み込み後に [`Config::validate`] で検証します。

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::world::{WorldMap, WorldRules};

pub const PORT_RANGE: std::ops::RangeInclusive<u16> = 1000..=9999;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("port {0} is out of range (1000-9999)")]
    PortOutOfRange(u16),

    #[error("world_rules.block_size must be greater than 0")]
    ZeroBlockSize,

    #[error("world_rules.min_player ({min}) must be between 1 and max_player ({max})")]
    PlayerBounds { min: usize, max: usize },

    #[error("world_rules.gravity must be a finite, non-negative number (got {0})")]
    InvalidGravity(f64),

    #[error("world_rules.friction must be between 0.0 and 1.0 (got {0})")]
    InvalidFriction(f64),

    #[error("tick_ms must be greater than 0")]
    ZeroTick,

    #[error("world_map must be a non-empty rectangle")]
    InvalidMap,
}

/// Effective configuration of the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub world_rules: WorldRules,
    pub world_map: WorldMap,
    /// Milliseconds per simulation tick
    pub tick_ms: u64,
    /// Directory served for every path that is not an API route
    pub static_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            world_rules: WorldRules::default(),
            world_map: WorldMap::default(),
            tick_ms: 16,
            static_dir: "public".to_string(),
        }
    }
}

impl Config {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !PORT_RANGE.contains(&self.port) {
            return Err(ConfigError::PortOutOfRange(self.port));
        }
        if self.world_rules.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        let (min, max) = (self.world_rules.min_player, self.world_rules.max_player);
        if min < 1 || min > max {
            return Err(ConfigError::PlayerBounds { min, max });
        }
        let gravity = self.world_rules.gravity;
        if !gravity.is_finite() || gravity < 0.0 {
            return Err(ConfigError::InvalidGravity(gravity));
        }
        let friction = self.world_rules.friction;
        if !(0.0..=1.0).contains(&friction) {
            return Err(ConfigError::InvalidFriction(friction));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if !self.world_map.is_rectangular() {
            return Err(ConfigError::InvalidMap);
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
