//! Per-match rules of the world.

use serde::{Deserialize, Serialize};

/// Immutable rules of one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldRules {
    /// Pixel size of one map tile. Characters use the same footprint.
    pub block_size: u32,
    pub max_player: usize,
    /// Stomps only score once this many players are in the game.
    pub min_player: usize,
    /// Round score that wins a round.
    pub target_score: u32,
    /// Seconds to wait between rounds.
    pub wait_time: u32,
    /// Downward acceleration in pixels per tick squared.
    pub gravity: f64,
    /// Horizontal velocity multiplier applied each tick while no direction is held.
    pub friction: f64,
}

impl Default for WorldRules {
    fn default() -> Self {
        Self {
            block_size: 16,
            max_player: 10,
            min_player: 2,
            target_score: 33,
            wait_time: 90,
            gravity: 0.5,
            friction: 0.8,
        }
    }
}
