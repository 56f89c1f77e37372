//! Players taking part in a match.

use super::control::{ControlInput, ControlKey};
use crate::domain::value_object::ClientId;

/// Direction and jump keys currently held by a player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl Controls {
    pub fn apply(&mut self, input: ControlInput) {
        match input.key {
            ControlKey::Left => self.left = input.pressed,
            ControlKey::Right => self.right = input.pressed,
            ControlKey::Jump => self.jump = input.pressed,
        }
    }

    /// Horizontal direction: -1 left, 1 right, 0 none or both.
    pub fn direction(&self) -> i8 {
        match (self.left, self.right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Connection the player logged in from. Never sent to clients.
    pub client_id: ClientId,
    pub name: String,
    pub color: String,
    pub round_wins: u32,
    pub round_score: u32,
    pub total_score: u32,
    pub controls: Controls,
}

impl Player {
    pub fn new(client_id: ClientId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            client_id,
            name: name.into(),
            color: color.into(),
            round_wins: 0,
            round_score: 0,
            total_score: 0,
            controls: Controls::default(),
        }
    }

    /// Add one stomp to the round and the total score.
    pub fn score(&mut self) {
        self.round_score += 1;
        self.total_score += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controls_track_held_keys() {
        // テスト項目: キーの押下・解放で操作状態が更新される
        // given (前提条件):
        let mut controls = Controls::default();

        // when (操作):
        controls.apply(ControlInput::new(ControlKey::Left, true));
        controls.apply(ControlInput::new(ControlKey::Jump, true));
        controls.apply(ControlInput::new(ControlKey::Jump, false));

        // then (期待する結果):
        assert!(controls.left);
        assert!(!controls.right);
        assert!(!controls.jump);
        assert_eq!(controls.direction(), -1);
    }

    #[test]
    fn test_opposite_directions_cancel() {
        // テスト項目: 左右同時押しは方向なしとして扱われる
        // given (前提条件):
        let controls = Controls {
            left: true,
            right: true,
            jump: false,
        };

        // when (操作) / then (期待する結果):
        assert_eq!(controls.direction(), 0);
    }

    #[test]
    fn test_score_increments_round_and_total() {
        // テスト項目: 得点はラウンドと通算の両方に加算される
        // given (前提条件):
        let mut player = Player::new(ClientId::new("c1".to_string()).unwrap(), "bob", "red");

        // when (操作):
        player.score();
        player.score();

        // then (期待する結果):
        assert_eq!(player.round_score, 2);
        assert_eq!(player.total_score, 2);
        assert_eq!(player.round_wins, 0);
    }
}
