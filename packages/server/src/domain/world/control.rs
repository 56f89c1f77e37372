//! Control notifies sent by clients while in game.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    Left,
    Right,
    Jump,
}

impl FromStr for ControlKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(ControlKey::Left),
            "right" => Ok(ControlKey::Right),
            "up" | "jump" => Ok(ControlKey::Jump),
            other => Err(format!("unknown control key '{other}'")),
        }
    }
}

/// A key press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlInput {
    pub key: ControlKey,
    pub pressed: bool,
}

impl ControlInput {
    pub fn new(key: ControlKey, pressed: bool) -> Self {
        Self { key, pressed }
    }

    /// Parse `control_type` (`keydown` / `keyup`) and `control_key`.
    pub fn parse(control_type: &str, control_key: &str) -> Result<Self, String> {
        let pressed = match control_type {
            "keydown" => true,
            "keyup" => false,
            other => return Err(format!("unknown control type '{other}'")),
        };
        Ok(Self::new(control_key.parse()?, pressed))
    }
}
