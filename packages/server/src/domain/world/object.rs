//! Movable objects of the world (player characters).

use uuid::Uuid;

use super::rect::Rect;
use crate::domain::value_object::ClientId;

/// Object type of a player character
pub const CHARACTER_TYPE: &str = "bunny";

/// Velocity in pixels per tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Animation index sent to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anim {
    #[default]
    Idle = 0,
    Run = 1,
    Jump = 2,
    Fall = 3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    pub id: String,
    /// Client ID of the owning player
    pub parent_id: ClientId,
    pub obj_type: String,
    pub anim: Anim,
    /// One-frame visual effect tag; empty when none
    pub effect: String,
    pub x: f64,
    pub y: f64,
    pub vel: Vector,
    pub width: f64,
    pub height: f64,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl WorldObject {
    /// Create a character of `size` x `size` pixels owned by `parent_id`.
    pub fn character(parent_id: ClientId, x: f64, y: f64, size: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            parent_id,
            obj_type: CHARACTER_TYPE.to_string(),
            anim: Anim::Idle,
            effect: String::new(),
            x,
            y,
            vel: Vector::default(),
            width: size,
            height: size,
            flip_x: false,
            flip_y: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_character(&self) -> bool {
        self.obj_type == CHARACTER_TYPE
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Place the object at a new position and clear its motion.
    pub fn respawn_at(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.vel = Vector::default();
        self.anim = Anim::Idle;
    }
}
