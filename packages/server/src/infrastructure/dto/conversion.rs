//! Conversion logic between DTOs and domain models.

use crate::domain::world::{ControlInput, Player, World, WorldObject};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Model → DTO
// ========================================

impl From<&Player> for dto::PlayerSnapshot {
    fn from(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            color: player.color.clone(),
            round_wins: player.round_wins,
            round_score: player.round_score,
            total_score: player.total_score,
        }
    }
}

impl From<&WorldObject> for dto::ObjectSnapshot {
    fn from(obj: &WorldObject) -> Self {
        Self {
            id: obj.id.clone(),
            obj_type: obj.obj_type.clone(),
            anim: obj.anim as u8,
            effect: obj.effect.clone(),
            x: obj.x.round() as i64,
            y: obj.y.round() as i64,
            flip_x: obj.flip_x,
            flip_y: obj.flip_y,
        }
    }
}

impl From<&World> for dto::WorldDump {
    fn from(world: &World) -> Self {
        Self {
            world_rules: world.rules().clone(),
            world_map: world.map().clone(),
            players: world.players().iter().map(Into::into).collect(),
            world_objects: world.objects().iter().map(Into::into).collect(),
        }
    }
}

// ========================================
// DTO → Domain Model
// ========================================

impl TryFrom<&dto::ControlNotify> for ControlInput {
    type Error = String;

    fn try_from(control: &dto::ControlNotify) -> Result<Self, Self::Error> {
        ControlInput::parse(&control.control_type, &control.control_key)
    }
}
