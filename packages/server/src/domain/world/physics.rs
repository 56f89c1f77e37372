//! Fixed-step movement, map collision and stomp resolution.

use super::{
    Anim, Controls, Rect, TileKind, World, WorldObject,
    spawn::{self, sample_offsets},
};
use crate::domain::value_object::ClientId;

const RUN_ACCEL: f64 = 0.6;
const AIR_CONTROL: f64 = 0.5;
const MAX_RUN_SPEED: f64 = 3.0;
const JUMP_SPEED: f64 = 7.5;
const SPRING_SPEED: f64 = 11.0;
const STOMP_BOUNCE: f64 = 5.0;
const MAX_FALL_SPEED: f64 = 8.0;
const ICE_FRICTION: f64 = 0.98;
const WATER_DRAG: f64 = 0.7;
/// Below this horizontal speed a character stops.
const MIN_SPEED: f64 = 0.05;
/// Inset of the far edges when testing a rectangle against the tile grid.
const EDGE: f64 = 0.01;

pub const EFFECT_SPRING: &str = "spring";
pub const EFFECT_STOMP: &str = "stomp";
pub const EFFECT_SPAWN: &str = "spawn";

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

impl World {
    /// Advance the world by one tick.
    pub fn step(&mut self) {
        for index in 0..self.objects.len() {
            let controls = self
                .player(&self.objects[index].parent_id)
                .map(|p| p.controls)
                .unwrap_or_default();
            self.objects[index].effect.clear();
            self.move_object(index, controls);
        }
        self.resolve_stomps();
    }

    /// Whether `rect` overlaps a blocking tile. Touching edges do not count.
    pub fn rect_hits_map(&self, rect: &Rect) -> bool {
        let block = f64::from(self.rules.block_size);
        let xs = sample_offsets(rect.width - EDGE, block);
        let ys = sample_offsets(rect.height - EDGE, block);
        ys.iter().any(|off_y| {
            xs.iter().any(|off_x| {
                self.map
                    .tile_kind(rect.x + off_x, rect.y + off_y, self.rules.block_size)
                    .is_blocking()
            })
        })
    }

    /// Kind of the blocking tile a rectangle stands on, if any.
    fn ground_under(&self, rect: &Rect) -> Option<TileKind> {
        let feet = rect.y + rect.height;
        let (center_x, _) = rect.center();
        [center_x, rect.x, rect.x + rect.width - EDGE]
            .into_iter()
            .map(|x| self.map.tile_kind(x, feet, self.rules.block_size))
            .find(|kind| kind.is_blocking())
    }

    fn move_object(&mut self, index: usize, controls: Controls) {
        let rect = self.objects[index].rect();
        let ground = self.ground_under(&rect);
        let (center_x, center_y) = rect.center();
        let in_water =
            self.map.tile_kind(center_x, center_y, self.rules.block_size) == TileKind::Water;
        let gravity = self.rules.gravity;
        let friction = self.rules.friction;

        let obj = &mut self.objects[index];
        let direction = controls.direction();
        if direction != 0 {
            let accel = if ground.is_some() {
                RUN_ACCEL
            } else {
                RUN_ACCEL * AIR_CONTROL
            };
            obj.vel.x =
                (obj.vel.x + accel * f64::from(direction)).clamp(-MAX_RUN_SPEED, MAX_RUN_SPEED);
            obj.flip_x = direction < 0;
        } else {
            obj.vel.x *= match ground {
                Some(TileKind::Ice) => ICE_FRICTION,
                _ => friction,
            };
            if obj.vel.x.abs() < MIN_SPEED {
                obj.vel.x = 0.0;
            }
        }

        match ground {
            Some(TileKind::Spring) => {
                obj.vel.y = -SPRING_SPEED;
                obj.effect = EFFECT_SPRING.to_string();
            }
            Some(_) if controls.jump => obj.vel.y = -JUMP_SPEED,
            _ => {}
        }
        obj.vel.y = (obj.vel.y + gravity).min(MAX_FALL_SPEED);
        if in_water {
            obj.vel.x *= WATER_DRAG;
            obj.vel.y *= WATER_DRAG;
        }

        let (vx, vy) = (obj.vel.x, obj.vel.y);
        if self.sweep(index, Axis::X, vx) {
            self.objects[index].vel.x = 0.0;
        }
        if self.sweep(index, Axis::Y, vy) {
            self.objects[index].vel.y = 0.0;
        }
        self.clamp_to_bounds(index);

        let grounded = self.ground_under(&self.objects[index].rect()).is_some();
        let obj = &mut self.objects[index];
        obj.anim = if !grounded {
            if obj.vel.y < 0.0 { Anim::Jump } else { Anim::Fall }
        } else if obj.vel.x.abs() > MIN_SPEED {
            Anim::Run
        } else {
            Anim::Idle
        };
    }

    /// Move along one axis in steps of at most one pixel.
    ///
    /// On contact the object is snapped against the tile edge and `true` is returned.
    fn sweep(&mut self, index: usize, axis: Axis, distance: f64) -> bool {
        let sign = distance.signum();
        let mut remaining = distance.abs();
        while remaining > 0.0 {
            let delta = remaining.min(1.0);
            let mut candidate = self.objects[index].rect();
            match axis {
                Axis::X => candidate.x += delta * sign,
                Axis::Y => candidate.y += delta * sign,
            }

            if self.rect_hits_map(&candidate) {
                let snapped = self.snap(&candidate, axis, sign);
                let obj = &mut self.objects[index];
                match axis {
                    Axis::X => obj.x = snapped,
                    Axis::Y => obj.y = snapped,
                }
                return true;
            }

            let obj = &mut self.objects[index];
            obj.x = candidate.x;
            obj.y = candidate.y;
            remaining -= delta;
        }
        false
    }

    /// Coordinate that puts the leading edge of `candidate` on the tile boundary it crossed.
    fn snap(&self, candidate: &Rect, axis: Axis, sign: f64) -> f64 {
        let block = f64::from(self.rules.block_size);
        let (start, extent) = match axis {
            Axis::X => (candidate.x, candidate.width),
            Axis::Y => (candidate.y, candidate.height),
        };
        if sign > 0.0 {
            ((start + extent - EDGE) / block).floor() * block - extent
        } else {
            ((start / block).floor() + 1.0) * block
        }
    }

    fn clamp_to_bounds(&mut self, index: usize) {
        let bounds = self.bounds;
        let obj = &mut self.objects[index];
        let max_x = bounds.x + bounds.width - obj.width;
        if obj.x < bounds.x || obj.x > max_x {
            obj.x = obj.x.clamp(bounds.x, max_x.max(bounds.x));
            obj.vel.x = 0.0;
        }
        let max_y = bounds.y + bounds.height - obj.height;
        if obj.y > max_y {
            obj.y = max_y;
            obj.vel.y = 0.0;
        }
    }

    /// Characters landing on top of another character score and bounce off.
    fn resolve_stomps(&mut self) {
        let mut stomps: Vec<(usize, usize)> = Vec::new();
        for (a, stomper) in self.objects.iter().enumerate() {
            if !stomper.is_character() || stomps.iter().any(|&(s, v)| s == a || v == a) {
                continue;
            }
            let victim = self.objects.iter().enumerate().find(|&(b, victim)| {
                b != a
                    && victim.is_character()
                    && !stomps.iter().any(|&(s, v)| s == b || v == b)
                    && is_stomp(stomper, victim)
            });
            if let Some((b, _)) = victim {
                stomps.push((a, b));
            }
        }

        let scoring = self.players.len() >= self.rules.min_player;
        for (stomper, victim) in stomps {
            let obj = &mut self.objects[stomper];
            obj.vel.y = -STOMP_BOUNCE;
            obj.effect = EFFECT_STOMP.to_string();
            let scorer = obj.parent_id.clone();

            if scoring {
                self.award_stomp(&scorer);
            }
            self.respawn(victim);
        }
    }

    fn award_stomp(&mut self, scorer: &ClientId) {
        let target = self.rules.target_score;
        let Some(player) = self.players.iter_mut().find(|p| &p.client_id == scorer) else {
            return;
        };
        player.score();
        if player.round_score < target {
            return;
        }

        player.round_wins += 1;
        tracing::info!(
            "Player {} won the round with {} points",
            player.name,
            player.round_score
        );
        for player in &mut self.players {
            player.round_score = 0;
        }
    }

    fn respawn(&mut self, index: usize) {
        let others: Vec<Rect> = self
            .objects
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != index)
            .map(|(_, obj)| obj.rect())
            .collect();
        match spawn::find_safe_place(
            &mut self.rng,
            &self.map,
            self.rules.block_size,
            &self.bounds,
            &others,
        ) {
            Ok((x, y)) => {
                let obj = &mut self.objects[index];
                obj.respawn_at(x, y);
                obj.effect = EFFECT_SPAWN.to_string();
            }
            Err(e) => tracing::warn!("Failed to respawn object {}: {}", self.objects[index].id, e),
        }
    }
}

/// `stomper` overlaps `victim` with its feet in the upper half of the victim.
fn is_stomp(stomper: &WorldObject, victim: &WorldObject) -> bool {
    stomper.rect().collides(&victim.rect())
        && stomper.y < victim.y
        && stomper.bottom() <= victim.y + victim.height / 2.0
}
