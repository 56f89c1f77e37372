//! Safe spawn placement.

use rand::Rng;

use super::{
    map::{TILE_EMPTY, WorldMap},
    rect::Rect,
};
use crate::domain::error::WorldError;

/// Minimum distance in pixels between the center of a new character and any other object.
pub const SAFE_DISTANCE: f64 = 35.0;

/// Number of random draws before spawning gives up.
pub const MAX_SPAWN_ATTEMPTS: usize = 1000;

/// Offsets from 0 to `extent` (both inclusive) in steps of `step`.
///
/// The last step is shortened so the far edge is always sampled.
pub fn sample_offsets(extent: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 {
        return if extent > 0.0 { vec![0.0, extent] } else { vec![0.0] };
    }
    let mut offsets = Vec::new();
    let mut offset = 0.0;
    loop {
        offsets.push(offset);
        if offset >= extent {
            break;
        }
        offset += (extent - offset).min(step);
    }
    offsets
}

/// Whether every tile under the square footprint at `(x, y)` is empty.
pub fn is_empty(map: &WorldMap, x: f64, y: f64, size: f64, block_size: u32) -> bool {
    let offsets = sample_offsets(size, f64::from(block_size));
    offsets.iter().all(|off_y| {
        offsets
            .iter()
            .all(|off_x| map.tile(x + off_x, y + off_y, block_size) == TILE_EMPTY)
    })
}

/// Whether `candidate` keeps [`SAFE_DISTANCE`] from every rectangle in `others`.
pub fn is_safe(candidate: &Rect, others: &[Rect]) -> bool {
    others
        .iter()
        .all(|other| candidate.center_distance(other) >= SAFE_DISTANCE)
}

/// Draw random block-sized footprints inside `bounds` until one is empty and safe.
pub fn find_safe_place<R: Rng>(
    rng: &mut R,
    map: &WorldMap,
    block_size: u32,
    bounds: &Rect,
    others: &[Rect],
) -> Result<(f64, f64), WorldError> {
    let size = f64::from(block_size);
    let max_x = (bounds.width - size).floor() as i64;
    let max_y = (bounds.height - size).floor() as i64;
    if max_x < 0 || max_y < 0 {
        return Err(WorldError::SpawnFailed { attempts: 0 });
    }

    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let x = bounds.x + rng.gen_range(0..=max_x) as f64;
        let y = bounds.y + rng.gen_range(0..=max_y) as f64;
        let candidate = Rect::new(x, y, size, size);
        if is_empty(map, x, y, size, block_size) && is_safe(&candidate, others) {
            return Ok((x, y));
        }
    }
    tracing::warn!(
        "No safe spawn place found after {} attempts",
        MAX_SPAWN_ATTEMPTS
    );
    Err(WorldError::SpawnFailed {
        attempts: MAX_SPAWN_ATTEMPTS,
    })
}
