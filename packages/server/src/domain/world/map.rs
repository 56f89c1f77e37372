//! Static tile map of a match.

use serde::{Deserialize, Serialize};

/// Tile code of an empty (void) tile.
pub const TILE_EMPTY: u8 = b'0';

/// Returned for coordinates above the first row: open sky, same code as an empty tile.
pub const SENTINEL_ABOVE: u8 = b'0';

/// Returned for coordinates left of, right of or below the map: treated as solid ground.
pub const SENTINEL_OUTSIDE: u8 = b'1';

/// Behaviour of a tile code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Void,
    Solid,
    Water,
    Ice,
    Spring,
    Unknown(u8),
}

impl TileKind {
    pub fn from_code(code: u8) -> Self {
        match code {
            b'0' => TileKind::Void,
            b'1' => TileKind::Solid,
            b'2' => TileKind::Water,
            b'3' => TileKind::Ice,
            b'4' => TileKind::Spring,
            other => TileKind::Unknown(other),
        }
    }

    /// Whether characters stand on / bump into this tile.
    pub fn is_blocking(self) -> bool {
        !matches!(self, TileKind::Void | TileKind::Water)
    }
}

/// Immutable grid of tile codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldMap {
    pub background: String,
    pub rows: Vec<String>,
}

impl WorldMap {
    pub fn new(background: impl Into<String>, rows: Vec<String>) -> Self {
        Self {
            background: background.into(),
            rows,
        }
    }

    /// Number of columns, taken from the first row.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |row| row.len())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Whether every row has the same, non-zero length.
    pub fn is_rectangular(&self) -> bool {
        let width = self.width();
        width > 0 && self.rows.iter().all(|row| row.len() == width)
    }

    /// Tile code at the pixel coordinate `(x, y)` for tiles of `block_size` pixels.
    ///
    /// Coordinates above the map resolve to [`SENTINEL_ABOVE`]; every other
    /// out-of-range coordinate (and a zero block size) resolves to
    /// [`SENTINEL_OUTSIDE`].
    pub fn tile(&self, x: f64, y: f64, block_size: u32) -> u8 {
        if block_size == 0 {
            return SENTINEL_OUTSIDE;
        }
        let size = f64::from(block_size);
        let col = (x / size).floor();
        let row = (y / size).floor();

        if col < 0.0 || col >= self.width() as f64 {
            return SENTINEL_OUTSIDE;
        }
        if row < 0.0 {
            return SENTINEL_ABOVE;
        }
        if row >= self.height() as f64 {
            return SENTINEL_OUTSIDE;
        }
        self.rows[row as usize]
            .as_bytes()
            .get(col as usize)
            .copied()
            .unwrap_or(SENTINEL_OUTSIDE)
    }

    pub fn tile_kind(&self, x: f64, y: f64, block_size: u32) -> TileKind {
        TileKind::from_code(self.tile(x, y, block_size))
    }
}

impl Default for WorldMap {
    fn default() -> Self {
        let rows = [
            "1110000000000000000000",
            "1000000000001000011000",
            "1000111100001100000000",
            "1000000000011110000011",
            "1100000000111000000001",
            "1110001111110000000001",
            "1000000000000011110001",
            "1000000000000000000011",
            "1110011100000000000111",
            "1000000000003100000001",
            "1000000000031110000001",
            "1011110000311111111001",
            "1000000000000000000001",
            "1100000000000000000011",
            "2222222214000001333111",
            "1111111111111111111111",
        ];
        Self::new("#4d9de3", rows.iter().map(|row| row.to_string()).collect())
    }
}
