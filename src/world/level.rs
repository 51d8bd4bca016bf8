use glam::{IVec2, Vec2};

/// Raw tile value: 0 = passable, anything else = solid wall with that material.
pub type TileId = u8;

/// Passable tile.
pub const EMPTY: TileId = 0;

/// Synthetic tile reported for coordinates outside the grid.
pub const OUTSIDE: TileId = 0xFF;

/// Things that can go wrong when assembling a level.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("level has zero size ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("tile buffer holds {actual} tiles, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("row {row} holds {len} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },
}

/// Axis-aligned box in map units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Closest point of the box to `p` (p itself when inside).
    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Runtime snapshot of one tile map (immutable after construction).
///
/// Tiles are stored row-major: `tiles[y * width + x]`.
#[derive(Clone, Debug)]
pub struct Level {
    width: u32,
    height: u32,
    tiles: Vec<TileId>,
}

impl Level {
    pub fn new(width: u32, height: u32, tiles: Vec<TileId>) -> Result<Self, LevelError> {
        if width == 0 || height == 0 {
            return Err(LevelError::Empty { width, height });
        }
        let expected = width as usize * height as usize;
        if tiles.len() != expected {
            return Err(LevelError::SizeMismatch {
                expected,
                actual: tiles.len(),
            });
        }

        let solid = tiles.iter().filter(|&&t| t != EMPTY).count();
        tracing::debug!(width, height, solid, "level built");

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Build from a slice of equally long rows (top row first).
    pub fn from_rows(rows: &[&[TileId]]) -> Result<Self, LevelError> {
        let width = rows.first().map_or(0, |r| r.len());
        let mut tiles = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            if line.len() != width {
                return Err(LevelError::RaggedRow {
                    row,
                    len: line.len(),
                    expected: width,
                });
            }
            tiles.extend_from_slice(line);
        }
        Self::new(width as u32, rows.len() as u32, tiles)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of tiles (`width * height`).
    #[inline]
    pub fn area(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Row-major offset of `(x, y)`, `None` outside the grid.
    #[inline]
    pub fn offset(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Tile value, `None` outside the grid.
    #[inline]
    pub fn tile(&self, x: i32, y: i32) -> Option<TileId> {
        self.offset(x, y).map(|o| self.tiles[o])
    }

    /// Tile value with out-of-bounds reads reported as [`OUTSIDE`].
    #[inline]
    pub fn tile_or_outside(&self, x: i32, y: i32) -> TileId {
        self.tile(x, y).unwrap_or(OUTSIDE)
    }

    #[inline]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.tile_or_outside(x, y) != EMPTY
    }

    /// Tile coordinate that contains the world point `p`.
    #[inline]
    pub fn tile_coord(p: Vec2) -> IVec2 {
        p.floor().as_ivec2()
    }

    /// Offset of the tile under `p`, `None` outside the grid.
    #[inline]
    pub fn offset_at(&self, p: Vec2) -> Option<usize> {
        let t = Self::tile_coord(p);
        self.offset(t.x, t.y)
    }

    /// Unit square covered by tile `t`.
    #[inline]
    pub fn tile_bounds(t: IVec2) -> Aabb {
        let min = t.as_vec2();
        Aabb {
            min,
            max: min + Vec2::ONE,
        }
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
