//! Amanatides–Woo grid traversal (the classic Wolfenstein DDA).

use glam::{IVec2, Vec2};

use crate::world::{Camera, EMPTY, Level, TileId};

/// Largest `f32` below 1, keeps `wall_x` inside `[0, 1)`.
const WALL_X_MAX: f32 = 1.0 - f32::EPSILON / 2.0;

/// Which grid line stopped the ray.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RaySide {
    /// Nothing hit (step budget exhausted).
    #[default]
    None,
    /// Crossed a vertical grid line (stepped along X).
    AxisX,
    /// Crossed a horizontal grid line (stepped along Y).
    AxisY,
    /// Left the grid; treated as solid with no material.
    OutOfBounds,
}

/// Set of tile offsets touched by the rays of one frame.
///
/// Backed by a dense mask plus an insertion list so clearing costs
/// O(visited) rather than O(level area).
#[derive(Clone, Debug, Default)]
pub struct VisitedTiles {
    mask: Vec<bool>,
    list: Vec<usize>,
}

impl VisitedTiles {
    pub fn new(area: usize) -> Self {
        Self {
            mask: vec![false; area],
            list: Vec::new(),
        }
    }

    /// Empty the set and size it for a level of `area` tiles.
    pub fn reset(&mut self, area: usize) {
        for &o in &self.list {
            self.mask[o] = false;
        }
        self.list.clear();
        if self.mask.len() != area {
            self.mask.clear();
            self.mask.resize(area, false);
        }
    }

    #[inline]
    pub fn insert(&mut self, offset: usize) {
        if let Some(seen) = self.mask.get_mut(offset) {
            if !*seen {
                *seen = true;
                self.list.push(offset);
            }
        }
    }

    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        self.mask.get(offset).copied().unwrap_or(false)
    }

    /// Offsets in first-visit order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.list.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// Result of one traversal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub hit: bool,
    pub side: RaySide,
    /// Tile value of the wall hit, 0 when nothing solid was found.
    pub material: TileId,
    /// Perpendicular distance to the camera plane (∞ when no wall).
    pub distance: f32,
    /// Fractional hit coordinate along the wall face, in `[0, 1)`.
    pub wall_x: f32,
    /// Last tile stepped into.
    pub tile: IVec2,
}

impl RayHit {
    fn open(side: RaySide, tile: IVec2) -> Self {
        Self {
            hit: side == RaySide::OutOfBounds,
            side,
            material: EMPTY,
            distance: f32::INFINITY,
            wall_x: 0.0,
            tile,
        }
    }

    /// Whether a textured wall slice should be drawn for this hit.
    #[inline]
    pub fn is_wall(&self) -> bool {
        matches!(self.side, RaySide::AxisX | RaySide::AxisY)
    }
}

/// One ray: origin, starting tile and (not necessarily unit) direction.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec2,
    pub tile: IVec2,
    pub dir: Vec2,
}

impl Ray {
    /// Column ray of `camera` for interpolation parameter `t ∈ [-1, 1]`.
    #[inline]
    pub fn from_camera(camera: &Camera, t: f32) -> Self {
        Self {
            origin: camera.position(),
            tile: camera.tile(),
            dir: camera.ray_dir(t),
        }
    }

    /// Step through the grid until a solid tile or the grid edge.
    ///
    /// Every in-bounds tile entered, including the starting one, is added
    /// to `visited`.
    pub fn trace(&self, level: &Level, visited: &mut VisitedTiles) -> RayHit {
        let Ray { origin, dir, .. } = *self;
        let mut tile = self.tile;

        if let Some(o) = level.offset(tile.x, tile.y) {
            visited.insert(o);
        }

        // 1/0 = ∞ on axis-aligned rays, which never wins the comparison below
        let delta = Vec2::new((1.0 / dir.x).abs(), (1.0 / dir.y).abs());

        let (step_x, mut side_x) = if dir.x < 0.0 {
            (-1, (origin.x - tile.x as f32) * delta.x)
        } else {
            (1, (tile.x as f32 + 1.0 - origin.x) * delta.x)
        };
        let (step_y, mut side_y) = if dir.y < 0.0 {
            (-1, (origin.y - tile.y as f32) * delta.y)
        } else {
            (1, (tile.y as f32 + 1.0 - origin.y) * delta.y)
        };

        // a straight line crosses at most width + height grid lines
        let budget = level.width() + level.height() + 2;
        let mut side = RaySide::None;
        let mut material = EMPTY;

        for _ in 0..budget {
            if side_x < side_y {
                side_x += delta.x;
                tile.x += step_x;
                side = RaySide::AxisX;
            } else {
                side_y += delta.y;
                tile.y += step_y;
                side = RaySide::AxisY;
            }

            let Some(offset) = level.offset(tile.x, tile.y) else {
                return RayHit::open(RaySide::OutOfBounds, tile);
            };
            visited.insert(offset);

            let t = level.tiles()[offset];
            if t != EMPTY {
                material = t;
                break;
            }
        }

        if material == EMPTY {
            return RayHit::open(RaySide::None, tile);
        }

        let (distance, along) = if side == RaySide::AxisX {
            let d = side_x - delta.x;
            (d, origin.y + d * dir.y)
        } else {
            let d = side_y - delta.y;
            (d, origin.x + d * dir.x)
        };

        RayHit {
            hit: true,
            side,
            material,
            distance,
            wall_x: (along - along.floor()).min(WALL_X_MAX),
            tile,
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
