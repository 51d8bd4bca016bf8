use glam::Vec2;
use hecs::Entity;
use smallvec::SmallVec;

use crate::renderer::software::sprites::facet_index;
use crate::world::TextureId;

/// World-space position in tile units (tile `(x, y)` covers `[x, x+1)`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position(pub Vec2);

/// Heading in radians (0 = +X, counter-clockwise positive).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Angle(pub f32);

impl Angle {
    /// Unit vector the entity faces.
    #[inline]
    pub fn dir(self) -> Vec2 {
        Vec2::from_angle(self.0)
    }
}

/// Circle that is kept out of solid tiles and reports overlapping circles.
///
/// Callers set `movement` before the resolver pass; the resolver consumes
/// it, moves `Position`, and zeroes it again. Everything below `hit_wall`
/// is per-frame scratch kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct Collider {
    pub radius: f32,
    pub movement: Vec2,
    pub(crate) collisions: SmallVec<[Entity; 4]>,
    pub(crate) hit_wall: bool,

    pub next_position: Vec2,
    pub nearest_point: Vec2,
    pub penetration: Vec2,
    pub distance: f32,
}

impl Collider {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            ..Default::default()
        }
    }

    /// Colliders overlapping this one during the last resolver pass.
    #[inline]
    pub fn collisions(&self) -> &[Entity] {
        &self.collisions
    }

    #[inline]
    pub fn collides_with(&self, other: Entity) -> bool {
        self.collisions.contains(&other)
    }

    /// True when the last pass pushed this collider out of a wall.
    #[inline]
    pub fn hit_wall(&self) -> bool {
        self.hit_wall
    }

    /// Touching anything at all (walls or other colliders).
    #[inline]
    pub fn collides(&self) -> bool {
        self.hit_wall || !self.collisions.is_empty()
    }
}

/// Texture(s) of a billboard.
#[derive(Debug, Clone, PartialEq)]
pub enum SpriteImage {
    Single(TextureId),
    /// Views around the sprite, facet 0 facing the camera head-on,
    /// continuing counter-clockwise around the sprite.
    Facets(Vec<TextureId>),
}

impl SpriteImage {
    /// Texture to show for a camera at `relative` (sprite − camera) from a
    /// sprite facing `rotation`.
    pub fn select(&self, relative: Vec2, rotation: f32) -> Option<TextureId> {
        match self {
            SpriteImage::Single(id) => Some(*id),
            SpriteImage::Facets(ids) if ids.is_empty() => None,
            SpriteImage::Facets(ids) => Some(ids[facet_index(relative, rotation, ids.len())]),
        }
    }
}

/// Camera-facing billboard drawn by the raycaster.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub image: SpriteImage,
    /// Draw-rect offset in sprite sizes; `(0, 0)` centres it on the horizon.
    pub pivot: Vec2,
}

impl Sprite {
    pub fn new(image: SpriteImage) -> Self {
        Self {
            image,
            pivot: Vec2::ZERO,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct InputCmd {
    pub forward: f32, // –1 … +1
    pub strafe: f32,  // –1 … +1  (left / right)
    pub turn: f32,    // –1 … +1  (left / right)
    pub fire: bool,   // edge-triggered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_image_ignores_view_angle() {
        let img = SpriteImage::Single(7);
        assert_eq!(img.select(Vec2::X, 0.0), Some(7));
        assert_eq!(img.select(Vec2::NEG_Y, 2.0), Some(7));
    }

    #[test]
    fn empty_facets_select_nothing() {
        assert_eq!(SpriteImage::Facets(vec![]).select(Vec2::X, 0.0), None);
    }

    #[test]
    fn facing_sprite_shows_front_facet() {
        let img = SpriteImage::Facets((10..18).collect());
        // camera at the origin, sprite at +X turned back towards the camera
        let relative = Vec2::new(3.0, 0.0);
        assert_eq!(img.select(relative, std::f32::consts::PI), Some(10));
        // sprite looking away from the camera
        assert_eq!(img.select(relative, 0.0), Some(14));
    }

    #[test]
    fn fresh_collider_touches_nothing() {
        let c = Collider::new(0.25);
        assert!(!c.collides());
        assert!(c.collisions().is_empty());
    }
}
