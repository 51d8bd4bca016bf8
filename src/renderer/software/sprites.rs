use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

use glam::Vec2;
use hecs::{Entity, World};
use smallvec::SmallVec;

use crate::{
    renderer::{Rgba, software::Software},
    sim::{Angle, Position, Sprite},
    world::{Camera, Level, Texture, TextureBank},
};

/// Pre-baked sprite data we need during the frame without touching `World`.
#[derive(Clone, Copy, Debug)]
pub struct SpriteStub {
    pub ent: Entity,
    pub pos: Vec2,
    pub rotation: f32,
}

/// Small fixed-capacity cell
type Cell = SmallVec<[SpriteStub; 4]>;

/// Which sprites stand in which tile, rebuilt from scratch every frame.
#[derive(Default)]
pub struct SpriteGrid {
    cells: HashMap<usize, Cell>,
}

impl SpriteGrid {
    /// Drop last frame's membership and bucket every sprite by the tile
    /// under its current position. Sprites outside the grid are left out.
    pub fn rebuild(&mut self, world: &World, level: &Level) {
        self.cells.clear();
        for (ent, (_, pos, angle)) in world
            .query::<(&Sprite, &Position, Option<&Angle>)>()
            .iter()
        {
            let Some(offset) = level.offset_at(pos.0) else {
                continue;
            };
            self.cells.entry(offset).or_default().push(SpriteStub {
                ent,
                pos: pos.0,
                rotation: angle.map_or(0.0, |a| a.0),
            });
        }
    }

    #[inline]
    pub fn cell(&self, offset: usize) -> &[SpriteStub] {
        self.cells.get(&offset).map_or(&[], |c| c.as_slice())
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A sprite that survived tile culling this frame.
#[derive(Clone, Copy, Debug)]
pub struct VisSprite {
    pub stub: SpriteStub,
    pub relative: Vec2, // sprite − camera
    pub dist2: f32,
}

/// Facet to show out of `count` views spread evenly around the sprite.
///
/// The view angle is wrapped into `[-π, π)` first so headings that have
/// accumulated whole turns bucket the same way.
pub fn facet_index(relative: Vec2, rotation: f32, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let n = count as f32;
    let diff = (relative.to_angle() - rotation + PI).rem_euclid(TAU) - PI;
    let between = ((diff / PI + 1.0) / 2.0 - 1.0).abs() + 1.0 / (2.0 * n);
    ((between * n).floor() as i64).rem_euclid(count as i64) as usize
}

impl Software {
    /// Gather every sprite standing in a tile some ray of this frame
    /// visited, sorted far to near.
    pub fn collect_sprites(&mut self, camera: &Camera) {
        self.vis_sprites.clear();
        let eye = camera.position();

        for offset in self.visited.iter() {
            for stub in self.sprite_grid.cell(offset) {
                let relative = stub.pos - eye;
                self.vis_sprites.push(VisSprite {
                    stub: *stub,
                    relative,
                    dist2: relative.length_squared(),
                });
            }
        }

        // far-to-near painter’s order
        self.vis_sprites.sort_by(|a, b| b.dist2.total_cmp(&a.dist2));
    }

    /// Rasterise the collected sprites against the camera's depth buffer.
    ///
    /// Returns the number of sprites that reached the rasteriser.
    pub fn draw_sprites(&mut self, camera: &mut Camera, world: &World, bank: &TextureBank) -> usize {
        if !camera.has_valid_basis() {
            tracing::debug!(
                inv_det = camera.inv_det(),
                "degenerate camera basis, sprites skipped"
            );
            return 0;
        }

        let mut drawn = 0;
        for vis in &self.vis_sprites {
            let Ok(sprite) = world.get::<&Sprite>(vis.stub.ent) else {
                continue;
            };
            let Some(tex_id) = sprite.image.select(vis.relative, vis.stub.rotation) else {
                continue;
            };
            let Some(proj) = camera.project(vis.relative) else {
                continue;
            };
            // behind (or exactly on) the camera plane
            if proj.y <= 0.0 {
                continue;
            }

            let tex = bank.texture_or_missing(tex_id);
            if draw_billboard(camera, proj, sprite.pivot, tex, self.config.transparent) {
                drawn += 1;
            }
        }
        drawn
    }
}

/// Draw one square billboard whose camera-space position is `proj`.
///
/// A column is skipped when something nearer already owns it in the depth
/// buffer; otherwise the sprite claims it, even where its texels turn out
/// transparent.
fn draw_billboard(
    camera: &mut Camera,
    proj: Vec2,
    pivot: Vec2,
    tex: &Texture,
    transparent: Rgba,
) -> bool {
    let w = camera.width();
    let h = camera.height();
    let half_w = w as f32 * 0.5;
    let half_h = h as f32 * 0.5;

    let screen_x = half_w * (1.0 + proj.x / proj.y);
    let size = (h as f32 / proj.y).floor().abs();
    if !screen_x.is_finite() || !size.is_finite() || size < 1.0 {
        return false;
    }

    let left = screen_x - size * (0.5 + pivot.x);
    let top = half_h - size * (0.5 + pivot.y);

    let x0 = left.floor().max(0.0) as usize;
    let x1 = (left + size).ceil().clamp(0.0, w as f32) as usize;
    let y0 = top.floor().max(0.0) as usize;
    let y1 = (top + size).ceil().clamp(0.0, h as f32) as usize;
    if x0 >= x1 || y0 >= y1 {
        return false;
    }

    let (pixels, depth) = camera.targets_mut();
    for x in x0..x1 {
        if proj.y > depth[x] {
            continue;
        }
        let u = (x as f32 - left) / size;
        if !(0.0..1.0).contains(&u) {
            continue;
        }
        depth[x] = proj.y;

        for y in y0..y1 {
            let v = (y as f32 - top) / size;
            if !(0.0..1.0).contains(&v) {
                continue;
            }
            let texel = tex.sample(u, v);
            if texel != transparent {
                pixels[y * w + x] = texel;
            }
        }
    }
    true
}

/*──────────────────────────────── Tests ───────────────────────────────*/
