//! ---------------------------------------------------------------------------
//! Grid raycaster (CPU)
//!
//! * One DDA ray per screen column finds the nearest wall face; its
//!   perpendicular distance lands in the camera's depth buffer.
//! * Every tile a ray entered is remembered, and only sprites standing in
//!   those tiles are projected, far to near, clipped per column by depth.
//! ---------------------------------------------------------------------------

pub mod ray;
pub mod sprites;
pub mod walls;

use hecs::World;

use crate::{
    renderer::{RenderConfig, Renderer},
    sim::{Angle, Position},
    world::{Camera, Level, TextureBank, TextureId},
};

use ray::VisitedTiles;
use sprites::{SpriteGrid, VisSprite};

/// Column raycaster drawing every camera entity in the world.
#[derive(Default)]
pub struct Software {
    pub config: RenderConfig,
    /// Wall textures, two per material: index `(m - 1) * 2` for faces
    /// crossed along X, the next one for faces crossed along Y.
    pub walls: Vec<TextureId>,

    visited: VisitedTiles,
    sprite_grid: SpriteGrid,
    vis_sprites: Vec<VisSprite>,
}

impl Software {
    pub fn new(config: RenderConfig, walls: Vec<TextureId>) -> Self {
        Self {
            config,
            walls,
            ..Default::default()
        }
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn update(&mut self, world: &World, level: &Level, bank: &TextureBank) {
        // pose every camera before anything reads a basis
        for (_, (camera, pos, angle)) in world.query::<(&mut Camera, &Position, &Angle)>().iter() {
            camera.update_basis(pos.0, angle.0);
        }

        self.sprite_grid.rebuild(world, level);

        for (ent, (camera, _, _)) in world.query::<(&mut Camera, &Position, &Angle)>().iter() {
            self.visited.reset(level.area());
            camera.begin_frame(self.config.ceiling, self.config.floor);

            let walls = self.draw_walls(camera, level, bank);
            self.collect_sprites(camera);
            let sprites = self.draw_sprites(camera, world, bank);

            tracing::trace!(
                ?ent,
                walls,
                visited = self.visited.len(),
                candidates = self.vis_sprites.len(),
                sprites,
                "camera drawn"
            );
        }
    }
}
