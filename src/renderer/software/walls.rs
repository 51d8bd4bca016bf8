use crate::{
    renderer::{
        Rgba,
        software::{
            Software,
            ray::{Ray, RayHit, RaySide},
        },
    },
    world::{Camera, Level, Texture, TextureBank},
};

/// Cap on slice height, in screens, for cameras pressed against a wall.
const MAX_COLUMN_SCREENS: f32 = 64.0;

/// What a single wall slice is painted with.
enum Surface<'a> {
    Textured(&'a Texture),
    Flat(Rgba),
}

impl Software {
    /// Cast one ray per column, paint the wall slices and fill the depth
    /// buffer. Rays that find nothing leave the background untouched; a
    /// wall with nothing to paint it still occludes.
    ///
    /// Returns the number of columns painted.
    pub fn draw_walls(&mut self, camera: &mut Camera, level: &Level, bank: &TextureBank) -> usize {
        let w = camera.width();
        let h = camera.height();
        let mut walls = 0;

        for x in 0..w {
            let ray = Ray::from_camera(camera, camera.column_param(x));
            let hit = ray.trace(level, &mut self.visited);
            if !hit.is_wall() {
                continue;
            }

            let (pixels, depth) = camera.targets_mut();
            depth[x] = hit.distance;
            let Some(surface) = self.surface(&hit, bank) else {
                continue;
            };
            draw_column(pixels, w, h, x, &hit, &surface);
            walls += 1;
        }
        walls
    }

    /// Texture (or flat fallback colour) for the face the ray hit.
    ///
    /// Each material owns two consecutive slots, the second for faces
    /// crossed along Y so the two orientations read differently.
    fn surface<'a>(&self, hit: &RayHit, bank: &'a TextureBank) -> Option<Surface<'a>> {
        let slot = (hit.material as usize).checked_sub(1)? * 2 + usize::from(hit.side == RaySide::AxisY);
        if let Some(&id) = self.walls.get(slot) {
            if let Ok(tex) = bank.texture(id) {
                return Some(Surface::Textured(tex));
            }
            tracing::trace!(id, slot, "wall texture missing, using palette");
        }
        self.config.palette.wrapped(slot).map(Surface::Flat)
    }
}

fn draw_column(pixels: &mut [Rgba], w: usize, h: usize, x: usize, hit: &RayHit, surface: &Surface) {
    let screen_h = h as f32;
    let column_h = (screen_h / hit.distance).floor().min(screen_h * MAX_COLUMN_SCREENS) as i32;
    if column_h <= 0 {
        return;
    }

    let half_h = h as i32 / 2;
    let top = half_h - column_h / 2;
    let bottom = half_h + column_h / 2;
    let y0 = top.max(0);
    let y1 = bottom.min(h as i32);

    for y in y0..y1 {
        let colour = match surface {
            Surface::Flat(c) => *c,
            Surface::Textured(tex) => {
                let v = (y - top) as f32 / column_h as f32;
                tex.sample(hit.wall_x, v)
            }
        };
        pixels[y as usize * w + x] = colour;
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RenderConfig;
    use crate::world::{DEFAULT_FOV, Palette};
    use glam::Vec2;

    const CEIL: Rgba = 0xFF_000001;
    const FLOOR: Rgba = 0xFF_000002;

    fn config() -> RenderConfig {
        RenderConfig {
            ceiling: CEIL,
            floor: FLOOR,
            ..RenderConfig::default()
        }
    }

    fn bordered(w: usize, h: usize) -> Level {
        let mut tiles = vec![0; w * h];
        for y in 0..h {
            for x in 0..w {
                if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                    tiles[y * w + x] = 1;
                }
            }
        }
        Level::new(w as u32, h as u32, tiles).unwrap()
    }

    fn frame(sw: &mut Software, cam: &mut Camera, level: &Level, bank: &TextureBank) -> usize {
        sw.visited.reset(level.area());
        cam.begin_frame(CEIL, FLOOR);
        sw.draw_walls(cam, level, bank)
    }

    #[test]
    fn textured_slice_is_centred_on_horizon() {
        let level = bordered(3, 3);
        let mut bank = TextureBank::default_with_checker();
        let lit = bank.insert(Texture::solid("LIT", 4, 4, 0xFF_AA0000)).unwrap();
        let dark = bank.insert(Texture::solid("DARK", 4, 4, 0xFF_550000)).unwrap();
        let mut sw = Software::new(config(), vec![lit, dark]);
        let mut cam = Camera::new(64, 48, DEFAULT_FOV).unwrap();
        cam.update_basis(Vec2::new(1.5, 1.5), 0.0);

        frame(&mut sw, &mut cam, &level, &bank);

        // distance 0.5 → slice twice the screen height, clipped to it
        assert!((cam.depth()[32] - 0.5).abs() < 1e-5);
        assert!((0..48).all(|y| cam.pixels()[y * 64 + 32] == 0xFF_AA0000));
    }

    #[test]
    fn faces_along_y_use_the_second_slot() {
        let level = bordered(5, 5);
        let mut bank = TextureBank::default_with_checker();
        let lit = bank.insert(Texture::solid("LIT", 4, 4, 0xFF_AA0000)).unwrap();
        let dark = bank.insert(Texture::solid("DARK", 4, 4, 0xFF_550000)).unwrap();
        let mut sw = Software::new(config(), vec![lit, dark]);
        let mut cam = Camera::new(32, 32, DEFAULT_FOV).unwrap();
        // looking straight at the top border
        cam.update_basis(Vec2::new(2.5, 2.5), std::f32::consts::FRAC_PI_2);

        frame(&mut sw, &mut cam, &level, &bank);

        assert!((cam.depth()[16] - 1.5).abs() < 1e-5);
        assert_eq!(cam.pixels()[16 * 32 + 16], 0xFF_550000);
        // slice is floor(32 / 1.5) = 21 rows: 6..26
        assert_eq!(cam.pixels()[5 * 32 + 16], CEIL);
        assert_eq!(cam.pixels()[6 * 32 + 16], 0xFF_550000);
        assert_eq!(cam.pixels()[26 * 32 + 16], FLOOR);
    }

    #[test]
    fn missing_texture_falls_back_to_palette() {
        let level = bordered(3, 3);
        let bank = TextureBank::default_with_checker();
        let palette = Palette(vec![0xFF_0A0B0C]);
        let mut sw = Software::new(
            RenderConfig {
                palette,
                ..config()
            },
            vec![],
        );
        let mut cam = Camera::new(16, 16, DEFAULT_FOV).unwrap();
        cam.update_basis(Vec2::new(1.5, 1.5), 0.0);

        let walls = frame(&mut sw, &mut cam, &level, &bank);

        assert_eq!(walls, 16);
        assert_eq!(cam.pixels()[8 * 16 + 8], 0xFF_0A0B0C);
    }

    #[test]
    fn unpainted_wall_keeps_background_but_writes_depth() {
        let level = bordered(3, 3);
        let bank = TextureBank::default_with_checker();
        let mut sw = Software::new(
            RenderConfig {
                palette: Palette(vec![]),
                ..config()
            },
            vec![],
        );
        let mut cam = Camera::new(8, 8, DEFAULT_FOV).unwrap();
        cam.update_basis(Vec2::new(1.5, 1.5), 0.0);

        assert_eq!(frame(&mut sw, &mut cam, &level, &bank), 0);
        assert!(cam.depth().iter().all(|d| d.is_finite()));
        assert!((cam.depth()[4] - 0.5).abs() < 1e-5);
        assert!(cam.pixels()[..4 * 8].iter().all(|&p| p == CEIL));
        assert!(cam.pixels()[4 * 8..].iter().all(|&p| p == FLOOR));
    }

    #[test]
    fn open_level_keeps_background_and_infinite_depth() {
        let level = Level::new(4, 4, vec![0; 16]).unwrap();
        let bank = TextureBank::default_with_checker();
        let mut sw = Software::new(config(), vec![]);
        let mut cam = Camera::new(16, 8, DEFAULT_FOV).unwrap();
        cam.update_basis(Vec2::new(1.5, 1.5), 0.3);

        assert_eq!(frame(&mut sw, &mut cam, &level, &bank), 0);
        assert!(cam.depth().iter().all(|d| d.is_infinite()));
        assert!(cam.pixels()[..4 * 16].iter().all(|&p| p == CEIL));
        assert!(cam.pixels()[4 * 16..].iter().all(|&p| p == FLOOR));
        assert!(!sw.visited.is_empty());
    }
}
