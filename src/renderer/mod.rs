//! Rendering abstraction layer.
//!
//! *The simulation never touches a pixel buffer directly.*
//! Each [`Camera`](crate::world::Camera) component owns its own colour and
//! depth buffers; a type implementing [`Renderer`] fills them once per frame
//! from the ECS world and the tile grid.
//!
//! * The only back-end is the CPU column caster in [`software`].
//! * Outputs are read back with `Camera::pixels()` and blitted by the caller.

use hecs::World;

use crate::world::{Level, Palette, TextureBank};

/// Pixel format of the software frame-buffer (0xAARRGGBB).
pub type Rgba = u32;

/// Texel value that sprites never write (classic Wolfenstein magenta).
pub const TRANSPARENT_KEY: Rgba = 0xFF_980088;

/// Static rendering options shared by every camera.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Fill above the horizon, also shown where rays leave the grid.
    pub ceiling: Rgba,
    /// Fill below the horizon.
    pub floor: Rgba,
    /// Sprite texels with exactly this value are skipped.
    pub transparent: Rgba,
    /// Flat colours for materials without a wall texture.
    pub palette: Palette,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ceiling: 0xFF_888888,
            floor: 0xFF_666666,
            transparent: TRANSPARENT_KEY,
            palette: Palette::default(),
        }
    }
}

/// A renderer that draws every camera in `world` for the current frame.
///
/// Must run after collision resolution so it samples corrected positions.
pub trait Renderer {
    fn update(&mut self, world: &World, level: &Level, bank: &TextureBank);
}

pub mod software;

pub use software::Software;
