pub mod camera;
pub mod level;
pub mod texture;

pub use camera::{Camera, CameraError, DEFAULT_FOV};
pub use level::{Aabb, EMPTY, Level, LevelError, OUTSIDE, TileId};
pub use texture::{
    NO_TEXTURE, Palette, SheetLayout, Texture, TextureBank, TextureError, TextureId,
};
