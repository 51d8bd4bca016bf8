// Format-agnostic repository of texel buffers.
// The renderer and world logic interact through `TextureId` only.

use std::collections::HashMap;
use std::ops::Index;

use crate::renderer::Rgba;

/// Runtime handle for a texture in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type TextureId = u16;

/// `TextureId` whose pixels are the checkerboard fallback.
/// Always = 0 because `TextureBank::new()` inserts it first.
pub const NO_TEXTURE: TextureId = 0;

/// CPU-side storage: 32-bit **ARGB** (0xAARRGGBB) in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<Rgba>,
}

/// Convenience checkerboard 8×8 (dark/light grey).
impl Default for Texture {
    fn default() -> Self {
        Texture::checker("CHECKER", 8, 8, 1, 0xFF_A0A0A0, 0xFF_505050)
    }
}

/// How a sheet is cut into equally sized cells.
///
/// `step_w`/`step_h` is the distance between the top-left corners of two
/// neighbouring cells, so a 1-pixel gutter between 64×64 cells is
/// `step_w = 65`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SheetLayout {
    pub columns: usize,
    pub rows: usize,
    pub step_w: usize,
    pub step_h: usize,
}

/// Things that can go wrong when using textures or the bank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID is outside `0 .. bank.len()`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),

    /// A sheet cell reaches past the edge of the source texture.
    #[error("sheet cell {index} at ({x}, {y}) does not fit in `{sheet}`")]
    SheetOutOfBounds {
        sheet: String,
        index: usize,
        x: usize,
        y: usize,
    },

    #[error("texture `{0}` has zero size")]
    ZeroSize(String),
}

impl Texture {
    /// One flat colour.
    pub fn solid<S: Into<String>>(name: S, w: usize, h: usize, color: Rgba) -> Self {
        Texture {
            name: name.into(),
            w,
            h,
            pixels: vec![color; w * h],
        }
    }

    /// Checkerboard with square cells of `cell` texels.
    pub fn checker<S: Into<String>>(
        name: S,
        w: usize,
        h: usize,
        cell: usize,
        a: Rgba,
        b: Rgba,
    ) -> Self {
        let cell = cell.max(1);
        let mut pixels = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                pixels.push(if ((x / cell) ^ (y / cell)) & 1 == 0 { a } else { b });
            }
        }
        Texture {
            name: name.into(),
            w,
            h,
            pixels,
        }
    }

    /// Running-bond brick wall: 4 courses, 2 bricks per course, 1-texel mortar.
    pub fn bricks<S: Into<String>>(name: S, w: usize, h: usize, brick: Rgba, mortar: Rgba) -> Self {
        let course_h = (h / 4).max(2);
        let brick_w = (w / 2).max(2);
        let mut pixels = Vec::with_capacity(w * h);
        for y in 0..h {
            let course = y / course_h;
            let shift = if course % 2 == 0 { 0 } else { brick_w / 2 };
            for x in 0..w {
                let joint = y % course_h == 0 || (x + shift) % brick_w == 0;
                pixels.push(if joint { mortar } else { brick });
            }
        }
        Texture {
            name: name.into(),
            w,
            h,
            pixels,
        }
    }

    /// Copy with every colour channel halved (alpha kept).
    ///
    /// Used to derive the Y-side variant of a wall, faking directional light.
    pub fn shaded(&self) -> Self {
        Texture {
            name: format!("{}_DARK", self.name),
            w: self.w,
            h: self.h,
            pixels: self
                .pixels
                .iter()
                .map(|&p| (p & 0xFF00_0000) | ((p >> 1) & 0x007F_7F7F))
                .collect(),
        }
    }

    /// Nearest-neighbour sample at normalised `(u, v)`; values are clamped
    /// to the texture edge.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> Rgba {
        let x = ((u * self.w as f32) as usize).min(self.w - 1);
        let y = ((v * self.h as f32) as usize).min(self.h - 1);
        self.pixels[y * self.w + x]
    }

    /// Cut this texture into `columns * rows` cells of `tile_w × tile_h`,
    /// returned row by row.
    pub fn slice_sheet(
        &self,
        layout: SheetLayout,
        tile_w: usize,
        tile_h: usize,
    ) -> Result<Vec<Texture>, TextureError> {
        if tile_w == 0 || tile_h == 0 || self.w == 0 || self.h == 0 {
            return Err(TextureError::ZeroSize(self.name.clone()));
        }

        let mut out = Vec::with_capacity(layout.columns * layout.rows);
        for row in 0..layout.rows {
            for col in 0..layout.columns {
                let index = row * layout.columns + col;
                let x0 = col * layout.step_w;
                let y0 = row * layout.step_h;
                if x0 + tile_w > self.w || y0 + tile_h > self.h {
                    return Err(TextureError::SheetOutOfBounds {
                        sheet: self.name.clone(),
                        index,
                        x: x0,
                        y: y0,
                    });
                }

                let mut pixels = Vec::with_capacity(tile_w * tile_h);
                for y in y0..y0 + tile_h {
                    let start = y * self.w + x0;
                    pixels.extend_from_slice(&self.pixels[start..start + tile_w]);
                }
                out.push(Texture {
                    name: format!("{}{}", self.name, index),
                    w: tile_w,
                    h: tile_h,
                    pixels,
                });
            }
        }
        Ok(out)
    }
}

/// Flat colours used for walls whose material has no texture.
///
/// Indexed like the wall texture list (`(material - 1) * 2 + side`),
/// modulo its length.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette(pub Vec<Rgba>);

impl Default for Palette {
    fn default() -> Self {
        Palette(vec![
            0xFF_FF0000,
            0xFF_770000,
            0xFF_00FF00,
            0xFF_007700,
            0xFF_0000FF,
            0xFF_000077,
            0xFF_FFFF00,
            0xFF_777700,
            0xFF_FF00FF,
            0xFF_770077,
            0xFF_00FFFF,
            0xFF_007777,
            0xFF_FFFFFF,
            0xFF_777777,
            0xFF_FF7700,
            0xFF_773300,
            0xFF_FF0077,
            0xFF_770033,
            0xFF_7700FF,
            0xFF_330077,
            0xFF_00FF77,
            0xFF_007733,
            0xFF_0077FF,
            0xFF_003377,
        ])
    }
}

impl Palette {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Colour at `idx` wrapped around the palette length.
    #[inline]
    pub fn wrapped(&self, idx: usize) -> Option<Rgba> {
        (!self.0.is_empty()).then(|| self.0[idx % self.0.len()])
    }
}

impl Index<usize> for Palette {
    type Output = Rgba;
    fn index(&self, idx: usize) -> &Rgba {
        &self.0[idx]
    }
}

/// A format-agnostic cache of textures.
///
/// * Does **not** know about PNG or sheets on disk — that’s the loader’s job.
/// * Stores exactly one copy of every name.
/// * ID **0** is always the “missing” checkerboard.
pub struct TextureBank {
    by_name: HashMap<String, TextureId>,
    data: Vec<Texture>,
}

impl TextureBank {
    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    /// Create an empty bank with a mandatory *missing* texture used as
    /// fallback.  The texture is inserted under the fixed name `"MISSING"`
    /// and obtains the handle **0**. An empty texture is replaced by the
    /// checkerboard, since every failed lookup samples it.
    pub fn new(mut missing_tex: Texture) -> Self {
        if missing_tex.w == 0 || missing_tex.h == 0 {
            tracing::warn!(name = %missing_tex.name, "empty missing texture, using checkerboard");
            missing_tex = Texture::default();
        }
        let mut by_name = HashMap::new();
        by_name.insert("MISSING".into(), NO_TEXTURE);
        Self {
            by_name,
            data: vec![missing_tex],
        }
    }

    pub fn default_with_checker() -> Self {
        Self::new(Texture::default())
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    /// Number of textures stored (including the “missing” one).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    } // only checker

    /// Obtain the id for a *loaded* texture by name.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    /// Fallback-safe query: unknown names resolve to the checkerboard id.
    pub fn id_or_missing(&self, name: &str) -> TextureId {
        self.id(name).unwrap_or(NO_TEXTURE)
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.data.get(id as usize).ok_or(TextureError::BadId(id))
    }

    /// Borrow a texture by id, falling back to the checkerboard.
    #[inline]
    pub fn texture_or_missing(&self, id: TextureId) -> &Texture {
        self.data.get(id as usize).unwrap_or(&self.data[0])
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Insert a texture under its own name.
    ///
    /// * Returns the newly assigned `TextureId`.
    /// * Fails if the name already exists (`Duplicate`).
    pub fn insert(&mut self, tex: Texture) -> Result<TextureId, TextureError> {
        if tex.w == 0 || tex.h == 0 {
            return Err(TextureError::ZeroSize(tex.name));
        }
        if self.by_name.contains_key(&tex.name) {
            return Err(TextureError::Duplicate(tex.name));
        }
        let id = self.data.len() as TextureId;
        self.by_name.insert(tex.name.clone(), id);
        self.data.push(tex);
        Ok(id)
    }

    /// Insert a batch (e.g. the cells of a sliced sheet), keeping order.
    pub fn insert_all<I>(&mut self, textures: I) -> Result<Vec<TextureId>, TextureError>
    where
        I: IntoIterator<Item = Texture>,
    {
        textures.into_iter().map(|t| self.insert(t)).collect()
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_tex(name: &str, color: Rgba) -> Texture {
        Texture::solid(name, 2, 2, color)
    }

    #[test]
    fn insert_and_lookup() {
        let mut bank = TextureBank::default_with_checker();
        let red = bank.insert(dummy_tex("RED", 0xFF_FF0000)).unwrap();
        let blue = bank.insert(dummy_tex("BLUE", 0xFF_0000FF)).unwrap();

        assert_ne!(red, NO_TEXTURE);
        assert_ne!(blue, red);
        assert_eq!(bank.id("RED"), Some(red));
        assert_eq!(bank.id("BLUE"), Some(blue));
        assert_eq!(bank.id("NOPE"), None);
        assert_eq!(bank.id_or_missing("NOPE"), NO_TEXTURE);

        assert_eq!(bank.texture(red).unwrap().pixels[0], 0xFF_FF0000);
        assert_eq!(bank.texture(blue).unwrap().pixels[0], 0xFF_0000FF);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut bank = TextureBank::default_with_checker();
        bank.insert(dummy_tex("WOOD", 1)).unwrap();
        let err = bank.insert(dummy_tex("WOOD", 2)).unwrap_err();
        assert_eq!(err, TextureError::Duplicate("WOOD".into()));
        // texture count still 2 (checker + first WOOD)
        assert_eq!(bank.len(), 2);
    }

    #[test]
    fn bad_id_guard() {
        let bank = TextureBank::default_with_checker();
        let bad = TextureId::MAX;
        assert_eq!(bank.texture(bad).unwrap_err(), TextureError::BadId(bad));
        assert_eq!(bank.texture_or_missing(bad).name, "CHECKER");
    }

    #[test]
    fn empty_missing_texture_falls_back_to_checker() {
        let bank = TextureBank::new(Texture::solid("VOID", 0, 0, 0));
        let missing = bank.texture_or_missing(99);
        assert_eq!(missing.name, "CHECKER");
        assert!(missing.w > 0 && missing.h > 0);
        // sampling the fallback must not underflow
        let _ = missing.sample(0.5, 0.5);
        assert_eq!(bank.id("MISSING"), Some(NO_TEXTURE));
    }

    #[test]
    fn sample_clamps_to_edge() {
        let tex = Texture::checker("C", 2, 2, 1, 0xA, 0xB);
        assert_eq!(tex.sample(0.0, 0.0), 0xA);
        assert_eq!(tex.sample(0.75, 0.0), 0xB);
        assert_eq!(tex.sample(0.75, 0.75), 0xA);
        assert_eq!(tex.sample(1.0, 1.0), 0xA);
    }

    #[test]
    fn slice_sheet_with_gutter() {
        // 2 cells of 2×2 separated by a 1-texel gutter: 5×2 sheet.
        let mut sheet = Texture::solid("SHEET", 5, 2, 0);
        for y in 0..2 {
            for x in 0..2 {
                sheet.pixels[y * 5 + x] = 1;
                sheet.pixels[y * 5 + x + 3] = 2;
            }
        }
        let layout = SheetLayout {
            columns: 2,
            rows: 1,
            step_w: 3,
            step_h: 3,
        };
        let cells = sheet.slice_sheet(layout, 2, 2).unwrap();
        assert_eq!(cells.len(), 2);
        assert!(cells[0].pixels.iter().all(|&p| p == 1));
        assert!(cells[1].pixels.iter().all(|&p| p == 2));
        assert_eq!(cells[1].name, "SHEET1");
    }

    #[test]
    fn slice_sheet_out_of_bounds() {
        let sheet = Texture::solid("SHEET", 4, 4, 0);
        let layout = SheetLayout {
            columns: 2,
            rows: 1,
            step_w: 3,
            step_h: 3,
        };
        let err = sheet.slice_sheet(layout, 2, 2).unwrap_err();
        assert!(matches!(err, TextureError::SheetOutOfBounds { index: 1, .. }));
    }

    #[test]
    fn shaded_halves_channels() {
        let tex = Texture::solid("W", 1, 1, 0xFF_FF8040);
        assert_eq!(tex.shaded().pixels[0], 0xFF_7F4020);
    }

    #[test]
    fn palette_wraps() {
        let pal = Palette::default();
        assert_eq!(pal.len(), 24);
        assert_eq!(pal.wrapped(24), Some(pal[0]));
        assert_eq!(Palette(vec![]).wrapped(3), None);
    }
}
