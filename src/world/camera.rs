use glam::{IVec2, Vec2};

use crate::renderer::Rgba;

/// Half-width of the view plane relative to the view direction (≈ 66° FoV).
pub const DEFAULT_FOV: f32 = 0.66;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera viewport must be non-empty, got {width}x{height}")]
    ZeroViewport { width: usize, height: usize },
}

/// Per-viewport view point plus the buffers it renders into.
///
/// * The pose is copied from the entity's `Position`/`Angle` once per frame
///   by [`Camera::update_basis`]; everything else is derived from it.
/// * `depth` holds one perpendicular distance per screen column.
/// * `pixels` is row-major 0xAARRGGBB, `width * height` long.
#[derive(Clone, Debug)]
pub struct Camera {
    width: usize,
    height: usize,
    pub fov: f32,

    position: Vec2,
    tile: IVec2,
    direction: Vec2,
    strafe: Vec2,
    plane: Vec2,
    start: Vec2,
    end: Vec2,
    inv_det: f32,

    depth: Vec<f32>,
    pixels: Vec<Rgba>,
}

impl Camera {
    /// Allocate a camera rendering a `width × height` viewport.
    pub fn new(width: usize, height: usize, fov: f32) -> Result<Self, CameraError> {
        if width == 0 || height == 0 {
            return Err(CameraError::ZeroViewport { width, height });
        }
        let mut cam = Self {
            width,
            height,
            fov,
            position: Vec2::ZERO,
            tile: IVec2::ZERO,
            direction: Vec2::X,
            strafe: Vec2::NEG_Y,
            plane: Vec2::ZERO,
            start: Vec2::ZERO,
            end: Vec2::ZERO,
            inv_det: f32::INFINITY,
            depth: vec![f32::INFINITY; width],
            pixels: vec![0; width * height],
        };
        cam.update_basis(Vec2::ZERO, 0.0);
        tracing::debug!(width, height, fov, "camera allocated");
        Ok(cam)
    }

    /*──────────────────────── per-frame basis ───────────────────────*/

    /// Recompute the view basis from the transform pose.
    ///
    /// `rotation` is in radians, 0 = +X, counter-clockwise positive.
    pub fn update_basis(&mut self, position: Vec2, rotation: f32) {
        let (s, c) = rotation.sin_cos();
        self.direction = Vec2::new(c, s);
        // right-hand perpendicular: (x, y) -> (y, -x)
        self.strafe = Vec2::new(self.direction.y, -self.direction.x);
        self.position = position;
        self.tile = position.floor().as_ivec2();
        self.plane = self.strafe * self.fov;
        self.start = self.direction - self.plane;
        self.end = self.direction + self.plane;
        self.inv_det = 1.0 / self.plane.perp_dot(self.direction);
    }

    /// False when plane and direction are collinear (e.g. `fov == 0`).
    #[inline]
    pub fn has_valid_basis(&self) -> bool {
        self.inv_det.is_finite()
    }

    /// Transform an offset from the camera into camera space:
    ///  .x = lateral offset scaled by the plane (negative = left)
    ///  .y = depth along the view direction
    ///
    /// `None` when the basis is degenerate.
    #[inline]
    pub fn project(&self, relative: Vec2) -> Option<Vec2> {
        let x = self.inv_det * relative.perp_dot(self.direction);
        let y = self.inv_det * self.plane.perp_dot(relative);
        (x.is_finite() && y.is_finite()).then_some(Vec2::new(x, y))
    }

    /// Ray direction for the interpolation parameter `t ∈ [-1, 1]`.
    #[inline]
    pub fn ray_dir(&self, t: f32) -> Vec2 {
        self.direction + self.plane * t
    }

    /// Interpolation parameter of screen column `x`.
    #[inline]
    pub fn column_param(&self, x: usize) -> f32 {
        x as f32 / self.width as f32 * 2.0 - 1.0
    }

    /// Reset the frame: ceiling above the horizon, floor below, depth at ∞.
    pub fn begin_frame(&mut self, ceiling: Rgba, floor: Rgba) {
        let split = (self.height / 2) * self.width;
        self.pixels[..split].fill(ceiling);
        self.pixels[split..].fill(floor);
        self.depth.fill(f32::INFINITY);
    }

    /*──────────────────────── accessors ─────────────────────────────*/

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn tile(&self) -> IVec2 {
        self.tile
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    #[inline]
    pub fn strafe(&self) -> Vec2 {
        self.strafe
    }

    #[inline]
    pub fn plane(&self) -> Vec2 {
        self.plane
    }

    /// Ray direction of the leftmost column.
    #[inline]
    pub fn start(&self) -> Vec2 {
        self.start
    }

    /// Ray direction one past the rightmost column.
    #[inline]
    pub fn end(&self) -> Vec2 {
        self.end
    }

    #[inline]
    pub fn inv_det(&self) -> f32 {
        self.inv_det
    }

    #[inline]
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Borrow both render targets at once.
    #[inline]
    pub fn targets_mut(&mut self) -> (&mut [Rgba], &mut [f32]) {
        (&mut self.pixels, &mut self.depth)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
