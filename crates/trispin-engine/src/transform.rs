//! Model/view/projection state.
//!
//! View and projection only change on resize; the model matrix is rebuilt from
//! elapsed time every frame.

use glam::{Mat4, Vec3};

/// Vertical field of view of the projection, in degrees.
pub const FOV_Y_DEGREES: f32 = 45.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;
/// Distance the camera is pulled back along +Z.
pub const CAMERA_DISTANCE: f32 = 2.0;

/// Render area in framebuffer pixels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Axis the triangle spins around: normalize(1, 1, 1).
pub fn rotation_axis() -> Vec3 {
    Vec3::ONE.normalize()
}

#[derive(Debug, Clone)]
pub struct TransformState {
    width: u32,
    height: u32,
    viewport: Viewport,
    model: Mat4,
    view: Mat4,
    projection: Mat4,
}

impl TransformState {
    /// State before the first resize: all matrices identity, zero-sized viewport.
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            viewport: Viewport::default(),
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }

    /// Recomputes viewport, projection and view for a framebuffer of `width` x `height`.
    ///
    /// Returns `false` and keeps the previous state if either dimension is zero
    /// (e.g. a minimized window).
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }

        self.width = width;
        self.height = height;
        self.viewport = Viewport::full(width, height);
        self.projection = Mat4::perspective_rh(
            FOV_Y_DEGREES.to_radians(),
            self.aspect_ratio(),
            Z_NEAR,
            Z_FAR,
        );
        self.view = Mat4::from_translation(Vec3::new(0.0, 0.0, -CAMERA_DISTANCE));
        true
    }

    /// Rotates the model by `elapsed` radians about [`rotation_axis`] and returns
    /// the combined projection * view * model matrix.
    pub fn update(&mut self, elapsed: f32) -> Mat4 {
        self.model = Mat4::from_axis_angle(rotation_axis(), elapsed);
        self.mvp()
    }

    pub fn mvp(&self) -> Mat4 {
        self.projection * self.view * self.model
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::new()
    }
}
