use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Drawing-surface dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True while layout has not produced a usable surface (zero, negative or NaN size).
    /// Integrators no-op on such frames.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0) || !self.width.is_finite() || !self.height.is_finite()
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }

    /// Scale that maps normalized shape offsets (roughly [-1, 1]) onto the surface,
    /// filling `fill` of the shorter side from center to edge.
    pub fn shape_scale(&self, fill: f32) -> f32 {
        self.min_side() * 0.5 * fill
    }

    /// Axis-aligned bounds grown by `margin` on every side: (min, max).
    pub fn padded_bounds(&self, margin: f32) -> (Vec2, Vec2) {
        (
            Vec2::splat(-margin),
            Vec2::new(self.width + margin, self.height + margin),
        )
    }
}
