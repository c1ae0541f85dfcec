// extensions/easing.rs
//
// Ease curves that map linear formation time onto progress.
// Pure math; no dependency on particles or the pool.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Easing curve applied to a normalized time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant velocity.
    Linear,
    /// Slow end.
    QuadOut,
    /// Stronger slow end; the default formation feel.
    #[default]
    CubicOut,
    /// Very strong slow end.
    QuartOut,
    /// Dramatic front-loaded speed.
    ExpoOut,
    /// Smooth start and end.
    SineInOut,
}

impl Easing {
    /// Apply the curve to `t`, clamped into [0, 1].
    /// Every variant is monotonic with `apply(0) == 0` and `apply(1) == 1`.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::QuartOut => 1.0 - (1.0 - t).powi(4),
            Easing::ExpoOut => {
                if t >= 1.0 { 1.0 } else { 1.0 - 2.0_f32.powf(-10.0 * t) }
            }
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Linearly interpolate between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linearly interpolate between two Vec2 values.
#[inline]
pub fn lerp_vec2(a: glam::Vec2, b: glam::Vec2, t: f32) -> glam::Vec2 {
    a + (b - a) * t
}
