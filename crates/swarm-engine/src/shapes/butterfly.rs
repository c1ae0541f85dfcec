//! Butterfly and single-wing silhouettes.

use std::f32::consts::PI;

use super::{Part, ShapePoint};
use crate::api::types::RegionTag;
use crate::core::rng::Rng;

/// Where the wings attach to the body.
const WING_ROOT_Y: f32 = 0.05;

pub(crate) static BUTTERFLY: &[Part] = &[
    Part { share: 0.10, generate: body },
    Part { share: 0.04, generate: antennae },
    Part { share: 0.27, generate: |n, rng| wing(n, rng, Wing::UPPER, 1.0, 0.0) },
    Part { share: 0.27, generate: |n, rng| wing(n, rng, Wing::UPPER, -1.0, 0.0) },
    Part { share: 0.16, generate: |n, rng| wing(n, rng, Wing::LOWER, 1.0, 0.0) },
    Part { share: 0.16, generate: |n, rng| wing(n, rng, Wing::LOWER, -1.0, 0.0) },
];

/// Right fore + hind wing, shifted so the pair is centered.
pub(crate) static WING_SHAPE: &[Part] = &[
    Part { share: 0.6, generate: |n, rng| wing(n, rng, Wing::UPPER, 1.0, -0.45) },
    Part { share: 0.4, generate: |n, rng| wing(n, rng, Wing::LOWER, 1.0, -0.45) },
];

/// Angular sweep and reach of one wing lobe (right side, y down).
#[derive(Clone, Copy)]
struct Wing {
    from: f32,
    to: f32,
    reach: f32,
    /// Phase of the scalloped edge so fore and hind wings do not line up.
    edge_phase: f32,
}

impl Wing {
    const UPPER: Wing = Wing { from: -1.55, to: -0.05, reach: 0.95, edge_phase: 0.0 };
    const LOWER: Wing = Wing { from: 0.12, to: 1.35, reach: 0.62, edge_phase: 1.3 };

    /// Edge radius at `angle`: a bulged lobe with a sinusoidal scallop.
    fn edge(&self, angle: f32) -> f32 {
        let along = (angle - self.from) / (self.to - self.from);
        let lobe = 0.55 + 0.45 * (along * PI).sin();
        self.reach * lobe * (1.0 + 0.08 * (6.0 * angle + self.edge_phase).sin())
    }
}

/// Stacked cross-sections: a thin line whose thickness swells mid-thorax.
fn body(budget: usize, rng: &mut Rng) -> Vec<ShapePoint> {
    (0..budget)
        .map(|i| {
            let t = (i as f32 + 0.5) / budget as f32;
            let y = -0.42 + t * 0.95;
            let half_width = 0.02 + 0.045 * (t * PI).sin();
            let x = rng.range(-half_width, half_width);
            let density = 1.0 - 0.3 * (x.abs() / half_width);
            ShapePoint::new(x, y, RegionTag::Body, density)
        })
        .collect()
}

/// Two curling feelers rising from the head.
fn antennae(budget: usize, rng: &mut Rng) -> Vec<ShapePoint> {
    (0..budget)
        .map(|i| {
            let side = if i % 2 == 0 { 1.0 } else { -1.0 };
            let t = rng.next_f32();
            let x = side * (0.24 * t + 0.04 * (t * PI).sin());
            let y = -0.42 - 0.4 * t + 0.06 * t * t;
            ShapePoint::new(x, y, RegionTag::Antenna, 0.6)
        })
        .collect()
}

/// Angle/radius sweep filling one wing lobe uniformly by area.
/// Points near the scalloped edge are denser, so outlines read crisply.
fn wing(budget: usize, rng: &mut Rng, lobe: Wing, side: f32, shift_x: f32) -> Vec<ShapePoint> {
    (0..budget)
        .map(|_| {
            let angle = rng.range(lobe.from, lobe.to);
            let edge = lobe.edge(angle);
            let r = edge * rng.next_f32().sqrt();
            let x = side * r * angle.cos() + shift_x;
            let y = WING_ROOT_Y + r * angle.sin();
            ShapePoint::new(x, y, RegionTag::Wing, 0.4 + 0.6 * (r / edge))
        })
        .collect()
}
