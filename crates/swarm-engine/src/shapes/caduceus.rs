//! Staff-and-serpents emblem.
//!
//! Budget split: 35% left serpent, 35% right serpent, 12% shaft, 8% heads,
//! 7% wings, 3% ornament.

use std::f32::consts::{PI, TAU};

use super::{Part, ShapePoint};
use crate::api::types::RegionTag;
use crate::core::rng::Rng;

const SHAFT_TOP: f32 = -0.85;
const SHAFT_BOTTOM: f32 = 0.95;
const SERPENT_TOP: f32 = -0.55;
const SERPENT_BOTTOM: f32 = 0.85;
const SERPENT_TURNS: f32 = 2.25;
const SERPENT_AMPLITUDE: f32 = 0.22;

pub(crate) static CADUCEUS: &[Part] = &[
    Part { share: 0.35, generate: |n, rng| serpent(n, rng, -1.0) },
    Part { share: 0.35, generate: |n, rng| serpent(n, rng, 1.0) },
    Part { share: 0.12, generate: shaft },
    Part { share: 0.08, generate: heads },
    Part { share: 0.07, generate: wings },
    Part { share: 0.03, generate: ornament },
];

/// Near-straight cylinder with a small jitter radius.
fn shaft(budget: usize, rng: &mut Rng) -> Vec<ShapePoint> {
    (0..budget)
        .map(|i| {
            let t = (i as f32 + rng.next_f32()) / budget as f32;
            let y = SHAFT_TOP + t * (SHAFT_BOTTOM - SHAFT_TOP);
            ShapePoint::new(rng.range(-0.02, 0.02), y, RegionTag::Staff, 0.9)
        })
        .collect()
}

/// Horizontal displacement of a serpent's spine at `t` in [0, 1] (top to bottom).
/// The two serpents are half a turn apart, so they cross at the shaft.
fn spine_x(t: f32, side: f32) -> f32 {
    let amplitude = SERPENT_AMPLITUDE * (1.0 - 0.35 * t);
    side * amplitude * (TAU * SERPENT_TURNS * t).cos()
}

/// Helix projected around the shaft. Points facing the viewer (spine near its
/// widest swing) get higher density as a depth cue.
fn serpent(budget: usize, rng: &mut Rng, side: f32) -> Vec<ShapePoint> {
    (0..budget)
        .map(|_| {
            let t = rng.next_f32();
            let y = SERPENT_TOP + t * (SERPENT_BOTTOM - SERPENT_TOP);
            let thickness = 0.025 * (1.0 - 0.5 * t);
            let x = spine_x(t, side) + rng.range(-thickness, thickness);
            let facing = (TAU * SERPENT_TURNS * t).cos().abs();
            ShapePoint::new(x, y, RegionTag::Serpent, 0.55 + 0.45 * facing)
        })
        .collect()
}

/// Two elongated clusters at the upper ends of the serpents, facing outward.
fn heads(budget: usize, rng: &mut Rng) -> Vec<ShapePoint> {
    (0..budget)
        .map(|i| {
            let side = if i % 2 == 0 { -1.0 } else { 1.0 };
            let center_x = spine_x(0.0, side) + side * 0.03;
            let jitter = rng.in_disc(0.055);
            ShapePoint::new(
                center_x + jitter.x * 1.3,
                SERPENT_TOP - 0.05 + jitter.y,
                RegionTag::Head,
                1.0,
            )
        })
        .collect()
}

/// Feathered wings spreading from the top of the shaft, tapering outward.
fn wings(budget: usize, rng: &mut Rng) -> Vec<ShapePoint> {
    (0..budget)
        .map(|i| {
            let side = if i % 2 == 0 { -1.0 } else { 1.0 };
            let s = rng.next_f32();
            let x = side * (0.04 + 0.46 * s);
            let crest = -0.72 - 0.22 * (s * PI * 0.5).sin();
            let depth = 0.12 * (1.0 - s) + 0.02;
            ShapePoint::new(x, crest + rng.range(0.0, depth), RegionTag::Wing, 0.5 + 0.5 * (1.0 - s))
        })
        .collect()
}

/// Small orb capping the staff.
fn ornament(budget: usize, rng: &mut Rng) -> Vec<ShapePoint> {
    (0..budget)
        .map(|_| {
            let p = rng.in_disc(0.05);
            ShapePoint::new(p.x, SHAFT_TOP - 0.07 + p.y, RegionTag::Ornament, 1.0)
        })
        .collect()
}
