//! Orbital icon arrangement: a glowing core, three tilted orbit rings and
//! small icon glyphs riding the rings.
//!
//! Unlike the organic shapes, every part here has a fixed natural
//! resolution; larger budgets are met by replicate-and-jitter.

use std::f32::consts::TAU;

use glam::Vec2;

use super::{Part, ShapePoint};
use crate::api::types::RegionTag;
use crate::core::rng::Rng;

const GOLDEN_ANGLE: f32 = 2.399_963;
const CORE_RADIUS: f32 = 0.14;
const CORE_POINTS: usize = 36;
const RING_SAMPLES: usize = 64;
const RING_TILT: f32 = 0.35;
/// Semi-axes of the three rings.
const RINGS: [(f32, f32); 3] = [(0.35, 0.26), (0.6, 0.44), (0.88, 0.64)];
const ICON_RADIUS: f32 = 0.06;
const ICON_POINTS: usize = 16;
/// (ring index, angle) for each icon.
const ICONS: [(usize, f32); 7] = [
    (0, 0.6), (0, 3.9),
    (1, 1.8), (1, 4.4),
    (2, 0.2), (2, 2.7), (2, 5.1),
];

pub(crate) static ORBITAL: &[Part] = &[
    Part { share: 0.12, generate: core },
    Part { share: 0.48, generate: rings },
    Part { share: 0.40, generate: icons },
];

/// Sunflower disc: evenly spread, denser toward the middle.
fn sunflower(center: Vec2, radius: f32, count: usize, region: RegionTag) -> Vec<ShapePoint> {
    (0..count)
        .map(|i| {
            let frac = (i as f32 + 0.5) / count as f32;
            let r = radius * frac.sqrt();
            let a = i as f32 * GOLDEN_ANGLE;
            let p = center + Vec2::new(a.cos(), a.sin()) * r;
            ShapePoint::new(p.x, p.y, region, 1.0 - 0.4 * frac)
        })
        .collect()
}

/// Point on ring `index` at parameter `angle`, after the shared tilt.
fn ring_point(index: usize, angle: f32) -> Vec2 {
    let (a, b) = RINGS[index];
    let local = Vec2::new(a * angle.cos(), b * angle.sin());
    Vec2::from_angle(RING_TILT).rotate(local)
}

fn core(_budget: usize, _rng: &mut Rng) -> Vec<ShapePoint> {
    sunflower(Vec2::ZERO, CORE_RADIUS, CORE_POINTS, RegionTag::Core)
}

fn rings(_budget: usize, _rng: &mut Rng) -> Vec<ShapePoint> {
    // Interleave rings so stride-thinning keeps all three visible.
    (0..RING_SAMPLES)
        .flat_map(|s| {
            (0..RINGS.len()).map(move |ring| {
                let p = ring_point(ring, s as f32 / RING_SAMPLES as f32 * TAU);
                ShapePoint::new(p.x, p.y, RegionTag::Orbit, 0.5)
            })
        })
        .collect()
}

fn icons(_budget: usize, _rng: &mut Rng) -> Vec<ShapePoint> {
    let glyphs: Vec<Vec<ShapePoint>> = ICONS
        .iter()
        .map(|&(ring, angle)| sunflower(ring_point(ring, angle), ICON_RADIUS, ICON_POINTS, RegionTag::Icon))
        .collect();
    // Interleave glyphs for the same reason as the rings.
    (0..ICON_POINTS)
        .flat_map(|i| glyphs.iter().map(move |g| g[i]))
        .map(|p| ShapePoint { density: 0.9 * p.density + 0.1, ..p })
        .collect()
}
