//! Declarative per-region color table.
//!
//! Each region lists `(color, weight)` entries; a particle's color is a
//! weighted pick from its region's list. Density tilts the pick toward the
//! region's first (primary) entry so dense cores read as solid color.

use serde::{Deserialize, Serialize};

use crate::api::types::RegionTag;
use crate::core::rng::Rng;

/// Linear RGB, each channel in [0, 1].
pub type Rgb = [f32; 3];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedColor {
    pub color: Rgb,
    pub weight: f32,
}

impl WeightedColor {
    pub const fn new(color: Rgb, weight: f32) -> Self {
        Self { color, weight }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPalette {
    pub region: RegionTag,
    pub colors: Vec<WeightedColor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorTable {
    pub regions: Vec<RegionPalette>,
}

const FALLBACK: Rgb = [1.0, 1.0, 1.0];

impl ColorTable {
    /// Palette entries for `region`, falling back to the `Free` palette.
    pub fn entries(&self, region: RegionTag) -> &[WeightedColor] {
        self.regions
            .iter()
            .find(|p| p.region == region)
            .or_else(|| self.regions.iter().find(|p| p.region == RegionTag::Free))
            .map(|p| p.colors.as_slice())
            .unwrap_or(&[])
    }

    /// Weighted pick for a particle of `region` with the given density.
    pub fn pick(&self, region: RegionTag, density: f32, rng: &mut Rng) -> Rgb {
        let entries = self.entries(region);
        if entries.is_empty() {
            return FALLBACK;
        }
        let bias = 0.5 + density.clamp(0.0, 1.0);
        let weights: Vec<f32> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| if i == 0 { e.weight * bias } else { e.weight })
            .collect();
        entries[rng.weighted_index(&weights)].color
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        use RegionTag::*;
        let table = |region, colors: &[WeightedColor]| RegionPalette { region, colors: colors.to_vec() };
        let w = WeightedColor::new;
        Self {
            regions: vec![
                table(Free, &[w([0.55, 0.75, 1.0], 3.0), w([0.85, 0.6, 1.0], 2.0), w([1.0, 1.0, 1.0], 1.0)]),
                table(Body, &[w([0.22, 0.16, 0.12], 4.0), w([0.45, 0.3, 0.18], 1.0)]),
                table(Wing, &[w([1.0, 0.55, 0.1], 5.0), w([1.0, 0.8, 0.25], 3.0), w([0.1, 0.08, 0.06], 1.0), w([1.0, 1.0, 0.95], 0.5)]),
                table(Antenna, &[w([0.2, 0.15, 0.1], 1.0)]),
                table(Staff, &[w([0.95, 0.78, 0.3], 4.0), w([0.8, 0.62, 0.2], 1.0)]),
                table(Serpent, &[w([0.15, 0.65, 0.4], 4.0), w([0.3, 0.8, 0.5], 2.0), w([0.95, 0.78, 0.3], 0.5)]),
                table(Head, &[w([0.1, 0.5, 0.3], 3.0), w([0.9, 0.2, 0.15], 0.4)]),
                table(Ornament, &[w([1.0, 0.9, 0.5], 1.0)]),
                table(Core, &[w([1.0, 0.85, 0.4], 3.0), w([1.0, 0.6, 0.2], 1.0)]),
                table(Orbit, &[w([0.45, 0.6, 0.95], 3.0), w([0.7, 0.8, 1.0], 1.0)]),
                table(Icon, &[w([0.95, 0.45, 0.7], 2.0), w([0.4, 0.9, 0.85], 2.0), w([0.95, 0.9, 0.4], 2.0)]),
            ],
        }
    }
}
