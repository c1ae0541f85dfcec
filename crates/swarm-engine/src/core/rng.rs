//! Seedable pseudo-random number generator (xorshift64).
//! Deterministic and allocation-free; every random choice in the engine
//! (scatter positions, shape jitter, palette picks) flows through it.

use glam::Vec2;

#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate a random integer in [0, upper_bound). Returns 0 for a zero bound.
    pub fn next_int(&mut self, upper_bound: u32) -> u32 {
        if upper_bound == 0 {
            return 0;
        }
        (self.next_u64() % upper_bound as u64) as u32
    }

    /// Uniform float in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        // Top 24 bits give an exactly representable mantissa.
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform float in [min, max).
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Uniform point inside a disc of the given radius.
    pub fn in_disc(&mut self, radius: f32) -> Vec2 {
        let angle = self.range(0.0, std::f32::consts::TAU);
        let r = radius * self.next_f32().sqrt();
        Vec2::new(angle.cos() * r, angle.sin() * r)
    }

    /// Pick an index proportionally to `weights`. Non-positive weights are never picked
    /// unless every weight is non-positive, in which case index 0 is returned.
    pub fn weighted_index(&mut self, weights: &[f32]) -> usize {
        let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return 0;
        }
        let mut pick = self.next_f32() * total;
        for (i, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            if pick < *w {
                return i;
            }
            pick -= *w;
        }
        // Float round-off: fall back to the last positive weight.
        weights.iter().rposition(|w| *w > 0.0).unwrap_or(0)
    }
}

/// Stateless hash of a 2D point into [0, 1).
/// Used wherever a stable per-particle value is needed without stored state.
pub fn hash_point(p: Vec2) -> f32 {
    let mut h = (p.x.to_bits() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (p.y.to_bits() as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h ^= h >> 33;
    h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h ^= h >> 33;
    (h >> 40) as f32 / (1u64 << 24) as f32
}
