//! Procedural silhouettes sampled into weighted point clouds.
//!
//! Every shape is a list of sub-generators, each owning a fixed share of the
//! point budget. Shares are part of the shape's identity: they keep the
//! silhouette recognizable at any resolution. Offsets are normalized to
//! roughly [-1, 1] with y pointing down (screen convention).

mod butterfly;
mod caduceus;
mod orbital;
pub mod task;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use glam::Vec2;

use crate::api::error::EngineError;
use crate::api::types::RegionTag;
use crate::core::rng::Rng;

pub use task::{SampleTask, TaskPoll};

/// Max replicate jitter (normalized units) for a point of density 1.
pub const REPLICATE_JITTER: f32 = 0.02;

/// A single sampled target with its metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapePoint {
    /// Offset from the shape-local origin, normalized units.
    pub offset: Vec2,
    pub region: RegionTag,
    /// Relative weight in [0, 1]; drives stiffness, float amplitude, size and color.
    pub density: f32,
}

impl ShapePoint {
    pub fn new(x: f32, y: f32, region: RegionTag, density: f32) -> Self {
        Self {
            offset: Vec2::new(x, y),
            region,
            density: density.clamp(0.0, 1.0),
        }
    }
}

/// Known silhouettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeId {
    Butterfly,
    /// A single fore + hind wing.
    WingShape,
    /// Staff, twin serpents, heads and wings.
    Caduceus,
    /// Core with tilted orbit rings and icon clusters.
    Orbital,
}

impl ShapeId {
    pub const ALL: [ShapeId; 4] = [Self::Butterfly, Self::WingShape, Self::Caduceus, Self::Orbital];

    pub fn name(self) -> &'static str {
        match self {
            ShapeId::Butterfly => "butterfly",
            ShapeId::WingShape => "wing-shape",
            ShapeId::Caduceus => "caduceus",
            ShapeId::Orbital => "orbital",
        }
    }

    /// Stable numeric code for the event wire format.
    pub fn code(self) -> u32 {
        match self {
            ShapeId::Butterfly => 1,
            ShapeId::WingShape => 2,
            ShapeId::Caduceus => 3,
            ShapeId::Orbital => 4,
        }
    }

    fn parts(self) -> &'static [Part] {
        match self {
            ShapeId::Butterfly => butterfly::BUTTERFLY,
            ShapeId::WingShape => butterfly::WING_SHAPE,
            ShapeId::Caduceus => caduceus::CADUCEUS,
            ShapeId::Orbital => orbital::ORBITAL,
        }
    }

    /// Deterministic point cloud of exactly `point_count` points.
    pub fn sample(self, point_count: usize) -> Vec<ShapePoint> {
        if point_count == 0 {
            return Vec::new();
        }
        let parts = self.parts();
        let shares: Vec<f32> = parts.iter().map(|p| p.share).collect();
        let budgets = allocate(point_count, &shares);
        let mut rng = Rng::new(((self.code() as u64) << 32) ^ point_count as u64);

        let mut points = Vec::with_capacity(point_count);
        for (part, budget) in parts.iter().zip(budgets) {
            if budget == 0 {
                continue;
            }
            let natural = (part.generate)(budget, &mut rng);
            points.extend(fill_budget(natural, budget, &mut rng));
        }
        points
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        ShapeId::ALL
            .into_iter()
            .find(|id| id.name() == key)
            .ok_or_else(|| EngineError::UnknownShape(s.to_string()))
    }
}

/// One procedural sub-generator and its share of the budget.
pub(crate) struct Part {
    pub share: f32,
    /// Produces up to `budget` points. Generators with a finite natural
    /// resolution may return fewer; `fill_budget` tops them up.
    pub generate: fn(budget: usize, rng: &mut Rng) -> Vec<ShapePoint>,
}

/// Sample a shape by name. Unknown names yield an empty cloud, which callers
/// treat as "no shape available".
pub fn sample(shape_id: &str, point_count: usize) -> Vec<ShapePoint> {
    match shape_id.parse::<ShapeId>() {
        Ok(id) => id.sample(point_count),
        Err(err) => {
            log::warn!("{err}");
            Vec::new()
        }
    }
}

/// Split `total` across `shares` with largest-remainder rounding.
/// The result always sums to `total` (given at least one positive share).
pub fn allocate(total: usize, shares: &[f32]) -> Vec<usize> {
    let sum: f64 = shares.iter().map(|s| s.max(0.0) as f64).sum();
    if sum <= 0.0 || shares.is_empty() {
        return vec![0; shares.len()];
    }
    let exact: Vec<f64> = shares.iter().map(|s| s.max(0.0) as f64 / sum * total as f64).collect();
    // Tolerance absorbs f32 share round-off (0.35 + 0.35 + ... != 1.0 exactly).
    let mut budgets: Vec<usize> = exact.iter().map(|e| (e + 1e-6).floor() as usize).collect();
    let assigned: usize = budgets.iter().sum();

    let mut order: Vec<usize> = (0..shares.len()).filter(|i| shares[*i] > 0.0).collect();
    order.sort_by(|a, b| {
        let ra = exact[*a] - budgets[*a] as f64;
        let rb = exact[*b] - budgets[*b] as f64;
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(b))
    });
    for i in order.into_iter().cycle().take(total.saturating_sub(assigned)) {
        budgets[i] += 1;
    }
    budgets
}

/// Bring a generator's natural output to exactly `budget` points.
/// Excess points are thinned with an even stride; a shortfall is covered by
/// replicating existing points with jitter bounded by each point's density.
pub fn fill_budget(natural: Vec<ShapePoint>, budget: usize, rng: &mut Rng) -> Vec<ShapePoint> {
    let len = natural.len();
    if len == 0 || budget == 0 {
        return Vec::new();
    }
    if len >= budget {
        if len == budget {
            return natural;
        }
        return (0..budget).map(|i| natural[i * len / budget]).collect();
    }
    let mut out = natural;
    out.reserve(budget - len);
    for k in len..budget {
        let base = out[k % len];
        let jitter = rng.in_disc(REPLICATE_JITTER * base.density);
        out.push(ShapePoint { offset: base.offset + jitter, ..base });
    }
    out
}

/// Memoized clouds keyed by (shape, resolution). Clouds are immutable once sampled.
#[derive(Debug, Default)]
pub struct ShapeCache {
    clouds: HashMap<(ShapeId, usize), Vec<ShapePoint>>,
}

impl ShapeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, shape: ShapeId, count: usize) -> Option<&[ShapePoint]> {
        self.clouds.get(&(shape, count)).map(|v| v.as_slice())
    }

    pub fn insert(&mut self, shape: ShapeId, count: usize, points: Vec<ShapePoint>) {
        self.clouds.insert((shape, count), points);
    }

    pub fn len(&self) -> usize {
        self.clouds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clouds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_shape_is_empty() {
        assert!(sample("unknown", 500).is_empty());
        assert!(sample("", 10).is_empty());
    }

    #[test]
    fn names_round_trip_case_insensitively() {
        for id in ShapeId::ALL {
            assert_eq!(id.name().parse::<ShapeId>().unwrap(), id);
        }
        assert_eq!("  Caduceus ".parse::<ShapeId>().unwrap(), ShapeId::Caduceus);
    }

    #[test]
    fn every_shape_fills_its_budget_exactly() {
        for id in ShapeId::ALL {
            for count in [1, 7, 100, 600, 2500] {
                assert_eq!(id.sample(count).len(), count, "{} @ {}", id, count);
            }
            assert!(id.sample(0).is_empty());
        }
    }

    #[test]
    fn sampling_is_deterministic() {
        for id in ShapeId::ALL {
            assert_eq!(id.sample(321), id.sample(321));
        }
    }

    #[test]
    fn points_stay_near_unit_square() {
        for id in ShapeId::ALL {
            for p in id.sample(1500) {
                assert!(p.offset.x.abs() <= 1.2 && p.offset.y.abs() <= 1.2, "{} {:?}", id, p);
                assert!((0.0..=1.0).contains(&p.density));
            }
        }
    }

    #[test]
    fn allocate_sums_to_total() {
        let shares = [0.35, 0.35, 0.12, 0.08, 0.07, 0.03];
        for total in [0, 1, 5, 99, 1000, 1234] {
            let budgets = allocate(total, &shares);
            assert_eq!(budgets.iter().sum::<usize>(), total);
        }
        assert_eq!(allocate(1000, &shares), vec![350, 350, 120, 80, 70, 30]);
    }

    #[test]
    fn allocate_handles_degenerate_shares() {
        assert_eq!(allocate(10, &[]), Vec::<usize>::new());
        assert_eq!(allocate(10, &[0.0, 0.0]), vec![0, 0]);
        assert_eq!(allocate(10, &[0.0, 1.0]), vec![0, 10]);
    }

    #[test]
    fn fill_budget_replicates_with_bounded_jitter() {
        let natural = vec![
            ShapePoint::new(0.0, 0.0, RegionTag::Icon, 0.5),
            ShapePoint::new(0.5, 0.5, RegionTag::Icon, 0.0),
        ];
        let mut rng = Rng::new(4);
        let out = fill_budget(natural.clone(), 9, &mut rng);
        assert_eq!(out.len(), 9);
        for (k, p) in out.iter().enumerate() {
            let base = natural[k % 2];
            let bound = REPLICATE_JITTER * base.density + 1e-6;
            assert!(p.offset.distance(base.offset) <= bound);
            assert_eq!(p.region, base.region);
        }
    }

    #[test]
    fn fill_budget_thins_evenly() {
        let natural: Vec<ShapePoint> =
            (0..10).map(|i| ShapePoint::new(i as f32, 0.0, RegionTag::Orbit, 1.0)).collect();
        let mut rng = Rng::new(4);
        let out = fill_budget(natural, 5, &mut rng);
        let xs: Vec<f32> = out.iter().map(|p| p.offset.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn caduceus_keeps_region_proportions() {
        let points = ShapeId::Caduceus.sample(1000);
        let count = |r: RegionTag| points.iter().filter(|p| p.region == r).count();
        assert_eq!(count(RegionTag::Serpent), 700);
        assert_eq!(count(RegionTag::Staff), 120);
        assert_eq!(count(RegionTag::Head), 80);
        assert_eq!(count(RegionTag::Wing), 70);
        assert_eq!(count(RegionTag::Ornament), 30);
    }

    #[test]
    fn cache_stores_by_shape_and_count() {
        let mut cache = ShapeCache::new();
        assert!(cache.get(ShapeId::Orbital, 50).is_none());
        cache.insert(ShapeId::Orbital, 50, ShapeId::Orbital.sample(50));
        assert_eq!(cache.get(ShapeId::Orbital, 50).map(|c| c.len()), Some(50));
        assert!(cache.get(ShapeId::Orbital, 51).is_none());
        assert_eq!(cache.len(), 1);
    }
}
