//! Fixed-size particle storage.
//!
//! The pool never changes size after construction; a different count means
//! a new pool. Targets are bound from shape clouds and re-aimed in place on
//! resize so formed particles never snap.

mod particle;

pub use particle::{region_radius_factor, Particle, RenderAttributes};

use glam::Vec2;

use crate::api::config::EngineConfig;
use crate::api::types::RegionTag;
use crate::core::rng::Rng;
use crate::core::viewport::Viewport;
use crate::shapes::ShapePoint;

pub struct ParticlePool {
    particles: Vec<Particle>,
}

/// Random point just outside one of the four surface edges.
fn scatter_point(viewport: Viewport, padding: f32, rng: &mut Rng) -> Vec2 {
    let (w, h) = (viewport.width.max(0.0), viewport.height.max(0.0));
    let out = rng.next_f32() * padding;
    match rng.next_int(4) {
        0 => Vec2::new(rng.next_f32() * w, -out),
        1 => Vec2::new(w + out, rng.next_f32() * h),
        2 => Vec2::new(rng.next_f32() * w, h + out),
        _ => Vec2::new(-out, rng.next_f32() * h),
    }
}

impl ParticlePool {
    /// Build `count` particles (at least one) scattered around the surface edges,
    /// so a following formation reads as converging inward.
    pub fn scatter(count: usize, viewport: Viewport, config: &EngineConfig, rng: &mut Rng) -> Self {
        let count = count.max(1);
        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            particles.push(Self::fresh(viewport, config, rng));
        }
        Self { particles }
    }

    fn fresh(viewport: Viewport, config: &EngineConfig, rng: &mut Rng) -> Particle {
        let position = scatter_point(viewport, config.scatter_padding, rng);
        let s = config.initial_speed;
        let velocity = Vec2::new(rng.range(-s, s), rng.range(-s, s));
        let color = config.palette.pick(RegionTag::Free, 0.5, rng);
        Particle::scattered(position, velocity, color, &config.render)
    }

    /// Re-scatter every particle in place, dropping targets and resetting progress.
    /// The count is unchanged.
    pub fn rescatter(&mut self, viewport: Viewport, config: &EngineConfig, rng: &mut Rng) {
        for p in &mut self.particles {
            *p = Self::fresh(viewport, config, rng);
        }
    }

    /// Bind particle `i` to `points[i % len]` with `target = origin + offset * scale`.
    /// Starts a new formation for every particle: progress and `formed` reset,
    /// the current position becomes the path origin.
    ///
    /// Returns false (and leaves the pool untouched) for an empty cloud.
    pub fn bind_targets(
        &mut self,
        points: &[ShapePoint],
        origin: Vec2,
        scale: f32,
        config: &EngineConfig,
        rng: &mut Rng,
    ) -> bool {
        if points.is_empty() {
            return false;
        }
        for (i, p) in self.particles.iter_mut().enumerate() {
            let sp = points[i % points.len()];
            p.anchor = Some(sp.offset);
            p.target = Some(origin + sp.offset * scale);
            p.region = sp.region;
            p.density = sp.density;
            p.origin = p.position;
            p.progress = 0.0;
            p.formed = false;
            p.displacement = Vec2::ZERO;
            p.retarget = Vec2::ZERO;
            p.render.color = config.palette.pick(sp.region, sp.density, rng);
            p.render.radius = p.base_radius(&config.render) * config.render.radius_ramp_start;
        }
        true
    }

    /// Re-aim bound particles at the resized shape. Progress, `formed` and
    /// positions are untouched; integrators carry particles over continuously.
    /// Particles still in flight keep their current aim through `retarget`,
    /// which the forming integrator bleeds off over the following frames.
    /// Returns how many particles were re-aimed.
    pub fn rebind_after_resize(&mut self, new_origin: Vec2, new_scale: f32) -> usize {
        let mut rebound = 0;
        for p in &mut self.particles {
            let Some(anchor) = p.anchor else {
                continue;
            };
            let target = new_origin + anchor * new_scale;
            if let (Some(old), false) = (p.target, p.formed) {
                p.retarget += old - target;
            }
            p.target = Some(target);
            rebound += 1;
        }
        rebound
    }

    /// Complete the formation for stragglers: pin to where they are aimed, mark formed.
    /// Returns how many were snapped.
    pub fn snap_stragglers(&mut self) -> usize {
        let mut snapped = 0;
        for p in &mut self.particles {
            if let (Some(aim), false) = (p.aim(), p.formed) {
                p.position = aim;
                p.retarget = Vec2::ZERO;
                p.velocity = Vec2::ZERO;
                p.progress = 1.0;
                p.formed = true;
                snapped += 1;
            }
        }
        snapped
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    pub fn formed_count(&self) -> usize {
        self.particles.iter().filter(|p| p.formed).count()
    }

    pub fn formed_fraction(&self) -> f32 {
        if self.particles.is_empty() {
            return 0.0;
        }
        self.formed_count() as f32 / self.particles.len() as f32
    }

    pub fn mean_progress(&self) -> f32 {
        if self.particles.is_empty() {
            return 0.0;
        }
        self.particles.iter().map(|p| p.progress).sum::<f32>() / self.particles.len() as f32
    }

    pub fn has_targets(&self) -> bool {
        self.particles.iter().any(|p| p.target.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeId;

    fn pool(count: usize) -> (ParticlePool, EngineConfig, Rng) {
        let config = EngineConfig::default();
        let mut rng = Rng::new(1);
        let pool = ParticlePool::scatter(count, Viewport::new(800.0, 600.0), &config, &mut rng);
        (pool, config, rng)
    }

    #[test]
    fn scatter_places_particles_on_padded_edges() {
        let (pool, config, _) = pool(500);
        assert_eq!(pool.len(), 500);
        let pad = config.scatter_padding;
        for p in pool.iter() {
            let x_edge = p.position.x <= 0.0 || p.position.x >= 800.0;
            let y_edge = p.position.y <= 0.0 || p.position.y >= 600.0;
            assert!(x_edge || y_edge, "{:?} not on an edge", p.position);
            assert!(p.position.x >= -pad && p.position.x <= 800.0 + pad);
            assert!(p.position.y >= -pad && p.position.y <= 600.0 + pad);
            assert!(p.velocity.x.abs() <= config.initial_speed);
            assert!(p.target.is_none());
        }
    }

    #[test]
    fn scatter_never_builds_an_empty_pool() {
        let (pool, _, _) = pool(0);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn bind_targets_maps_cyclically() {
        let (mut pool, config, mut rng) = pool(10);
        let points = ShapeId::Caduceus.sample(4);
        let origin = Vec2::new(400.0, 300.0);
        assert!(pool.bind_targets(&points, origin, 200.0, &config, &mut rng));
        for (i, p) in pool.iter().enumerate() {
            let sp = points[i % 4];
            assert_eq!(p.target, Some(origin + sp.offset * 200.0));
            assert_eq!(p.region, sp.region);
            assert_eq!(p.density, sp.density);
            assert_eq!(p.origin, p.position);
        }
    }

    #[test]
    fn bind_targets_on_empty_cloud_is_noop() {
        let (mut pool, config, mut rng) = pool(10);
        assert!(!pool.bind_targets(&[], Vec2::ZERO, 1.0, &config, &mut rng));
        assert!(!pool.has_targets());
        assert!(pool.iter().all(|p| p.region == RegionTag::Free));
    }

    #[test]
    fn rebind_keeps_progress_and_position() {
        let (mut pool, config, mut rng) = pool(20);
        let points = ShapeId::Butterfly.sample(20);
        pool.bind_targets(&points, Vec2::new(400.0, 300.0), 200.0, &config, &mut rng);
        pool.snap_stragglers();
        let before: Vec<_> = pool.iter().map(|p| (p.position, p.progress, p.formed)).collect();

        assert_eq!(pool.rebind_after_resize(Vec2::new(600.0, 450.0), 300.0), 20);
        for (p, (pos, progress, formed)) in pool.iter().zip(before) {
            assert_eq!(p.position, pos);
            assert_eq!(p.progress, progress);
            assert_eq!(p.formed, formed);
            let anchor = p.anchor.unwrap();
            assert_eq!(p.target, Some(Vec2::new(600.0, 450.0) + anchor * 300.0));
        }
    }

    #[test]
    fn rebind_mid_flight_keeps_current_aim() {
        let (mut pool, config, mut rng) = pool(20);
        let points = ShapeId::Orbital.sample(20);
        pool.bind_targets(&points, Vec2::new(400.0, 300.0), 200.0, &config, &mut rng);
        pool.particles[0].formed = true;
        let aims: Vec<_> = pool.iter().map(|p| p.aim().unwrap()).collect();

        pool.rebind_after_resize(Vec2::new(800.0, 600.0), 400.0);
        for (i, (p, aim)) in pool.iter().zip(aims).enumerate() {
            if i == 0 {
                assert_eq!(p.retarget, Vec2::ZERO);
            } else {
                assert!(p.aim().unwrap().distance(aim) < 1e-3);
            }
        }

        pool.snap_stragglers();
        assert!(pool.iter().all(|p| p.formed && p.retarget == Vec2::ZERO));
    }

    #[test]
    fn rescatter_clears_targets() {
        let (mut pool, config, mut rng) = pool(20);
        let points = ShapeId::Orbital.sample(20);
        pool.bind_targets(&points, Vec2::new(400.0, 300.0), 200.0, &config, &mut rng);
        pool.snap_stragglers();
        assert_eq!(pool.formed_fraction(), 1.0);

        pool.rescatter(Viewport::new(800.0, 600.0), &config, &mut rng);
        assert_eq!(pool.len(), 20);
        assert!(!pool.has_targets());
        assert_eq!(pool.formed_count(), 0);
        assert_eq!(pool.mean_progress(), 0.0);
    }
}
