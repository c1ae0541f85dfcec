use glam::Vec2;

use crate::api::config::RenderParams;
use crate::api::types::RegionTag;
use crate::renderer::palette::Rgb;

/// What the render adapter needs to draw one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderAttributes {
    pub radius: f32,
    pub opacity: f32,
    pub color: Rgb,
}

/// A single point-entity.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    /// Per-frame velocity, px/frame.
    pub velocity: Vec2,
    /// Absolute target; `None` exactly while the pool is in Playground.
    pub target: Option<Vec2>,
    /// Shape-local offset the target was built from; kept for resize rebinding.
    pub anchor: Option<Vec2>,
    /// Last scatter/start position. Seeds stagger, drift phase and path curvature.
    pub origin: Vec2,
    pub region: RegionTag,
    pub density: f32,
    pub render: RenderAttributes,
    /// Formation completion in [0, 1]; only advances while forming.
    pub progress: f32,
    /// Latched once converged; cleared only by an explicit reset or new formation.
    pub formed: bool,
    /// Pointer-induced offset from the target while formed; decays to zero.
    pub displacement: Vec2,
    /// Offset from `target` to where an in-flight particle was headed before
    /// the last resize. Decays to zero while forming.
    pub retarget: Vec2,
}

impl Particle {
    /// A free particle at a scatter position.
    pub fn scattered(position: Vec2, velocity: Vec2, color: Rgb, params: &RenderParams) -> Self {
        let mut p = Self {
            position,
            velocity,
            target: None,
            anchor: None,
            origin: position,
            region: RegionTag::Free,
            density: 0.5,
            render: RenderAttributes { radius: 0.0, opacity: params.playground_opacity, color },
            progress: 0.0,
            formed: false,
            displacement: Vec2::ZERO,
            retarget: Vec2::ZERO,
        };
        p.render.radius = p.base_radius(params);
        p
    }

    /// Full-size radius for this particle's region and density.
    pub fn base_radius(&self, params: &RenderParams) -> f32 {
        params.base_radius * region_radius_factor(self.region) * (0.8 + 0.4 * self.density)
    }

    /// Where the particle is currently converging: the target plus any
    /// not-yet-absorbed resize shift.
    pub fn aim(&self) -> Option<Vec2> {
        self.target.map(|t| t + self.retarget)
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Relative particle size per region.
pub fn region_radius_factor(region: RegionTag) -> f32 {
    match region {
        RegionTag::Free => 1.0,
        RegionTag::Body | RegionTag::Staff => 1.15,
        RegionTag::Wing | RegionTag::Serpent => 1.0,
        RegionTag::Antenna => 0.7,
        RegionTag::Head | RegionTag::Core => 1.3,
        RegionTag::Ornament => 1.2,
        RegionTag::Orbit => 0.8,
        RegionTag::Icon => 1.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scattered_particle_is_free() {
        let params = RenderParams::default();
        let p = Particle::scattered(Vec2::new(1.0, 2.0), Vec2::X, [1.0, 1.0, 1.0], &params);
        assert!(p.target.is_none());
        assert_eq!(p.origin, p.position);
        assert_eq!(p.progress, 0.0);
        assert!(!p.formed);
        assert_eq!(p.render.opacity, params.playground_opacity);
        assert!((p.render.radius - params.base_radius).abs() < 1e-6);
    }

    #[test]
    fn denser_particles_are_larger() {
        let params = RenderParams::default();
        let mut p = Particle::scattered(Vec2::ZERO, Vec2::ZERO, [1.0; 3], &params);
        p.density = 0.1;
        let small = p.base_radius(&params);
        p.density = 0.9;
        assert!(p.base_radius(&params) > small);
    }
}
