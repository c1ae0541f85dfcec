//! Free-drift integrator.
//!
//! Ambient drift + pointer ring force, multiplicative damping, Euler step,
//! then an inelastic bounce against the padded surface bounds.

use std::f32::consts::FRAC_1_SQRT_2;

use glam::Vec2;

use super::StepInput;
use crate::api::config::PlaygroundParams;
use crate::pool::Particle;

/// Low-frequency drift acceleration, seeded by the particle's origin so no
/// per-particle phase needs storing. Magnitude never exceeds `ambient_strength`.
pub fn ambient_drift(origin: Vec2, time: f32, params: &PlaygroundParams) -> Vec2 {
    let phase = time * params.ambient_frequency;
    Vec2::new(
        (phase + origin.y * params.ambient_spatial).sin(),
        (phase * 0.87 + origin.x * params.ambient_spatial).cos(),
    ) * (params.ambient_strength * FRAC_1_SQRT_2)
}

/// Core of the repulsion falloff, as a fraction of the repulsion radius.
const FALLOFF_CORE: f32 = 0.2;

/// Inverse-distance repulsion weight: 1 at the pointer, 0 at `radius`.
fn inverse_falloff(dist: f32, radius: f32) -> f32 {
    let core = radius * FALLOFF_CORE;
    let edge = core / (core + radius);
    ((core / (core + dist) - edge) / (1.0 - edge)).max(0.0)
}

/// Pointer force: inverse-falloff push inside the repulsion radius, weaker
/// pull in the ring out to the attraction radius, nothing beyond.
pub fn pointer_force(position: Vec2, pointer: Option<Vec2>, params: &PlaygroundParams) -> Vec2 {
    let Some(pointer) = pointer else {
        return Vec2::ZERO;
    };
    let away = position - pointer;
    let dist = away.length();
    let dir = if dist > 1e-3 { away / dist } else { Vec2::X };

    if dist < params.repulsion_radius {
        dir * params.repulsion_strength * inverse_falloff(dist, params.repulsion_radius)
    } else if dist < params.attraction_radius {
        let ring = params.attraction_radius - params.repulsion_radius;
        let t = (dist - params.repulsion_radius) / ring;
        -dir * params.attraction_strength * (1.0 - t)
    } else {
        Vec2::ZERO
    }
}

/// Advance one free particle by one frame.
pub fn integrate(p: &mut Particle, input: &StepInput, params: &PlaygroundParams) {
    let accel = ambient_drift(p.origin, input.time, params) + pointer_force(p.position, input.pointer, params);
    p.velocity = (p.velocity + accel) * params.damping;
    p.position += p.velocity;

    let (min, max) = input.viewport.padded_bounds(params.boundary_margin);
    if p.position.x < min.x {
        p.position.x = min.x;
        p.velocity.x = p.velocity.x.abs() * params.restitution;
    } else if p.position.x > max.x {
        p.position.x = max.x;
        p.velocity.x = -p.velocity.x.abs() * params.restitution;
    }
    if p.position.y < min.y {
        p.position.y = min.y;
        p.velocity.y = p.velocity.y.abs() * params.restitution;
    } else if p.position.y > max.y {
        p.position.y = max.y;
        p.velocity.y = -p.velocity.y.abs() * params.restitution;
    }
}
