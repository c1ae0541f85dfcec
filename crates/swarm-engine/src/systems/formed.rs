//! Hold integrator: a damped spring toward `target + offset`, where the
//! offset is a slow per-region float plus a decaying pointer displacement.

use std::f32::consts::TAU;

use glam::Vec2;

use super::StepInput;
use crate::api::config::FormedParams;
use crate::api::types::RegionTag;
use crate::core::rng::hash_point;
use crate::pool::Particle;

/// How much each region breathes relative to the base float amplitude.
pub fn region_float_factor(region: RegionTag) -> f32 {
    match region {
        RegionTag::Wing => 1.6,
        RegionTag::Antenna => 1.2,
        RegionTag::Body => 0.5,
        RegionTag::Staff => 0.3,
        RegionTag::Serpent => 1.0,
        RegionTag::Head => 0.8,
        RegionTag::Ornament => 0.6,
        RegionTag::Core => 0.4,
        RegionTag::Orbit => 1.0,
        RegionTag::Icon => 0.8,
        RegionTag::Free => 1.0,
    }
}

/// The continuous oscillation around the target at simulation time `time`.
/// Phase comes from the origin hash, amplitude from region and density
/// (dense points float less).
pub fn ambient_offset(p: &Particle, time: f32, params: &FormedParams) -> Vec2 {
    let phase = hash_point(p.origin) * TAU;
    let amp = params.float_amplitude * region_float_factor(p.region) * (1.25 - 0.5 * p.density);
    let w = time * params.float_frequency;
    Vec2::new((w + phase).sin(), (0.8 * w + 1.3 * phase).cos()) * amp
}

/// Push away from the pointer plus a smaller pull toward the shape center,
/// so the silhouette stays readable while locally disturbed.
fn pointer_push(p: &Particle, target: Vec2, input: &StepInput, params: &FormedParams) -> Vec2 {
    let Some(pointer) = input.pointer else {
        return Vec2::ZERO;
    };
    let away = p.position - pointer;
    let dist = away.length();
    if dist >= params.repulsion_radius {
        return Vec2::ZERO;
    }
    let dir = if dist > 1e-3 { away / dist } else { Vec2::Y };
    let push = dir * params.repulsion_strength * (1.0 - dist / params.repulsion_radius);
    let inward = (input.shape_center - target).normalize_or_zero();
    push + inward * params.center_bias * push.length()
}

/// Advance one held particle by one frame.
pub fn integrate(p: &mut Particle, input: &StepInput, params: &FormedParams) {
    let Some(target) = p.target else {
        return;
    };

    let push = pointer_push(p, target, input, params);
    p.displacement = (p.displacement + push).clamp_length_max(params.max_displacement) * params.displacement_decay;

    let rest = target + ambient_offset(p, input.time, params) + p.displacement;
    let stiffness = params.spring_k * (0.75 + 0.5 * p.density);
    p.velocity = ((p.velocity + (rest - p.position) * stiffness) * params.damping).clamp_length_max(params.max_speed);
    p.position += p.velocity;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::RenderParams;
    use crate::core::viewport::Viewport;

    fn held(target: Vec2, region: RegionTag) -> Particle {
        let mut p = Particle::scattered(target, Vec2::ZERO, [1.0; 3], &RenderParams::default());
        p.target = Some(target);
        p.region = region;
        p.formed = true;
        p.progress = 1.0;
        p
    }

    fn input(time: f32, pointer: Option<Vec2>) -> StepInput {
        let viewport = Viewport::new(800.0, 600.0);
        StepInput { time, pointer, viewport, shape_center: viewport.center() }
    }

    #[test]
    fn wings_float_more_than_body() {
        let params = FormedParams::default();
        let wing = held(Vec2::new(300.0, 300.0), RegionTag::Wing);
        let body = held(Vec2::new(300.0, 300.0), RegionTag::Body);
        let peak = |p: &Particle| {
            (0..600).map(|i| ambient_offset(p, i as f32 / 60.0, &params).length()).fold(0.0, f32::max)
        };
        assert!(peak(&wing) > peak(&body));
    }

    #[test]
    fn pointer_displaces_and_recovers() {
        let params = FormedParams::default();
        let target = Vec2::new(300.0, 300.0);
        let mut p = held(target, RegionTag::Serpent);
        let dt = 1.0 / 60.0;
        let mut t = 0.0;
        for _ in 0..60 {
            t += dt;
            integrate(&mut p, &input(t, Some(target + Vec2::new(10.0, 0.0))), &params);
        }
        assert!(p.position.distance(target) > 5.0);
        assert!(p.position.x < target.x, "pushed away from the pointer");

        for _ in 0..120 {
            t += dt;
            integrate(&mut p, &input(t, None), &params);
        }
        let rest = target + ambient_offset(&p, t, &params);
        assert!(p.position.distance(rest) < 1.0, "off by {}", p.position.distance(rest));
        assert!(p.displacement.length() < 1e-3);
    }

    #[test]
    fn speed_is_capped() {
        let params = FormedParams::default();
        let mut p = held(Vec2::new(300.0, 300.0), RegionTag::Body);
        p.target = Some(Vec2::new(3000.0, 3000.0));
        for i in 0..30 {
            let before = p.position;
            integrate(&mut p, &input(i as f32 / 60.0, None), &params);
            assert!(p.position.distance(before) <= params.max_speed + 1e-3);
        }
    }
}
