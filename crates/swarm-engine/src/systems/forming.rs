//! Convergence integrator.
//!
//! Each particle waits out a stagger delay derived from its origin, then
//! follows an eased, slightly arced path toward its target. Position is
//! blended toward the path point rather than assigned, so the handoff from
//! free drift has no visible jump. A resize mid-flight leaves the path aimed
//! at the old target and slides that aim onto the new one over a few frames.

use std::f32::consts::PI;

use glam::Vec2;

use crate::api::config::{FormingParams, RenderParams};
use crate::core::rng::hash_point;
use crate::extensions::easing::{lerp, lerp_vec2};
use crate::pool::Particle;

/// Start delay in seconds, stable for a given origin.
pub fn stagger_delay(origin: Vec2, params: &FormingParams) -> f32 {
    hash_point(origin) * params.stagger_window
}

/// Arc direction (+1 or -1), stable for a given origin.
fn arc_side(origin: Vec2) -> f32 {
    if hash_point(origin + Vec2::new(17.0, -31.0)) < 0.5 {
        -1.0
    } else {
        1.0
    }
}

/// Eased progress `clock` seconds into the formation.
pub fn progress_at(origin: Vec2, clock: f32, params: &FormingParams) -> f32 {
    let t = (clock - stagger_delay(origin, params)) / params.duration;
    params.easing.apply(t.clamp(0.0, 1.0))
}

/// Point on the curved path at `progress`. The bulge peaks mid-way and
/// vanishes at both ends.
pub fn path_point(origin: Vec2, target: Vec2, progress: f32, params: &FormingParams) -> Vec2 {
    let travel = target - origin;
    let bulge = (PI * progress).sin() * (1.0 - progress) * params.curvature * arc_side(origin);
    origin + travel * progress + travel.perp() * bulge
}

/// Advance one particle by a `dt` step ending at `clock`. Returns true on
/// the step its `formed` flag latches.
pub fn integrate(p: &mut Particle, clock: f32, dt: f32, params: &FormingParams, render: &RenderParams) -> bool {
    if p.formed {
        return false;
    }
    let Some(target) = p.target else {
        return false;
    };
    p.retarget *= (-params.retarget_rate * dt).exp();
    let aim = target + p.retarget;

    p.progress = p.progress.max(progress_at(p.origin, clock, params)).clamp(0.0, 1.0);

    let base = p.base_radius(render);
    p.render.opacity = lerp(render.playground_opacity, render.formed_opacity, p.progress);
    p.render.radius = base * lerp(render.radius_ramp_start, 1.0, p.progress);

    if p.progress >= params.particle_threshold {
        p.progress = 1.0;
        p.formed = true;
        p.position = aim;
        p.retarget = Vec2::ZERO;
        p.velocity = Vec2::ZERO;
        p.render.opacity = render.formed_opacity;
        p.render.radius = base;
        return true;
    }

    let path = path_point(p.origin, aim, p.progress, params);
    let blend = lerp(params.min_blend, 1.0, p.progress);
    let next = lerp_vec2(p.position, path, blend);
    p.velocity = next - p.position;
    p.position = next;
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound(origin: Vec2, target: Vec2) -> Particle {
        let mut p = Particle::scattered(origin, Vec2::new(0.5, -0.5), [1.0; 3], &RenderParams::default());
        p.target = Some(target);
        p
    }

    #[test]
    fn stagger_stays_in_window() {
        let params = FormingParams::default();
        for i in 0..500 {
            let d = stagger_delay(Vec2::new(i as f32 * 3.7, 900.0 - i as f32), &params);
            assert!((0.0..params.stagger_window).contains(&d));
        }
    }

    #[test]
    fn path_hits_both_ends() {
        let params = FormingParams::default();
        let (a, b) = (Vec2::new(-40.0, 10.0), Vec2::new(400.0, 300.0));
        assert!(path_point(a, b, 0.0, &params).distance(a) < 1e-4);
        assert!(path_point(a, b, 1.0, &params).distance(b) < 1e-3);
        let mid = path_point(a, b, 0.5, &params);
        let straight = a.lerp(b, 0.5);
        assert!(mid.distance(straight) > 1.0, "path should arc");
    }

    #[test]
    fn progress_is_monotonic_and_latches() {
        let params = FormingParams::default();
        let render = RenderParams::default();
        let mut p = bound(Vec2::new(-30.0, 200.0), Vec2::new(400.0, 300.0));
        let dt = 1.0 / 60.0;
        let mut last = 0.0;
        let mut latched = 0;
        let frames = (params.nominal_duration() / dt).ceil() as usize + 2;
        for i in 1..=frames {
            if integrate(&mut p, i as f32 * dt, dt, &params, &render) {
                latched += 1;
            }
            assert!(p.progress >= last);
            assert!((0.0..=1.0).contains(&p.progress));
            last = p.progress;
        }
        assert_eq!(latched, 1);
        assert!(p.formed);
        assert_eq!(p.position, Vec2::new(400.0, 300.0));
        assert_eq!(p.velocity, Vec2::ZERO);
        assert_eq!(p.render.opacity, render.formed_opacity);
    }

    #[test]
    fn nothing_moves_before_delay() {
        let params = FormingParams::default();
        let render = RenderParams::default();
        let mut p = bound(Vec2::new(5.0, 5.0), Vec2::new(400.0, 300.0));
        integrate(&mut p, 0.0, 1.0 / 60.0, &params, &render);
        assert_eq!(p.progress, 0.0);
        assert!(p.render.radius < p.base_radius(&render));
    }

    #[test]
    fn moved_target_is_approached_gradually() {
        let params = FormingParams::default();
        let render = RenderParams::default();
        let dt = 1.0 / 60.0;
        let old = Vec2::new(400.0, 300.0);
        let mut p = bound(Vec2::new(-30.0, 200.0), old);
        let mut clock = 0.0;
        while p.progress < 0.8 {
            clock += dt;
            integrate(&mut p, clock, dt, &params, &render);
        }

        let new = Vec2::new(800.0, 600.0);
        p.retarget = old - new;
        p.target = Some(new);
        let mut steps = 0;
        while !p.formed {
            let before = p.position;
            clock += dt;
            integrate(&mut p, clock, dt, &params, &render);
            assert!(p.position.distance(before) < 40.0, "jumped {}", p.position.distance(before));
            steps += 1;
            assert!(steps < 600);
        }
        // More than a second of flight remained, so most of the shift is absorbed.
        assert_eq!(p.retarget, Vec2::ZERO);
        assert!(p.position.distance(new) < 500.0 * (-params.retarget_rate).exp());
    }

    #[test]
    fn unbound_particle_is_ignored() {
        let params = FormingParams::default();
        let render = RenderParams::default();
        let mut p = Particle::scattered(Vec2::ZERO, Vec2::X, [1.0; 3], &render);
        assert!(!integrate(&mut p, 10.0, 1.0 / 60.0, &params, &render));
        assert_eq!(p.position, Vec2::ZERO);
    }
}
