//! End-to-end behavior of the engine, driven frame by frame through a
//! manual scheduler and a recording render adapter.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::api::config::{EngineConfig, SamplingMode};
use crate::api::types::{Command, EngineEvent, Regime};
use crate::core::engine::Engine;
use crate::core::scheduler::{self, EngineDriver, ManualScheduler};
use crate::core::viewport::Viewport;
use crate::renderer::traits::RecordingAdapter;
use crate::shapes::{self, ShapeId};
use crate::systems::formed::ambient_offset;

const DT: f32 = 1.0 / 60.0;

fn engine_with(config: EngineConfig) -> Engine {
    Engine::new(config, Viewport::new(800.0, 600.0)).unwrap()
}

fn run(engine: &mut Engine, adapter: &mut RecordingAdapter, frames: usize) {
    for _ in 0..frames {
        engine.tick(DT, adapter);
    }
}

fn frames_for(seconds: f32) -> usize {
    (seconds / DT).ceil() as usize
}

fn formed_engine(shape: &str, count: u32) -> (Engine, RecordingAdapter) {
    let mut engine = engine_with(EngineConfig { particle_count: count, ..EngineConfig::default() });
    let mut adapter = RecordingAdapter::new();
    engine.command(Command::StartFormation(shape.into()));
    let frames = frames_for(engine.config().forming.nominal_duration()) + 10;
    run(&mut engine, &mut adapter, frames);
    assert_eq!(engine.regime(), Regime::Formed);
    (engine, adapter)
}

#[test]
fn playground_settles_without_pointer() {
    let mut engine = engine_with(EngineConfig { particle_count: 300, ..EngineConfig::default() });
    let mut adapter = RecordingAdapter::new();
    let margin = engine.config().playground.boundary_margin;

    for _ in 0..1000 {
        engine.tick(DT, &mut adapter);
        for p in engine.pool().iter() {
            assert!(p.position.x >= -margin && p.position.x <= 800.0 + margin);
            assert!(p.position.y >= -margin && p.position.y <= 600.0 + margin);
        }
    }
    assert_eq!(engine.regime(), Regime::Playground);
    let fastest = engine.pool().iter().map(|p| p.speed()).fold(0.0_f32, f32::max);
    assert!(fastest < 1.0, "fastest particle at {fastest} px/frame");
}

#[test]
fn wing_shape_forms_within_nominal_duration() {
    let config = EngineConfig {
        particle_count: 1200,
        shape_resolution: Some(600),
        ..EngineConfig::default()
    };
    let mut engine = engine_with(config);
    let mut adapter = RecordingAdapter::new();
    engine.command(Command::StartFormation("wing-shape".into()));

    let frames = frames_for(engine.config().forming.nominal_duration()) + 10;
    let mut events = Vec::new();
    for _ in 0..frames {
        engine.tick(DT, &mut adapter);
        events.extend(engine.drain_events());
    }

    assert_eq!(engine.regime(), Regime::Formed);
    assert!(engine.pool().formed_fraction() >= 0.99);
    let completions = events
        .iter()
        .filter(|e| matches!(e, EngineEvent::FormationComplete { shape: ShapeId::WingShape }))
        .count();
    assert_eq!(completions, 1);

    // Staying formed never refires the event.
    run(&mut engine, &mut adapter, 120);
    assert!(engine
        .drain_events()
        .iter()
        .all(|e| !matches!(e, EngineEvent::FormationComplete { .. })));
    assert_eq!(engine.stats().formation_progress_pct, 100.0);
}

#[test]
fn progress_is_bounded_and_monotonic_while_forming() {
    let mut engine = engine_with(EngineConfig { particle_count: 400, ..EngineConfig::default() });
    let mut adapter = RecordingAdapter::new();
    engine.command(Command::StartFormation("caduceus".into()));
    engine.tick(DT, &mut adapter);

    let mut last: Vec<f32> = engine.pool().iter().map(|p| p.progress).collect();
    let mut latched = vec![false; last.len()];
    while engine.regime() == Regime::Forming {
        engine.tick(DT, &mut adapter);
        for (i, p) in engine.pool().iter().enumerate() {
            assert!((0.0..=1.0).contains(&p.progress));
            assert!(p.progress >= last[i]);
            if latched[i] {
                assert!(p.formed, "formed flag cleared without a reset");
            }
            latched[i] = p.formed;
            last[i] = p.progress;
        }
    }
    assert_eq!(engine.regime(), Regime::Formed);

    // Held particles keep their flags through many frames of hold motion.
    run(&mut engine, &mut adapter, 300);
    assert!(engine.pool().iter().all(|p| p.formed && p.progress == 1.0));
}

#[test]
fn pointer_displacement_reconverges() {
    let (mut engine, mut adapter) = formed_engine("butterfly", 300);
    let target = engine.pool().particles()[0].target.unwrap();

    engine.pointer_move(target.x + 10.0, target.y);
    run(&mut engine, &mut adapter, 60);
    let pushed = &engine.pool().particles()[0];
    assert!(pushed.displacement.length() > 5.0, "displacement {}", pushed.displacement.length());

    engine.pointer_leave();
    run(&mut engine, &mut adapter, frames_for(2.0));
    let p = &engine.pool().particles()[0];
    let rest = target + ambient_offset(p, engine.elapsed(), &engine.config().formed);
    let error = p.position.distance(rest);
    assert!(error < 1.0, "particle {error}px from rest");
    assert!(p.formed);
}

#[test]
fn resize_while_formed_reaims_without_teleport() {
    let (mut engine, mut adapter) = formed_engine("orbital", 500);
    let max_speed = engine.config().formed.max_speed;

    engine.resize(1200.0, 900.0);
    let mut previous: Vec<Vec2> = engine.pool().iter().map(|p| p.position).collect();
    for _ in 0..frames_for(1.0) {
        engine.tick(DT, &mut adapter);
        for (p, before) in engine.pool().iter().zip(&previous) {
            assert!(p.formed);
            assert_eq!(p.progress, 1.0);
            assert!(p.position.distance(*before) <= max_speed + 1e-3);
        }
        previous = engine.pool().iter().map(|p| p.position).collect();
    }
    assert_eq!(engine.regime(), Regime::Formed);
    assert_eq!(adapter.resizes, 1);

    let center = Vec2::new(600.0, 450.0);
    let scale = engine.viewport().shape_scale(engine.config().shape_fill);
    for p in engine.pool().iter() {
        assert_eq!(p.target, Some(center + p.anchor.unwrap() * scale));
    }
}

#[test]
fn resize_while_forming_slides_onto_new_targets() {
    let mut engine = engine_with(EngineConfig { particle_count: 600, ..EngineConfig::default() });
    let mut adapter = RecordingAdapter::new();
    engine.command(Command::StartFormation("butterfly".into()));
    run(&mut engine, &mut adapter, 120);
    assert_eq!(engine.regime(), Regime::Forming);
    let formed_before = engine.pool().formed_count();
    assert!(formed_before > 0 && formed_before < 600);

    let bound = 2.0 * engine.config().formed.max_speed;
    engine.resize(1600.0, 1200.0);
    let mut previous: Vec<(Vec2, f32, bool)> =
        engine.pool().iter().map(|p| (p.position, p.progress, p.formed)).collect();
    for _ in 0..frames_for(4.0) {
        engine.tick(DT, &mut adapter);
        for (p, (pos, progress, formed)) in engine.pool().iter().zip(&previous) {
            let step = p.position.distance(*pos);
            assert!(step <= bound, "moved {step}px in one frame");
            assert!(p.progress >= *progress);
            assert!(p.formed || !formed);
        }
        previous = engine.pool().iter().map(|p| (p.position, p.progress, p.formed)).collect();
    }

    assert_eq!(engine.regime(), Regime::Formed);
    let center = Vec2::new(800.0, 600.0);
    let scale = engine.viewport().shape_scale(engine.config().shape_fill);
    for p in engine.pool().iter() {
        let target = center + p.anchor.unwrap() * scale;
        assert_eq!(p.target, Some(target));
        let rest = target + ambient_offset(p, engine.elapsed(), &engine.config().formed);
        assert!(p.position.distance(rest) < 1.0, "particle {}px from rest", p.position.distance(rest));
    }
}

#[test]
fn unknown_shape_yields_empty_cloud_and_playground() {
    assert!(shapes::sample("unknown", 500).is_empty());

    let mut engine = engine_with(EngineConfig { particle_count: 100, ..EngineConfig::default() });
    let mut adapter = RecordingAdapter::new();
    engine.command(Command::StartFormation("unknown".into()));
    run(&mut engine, &mut adapter, 5);
    assert_eq!(engine.regime(), Regime::Playground);
    assert!(!engine.pool().has_targets());
    assert!(engine.drain_events().is_empty());
}

#[test]
fn background_sampling_binds_on_a_later_tick() {
    let mut engine = engine_with(EngineConfig {
        particle_count: 800,
        sampling: SamplingMode::Background,
        ..EngineConfig::default()
    });
    let mut adapter = RecordingAdapter::new();
    engine.command(Command::StartFormation("caduceus".into()));

    for _ in 0..2000 {
        engine.tick(DT, &mut adapter);
        if engine.regime() == Regime::Forming {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
    assert_eq!(engine.regime(), Regime::Forming);
    assert!(!engine.is_sampling());
    assert!(engine.pool().iter().all(|p| p.target.is_some()));
}

#[test]
fn cached_shape_rebinds_immediately() {
    let mut engine = engine_with(EngineConfig {
        particle_count: 200,
        sampling: SamplingMode::Background,
        ..EngineConfig::default()
    });
    let mut adapter = RecordingAdapter::new();
    engine.command(Command::StartFormation("orbital".into()));
    for _ in 0..2000 {
        engine.tick(DT, &mut adapter);
        if engine.regime() == Regime::Forming {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
    engine.command(Command::Disperse);
    engine.tick(DT, &mut adapter);
    assert_eq!(engine.regime(), Regime::Playground);

    engine.command(Command::StartFormation("orbital".into()));
    engine.tick(DT, &mut adapter);
    assert_eq!(engine.regime(), Regime::Forming);
}

#[test]
fn scheduler_drives_engine_until_teardown() {
    let engine = engine_with(EngineConfig { particle_count: 50, ..EngineConfig::default() });
    let driver = Rc::new(RefCell::new(EngineDriver::new(engine, RecordingAdapter::new())));
    let mut sched = ManualScheduler::new();
    let token = scheduler::start(&driver, &mut sched);

    for _ in 0..30 {
        sched.advance(DT);
    }
    assert_eq!(driver.borrow().renderer.frames_drawn, 30);

    driver.borrow_mut().engine.teardown();
    assert!(token.is_cancelled());
    assert_eq!(sched.advance(DT), 0);
    assert_eq!(driver.borrow().engine.frame_index(), 30);
}

#[test]
fn fps_tracks_host_frame_rate() {
    let mut engine = engine_with(EngineConfig { particle_count: 20, ..EngineConfig::default() });
    let mut adapter = RecordingAdapter::new();
    for _ in 0..70 {
        engine.tick(1.0 / 30.0, &mut adapter);
    }
    assert_eq!(engine.stats().fps, 30);
}
