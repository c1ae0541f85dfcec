//! Browser bridge for the swarm engine.
//!
//! One engine per page, held in a `thread_local!`. JS forwards pointer,
//! resize and command events through the exported functions and reads
//! frames straight out of WASM memory via the buffer accessors. The frame
//! loop is either driven by JS (`engine_tick`) or by `engine_start`, which
//! schedules itself on `requestAnimationFrame`.

pub mod raf;
pub mod runner;

pub use raf::AnimationFrameScheduler;
pub use runner::EngineRunner;

use std::cell::RefCell;

use swarm_engine::{Command, Engine, InputEvent, Scheduler, Viewport};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<EngineRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the live runner. Before `engine_init` (or while the
/// runner is busy in a re-entrant call) this logs and returns `R::default()`.
fn with_runner<R: Default>(f: impl FnOnce(&mut EngineRunner) -> R) -> R {
    RUNNER.with(|cell| match cell.try_borrow_mut() {
        Ok(mut borrow) => match borrow.as_mut() {
            Some(runner) => f(runner),
            None => {
                log::warn!("engine not initialized; call engine_init() first");
                R::default()
            }
        },
        Err(_) => R::default(),
    })
}

/// Create the engine. `config_json` may be empty for defaults. Any previous
/// engine is torn down first.
#[wasm_bindgen]
pub fn engine_init(width: f32, height: f32, config_json: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let json = if config_json.trim().is_empty() { "{}" } else { config_json };
    let engine = Engine::from_json(json, Viewport::new(width, height))
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    RUNNER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if let Some(old) = slot.as_mut() {
            old.teardown();
        }
        *slot = Some(EngineRunner::new(engine));
    });
    log::info!("swarm: initialized at {width}x{height}");
    Ok(())
}

/// Drive the engine from `requestAnimationFrame`. Returns false when no
/// window is available. `engine_teardown` stops the loop.
#[wasm_bindgen]
pub fn engine_start() -> bool {
    let Some(mut scheduler) = AnimationFrameScheduler::new() else {
        log::warn!("no window; drive the engine with engine_tick instead");
        return false;
    };
    start_on(&mut scheduler)
}

/// Schedule the runner's frame loop on `scheduler` and hand the token to the
/// engine. Nothing is scheduled without a live runner; a loop whose token
/// cannot be attached is cancelled so it cannot outlive the engine.
fn start_on<S: Scheduler + ?Sized>(scheduler: &mut S) -> bool {
    if !with_runner(|r| !r.engine().is_torn_down()) {
        return false;
    }
    let token = scheduler.tick(Box::new(|dt| with_runner(|r| r.tick(dt))));
    let attached = with_runner(|r| {
        r.engine_mut().attach_frame_token(token.clone());
        true
    });
    if !attached {
        log::warn!("engine busy while starting its frame loop; loop cancelled");
        token.cancel();
    }
    attached
}

#[wasm_bindgen]
pub fn engine_tick(dt: f32) {
    with_runner(|r| r.tick(dt));
}

#[wasm_bindgen]
pub fn engine_pointer_move(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerMove { x, y }));
}

#[wasm_bindgen]
pub fn engine_pointer_leave() {
    with_runner(|r| r.push_input(InputEvent::PointerLeave));
}

#[wasm_bindgen]
pub fn engine_resize(width: f32, height: f32) {
    with_runner(|r| r.push_input(InputEvent::Resize { width, height }));
}

// ---- Commands ----

#[wasm_bindgen]
pub fn engine_start_formation(shape: &str) {
    let shape = shape.to_string();
    with_runner(|r| r.command(Command::StartFormation(shape)));
}

#[wasm_bindgen]
pub fn engine_disperse() {
    with_runner(|r| r.command(Command::Disperse));
}

#[wasm_bindgen]
pub fn engine_set_particle_count(count: i32) {
    with_runner(|r| r.command(Command::SetParticleCount(i64::from(count))));
}

#[wasm_bindgen]
pub fn engine_toggle_stats() {
    with_runner(|r| r.command(Command::ToggleStatsDisplay));
}

/// Cancel the frame loop and any in-flight sampling. Safe to call twice.
#[wasm_bindgen]
pub fn engine_teardown() {
    with_runner(|r| r.teardown());
}

// ---- Buffer accessors ----

#[wasm_bindgen]
pub fn get_buffer_ptr() -> *const f32 {
    with_runner(|r| Some(r.buffer_ptr())).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_buffer_total_floats() -> u32 {
    with_runner(|r| r.buffer_total_floats())
}

#[wasm_bindgen]
pub fn get_instance_data_offset() -> u32 {
    with_runner(|r| r.instance_data_offset())
}

#[wasm_bindgen]
pub fn get_event_data_offset() -> u32 {
    with_runner(|r| r.event_data_offset())
}

#[wasm_bindgen]
pub fn get_instance_count() -> u32 {
    with_runner(|r| r.instance_count())
}

#[wasm_bindgen]
pub fn get_event_count() -> u32 {
    with_runner(|r| r.event_count())
}

#[wasm_bindgen]
pub fn get_max_instances() -> u32 {
    with_runner(|r| r.max_instances())
}

// ---- Stats accessors ----

#[wasm_bindgen]
pub fn get_particle_count() -> u32 {
    with_runner(|r| r.stats().particle_count)
}

#[wasm_bindgen]
pub fn get_formation_progress() -> f32 {
    with_runner(|r| r.stats().formation_progress_pct)
}

#[wasm_bindgen]
pub fn get_fps() -> u32 {
    with_runner(|r| r.stats().fps)
}

#[wasm_bindgen]
pub fn get_regime() -> u32 {
    with_runner(|r| r.regime().code())
}

#[wasm_bindgen]
pub fn get_stats_visible() -> bool {
    with_runner(|r| r.engine().stats_visible())
}
