//! `requestAnimationFrame` as a `Scheduler`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use swarm_engine::{CancellationToken, FrameCallback, Scheduler};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

type FrameClosure = Closure<dyn FnMut(f64)>;

pub struct AnimationFrameScheduler {
    window: web_sys::Window,
}

impl AnimationFrameScheduler {
    /// `None` outside a window context (e.g. in a worker).
    pub fn new() -> Option<Self> {
        web_sys::window().map(|window| Self { window })
    }
}

fn request(window: &web_sys::Window, slot: &RefCell<Option<FrameClosure>>, handle: &Cell<i32>) {
    if let Some(cb) = slot.borrow().as_ref() {
        match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => handle.set(id),
            Err(err) => log::warn!("requestAnimationFrame failed: {err:?}"),
        }
    }
}

impl Scheduler for AnimationFrameScheduler {
    fn tick(&mut self, mut callback: FrameCallback) -> CancellationToken {
        let slot: Rc<RefCell<Option<FrameClosure>>> = Rc::new(RefCell::new(None));
        let handle = Rc::new(Cell::new(0));

        // Cancelling drops the pending request and the loop closure.
        let token = {
            let window = self.window.clone();
            let slot = Rc::clone(&slot);
            let handle = Rc::clone(&handle);
            CancellationToken::with_cancel_hook(move || {
                if let Err(err) = window.cancel_animation_frame(handle.get()) {
                    log::warn!("cancelAnimationFrame failed: {err:?}");
                }
                slot.borrow_mut().take();
            })
        };

        let loop_token = token.clone();
        let window = self.window.clone();
        let loop_slot = Rc::clone(&slot);
        let loop_handle = Rc::clone(&handle);
        let last = Cell::new(None::<f64>);
        *slot.borrow_mut() = Some(Closure::new(move |now: f64| {
            if loop_token.is_cancelled() {
                return;
            }
            // Timestamps are milliseconds; the first frame advances nothing.
            let dt = last
                .replace(Some(now))
                .map(|prev| ((now - prev) / 1000.0) as f32)
                .unwrap_or(0.0);
            callback(dt);
            if !loop_token.is_cancelled() {
                request(&window, &loop_slot, &loop_handle);
            }
        }));

        request(&self.window, &slot, &handle);
        token
    }
}
