//! Frame scheduling.
//!
//! The host owns the clock (requestAnimationFrame, a native vsync loop, a
//! test harness). It exposes itself as a `Scheduler` that calls a frame
//! callback with the elapsed seconds until the returned token is cancelled.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::core::engine::Engine;
use crate::renderer::traits::RenderAdapter;

/// Per-frame callback; the argument is seconds since the previous frame.
pub type FrameCallback = Box<dyn FnMut(f32)>;

struct TokenInner {
    cancelled: Cell<bool>,
    on_cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

/// Handle to a scheduled frame loop. Clones share state; cancelling any
/// clone stops the loop and runs the scheduler's cancel hook once.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Rc<TokenInner>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(TokenInner {
                cancelled: Cell::new(false),
                on_cancel: RefCell::new(None),
            }),
        }
    }

    /// Token whose cancellation also runs `hook` (e.g. to cancel a pending
    /// host frame request).
    pub fn with_cancel_hook(hook: impl FnOnce() + 'static) -> Self {
        let token = Self::new();
        *token.inner.on_cancel.borrow_mut() = Some(Box::new(hook));
        token
    }

    pub fn cancel(&self) {
        if self.inner.cancelled.replace(true) {
            return;
        }
        let hook = self.inner.on_cancel.borrow_mut().take();
        if let Some(hook) = hook {
            hook();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.get()
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken").field("cancelled", &self.is_cancelled()).finish()
    }
}

pub trait Scheduler {
    /// Call `callback` once per frame until the returned token is cancelled.
    fn tick(&mut self, callback: FrameCallback) -> CancellationToken;
}

/// Scheduler driven by explicit `advance` calls. Headless hosts and tests.
#[derive(Default)]
pub struct ManualScheduler {
    loops: Vec<(CancellationToken, FrameCallback)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one frame of every live loop. Returns how many callbacks ran.
    pub fn advance(&mut self, dt: f32) -> usize {
        self.loops.retain(|(token, _)| !token.is_cancelled());
        let mut ran = 0;
        for (token, callback) in &mut self.loops {
            if token.is_cancelled() {
                continue;
            }
            callback(dt);
            ran += 1;
        }
        ran
    }

    /// Live (not cancelled) loops.
    pub fn active(&self) -> usize {
        self.loops.iter().filter(|(t, _)| !t.is_cancelled()).count()
    }
}

impl Scheduler for ManualScheduler {
    fn tick(&mut self, callback: FrameCallback) -> CancellationToken {
        let token = CancellationToken::new();
        self.loops.push((token.clone(), callback));
        token
    }
}

/// An engine plus the adapter it draws through: what a frame loop drives.
pub struct EngineDriver<R: RenderAdapter> {
    pub engine: Engine,
    pub renderer: R,
}

impl<R: RenderAdapter> EngineDriver<R> {
    pub fn new(engine: Engine, renderer: R) -> Self {
        Self { engine, renderer }
    }

    pub fn frame(&mut self, dt: f32) {
        self.engine.tick(dt, &mut self.renderer);
    }
}

/// Start the frame loop for `driver` on `scheduler`. The engine keeps the
/// token, so `Engine::teardown` stops the loop. The loop holds only a weak
/// reference; dropping the driver also ends it.
pub fn start<R, S>(driver: &Rc<RefCell<EngineDriver<R>>>, scheduler: &mut S) -> CancellationToken
where
    R: RenderAdapter + 'static,
    S: Scheduler + ?Sized,
{
    let weak = Rc::downgrade(driver);
    let token = scheduler.tick(Box::new(move |dt| {
        let Some(driver) = weak.upgrade() else {
            return;
        };
        // A re-entrant frame (host called back while we were drawing) is skipped.
        if let Ok(mut driver) = driver.try_borrow_mut() {
            driver.frame(dt);
        };
    }));
    match driver.try_borrow_mut() {
        Ok(mut d) => d.engine.attach_frame_token(token.clone()),
        Err(_) => log::warn!("engine busy while starting its frame loop; token not attached"),
    }
    token
}
