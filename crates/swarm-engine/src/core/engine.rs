//! The motion controller.
//!
//! `Engine` owns the pool and every piece of per-instance state (input
//! cells, clocks, caches, the frame token). Each host frame it reads input,
//! applies queued commands, runs the current regime's integrator for each
//! fixed step, then hands the packed instances to the render adapter.

use glam::Vec2;

use crate::api::config::{EngineConfig, SamplingMode};
use crate::api::error::EngineError;
use crate::api::types::{Command, EngineEvent, Regime, StatsSnapshot};
use crate::core::rng::Rng;
use crate::core::scheduler::CancellationToken;
use crate::core::time::FixedTimestep;
use crate::core::viewport::Viewport;
use crate::input::state::{InputEvent, InputState};
use crate::pool::ParticlePool;
use crate::renderer::instance::RenderBuffer;
use crate::renderer::traits::{FrameData, RenderAdapter};
use crate::shapes::{SampleTask, ShapeCache, ShapeId, ShapePoint, TaskPoll};
use crate::systems::monitor::PerformanceMonitor;
use crate::systems::render::build_render_buffer;
use crate::systems::{formed, forming, playground, StepInput};

pub struct Engine {
    config: EngineConfig,
    viewport: Viewport,
    pool: ParticlePool,
    regime: Regime,
    rng: Rng,
    timestep: FixedTimestep,
    input: InputState,
    monitor: PerformanceMonitor,
    events: Vec<EngineEvent>,
    render_buffer: RenderBuffer,
    /// Shape currently bound (Forming/Formed).
    active_shape: Option<ShapeId>,
    shape_cache: ShapeCache,
    pending_task: Option<SampleTask>,
    /// Seconds since the current formation started.
    formation_clock: f32,
    /// Seconds Formed with no pointer present.
    idle_time: f32,
    completion_fired: bool,
    stats_visible: bool,
    /// Pool was built against an unusable surface; re-scatter on the first good frame.
    needs_scatter: bool,
    frame_token: Option<CancellationToken>,
    render_failures: u32,
    total_render_failures: u64,
    frame_index: u64,
    torn_down: bool,
}

impl Engine {
    pub fn new(config: EngineConfig, viewport: Viewport) -> Result<Self, EngineError> {
        config.validate()?;
        let mut rng = Rng::new(config.seed);
        let count = config.clamp_particle_count(config.particle_count as i64);
        let pool = ParticlePool::scatter(count as usize, viewport, &config, &mut rng);
        log::info!("engine: {} particles on {}x{}", pool.len(), viewport.width, viewport.height);

        Ok(Self {
            timestep: FixedTimestep::new(config.fixed_dt),
            viewport,
            pool,
            regime: Regime::Playground,
            rng,
            input: InputState::new(),
            monitor: PerformanceMonitor::default(),
            events: Vec::with_capacity(4),
            render_buffer: RenderBuffer::new(),
            active_shape: None,
            shape_cache: ShapeCache::new(),
            pending_task: None,
            formation_clock: 0.0,
            idle_time: 0.0,
            completion_fired: false,
            stats_visible: false,
            needs_scatter: viewport.is_degenerate(),
            frame_token: None,
            render_failures: 0,
            total_render_failures: 0,
            frame_index: 0,
            torn_down: false,
            config,
        })
    }

    /// Build from a JSON config (missing fields take defaults).
    pub fn from_json(json: &str, viewport: Viewport) -> Result<Self, EngineError> {
        Self::new(EngineConfig::from_json(json)?, viewport)
    }

    // ---- Input ----

    /// Record a host input. Takes effect at the start of the next tick.
    pub fn push_input(&mut self, event: InputEvent) {
        if self.torn_down {
            return;
        }
        self.input.push(event);
    }

    pub fn command(&mut self, command: Command) {
        self.push_input(InputEvent::Command(command));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.push_input(InputEvent::PointerMove { x, y });
    }

    pub fn pointer_leave(&mut self) {
        self.push_input(InputEvent::PointerLeave);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.push_input(InputEvent::Resize { width, height });
    }

    // ---- Frame ----

    /// Run one host frame of `frame_dt` seconds and draw it through `renderer`.
    pub fn tick(&mut self, frame_dt: f32, renderer: &mut dyn RenderAdapter) {
        if self.torn_down {
            return;
        }
        self.frame_index += 1;
        self.monitor.record_frame(frame_dt);

        if let Some(viewport) = self.input.take_viewport() {
            self.apply_resize(viewport, renderer);
        }
        // Mid-layout: skip the frame, keep commands queued for a later one.
        if self.viewport.is_degenerate() {
            return;
        }
        if self.needs_scatter {
            self.pool.rescatter(self.viewport, &self.config, &mut self.rng);
            self.needs_scatter = false;
        }

        for command in self.input.drain_commands() {
            self.apply_command(command);
        }
        self.poll_sampling();

        let steps = self.timestep.accumulate(frame_dt);
        for _ in 0..steps {
            let time = self.timestep.advance();
            self.step(time);
        }

        self.draw(renderer);
    }

    fn step(&mut self, time: f32) {
        let dt = self.timestep.dt();
        let input = StepInput {
            time,
            pointer: self.input.poll_pointer(),
            viewport: self.viewport,
            shape_center: self.viewport.center(),
        };

        match self.regime {
            Regime::Playground => {
                for p in self.pool.iter_mut() {
                    playground::integrate(p, &input, &self.config.playground);
                }
            }
            Regime::Forming => {
                self.formation_clock += dt;
                let clock = self.formation_clock;
                for p in self.pool.iter_mut() {
                    // Arrived particles are held as in Formed and follow a
                    // moved target at the hold speed cap.
                    if p.formed {
                        formed::integrate(p, &input, &self.config.formed);
                    } else {
                        forming::integrate(p, clock, dt, &self.config.forming, &self.config.render);
                    }
                }
                if self.pool.formed_fraction() >= self.config.forming.pool_snap_threshold {
                    self.complete_formation();
                }
            }
            Regime::Formed => {
                for p in self.pool.iter_mut() {
                    formed::integrate(p, &input, &self.config.formed);
                }
                if let Some(after) = self.config.idle_disperse_after {
                    if input.pointer.is_some() {
                        self.idle_time = 0.0;
                    } else {
                        self.idle_time += dt;
                        if self.idle_time >= after {
                            log::info!("idle for {:.1}s while formed; dispersing", self.idle_time);
                            self.disperse();
                        }
                    }
                }
            }
        }
    }

    fn draw(&mut self, renderer: &mut dyn RenderAdapter) {
        build_render_buffer(&self.pool, &mut self.render_buffer);
        let frame = FrameData {
            instances: &self.render_buffer.instances,
            viewport: self.viewport,
            regime: self.regime,
            stats: self.stats_visible.then(|| self.monitor.snapshot(&self.pool)),
            frame_index: self.frame_index,
        };
        match renderer.draw(&frame) {
            Ok(()) => self.render_failures = 0,
            Err(err) => {
                self.render_failures += 1;
                self.total_render_failures += 1;
                log::warn!(
                    "render backend '{}' failed ({err}), {} in a row; resetting to playground",
                    renderer.backend(),
                    self.render_failures
                );
                self.disperse();
            }
        }
    }

    // ---- Transitions ----

    fn apply_resize(&mut self, viewport: Viewport, renderer: &mut dyn RenderAdapter) {
        if viewport == self.viewport {
            return;
        }
        let was_degenerate = self.viewport.is_degenerate();
        self.viewport = viewport;
        if viewport.is_degenerate() {
            log::debug!("surface is {}x{}; pausing", viewport.width, viewport.height);
            return;
        }
        renderer.resize(viewport);
        if was_degenerate {
            self.needs_scatter = self.regime == Regime::Playground;
        }
        if self.regime != Regime::Playground {
            let scale = viewport.shape_scale(self.config.shape_fill);
            let rebound = self.pool.rebind_after_resize(viewport.center(), scale);
            log::debug!("resize to {}x{}: re-aimed {rebound} particles", viewport.width, viewport.height);
        }
    }

    fn apply_command(&mut self, command: Command) {
        match command {
            Command::StartFormation(name) => match name.parse::<ShapeId>() {
                Ok(shape) => self.request_shape(shape),
                Err(err) => {
                    log::warn!("{err}; falling back to playground");
                    self.fall_back_to_playground();
                }
            },
            Command::Disperse => self.disperse(),
            Command::SetParticleCount(requested) => self.set_particle_count(requested),
            Command::ToggleStatsDisplay => {
                self.stats_visible = !self.stats_visible;
                log::debug!("stats overlay {}", if self.stats_visible { "on" } else { "off" });
            }
        }
    }

    fn shape_resolution(&self) -> usize {
        self.config
            .shape_resolution
            .map(|n| n as usize)
            .unwrap_or_else(|| self.pool.len())
    }

    /// Bind `shape` now if its cloud is cached, otherwise start sampling it.
    /// Any earlier in-flight sampling is abandoned.
    fn request_shape(&mut self, shape: ShapeId) {
        self.cancel_sampling();
        let resolution = self.shape_resolution();
        if let Some(points) = self.shape_cache.get(shape, resolution).map(|p| p.to_vec()) {
            log::debug!("{shape}: {resolution} points from cache");
            self.begin_formation(shape, &points);
            return;
        }
        self.pending_task = Some(SampleTask::spawn(shape, resolution, self.config.sampling));
        if self.config.sampling == SamplingMode::Background {
            log::debug!("{shape}: sampling {resolution} points in the background");
        }
    }

    fn poll_sampling(&mut self) {
        let Some(task) = self.pending_task.as_mut() else {
            return;
        };
        let (shape, resolution) = (task.shape(), task.count());
        match task.poll() {
            TaskPoll::Pending => {}
            TaskPoll::Ready(points) => {
                self.pending_task = None;
                self.shape_cache.insert(shape, resolution, points.clone());
                self.begin_formation(shape, &points);
            }
            TaskPoll::Cancelled => {
                self.pending_task = None;
                log::debug!("{shape}: sampling abandoned");
            }
        }
    }

    fn cancel_sampling(&mut self) {
        if let Some(task) = self.pending_task.take() {
            task.cancel();
        }
    }

    fn begin_formation(&mut self, shape: ShapeId, points: &[ShapePoint]) {
        let center = self.viewport.center();
        let scale = self.viewport.shape_scale(self.config.shape_fill);
        if !self.pool.bind_targets(points, center, scale, &self.config, &mut self.rng) {
            log::warn!("{}; falling back to playground", EngineError::EmptyShape(shape.to_string()));
            self.fall_back_to_playground();
            return;
        }
        self.regime = Regime::Forming;
        self.active_shape = Some(shape);
        self.formation_clock = 0.0;
        self.idle_time = 0.0;
        self.completion_fired = false;
        self.events.push(EngineEvent::FormationStarted { shape });
        log::info!("forming {shape}: {} particles on {} points", self.pool.len(), points.len());
    }

    fn complete_formation(&mut self) {
        let snapped = self.pool.snap_stragglers();
        let render = &self.config.render;
        for p in self.pool.iter_mut() {
            p.render.opacity = render.formed_opacity;
            p.render.radius = p.base_radius(render);
        }
        self.regime = Regime::Formed;
        self.idle_time = 0.0;
        if let (Some(shape), false) = (self.active_shape, self.completion_fired) {
            self.completion_fired = true;
            self.events.push(EngineEvent::FormationComplete { shape });
            log::info!("{shape} formed after {:.2}s ({snapped} stragglers snapped)", self.formation_clock);
        }
    }

    /// Re-scatter everything into Playground.
    fn disperse(&mut self) {
        self.cancel_sampling();
        self.pool.rescatter(self.viewport, &self.config, &mut self.rng);
        self.regime = Regime::Playground;
        self.active_shape = None;
        self.formation_clock = 0.0;
        self.idle_time = 0.0;
        self.events.push(EngineEvent::Dispersed);
        log::info!("dispersed {} particles", self.pool.len());
    }

    fn fall_back_to_playground(&mut self) {
        self.cancel_sampling();
        if self.regime != Regime::Playground {
            self.disperse();
        }
    }

    fn set_particle_count(&mut self, requested: i64) {
        let count = self.config.clamp_particle_count(requested);
        if i64::from(count) != requested {
            let err = EngineError::ParticleCount {
                requested,
                min: self.config.min_particle_count,
                max: self.config.max_particle_count,
            };
            log::warn!("{err}; using {count}");
        }
        let restart = self.active_shape.or_else(|| self.pending_task.as_ref().map(|t| t.shape()));
        self.cancel_sampling();

        self.pool = ParticlePool::scatter(count as usize, self.viewport, &self.config, &mut self.rng);
        self.regime = Regime::Playground;
        self.active_shape = None;
        self.formation_clock = 0.0;
        log::info!("pool rebuilt with {count} particles");

        if let Some(shape) = restart {
            self.request_shape(shape);
        }
    }

    // ---- Lifecycle ----

    /// Keep the frame loop's token so teardown can stop it.
    pub fn attach_frame_token(&mut self, token: CancellationToken) {
        if self.torn_down {
            token.cancel();
            return;
        }
        if let Some(old) = self.frame_token.replace(token) {
            old.cancel();
        }
    }

    /// Stop the frame loop, abandon in-flight sampling and drop input.
    /// Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if let Some(token) = self.frame_token.take() {
            token.cancel();
        }
        self.cancel_sampling();
        self.input.clear();
        self.events.clear();
        log::info!("engine torn down after {} frames", self.frame_index);
    }

    // ---- Outputs ----

    pub fn stats(&self) -> StatsSnapshot {
        self.monitor.snapshot(&self.pool)
    }

    /// Events raised since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn regime(&self) -> Regime {
        self.regime
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn render_buffer(&self) -> &RenderBuffer {
        &self.render_buffer
    }

    pub fn active_shape(&self) -> Option<ShapeId> {
        self.active_shape
    }

    pub fn is_sampling(&self) -> bool {
        self.pending_task.is_some()
    }

    pub fn stats_visible(&self) -> bool {
        self.stats_visible
    }

    /// Consecutive failed draws (0 after any success).
    pub fn render_failures(&self) -> u32 {
        self.render_failures
    }

    pub fn total_render_failures(&self) -> u64 {
        self.total_render_failures
    }

    /// Simulation seconds; the clock used by drift and float terms.
    pub fn elapsed(&self) -> f32 {
        self.timestep.elapsed()
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Where the current shape is centered on the surface.
    pub fn shape_center(&self) -> Vec2 {
        self.viewport.center()
    }
}
