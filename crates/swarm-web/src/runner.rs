use swarm_engine::{Command, Engine, InputEvent, ProtocolLayout, Regime, RenderAdapter, SharedFrameBuffer, StatsSnapshot};

/// Owns the engine and the shared frame buffer the browser reads.
///
/// `lib.rs` keeps one runner in a `thread_local!` and exports free
/// functions over it, because wasm-bindgen cannot export generic or
/// borrowed state directly.
pub struct EngineRunner {
    engine: Engine,
    frame: SharedFrameBuffer,
}

impl EngineRunner {
    pub fn new(engine: Engine) -> Self {
        let layout = ProtocolLayout::from_config(engine.config());
        let mut frame = SharedFrameBuffer::new(layout);
        frame.resize(engine.viewport());
        Self { engine, frame }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.engine.push_input(event);
    }

    pub fn command(&mut self, command: Command) {
        self.engine.command(command);
    }

    /// Run one frame and publish this frame's events next to the instances.
    pub fn tick(&mut self, dt: f32) {
        self.engine.tick(dt, &mut self.frame);
        let events = self.engine.drain_events();
        self.frame.write_events(&events);
    }

    pub fn teardown(&mut self) {
        self.engine.teardown();
    }

    // ---- Pointer accessors for shared-memory reads ----

    pub fn buffer_ptr(&self) -> *const f32 {
        self.frame.as_ptr()
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.frame.layout().buffer_total_floats as u32
    }

    pub fn instance_data_offset(&self) -> u32 {
        self.frame.layout().instance_data_offset as u32
    }

    pub fn event_data_offset(&self) -> u32 {
        self.frame.layout().event_data_offset as u32
    }

    pub fn instance_count(&self) -> u32 {
        self.frame.instance_count()
    }

    pub fn event_count(&self) -> u32 {
        self.frame.header(swarm_engine::bridge::protocol::HEADER_EVENT_COUNT) as u32
    }

    pub fn max_instances(&self) -> u32 {
        self.frame.layout().max_instances as u32
    }

    // ---- Stats ----

    pub fn stats(&self) -> StatsSnapshot {
        self.engine.stats()
    }

    pub fn regime(&self) -> Regime {
        self.engine.regime()
    }
}
