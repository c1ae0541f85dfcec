//! Shared frame buffer layout.
//! Hosts reading the buffer must agree with these indices.
//!
//! Layout (all values f32 / 4 bytes):
//! ```text
//! [Header: 16 floats]
//! [Instances: max_instances × 8 floats]
//! [Events: max_events × 4 floats]
//! ```
//!
//! Capacities are written into the header once, so readers can compute
//! section offsets without hardcoding them.

use crate::api::config::EngineConfig;
use crate::api::error::RenderError;
use crate::api::types::EngineEvent;
use crate::core::viewport::Viewport;
use crate::renderer::instance::ParticleInstance;
use crate::renderer::traits::{FrameData, RenderAdapter};

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_LOCK: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_MAX_INSTANCES: usize = 2;
pub const HEADER_INSTANCE_COUNT: usize = 3;
pub const HEADER_VIEWPORT_WIDTH: usize = 4;
pub const HEADER_VIEWPORT_HEIGHT: usize = 5;
pub const HEADER_REGIME: usize = 6;
pub const HEADER_STATS_VISIBLE: usize = 7;
pub const HEADER_PARTICLE_COUNT: usize = 8;
pub const HEADER_PROGRESS_PCT: usize = 9;
pub const HEADER_FPS: usize = 10;
pub const HEADER_MAX_EVENTS: usize = 11;
pub const HEADER_EVENT_COUNT: usize = 12;
pub const HEADER_PROTOCOL_VERSION: usize = 13;

pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per particle instance.
pub const INSTANCE_FLOATS: usize = ParticleInstance::FLOATS;

/// Floats per engine event: kind, a, b, c.
pub const EVENT_FLOATS: usize = 4;

/// Events kept per frame; extra events in one frame are dropped from the buffer.
pub const DEFAULT_MAX_EVENTS: usize = 16;

/// Buffer layout computed from capacities.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_instances: usize,
    pub max_events: usize,

    pub instance_data_floats: usize,
    pub event_data_floats: usize,

    /// Offset (in floats) where instance data begins.
    pub instance_data_offset: usize,
    /// Offset (in floats) where event data begins.
    pub event_data_offset: usize,

    pub buffer_total_floats: usize,
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    pub fn new(max_instances: usize, max_events: usize) -> Self {
        let instance_data_floats = max_instances * INSTANCE_FLOATS;
        let event_data_floats = max_events * EVENT_FLOATS;

        let instance_data_offset = HEADER_FLOATS;
        let event_data_offset = instance_data_offset + instance_data_floats;
        let buffer_total_floats = event_data_offset + event_data_floats;

        Self {
            max_instances,
            max_events,
            instance_data_floats,
            event_data_floats,
            instance_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    /// Sized for the largest pool the config allows.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_particle_count as usize, DEFAULT_MAX_EVENTS)
    }
}

/// Render adapter that serializes each frame into one flat float buffer,
/// for hosts that read engine memory directly (e.g. a browser renderer
/// reading WASM linear memory).
pub struct SharedFrameBuffer {
    layout: ProtocolLayout,
    data: Vec<f32>,
    truncation_warned: bool,
}

impl SharedFrameBuffer {
    pub fn new(layout: ProtocolLayout) -> Self {
        let mut data = vec![0.0; layout.buffer_total_floats];
        data[HEADER_MAX_INSTANCES] = layout.max_instances as f32;
        data[HEADER_MAX_EVENTS] = layout.max_events as f32;
        data[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        Self { layout, data, truncation_warned: false }
    }

    pub fn layout(&self) -> &ProtocolLayout {
        &self.layout
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn header(&self, index: usize) -> f32 {
        self.data[index]
    }

    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.data[HEADER_INSTANCE_COUNT] as u32
    }

    /// Write this frame's events, replacing last frame's.
    pub fn write_events(&mut self, events: &[EngineEvent]) {
        let n = events.len().min(self.layout.max_events);
        if n < events.len() {
            log::warn!("{} engine events dropped from the frame buffer", events.len() - n);
        }
        let base = self.layout.event_data_offset;
        for (i, ev) in events[..n].iter().enumerate() {
            let at = base + i * EVENT_FLOATS;
            self.data[at..at + EVENT_FLOATS].copy_from_slice(&ev.to_floats());
        }
        self.data[HEADER_EVENT_COUNT] = n as f32;
    }
}

impl RenderAdapter for SharedFrameBuffer {
    fn backend(&self) -> &'static str {
        "shared-buffer"
    }

    fn resize(&mut self, viewport: Viewport) {
        self.data[HEADER_VIEWPORT_WIDTH] = viewport.width;
        self.data[HEADER_VIEWPORT_HEIGHT] = viewport.height;
    }

    /// Never fails: the buffer is sized once from the layout and oversized
    /// frames are truncated.
    fn draw(&mut self, frame: &FrameData) -> Result<(), RenderError> {
        let n = frame.instances.len().min(self.layout.max_instances);
        if n < frame.instances.len() && !self.truncation_warned {
            log::warn!(
                "frame has {} instances, buffer holds {}; extra particles are not drawn",
                frame.instances.len(),
                self.layout.max_instances
            );
            self.truncation_warned = true;
        }

        self.data[HEADER_LOCK] = 1.0;
        let start = self.layout.instance_data_offset;
        let floats: &[f32] = bytemuck::cast_slice(&frame.instances[..n]);
        self.data[start..start + floats.len()].copy_from_slice(floats);

        self.data[HEADER_FRAME_COUNTER] = frame.frame_index as f32;
        self.data[HEADER_INSTANCE_COUNT] = n as f32;
        self.data[HEADER_VIEWPORT_WIDTH] = frame.viewport.width;
        self.data[HEADER_VIEWPORT_HEIGHT] = frame.viewport.height;
        self.data[HEADER_REGIME] = frame.regime.code() as f32;
        match frame.stats {
            Some(stats) => {
                self.data[HEADER_STATS_VISIBLE] = 1.0;
                self.data[HEADER_PARTICLE_COUNT] = stats.particle_count as f32;
                self.data[HEADER_PROGRESS_PCT] = stats.formation_progress_pct;
                self.data[HEADER_FPS] = stats.fps as f32;
            }
            None => self.data[HEADER_STATS_VISIBLE] = 0.0,
        }
        self.data[HEADER_LOCK] = 0.0;
        Ok(())
    }
}
