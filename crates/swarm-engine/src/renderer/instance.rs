use bytemuck::{Pod, Zeroable};

use crate::pool::Particle;

/// Per-particle draw data handed to render backends.
/// Wire format: 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// X position in surface pixels.
    pub x: f32,
    /// Y position in surface pixels.
    pub y: f32,
    /// Rendered radius in pixels.
    pub radius: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    /// Region code (see `RegionTag::code`), for backends that style by region.
    pub region: f32,
}

impl ParticleInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn from_particle(p: &Particle) -> Self {
        let [r, g, b] = p.render.color;
        Self {
            x: p.position.x,
            y: p.position.y,
            radius: p.render.radius,
            alpha: p.render.opacity,
            r,
            g,
            b,
            region: p.region.code() as f32,
        }
    }
}

/// Instance buffer rebuilt every frame, sized to the pool.
pub struct RenderBuffer {
    pub instances: Vec<ParticleInstance>,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(1024),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: ParticleInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Flat float view of the instances.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Raw pointer to instance data for shared-memory reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
