use crate::pool::ParticlePool;
use crate::renderer::instance::{ParticleInstance, RenderBuffer};

/// Rebuild the instance buffer from the pool.
/// Particles still in flight are written first so formed ones draw on top.
/// Returns the index where the formed group starts.
pub fn build_render_buffer(pool: &ParticlePool, buffer: &mut RenderBuffer) -> u32 {
    buffer.clear();

    for p in pool.iter().filter(|p| !p.formed) {
        buffer.push(ParticleInstance::from_particle(p));
    }
    let split = buffer.instance_count();
    for p in pool.iter().filter(|p| p.formed) {
        buffer.push(ParticleInstance::from_particle(p));
    }
    split
}
