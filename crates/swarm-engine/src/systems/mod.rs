//! Per-frame systems: one integrator per regime, plus render packing and
//! performance sampling. Integrators are plain functions over a single
//! particle so the controller decides iteration order and regime.

pub mod playground;
pub mod forming;
pub mod formed;
pub mod monitor;
pub mod render;

use glam::Vec2;

use crate::core::viewport::Viewport;

/// Frame-invariant inputs shared by every particle in one integrator step.
#[derive(Debug, Clone, Copy)]
pub struct StepInput {
    /// Simulation seconds at this step.
    pub time: f32,
    pub pointer: Option<Vec2>,
    pub viewport: Viewport,
    /// Shape-space origin on the surface (where offsets are anchored).
    pub shape_center: Vec2,
}
