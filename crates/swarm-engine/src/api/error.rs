//! Error types for the engine.
//!
//! Nothing here is fatal to the host: commands that fail are logged and
//! dropped, and render failures trigger a local reset.

use thiserror::Error;

/// Errors surfaced by configuration and command validation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown shape: {0}")]
    UnknownShape(String),

    #[error("Shape {0} produced no points")]
    EmptyShape(String),

    #[error("Particle count {requested} rejected (allowed {min}..={max})")]
    ParticleCount { requested: i64, min: u32, max: u32 },
}

/// Errors raised by a render backend while drawing a frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Render backend failure: {0}")]
    Backend(String),

    #[error("Drawing surface lost")]
    SurfaceLost,
}
