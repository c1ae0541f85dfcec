pub mod api;
pub mod core;
pub mod pool;
pub mod shapes;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::config::{EngineConfig, FormedParams, FormingParams, PlaygroundParams, RenderParams, SamplingMode};
pub use api::error::{EngineError, RenderError};
pub use api::types::{Command, EngineEvent, Regime, RegionTag, StatsSnapshot};
pub use core::engine::Engine;
pub use core::rng::Rng;
pub use core::scheduler::{CancellationToken, EngineDriver, FrameCallback, ManualScheduler, Scheduler};
pub use core::time::FixedTimestep;
pub use core::viewport::Viewport;
pub use pool::{Particle, ParticlePool, RenderAttributes};
pub use shapes::{ShapeCache, ShapeId, ShapePoint};
pub use systems::monitor::PerformanceMonitor;
pub use renderer::instance::{ParticleInstance, RenderBuffer};
pub use renderer::palette::{ColorTable, RegionPalette, Rgb, WeightedColor};
pub use renderer::traits::{FrameData, RecordingAdapter, RenderAdapter};
pub use input::state::{InputEvent, InputState};
pub use bridge::protocol::{ProtocolLayout, SharedFrameBuffer};
pub use extensions::{lerp, lerp_vec2, Easing};
