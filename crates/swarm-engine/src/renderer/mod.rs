pub mod instance;
pub mod palette;
pub mod traits;

pub use instance::{ParticleInstance, RenderBuffer};
pub use palette::{ColorTable, RegionPalette, Rgb, WeightedColor};
pub use traits::{FrameData, RecordingAdapter, RenderAdapter};
