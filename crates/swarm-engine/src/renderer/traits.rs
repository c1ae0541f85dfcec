//! Render adapter contract.
//!
//! The engine never draws. Each frame it hands a `FrameData` to whatever
//! adapter the host attached: a shared-memory buffer read by a browser
//! renderer, a native GPU backend, or a recording double in tests.

use super::instance::ParticleInstance;
use crate::api::error::RenderError;
use crate::api::types::{Regime, StatsSnapshot};
use crate::core::viewport::Viewport;

/// Everything a backend needs to draw one frame.
pub struct FrameData<'a> {
    pub instances: &'a [ParticleInstance],
    pub viewport: Viewport,
    pub regime: Regime,
    /// Present only while the stats overlay is toggled on.
    pub stats: Option<StatsSnapshot>,
    /// Host frames seen since construction.
    pub frame_index: u64,
}

pub trait RenderAdapter {
    /// Backend identifier (e.g. "shared-buffer", "canvas2d", "recording").
    fn backend(&self) -> &'static str;

    /// The drawing surface changed size.
    fn resize(&mut self, viewport: Viewport);

    /// Draw a complete frame. An error makes the engine reset to Playground
    /// and try again next frame.
    fn draw(&mut self, frame: &FrameData) -> Result<(), RenderError>;
}

/// Adapter that keeps a copy of the last frame. Useful for headless hosts
/// and tests; can be told to fail a number of upcoming draws.
#[derive(Debug, Default)]
pub struct RecordingAdapter {
    pub frames_drawn: u64,
    pub last_instances: Vec<ParticleInstance>,
    pub last_regime: Option<Regime>,
    pub last_stats: Option<StatsSnapshot>,
    pub last_viewport: Option<Viewport>,
    pub resizes: u32,
    pub fail_next: u32,
}

impl RecordingAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderAdapter for RecordingAdapter {
    fn backend(&self) -> &'static str {
        "recording"
    }

    fn resize(&mut self, viewport: Viewport) {
        self.resizes += 1;
        self.last_viewport = Some(viewport);
    }

    fn draw(&mut self, frame: &FrameData) -> Result<(), RenderError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(RenderError::Backend("injected failure".into()));
        }
        self.frames_drawn += 1;
        self.last_instances.clear();
        self.last_instances.extend_from_slice(frame.instances);
        self.last_regime = Some(frame.regime);
        self.last_stats = frame.stats;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_adapter_fails_on_request() {
        let mut adapter = RecordingAdapter::new();
        adapter.fail_next = 1;
        let frame = FrameData {
            instances: &[ParticleInstance::default()],
            viewport: Viewport::new(10.0, 10.0),
            regime: Regime::Playground,
            stats: None,
            frame_index: 0,
        };
        assert!(adapter.draw(&frame).is_err());
        assert!(adapter.draw(&frame).is_ok());
        assert_eq!(adapter.frames_drawn, 1);
        assert_eq!(adapter.last_instances.len(), 1);
        assert_eq!(adapter.last_regime, Some(Regime::Playground));
    }
}
