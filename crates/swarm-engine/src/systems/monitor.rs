use crate::api::types::StatsSnapshot;
use crate::pool::ParticlePool;

/// Frame-rate sampler over non-overlapping windows of at least `window` seconds.
#[derive(Debug, Clone)]
pub struct PerformanceMonitor {
    window: f32,
    frames: u32,
    elapsed: f32,
    fps: u32,
    windows_closed: u64,
}

impl PerformanceMonitor {
    pub fn new(window: f32) -> Self {
        Self {
            window: window.max(f32::EPSILON),
            frames: 0,
            elapsed: 0.0,
            fps: 0,
            windows_closed: 0,
        }
    }

    /// Count one host frame of `frame_dt` seconds. When the window closes the
    /// fps estimate becomes `round(frames / elapsed)` and a new window opens.
    pub fn record_frame(&mut self, frame_dt: f32) {
        if !(frame_dt >= 0.0) {
            return;
        }
        self.frames += 1;
        self.elapsed += frame_dt;
        if self.elapsed >= self.window {
            self.fps = (self.frames as f32 / self.elapsed).round() as u32;
            self.frames = 0;
            self.elapsed = 0.0;
            self.windows_closed += 1;
        }
    }

    /// Last completed window's estimate; 0 before the first window closes.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn windows_closed(&self) -> u64 {
        self.windows_closed
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.window);
    }

    pub fn snapshot(&self, pool: &ParticlePool) -> StatsSnapshot {
        StatsSnapshot {
            particle_count: pool.len() as u32,
            formation_progress_pct: pool.mean_progress() * 100.0,
            fps: self.fps,
        }
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(1.0)
    }
}
