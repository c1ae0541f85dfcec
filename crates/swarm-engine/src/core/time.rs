/// Fixed timestep accumulator.
/// Converts variable host frame deltas into a whole number of integrator steps
/// and tracks the simulation clock those steps advance.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// The fixed delta time per step, in seconds.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    /// Simulation seconds consumed by completed steps.
    elapsed: f32,
}

impl FixedTimestep {
    /// Max steps run for a single host frame (prevents a spiral of death after a stall).
    pub const MAX_STEPS: u32 = 10;

    pub fn new(dt: f32) -> Self {
        Self {
            dt: if dt > 0.0 { dt } else { 1.0 / 60.0 },
            accumulator: 0.0,
            elapsed: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    /// Negative or non-finite deltas (tab resume, clock skew) count as zero.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        let frame_dt = if frame_dt.is_finite() { frame_dt.max(0.0) } else { 0.0 };
        self.accumulator = (self.accumulator + frame_dt).min(self.dt * Self::MAX_STEPS as f32);
        // Small epsilon so 1/60 + 1/60 + ... does not drop a step to round-off.
        let steps = ((self.accumulator + self.dt * 1e-3) / self.dt) as u32;
        self.accumulator = (self.accumulator - steps as f32 * self.dt).max(0.0);
        steps
    }

    /// Advance the simulation clock by one step. Returns the new elapsed time.
    pub fn advance(&mut self) -> f32 {
        self.elapsed += self.dt;
        self.elapsed
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Simulation seconds elapsed since construction.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}
