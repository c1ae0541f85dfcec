use serde::{Deserialize, Serialize};

use crate::api::error::EngineError;
use crate::extensions::easing::Easing;
use crate::renderer::palette::ColorTable;

/// Where shape sampling runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Sample on the command path; the result is bound on the same tick.
    #[default]
    Inline,
    /// Sample on a worker thread; the result is bound on a later tick.
    /// Falls back to inline on wasm32, where threads are unavailable.
    Background,
}

/// Free-drift tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundParams {
    /// Peak ambient acceleration, px/frame².
    pub ambient_strength: f32,
    /// Temporal frequency of the drift, rad/s.
    pub ambient_frequency: f32,
    /// Spatial frequency applied to the origin seed, rad/px.
    pub ambient_spatial: f32,
    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    /// Outer radius of the weak pull ring (must exceed `repulsion_radius`).
    pub attraction_radius: f32,
    pub attraction_strength: f32,
    /// Multiplicative velocity damping per frame.
    pub damping: f32,
    /// Velocity kept (and reversed) on wall contact.
    pub restitution: f32,
    /// How far outside the surface particles may travel.
    pub boundary_margin: f32,
}

impl Default for PlaygroundParams {
    fn default() -> Self {
        Self {
            ambient_strength: 0.05,
            ambient_frequency: 0.6,
            ambient_spatial: 0.01,
            repulsion_radius: 100.0,
            repulsion_strength: 1.2,
            attraction_radius: 220.0,
            attraction_strength: 0.08,
            damping: 0.92,
            restitution: 0.6,
            boundary_margin: 40.0,
        }
    }
}

/// Convergence tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormingParams {
    /// Seconds a single particle takes from start to target.
    pub duration: f32,
    /// Per-particle start delays are spread over this window.
    pub stagger_window: f32,
    pub easing: Easing,
    /// Blend strength toward the path point at progress 0 (reaches 1 at progress 1).
    pub min_blend: f32,
    /// Peak perpendicular bulge, as a fraction of the start-to-target distance.
    pub curvature: f32,
    /// Per-particle progress at which `formed` latches.
    pub particle_threshold: f32,
    /// Pool-wide formed fraction that completes the formation and snaps stragglers.
    pub pool_snap_threshold: f32,
    /// Rate (1/s) at which in-flight particles absorb a resize's target shift.
    pub retarget_rate: f32,
}

impl Default for FormingParams {
    fn default() -> Self {
        Self {
            duration: 2.2,
            stagger_window: 0.6,
            easing: Easing::CubicOut,
            min_blend: 0.08,
            curvature: 0.18,
            particle_threshold: 0.999,
            pool_snap_threshold: 0.99,
            retarget_rate: 2.5,
        }
    }
}

impl FormingParams {
    /// Time by which every particle should have arrived: last stagger slot + travel time.
    pub fn nominal_duration(&self) -> f32 {
        self.stagger_window + self.duration
    }
}

/// Hold tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormedParams {
    pub spring_k: f32,
    pub damping: f32,
    /// Per-frame speed cap; bounds motion when targets move (resize).
    pub max_speed: f32,
    /// Base breathing amplitude in px, scaled per region.
    pub float_amplitude: f32,
    /// Breathing frequency, rad/s.
    pub float_frequency: f32,
    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    /// Fraction of the push redirected toward the shape center.
    pub center_bias: f32,
    pub max_displacement: f32,
    /// Per-frame decay of pointer-induced displacement.
    pub displacement_decay: f32,
}

impl Default for FormedParams {
    fn default() -> Self {
        Self {
            spring_k: 0.1,
            damping: 0.8,
            max_speed: 24.0,
            float_amplitude: 2.5,
            float_frequency: 1.2,
            repulsion_radius: 90.0,
            repulsion_strength: 4.0,
            center_bias: 0.25,
            max_displacement: 60.0,
            displacement_decay: 0.9,
        }
    }
}

/// Visual attribute tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    /// Radius before region and density multipliers, px.
    pub base_radius: f32,
    pub playground_opacity: f32,
    pub formed_opacity: f32,
    /// Radius multiplier at formation start; ramps to 1 with progress.
    pub radius_ramp_start: f32,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            base_radius: 2.0,
            playground_opacity: 0.55,
            formed_opacity: 1.0,
            radius_ramp_start: 0.6,
        }
    }
}

/// Engine configuration. Every field has a default, so partial JSON is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub particle_count: u32,
    pub min_particle_count: u32,
    pub max_particle_count: u32,
    /// Fixed integrator step in seconds.
    pub fixed_dt: f32,
    pub seed: u64,
    /// Fraction of the shorter surface side a shape spans.
    pub shape_fill: f32,
    /// Max outward distance for scatter positions.
    pub scatter_padding: f32,
    /// Max per-axis scatter velocity, px/frame.
    pub initial_speed: f32,
    pub sampling: SamplingMode,
    /// Points sampled per shape. `None` samples one point per particle;
    /// a smaller cloud is shared cyclically across the pool.
    pub shape_resolution: Option<u32>,
    /// Disperse after this many seconds Formed with no pointer present.
    pub idle_disperse_after: Option<f32>,
    pub playground: PlaygroundParams,
    pub forming: FormingParams,
    pub formed: FormedParams,
    pub render: RenderParams,
    pub palette: ColorTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            particle_count: 600,
            min_particle_count: 1,
            max_particle_count: 20_000,
            fixed_dt: 1.0 / 60.0,
            seed: 42,
            shape_fill: 0.8,
            scatter_padding: 40.0,
            initial_speed: 0.8,
            sampling: SamplingMode::Inline,
            shape_resolution: None,
            idle_disperse_after: None,
            playground: PlaygroundParams::default(),
            forming: FormingParams::default(),
            formed: FormedParams::default(),
            render: RenderParams::default(),
            palette: ColorTable::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges the integrators rely on.
    pub fn validate(&self) -> Result<(), EngineError> {
        fn unit_open(name: &str, v: f32) -> Result<(), EngineError> {
            if v > 0.0 && v < 1.0 {
                Ok(())
            } else {
                Err(EngineError::InvalidConfig(format!("{name} must be in (0, 1), got {v}")))
            }
        }
        fn positive(name: &str, v: f32) -> Result<(), EngineError> {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(EngineError::InvalidConfig(format!("{name} must be > 0, got {v}")))
            }
        }

        if self.min_particle_count == 0 || self.min_particle_count > self.max_particle_count {
            return Err(EngineError::InvalidConfig(format!(
                "particle count range {}..={} is empty or starts at zero",
                self.min_particle_count, self.max_particle_count
            )));
        }
        positive("fixed_dt", self.fixed_dt)?;
        if self.shape_resolution == Some(0) {
            return Err(EngineError::InvalidConfig("shape_resolution must be > 0".into()));
        }
        if let Some(after) = self.idle_disperse_after {
            positive("idle_disperse_after", after)?;
        }
        positive("shape_fill", self.shape_fill)?;

        let pg = &self.playground;
        unit_open("playground.damping", pg.damping)?;
        unit_open("playground.restitution", pg.restitution)?;
        positive("playground.repulsion_radius", pg.repulsion_radius)?;
        if pg.attraction_radius <= pg.repulsion_radius {
            return Err(EngineError::InvalidConfig(
                "playground.attraction_radius must exceed repulsion_radius".into(),
            ));
        }
        if self.scatter_padding > pg.boundary_margin {
            return Err(EngineError::InvalidConfig(
                "scatter_padding must not exceed playground.boundary_margin".into(),
            ));
        }

        let fm = &self.forming;
        positive("forming.duration", fm.duration)?;
        positive("forming.retarget_rate", fm.retarget_rate)?;
        if fm.stagger_window < 0.0 {
            return Err(EngineError::InvalidConfig("forming.stagger_window must be >= 0".into()));
        }
        if !(fm.particle_threshold > 0.0 && fm.particle_threshold <= 1.0) {
            return Err(EngineError::InvalidConfig("forming.particle_threshold must be in (0, 1]".into()));
        }
        if !(fm.pool_snap_threshold > 0.0 && fm.pool_snap_threshold <= 1.0) {
            return Err(EngineError::InvalidConfig("forming.pool_snap_threshold must be in (0, 1]".into()));
        }

        let fd = &self.formed;
        unit_open("formed.damping", fd.damping)?;
        unit_open("formed.displacement_decay", fd.displacement_decay)?;
        positive("formed.spring_k", fd.spring_k)?;
        positive("formed.max_speed", fd.max_speed)?;
        positive("formed.repulsion_radius", fd.repulsion_radius)?;
        Ok(())
    }

    /// Clamp a requested particle count into the configured range.
    pub fn clamp_particle_count(&self, requested: i64) -> u32 {
        requested.clamp(self.min_particle_count as i64, self.max_particle_count as i64) as u32
    }
}
