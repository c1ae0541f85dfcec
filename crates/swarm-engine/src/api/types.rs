use serde::{Deserialize, Serialize};

use crate::shapes::ShapeId;

/// Which part of a silhouette a point belongs to.
/// Drives palette choice, base radius and how much a formed particle floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionTag {
    /// Not bound to any shape (playground particles).
    #[default]
    Free,
    Body,
    Wing,
    Antenna,
    Staff,
    Serpent,
    Head,
    Ornament,
    Core,
    Orbit,
    Icon,
}

impl RegionTag {
    pub const ALL: [RegionTag; 11] = [
        Self::Free, Self::Body, Self::Wing, Self::Antenna, Self::Staff, Self::Serpent,
        Self::Head, Self::Ornament, Self::Core, Self::Orbit, Self::Icon,
    ];

    /// Stable numeric code for the instance wire format.
    pub fn code(self) -> u32 {
        Self::ALL.iter().position(|r| *r == self).unwrap_or(0) as u32
    }
}

/// Coarse behavioral mode of the whole pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Free drift under ambient and pointer forces; no targets.
    #[default]
    Playground,
    /// Staggered convergence onto shape targets.
    Forming,
    /// Spring-held on targets, still reacting to the pointer.
    Formed,
}

impl Regime {
    pub fn code(self) -> u32 {
        match self {
            Regime::Playground => 0,
            Regime::Forming => 1,
            Regime::Formed => 2,
        }
    }
}

/// Discrete commands from the host. Queued and applied at the start of the next tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Sample the named shape and converge onto it. Unknown names leave the pool in Playground.
    StartFormation(String),
    /// Re-scatter everything and return to Playground.
    Disperse,
    /// Rebuild the pool with `n` particles (clamped to the configured range).
    SetParticleCount(i64),
    /// Flip whether stats are forwarded to the render adapter.
    ToggleStatsDisplay,
}

/// Notifications for the host, drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// A sampled shape was bound and the pool entered Forming.
    FormationStarted { shape: ShapeId },
    /// Fired exactly once per formation, on the Forming -> Formed transition.
    FormationComplete { shape: ShapeId },
    /// The pool was re-scattered into Playground.
    Dispersed,
}

impl EngineEvent {
    /// Wire encoding: `[kind, a, b, c]`, matching the bridge's event section.
    pub fn to_floats(self) -> [f32; 4] {
        match self {
            EngineEvent::FormationStarted { shape } => [1.0, shape.code() as f32, 0.0, 0.0],
            EngineEvent::FormationComplete { shape } => [2.0, shape.code() as f32, 0.0, 0.0],
            EngineEvent::Dispersed => [3.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Read-only stats for overlays.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub particle_count: u32,
    /// Mean per-particle formation progress, in percent.
    pub formation_progress_pct: f32,
    pub fps: u32,
}
