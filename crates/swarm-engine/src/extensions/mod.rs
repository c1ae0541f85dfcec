// extensions/mod.rs
//
// Helpers that sit beside the engine rather than inside it.
// Pure math the integrators and hosts can share.

pub mod easing;

pub use easing::{lerp, lerp_vec2, Easing};
