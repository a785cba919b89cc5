//! Per-frame motion: the elapsed clock, the plane mesh and the presets that drive it.

pub mod clock;
pub mod mesh;
pub mod preset;
