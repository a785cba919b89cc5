/// Backend trait, frame type and settings.
pub mod backend;
/// Software rasterizer.
pub mod cpu;
