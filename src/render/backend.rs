use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::ReelResult;
use crate::scene::composer::Scene;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**. The `premultiplied` flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

/// A renderer that draws a [`Scene`] into a [`FrameRGBA`].
pub trait RenderBackend: Send {
    /// Draw the scene as currently posed.
    fn render_scene(&mut self, scene: &Scene, canvas: Canvas) -> ReelResult<FrameRGBA>;
}

/// Radial backdrop drawn behind the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Background {
    /// Color at the canvas centre.
    pub inner: Rgb8,
    /// Color at the farthest corner.
    pub outer: Rgb8,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            inner: Rgb8::new(0x1a, 0x1a, 0x2e),
            outer: Rgb8::new(0x0f, 0x0f, 0x1e),
        }
    }
}

/// Backend-agnostic settings.
#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// Backdrop behind the plane.
    pub background: Background,
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug)]
pub enum BackendKind {
    /// Software rasterizer.
    Cpu,
}

/// Create a rendering backend implementation.
pub fn create_backend(
    kind: BackendKind,
    settings: &RenderSettings,
) -> ReelResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new(
            settings.clone(),
            crate::render::cpu::CpuBackendOpts::default(),
        ))),
    }
}
