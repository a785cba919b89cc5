use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::core::Vec4;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded image ready for sampling.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl Texture {
    /// Build a texture from straight-alpha RGBA8 pixels.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::intake("image has zero width or height"));
        }
        if rgba.len() != (width as usize) * (height as usize) * 4 {
            return Err(ReelError::intake(
                "pixel buffer size mismatch with width*height*4",
            ));
        }
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Bilinear sample at `(u, v)`, `v = 1` being the top row. Returns premultiplied `[0, 1]`
    /// RGBA. Coordinates are clamped to the edge.
    pub fn sample(&self, u: f32, v: f32) -> Vec4 {
        let w = self.width as usize;
        let h = self.height as usize;
        let x = (u.clamp(0.0, 1.0) * self.width as f32 - 0.5).max(0.0);
        let y = ((1.0 - v.clamp(0.0, 1.0)) * self.height as f32 - 0.5).max(0.0);

        let x0 = (x.floor() as usize).min(w - 1);
        let y0 = (y.floor() as usize).min(h - 1);
        let x1 = (x0 + 1).min(w - 1);
        let y1 = (y0 + 1).min(h - 1);
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let px = |xx: usize, yy: usize| {
            let i = (yy * w + xx) * 4;
            let d = &self.rgba8_premul[i..i + 4];
            Vec4::new(
                f32::from(d[0]),
                f32::from(d[1]),
                f32::from(d[2]),
                f32::from(d[3]),
            ) / 255.0
        };

        let top = px(x0, y0).lerp(px(x1, y0), fx);
        let bottom = px(x0, y1).lerp(px(x1, y1), fx);
        top.lerp(bottom, fy)
    }
}

/// Decode encoded image bytes (PNG, JPEG, GIF, ...) into a premultiplied texture.
pub fn decode_texture(bytes: &[u8]) -> ReelResult<Texture> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Texture::from_straight_rgba8(width, height, rgba.into_raw())
}
