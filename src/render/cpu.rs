use rayon::prelude::*;

use crate::animation::mesh::Material;
use crate::foundation::core::{Canvas, Mat4, Vec2, Vec3};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::unit_to_u8;
use crate::intake::texture::Texture;
use crate::render::backend::{Background, FrameRGBA, RenderBackend, RenderSettings};
use crate::scene::composer::Scene;
use crate::scene::lights::LightingRig;

const DIELECTRIC_F0: f32 = 0.04;
const MIN_CLIP_W: f32 = 1e-5;

/// Options for the software rasterizer.
#[derive(Clone, Copy, Debug)]
pub struct CpuBackendOpts {
    /// Rasterize row bands on the rayon pool.
    pub parallel: bool,
    /// Rows per band (the unit of parallel work).
    pub band_rows: u32,
}

impl Default for CpuBackendOpts {
    fn default() -> Self {
        Self {
            parallel: true,
            band_rows: 16,
        }
    }
}

/// Depth-buffered triangle rasterizer with perspective-correct texturing and per-pixel
/// lighting.
pub struct CpuBackend {
    settings: RenderSettings,
    opts: CpuBackendOpts,
}

impl CpuBackend {
    /// Create a backend.
    pub fn new(settings: RenderSettings, opts: CpuBackendOpts) -> Self {
        Self { settings, opts }
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(level = "trace", skip(self, scene), fields(t = scene.elapsed()))]
    fn render_scene(&mut self, scene: &Scene, canvas: Canvas) -> ReelResult<FrameRGBA> {
        if canvas.width == 0
            || canvas.height == 0
            || canvas.width > Canvas::MAX_DIMENSION
            || canvas.height > Canvas::MAX_DIMENSION
        {
            return Err(ReelError::validation(format!(
                "render canvas must be 1..={} pixels per side, got {}x{}",
                Canvas::MAX_DIMENSION,
                canvas.width,
                canvas.height
            )));
        }
        let width = canvas.width as usize;
        let height = canvas.height as usize;

        let tris = setup_triangles(scene, canvas);
        let shade_ctx = ShadeCtx::new(
            &scene.image().texture,
            &scene.lights,
            scene.camera.position,
            scene.mesh.material,
        );
        let background = self.settings.background;

        let mut data = vec![0u8; width * height * 4];
        let mut depth = vec![f32::INFINITY; width * height];
        let band_rows = self.opts.band_rows.max(1) as usize;

        let render_band = |(band, (px, zbuf)): (usize, (&mut [u8], &mut [f32]))| {
            let y0 = band * band_rows;
            let rows = zbuf.len() / width;
            fill_background(px, y0, canvas, background);
            for tri in &tris {
                if tri.max_y as usize <= y0 || tri.min_y as usize >= y0 + rows {
                    continue;
                }
                raster_rows(tri, px, zbuf, y0, rows, width, &shade_ctx);
            }
        };

        if self.opts.parallel {
            data.par_chunks_mut(width * 4 * band_rows)
                .zip(depth.par_chunks_mut(width * band_rows))
                .enumerate()
                .for_each(render_band);
        } else {
            data.chunks_mut(width * 4 * band_rows)
                .zip(depth.chunks_mut(width * band_rows))
                .enumerate()
                .for_each(render_band);
        }

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct ScreenVertex {
    /// x, y in pixels; z is NDC depth in `[0, 1]`.
    pos: Vec3,
    inv_w: f32,
    uv: Vec2,
    world: Vec3,
    normal: Vec3,
}

#[derive(Clone, Debug)]
struct RasterTri {
    v: [ScreenVertex; 3],
    area: f32,
    front: bool,
    min_x: u32,
    max_x: u32,
    min_y: u32,
    max_y: u32,
}

fn setup_triangles(scene: &Scene, canvas: Canvas) -> Vec<RasterTri> {
    let geometry = &scene.mesh.geometry;
    let model = scene.mesh.transform.model_matrix();
    let normal_mat = glam::Mat3::from_mat4(model).inverse().transpose();
    let view_proj: Mat4 =
        scene.camera.projection_matrix(canvas.aspect()) * scene.camera.view_matrix();
    let w = canvas.width as f32;
    let h = canvas.height as f32;

    let verts: Vec<Option<ScreenVertex>> = geometry
        .positions
        .iter()
        .zip(&geometry.normals)
        .zip(&geometry.uvs)
        .map(|((&p, &n), &uv)| {
            let world = model.transform_point3(p);
            let clip = view_proj * world.extend(1.0);
            if clip.w <= MIN_CLIP_W {
                return None;
            }
            let ndc = clip.truncate() / clip.w;
            Some(ScreenVertex {
                pos: Vec3::new((ndc.x * 0.5 + 0.5) * w, (0.5 - ndc.y * 0.5) * h, ndc.z),
                inv_w: 1.0 / clip.w,
                uv,
                world,
                normal: (normal_mat * n).normalize_or_zero(),
            })
        })
        .collect();

    let double_sided = scene.mesh.material.double_sided;
    let mut out = Vec::with_capacity(geometry.indices.len());
    for &[a, b, c] in &geometry.indices {
        let (Some(va), Some(vb), Some(vc)) =
            (verts[a as usize], verts[b as usize], verts[c as usize])
        else {
            continue;
        };
        let area = edge(va.pos, vb.pos, vc.pos.truncate());
        if area.abs() < 1e-9 {
            continue;
        }
        // Screen y points down, so counter-clockwise faces have negative area.
        let front = area < 0.0;
        if !front && !double_sided {
            continue;
        }

        let xs = [va.pos.x, vb.pos.x, vc.pos.x];
        let ys = [va.pos.y, vb.pos.y, vc.pos.y];
        let min_x = xs.iter().copied().fold(f32::INFINITY, f32::min).floor().max(0.0);
        let max_x = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max).ceil().min(w);
        let min_y = ys.iter().copied().fold(f32::INFINITY, f32::min).floor().max(0.0);
        let max_y = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max).ceil().min(h);
        if min_x >= max_x || min_y >= max_y {
            continue;
        }

        out.push(RasterTri {
            v: [va, vb, vc],
            area,
            front,
            min_x: min_x as u32,
            max_x: max_x as u32,
            min_y: min_y as u32,
            max_y: max_y as u32,
        });
    }
    out
}

fn edge(a: Vec3, b: Vec3, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

fn raster_rows(
    tri: &RasterTri,
    px: &mut [u8],
    zbuf: &mut [f32],
    y0: usize,
    rows: usize,
    width: usize,
    ctx: &ShadeCtx<'_>,
) {
    let [a, b, c] = &tri.v;
    let inv_area = 1.0 / tri.area;
    let y_start = (tri.min_y as usize).max(y0);
    let y_end = (tri.max_y as usize).min(y0 + rows);

    for y in y_start..y_end {
        let py = y as f32 + 0.5;
        let row = (y - y0) * width;
        for x in tri.min_x as usize..tri.max_x as usize {
            let p = Vec2::new(x as f32 + 0.5, py);
            let b0 = edge(b.pos, c.pos, p) * inv_area;
            let b1 = edge(c.pos, a.pos, p) * inv_area;
            let b2 = edge(a.pos, b.pos, p) * inv_area;
            if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
                continue;
            }

            let z = b0 * a.pos.z + b1 * b.pos.z + b2 * c.pos.z;
            let di = row + x;
            if !(0.0..=1.0).contains(&z) || z >= zbuf[di] {
                continue;
            }

            let (w0, w1, w2) = (b0 * a.inv_w, b1 * b.inv_w, b2 * c.inv_w);
            let sum = w0 + w1 + w2;
            if sum <= 0.0 {
                continue;
            }
            let (w0, w1, w2) = (w0 / sum, w1 / sum, w2 / sum);

            let uv = a.uv * w0 + b.uv * w1 + c.uv * w2;
            let world = a.world * w0 + b.world * w1 + c.world * w2;
            let normal = a.normal * w0 + b.normal * w1 + c.normal * w2;
            let color = ctx.shade(uv, world, normal, tri.front);

            zbuf[di] = z;
            let o = di * 4;
            px[o] = unit_to_u8(color.x);
            px[o + 1] = unit_to_u8(color.y);
            px[o + 2] = unit_to_u8(color.z);
            px[o + 3] = 255;
        }
    }
}

struct ShadeCtx<'a> {
    texture: &'a Texture,
    lights: &'a LightingRig,
    ambient: Vec3,
    eye: Vec3,
    metalness: f32,
    shininess: f32,
    spec_norm: f32,
}

impl<'a> ShadeCtx<'a> {
    fn new(texture: &'a Texture, lights: &'a LightingRig, eye: Vec3, material: Material) -> Self {
        let alpha = (material.roughness * material.roughness).max(1e-3);
        let shininess = (2.0 / (alpha * alpha) - 2.0).max(1.0);
        Self {
            texture,
            lights,
            ambient: lights.ambient(),
            eye,
            metalness: material.metalness.clamp(0.0, 1.0),
            shininess,
            spec_norm: (shininess + 2.0) / 8.0,
        }
    }

    fn shade(&self, uv: Vec2, world: Vec3, normal: Vec3, front: bool) -> Vec3 {
        let texel = self.texture.sample(uv.x, uv.y);
        let albedo = if texel.w > 0.0 {
            texel.truncate() / texel.w
        } else {
            Vec3::ZERO
        };

        let mut n = normal.try_normalize().unwrap_or(Vec3::Z);
        if !front {
            n = -n;
        }
        let v = (self.eye - world).try_normalize().unwrap_or(Vec3::Z);

        let diffuse = albedo * (1.0 - self.metalness);
        let f0 = Vec3::splat(DIELECTRIC_F0).lerp(albedo, self.metalness);

        let mut out = diffuse * self.ambient;
        for light in &self.lights.lights {
            let Some((l, radiance)) = light.incident(world) else {
                continue;
            };
            let ndl = n.dot(l);
            if ndl <= 0.0 {
                continue;
            }
            let h = (l + v).normalize_or_zero();
            let ndh = n.dot(h).max(0.0);
            let spec = f0 * (self.spec_norm * ndh.powf(self.shininess));
            out += (diffuse + spec) * radiance * ndl;
        }
        out.clamp(Vec3::ZERO, Vec3::ONE)
    }
}

fn fill_background(px: &mut [u8], y0: usize, canvas: Canvas, bg: Background) {
    let width = canvas.width as usize;
    let cx = canvas.width as f32 * 0.5;
    let cy = canvas.height as f32 * 0.5;
    // Gradient reaches the outer color at the farthest corner.
    let radius = (cx * cx + cy * cy).sqrt().max(f32::EPSILON);
    let inner = bg.inner.to_vec3();
    let outer = bg.outer.to_vec3();

    for (i, out) in px.chunks_exact_mut(4).enumerate() {
        let x = (i % width) as f32 + 0.5;
        let y = (y0 + i / width) as f32 + 0.5;
        let d = (Vec2::new(x - cx, y - cy).length() / radius).min(1.0);
        let c = inner.lerp(outer, d);
        out[0] = unit_to_u8(c.x);
        out[1] = unit_to_u8(c.y);
        out[2] = unit_to_u8(c.z);
        out[3] = 255;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
