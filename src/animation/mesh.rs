use crate::foundation::core::{Mat4, Quat, Vec2, Vec3};

/// Side length of the square the plane is fitted into.
pub const BOUNDING_BOX: f32 = 4.0;

/// Grid subdivisions along each axis. Wave displacement needs the density; the other presets
/// share the same geometry.
pub const GRID_SEGMENTS: u32 = 32;

/// Plane `(width, height)` preserving `aspect` (width / height) inside the bounding box.
///
/// The longer side is exactly [`BOUNDING_BOX`]. Invalid ratios fall back to a square.
pub fn plane_size(aspect: f32) -> (f32, f32) {
    let aspect = if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    };
    if aspect > 1.0 {
        (BOUNDING_BOX, BOUNDING_BOX / aspect)
    } else {
        (BOUNDING_BOX * aspect, BOUNDING_BOX)
    }
}

/// Subdivided plane in the local XY plane, centred on the origin, facing `+Z`.
#[derive(Clone, Debug)]
pub struct PlaneGeometry {
    /// Plane width in world units.
    pub width: f32,
    /// Plane height in world units.
    pub height: f32,
    /// Undisplaced vertex positions.
    pub rest_positions: Vec<Vec3>,
    /// Current vertex positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex normals, unit length.
    pub normals: Vec<Vec3>,
    /// Texture coordinates, `v = 1` along the top edge.
    pub uvs: Vec<Vec2>,
    /// Counter-clockwise triangles (seen from `+Z`).
    pub indices: Vec<[u32; 3]>,
}

impl PlaneGeometry {
    /// Build a `segments_x × segments_y` grid. Zero segments are bumped to one.
    pub fn new(width: f32, height: f32, segments_x: u32, segments_y: u32) -> Self {
        let gx = segments_x.max(1);
        let gy = segments_y.max(1);
        let gx1 = gx + 1;
        let gy1 = gy + 1;
        let seg_w = width / gx as f32;
        let seg_h = height / gy as f32;

        let mut positions = Vec::with_capacity((gx1 * gy1) as usize);
        let mut uvs = Vec::with_capacity(positions.capacity());
        for iy in 0..gy1 {
            let y = height / 2.0 - iy as f32 * seg_h;
            for ix in 0..gx1 {
                let x = ix as f32 * seg_w - width / 2.0;
                positions.push(Vec3::new(x, y, 0.0));
                uvs.push(Vec2::new(ix as f32 / gx as f32, 1.0 - iy as f32 / gy as f32));
            }
        }

        let mut indices = Vec::with_capacity((gx * gy * 2) as usize);
        for iy in 0..gy {
            for ix in 0..gx {
                let a = ix + gx1 * iy;
                let b = ix + gx1 * (iy + 1);
                let c = (ix + 1) + gx1 * (iy + 1);
                let d = (ix + 1) + gx1 * iy;
                indices.push([a, b, d]);
                indices.push([b, c, d]);
            }
        }

        Self {
            width,
            height,
            normals: vec![Vec3::Z; positions.len()],
            rest_positions: positions.clone(),
            positions,
            uvs,
            indices,
        }
    }

    /// Plane sized for an image of the given aspect, with the standard grid density.
    pub fn for_aspect(aspect: f32) -> Self {
        let (w, h) = plane_size(aspect);
        Self::new(w, h, GRID_SEGMENTS, GRID_SEGMENTS)
    }

    /// Set each vertex's `z` from its rest `(x, y)`.
    pub fn displace_z(&mut self, f: impl Fn(f32, f32) -> f32) {
        for (p, rest) in self.positions.iter_mut().zip(&self.rest_positions) {
            p.z = f(rest.x, rest.y);
        }
    }

    /// Recompute normals as the normalized sum of adjacent (area-weighted) face normals.
    pub fn compute_vertex_normals(&mut self) {
        for n in &mut self.normals {
            *n = Vec3::ZERO;
        }
        for &[a, b, c] in &self.indices {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            let pa = self.positions[a];
            let face = (self.positions[b] - pa).cross(self.positions[c] - pa);
            self.normals[a] += face;
            self.normals[b] += face;
            self.normals[c] += face;
        }
        for n in &mut self.normals {
            *n = n.try_normalize().unwrap_or(Vec3::Z);
        }
    }
}

/// Translation, Euler rotation (XYZ order, radians) and scale of the mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshTransform {
    /// Translation.
    pub position: Vec3,
    /// Euler angles applied in XYZ order.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for MeshTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl MeshTransform {
    /// Local-to-world matrix `T · R · S`.
    pub fn model_matrix(&self) -> Mat4 {
        let rot = Quat::from_euler(
            glam::EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rot, self.position)
    }
}

/// Surface parameters of the image material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// 0 = dielectric, 1 = metal.
    pub metalness: f32,
    /// 0 = mirror, 1 = fully rough.
    pub roughness: f32,
    /// Render back faces too.
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            metalness: 0.3,
            roughness: 0.4,
            double_sided: true,
        }
    }
}

/// The textured plane plus its animated state.
#[derive(Clone, Debug)]
pub struct AnimatedMesh {
    /// Geometry, mutated in place by the wave preset.
    pub geometry: PlaneGeometry,
    /// Transform, mutated by the other presets.
    pub transform: MeshTransform,
    /// Surface parameters.
    pub material: Material,
}

impl AnimatedMesh {
    /// A fresh mesh at identity for an image of the given aspect.
    pub fn new(aspect: f32) -> Self {
        Self {
            geometry: PlaneGeometry::for_aspect(aspect),
            transform: MeshTransform::default(),
            material: Material::default(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/mesh.rs"]
mod tests;
