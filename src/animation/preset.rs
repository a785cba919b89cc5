use std::fmt;
use std::str::FromStr;

use crate::animation::mesh::AnimatedMesh;
use crate::foundation::core::Vec3;
use crate::foundation::error::{ReelError, ReelResult};

/// One of the fixed per-frame motion recipes.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Gentle yaw/pitch sway with a depth bob.
    #[default]
    Rotate,
    /// Ripple the plane surface.
    Wave,
    /// Breathe the scale with a slight roll.
    Zoom,
    /// Drift the plane and move the camera against it.
    Parallax,
}

impl Preset {
    /// Every preset, in menu order.
    pub const ALL: [Preset; 4] = [Self::Rotate, Self::Wave, Self::Zoom, Self::Parallax];

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rotate => "rotate",
            Self::Wave => "wave",
            Self::Zoom => "zoom",
            Self::Parallax => "parallax",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Rotate => "3D Rotate",
            Self::Wave => "Wave Motion",
            Self::Zoom => "Zoom In/Out",
            Self::Parallax => "Parallax Depth",
        }
    }

    /// `true` when the preset moves the camera itself, which rules out orbit interaction.
    pub fn drives_camera(self) -> bool {
        matches!(self, Self::Parallax)
    }

    /// Mutate `mesh` for elapsed time `t` seconds.
    pub fn apply(self, t: f64, mesh: &mut AnimatedMesh) {
        match self {
            Self::Rotate => {
                let tr = &mut mesh.transform;
                tr.rotation.y = ((t * 0.5).sin() * 0.5) as f32;
                tr.rotation.x = ((t * 0.3).cos() * 0.2) as f32;
                tr.position.z = ((t * 0.4).sin() * 0.3) as f32;
            }
            Self::Wave => {
                mesh.geometry.displace_z(|x, y| wave_height(f64::from(x), f64::from(y), t));
                mesh.geometry.compute_vertex_normals();
            }
            Self::Zoom => {
                let s = zoom_scale(t);
                mesh.transform.scale = Vec3::new(s, s, 1.0);
                mesh.transform.rotation.z = ((t * 0.5).sin() * 0.1) as f32;
            }
            Self::Parallax => {
                let tr = &mut mesh.transform;
                tr.position.x = ((t * 0.8).sin() * 0.5) as f32;
                tr.position.y = ((t * 0.6).cos() * 0.3) as f32;
                tr.rotation.y = ((t * 0.4).sin() * 0.3) as f32;
                tr.position.z = ((t * 0.5).cos() * 0.5) as f32;
            }
        }
    }
}

/// Surface height of the wave preset at local `(x, y)`.
pub fn wave_height(x: f64, y: f64, t: f64) -> f32 {
    ((x * 2.0 + t * 2.0).sin() * 0.1 + (y * 2.0 + t * 1.5).cos() * 0.1) as f32
}

/// Uniform in-plane scale of the zoom preset.
pub fn zoom_scale(t: f64) -> f32 {
    (1.0 + (t * 1.5).sin() * 0.3) as f32
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = ReelError;

    fn from_str(s: &str) -> ReelResult<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ReelError::validation(format!(
                    "unknown preset '{s}' (expected rotate, wave, zoom or parallax)"
                ))
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/preset.rs"]
mod tests;
