use crate::animation::preset::Preset;
use crate::foundation::core::{Mat4, Vec3};

/// Perspective camera with a look-at target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Eye position.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            fov_y_deg: 50.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

impl Camera {
    /// Re-aim at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// World-to-view matrix (right-handed, `+Y` up).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// View-to-clip matrix for a viewport of the given aspect.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), aspect, self.near, self.far)
    }
}

/// Moves the camera for presets that animate it. A no-op for the others.
#[derive(Clone, Copy, Debug)]
pub struct CameraController {
    preset: Preset,
}

impl CameraController {
    /// Controller for `preset`.
    pub fn new(preset: Preset) -> Self {
        Self { preset }
    }

    /// Update `camera` for elapsed `t`; returns whether it moved.
    pub fn update(&self, t: f64, camera: &mut Camera) -> bool {
        match self.preset {
            Preset::Parallax => {
                camera.position.x = (t * 0.5).sin() as f32;
                camera.position.y = ((t * 0.3).cos() * 0.5) as f32;
                camera.look_at(Vec3::ZERO);
                true
            }
            Preset::Rotate | Preset::Wave | Preset::Zoom => false,
        }
    }
}
