use std::f32::consts::{PI, TAU};

use crate::foundation::core::Vec3;
use crate::scene::camera::Camera;

const POLAR_EPS: f32 = 1e-6;

/// Drag-to-rotate camera control around a fixed target. Zoom and pan are disabled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitControls {
    /// Orbit centre.
    pub target: Vec3,
    /// Multiplier on drag distance.
    pub rotate_speed: f32,
    pending_theta: f32,
    pending_phi: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            rotate_speed: 1.0,
            pending_theta: 0.0,
            pending_phi: 0.0,
        }
    }
}

impl OrbitControls {
    /// Queue a pointer drag of `(dx, dy)` pixels on a viewport `viewport_height` pixels tall.
    ///
    /// A drag across the full viewport height is one full turn.
    pub fn drag(&mut self, dx: f32, dy: f32, viewport_height: u32) {
        let h = viewport_height.max(1) as f32;
        self.pending_theta -= TAU * dx / h * self.rotate_speed;
        self.pending_phi -= TAU * dy / h * self.rotate_speed;
    }

    /// `true` if a drag is waiting to be applied.
    pub fn has_pending(&self) -> bool {
        self.pending_theta != 0.0 || self.pending_phi != 0.0
    }

    /// Apply queued rotation to `camera`, keeping its distance to the target.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        if !self.has_pending() {
            return false;
        }
        let offset = camera.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
            return false;
        }

        let theta = offset.x.atan2(offset.z) + self.pending_theta;
        let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() + self.pending_phi)
            .clamp(POLAR_EPS, PI - POLAR_EPS);

        let sin_phi = phi.sin();
        camera.position = self.target
            + Vec3::new(
                radius * sin_phi * theta.sin(),
                radius * phi.cos(),
                radius * sin_phi * theta.cos(),
            );
        camera.look_at(self.target);

        self.pending_theta = 0.0;
        self.pending_phi = 0.0;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/orbit.rs"]
mod tests;
