use crate::animation::clock::ElapsedClock;
use crate::animation::mesh::AnimatedMesh;
use crate::animation::preset::Preset;
use crate::intake::file::SelectedImage;
use crate::scene::camera::{Camera, CameraController};
use crate::scene::lights::LightingRig;
use crate::scene::orbit::OrbitControls;

/// Everything needed to draw one frame: lights, the animated image plane and the camera.
///
/// A scene is bound to one image and one preset. Changing either means composing a new scene,
/// which restarts the animation at `t = 0`.
#[derive(Clone, Debug)]
pub struct Scene {
    image: SelectedImage,
    preset: Preset,
    clock: ElapsedClock,
    /// The textured plane.
    pub mesh: AnimatedMesh,
    /// Active camera.
    pub camera: Camera,
    controller: CameraController,
    orbit: Option<OrbitControls>,
    /// Lights.
    pub lights: LightingRig,
}

impl Scene {
    /// Build a scene posed at `t = 0`.
    pub fn compose(image: &SelectedImage, preset: Preset) -> Self {
        let mut scene = Self {
            mesh: AnimatedMesh::new(image.aspect()),
            image: image.clone(),
            preset,
            clock: ElapsedClock::new(),
            camera: Camera::default(),
            controller: CameraController::new(preset),
            orbit: (!preset.drives_camera()).then(OrbitControls::default),
            lights: LightingRig::standard(),
        };
        scene.pose();
        tracing::debug!(image = %scene.image.id, preset = %preset, "composed scene");
        scene
    }

    /// Per-frame callback: accumulate `delta_secs` and re-pose mesh and camera.
    pub fn advance(&mut self, delta_secs: f64) -> f64 {
        self.clock.advance(delta_secs);
        self.pose();
        self.clock.secs()
    }

    fn pose(&mut self) {
        let t = self.clock.secs();
        self.preset.apply(t, &mut self.mesh);
        self.controller.update(t, &mut self.camera);
        if let Some(orbit) = self.orbit.as_mut() {
            orbit.update(&mut self.camera);
        }
    }

    /// Queue an orbit drag. Returns `false` when the preset owns the camera.
    pub fn orbit_drag(&mut self, dx: f32, dy: f32, viewport_height: u32) -> bool {
        match self.orbit.as_mut() {
            Some(orbit) => {
                orbit.drag(dx, dy, viewport_height);
                orbit.update(&mut self.camera);
                true
            }
            None => false,
        }
    }

    /// Elapsed animation time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.clock.secs()
    }

    /// The preset this scene animates with.
    pub fn preset(&self) -> Preset {
        self.preset
    }

    /// The image mapped onto the plane.
    pub fn image(&self) -> &SelectedImage {
        &self.image
    }

    /// `true` when drag-to-rotate is available.
    pub fn orbit_enabled(&self) -> bool {
        self.orbit.is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/composer.rs"]
mod tests;
