use crate::foundation::core::{Rgb8, Vec3};
use crate::foundation::math::smoothstep;

/// A light source in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    /// Uniform light from every direction.
    Ambient {
        /// Light color.
        color: Rgb8,
        /// Scalar intensity.
        intensity: f32,
    },
    /// Omnidirectional light at a point. No distance falloff.
    Point {
        /// World position.
        position: Vec3,
        /// Light color.
        color: Rgb8,
        /// Scalar intensity.
        intensity: f32,
    },
    /// Cone light aimed at a target.
    Spot {
        /// World position.
        position: Vec3,
        /// Point the cone is aimed at.
        target: Vec3,
        /// Light color.
        color: Rgb8,
        /// Scalar intensity.
        intensity: f32,
        /// Cone half-angle in radians.
        angle: f32,
        /// Fraction of the cone that fades out, `[0, 1]`.
        penumbra: f32,
    },
}

impl Light {
    /// Direction from `surface` toward the light and the radiance arriving there.
    ///
    /// Ambient lights have no direction and return `None`.
    pub fn incident(&self, surface: Vec3) -> Option<(Vec3, Vec3)> {
        match *self {
            Self::Ambient { .. } => None,
            Self::Point {
                position,
                color,
                intensity,
            } => {
                let l = (position - surface).try_normalize()?;
                Some((l, color.to_vec3() * intensity))
            }
            Self::Spot {
                position,
                target,
                color,
                intensity,
                angle,
                penumbra,
            } => {
                let l = (position - surface).try_normalize()?;
                let axis = (target - position).try_normalize()?;
                let cos_outer = angle.cos();
                let cos_inner = (angle * (1.0 - penumbra.clamp(0.0, 1.0))).cos();
                let cone = smoothstep(cos_outer, cos_inner, (-l).dot(axis));
                Some((l, color.to_vec3() * (intensity * cone)))
            }
        }
    }
}

/// The fixed set of lights every scene is lit by.
#[derive(Clone, Debug, PartialEq)]
pub struct LightingRig {
    /// Lights in evaluation order.
    pub lights: Vec<Light>,
}

impl LightingRig {
    /// Soft white ambient, a white key light, a blue fill from below-behind and a purple spot
    /// from above the camera.
    pub fn standard() -> Self {
        Self {
            lights: vec![
                Light::Ambient {
                    color: Rgb8::WHITE,
                    intensity: 0.5,
                },
                Light::Point {
                    position: Vec3::new(10.0, 10.0, 10.0),
                    color: Rgb8::WHITE,
                    intensity: 1.0,
                },
                Light::Point {
                    position: Vec3::new(-10.0, -10.0, -10.0),
                    color: Rgb8::new(0x66, 0x7e, 0xea),
                    intensity: 0.5,
                },
                Light::Spot {
                    position: Vec3::new(0.0, 5.0, 5.0),
                    target: Vec3::ZERO,
                    color: Rgb8::new(0x76, 0x4b, 0xa2),
                    intensity: 0.5,
                    angle: 0.3,
                    penumbra: 1.0,
                },
            ],
        }
    }

    /// Sum of ambient contributions.
    pub fn ambient(&self) -> Vec3 {
        self.lights
            .iter()
            .map(|l| match *l {
                Light::Ambient { color, intensity } => color.to_vec3() * intensity,
                Light::Point { .. } | Light::Spot { .. } => Vec3::ZERO,
            })
            .sum()
    }
}
