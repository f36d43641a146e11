//! Orbit camera controller for the demo viewport.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use dd_core::Camera;

const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 200.0;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Yaw/pitch/distance around a target point, Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::new(0.0, 0.5, 0.0),
            distance: 9.0,
            yaw: 0.6,
            pitch: 0.45,
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Multiplies the distance by `factor`.
    pub fn zoom(&mut self, factor: f32) {
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Writes position and target into `camera`.
    pub fn apply(&self, camera: &mut Camera) {
        camera.position = self.eye();
        camera.target = self.target;
        camera.up = Vec3::Y;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_eye_distance() {
        let orbit = OrbitCamera::default();
        assert_relative_eq!(orbit.eye().distance(orbit.target), orbit.distance, epsilon = 1e-4);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut orbit = OrbitCamera::default();
        orbit.orbit(0.0, 10.0);
        assert_relative_eq!(orbit.pitch, PITCH_LIMIT);
        orbit.orbit(0.0, -20.0);
        assert_relative_eq!(orbit.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut orbit = OrbitCamera::default();
        orbit.zoom(0.0);
        assert_relative_eq!(orbit.distance, MIN_DISTANCE);
        orbit.zoom(1e6);
        assert_relative_eq!(orbit.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_apply_looks_at_target() {
        let orbit = OrbitCamera::default();
        let mut camera = Camera::default();
        orbit.apply(&mut camera);
        assert_eq!(camera.target, orbit.target);
        assert!(camera.forward().dot(orbit.target - orbit.eye()) > 0.0);
    }
}
