//! Viewport camera used for projection of geometry and labels.

use std::sync::{Arc, Weak};

use glam::{Mat4, Vec2, Vec3};
use parking_lot::RwLock;

use crate::primitives::PARALLEL_THRESHOLD;

/// Camera owned by the host and shared with queued text jobs.
pub type SharedCamera = Arc<RwLock<Camera>>;

/// Non-owning camera reference held by queued jobs.
pub type CameraRef = Weak<RwLock<Camera>>;

/// Perspective camera with an explicit viewport size in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Viewport size in pixels
    pub viewport: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(4.0, 3.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 60f32.to_radians(),
            near: 0.05,
            far: 500.0,
            viewport: Vec2::new(1280.0, 720.0),
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, viewport: Vec2) -> Self {
        Self {
            position,
            target,
            viewport,
            ..Default::default()
        }
    }

    /// Wraps the camera for sharing with the pipeline.
    pub fn into_shared(self) -> SharedCamera {
        Arc::new(RwLock::new(self))
    }

    pub fn aspect(&self) -> f32 {
        if self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        }
    }

    /// Unit vector the camera looks along.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Up vector for the view matrix. Falls back to another axis when the
    /// camera looks along `up`.
    pub fn view_up(&self) -> Vec3 {
        let up = self.up.normalize_or(Vec3::Y);
        if self.forward().dot(up).abs() <= PARALLEL_THRESHOLD {
            up
        } else if up.dot(Vec3::Z).abs() > PARALLEL_THRESHOLD {
            Vec3::Y
        } else {
            Vec3::Z
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), self.view_up())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect(), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Projects a world point to viewport space.
    ///
    /// `x` and `y` are normalized to `0..1` with the origin at the bottom
    /// left; `z` is the distance in front of the camera in world units and
    /// is negative for points behind it.
    pub fn world_to_viewport(&self, world: Vec3) -> Vec3 {
        let depth = -self.view_matrix().transform_point3(world).z;
        let clip = self.view_projection() * world.extend(1.0);
        let w = if clip.w.abs() < f32::EPSILON {
            f32::EPSILON.copysign(clip.w)
        } else {
            clip.w
        };
        let ndc = clip.truncate() / w;
        Vec3::new((ndc.x + 1.0) * 0.5, (ndc.y + 1.0) * 0.5, depth)
    }

    /// Converts normalized viewport coordinates to pixels with the origin at
    /// the top left.
    pub fn viewport_to_screen(&self, viewport: Vec2) -> Vec2 {
        Vec2::new(
            viewport.x * self.viewport.x,
            (1.0 - viewport.y) * self.viewport.y,
        )
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn looking_down_neg_z() -> Camera {
        Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec2::new(800.0, 600.0))
    }

    #[test]
    fn test_center_projects_to_viewport_center() {
        let camera = looking_down_neg_z();
        let v = camera.world_to_viewport(Vec3::new(0.0, 0.0, -10.0));
        assert_relative_eq!(v.x, 0.5, epsilon = 1e-5);
        assert_relative_eq!(v.y, 0.5, epsilon = 1e-5);
        assert_relative_eq!(v.z, 10.0, epsilon = 1e-4);

        let screen = camera.viewport_to_screen(v.truncate());
        assert_relative_eq!(screen.x, 400.0, epsilon = 1e-2);
        assert_relative_eq!(screen.y, 300.0, epsilon = 1e-2);
    }

    #[test]
    fn test_points_behind_have_negative_depth() {
        let camera = looking_down_neg_z();
        let v = camera.world_to_viewport(Vec3::new(0.0, 0.0, 5.0));
        assert!(v.z < 0.0);
    }

    #[test]
    fn test_vertical_flip() {
        let camera = looking_down_neg_z();
        // A point above the view axis has viewport y > 0.5 but screen y < half
        let v = camera.world_to_viewport(Vec3::new(0.0, 1.0, -5.0));
        assert!(v.y > 0.5);
        let screen = camera.viewport_to_screen(v.truncate());
        assert!(screen.y < 300.0);
    }

    #[test]
    fn test_top_down_camera_is_finite() {
        let camera = Camera::new(
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::ZERO,
            Vec2::new(800.0, 600.0),
        );
        assert_eq!(camera.view_up(), Vec3::Z);
        assert!(camera.view_projection().is_finite());

        let v = camera.world_to_viewport(Vec3::ZERO);
        assert_relative_eq!(v.x, 0.5, epsilon = 1e-5);
        assert_relative_eq!(v.y, 0.5, epsilon = 1e-5);
        assert_relative_eq!(v.z, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_shared_camera_weak_reference() {
        let shared = Camera::default().into_shared();
        let weak: CameraRef = Arc::downgrade(&shared);
        assert!(weak.upgrade().is_some());
        drop(shared);
        assert!(weak.upgrade().is_none());
    }
}
