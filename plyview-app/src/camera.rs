//! Orbit camera and perspective projection.

use glam::{Mat4, Quat, Vec2, Vec3};

/// Distance of the default framing along +Z.
pub const DEFAULT_DISTANCE: f32 = 5.0;

const MIN_DISTANCE: f32 = 0.1;
const MAX_DISTANCE: f32 = 1000.0;

/// Orbit camera: a focus point plus a spherical offset (yaw/pitch/distance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl Camera {
    /// Default framing: at `(0, 0, 5)` looking at the origin. Every
    /// successful model load resets to this pose.
    pub fn default_framing() -> Self {
        Self {
            center: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            distance: DEFAULT_DISTANCE,
        }
    }

    fn forward(&self) -> Vec3 {
        Quat::from_euler(glam::EulerRot::YXZ, self.yaw, self.pitch, 0.0) * -Vec3::Z
    }

    /// Camera position in world space.
    pub fn position(&self) -> Vec3 {
        self.center - self.forward() * self.distance
    }

    /// Orbit around the center point.
    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw -= delta.x;
        self.pitch = (self.pitch - delta.y).clamp(
            -std::f32::consts::FRAC_PI_2 + 0.01,
            std::f32::consts::FRAC_PI_2 - 0.01,
        );
    }

    /// Pan the center (and with it the camera) in the view plane.
    pub fn pan(&mut self, delta: Vec2) {
        let right = Quat::from_euler(glam::EulerRot::YXZ, self.yaw, 0.0, 0.0) * Vec3::X;
        let up = Vec3::Y;
        self.center += (-delta.x * self.distance) * right + (delta.y * self.distance) * up;
    }

    /// Move toward (positive) or away from (negative) the center.
    pub fn zoom(&mut self, amount: f32) {
        self.distance = (self.distance - amount).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.center, Vec3::Y)
    }
}

/// Perspective projection configuration.
pub struct Projection {
    width: u32,
    height: u32,
    fov: f32,
    near: f32,
    far: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            fov: 75.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Update the projection to the container's current dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect(), self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_framing_sits_on_positive_z() {
        let camera = Camera::default_framing();
        assert!((camera.position() - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn test_view_matrix_puts_center_ahead_of_the_camera() {
        let camera = Camera::default_framing();
        let center_in_view = camera.view_matrix().transform_point3(camera.center);
        assert!((center_in_view - Vec3::new(0.0, 0.0, -DEFAULT_DISTANCE)).length() < 1e-4);
    }

    #[test]
    fn test_orbit_keeps_distance_to_center() {
        let mut camera = Camera::default_framing();
        camera.orbit(Vec2::new(1.2, 0.4));
        let distance = (camera.position() - camera.center).length();
        assert!((distance - DEFAULT_DISTANCE).abs() < 1e-4);
    }

    #[test]
    fn test_pitch_is_clamped_short_of_the_poles() {
        let mut camera = Camera::default_framing();
        camera.orbit(Vec2::new(0.0, -100.0));
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        camera.orbit(Vec2::new(0.0, 200.0));
        assert!(camera.pitch > -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::default_framing();
        camera.zoom(1e6);
        assert_eq!(camera.distance, MIN_DISTANCE);
        camera.zoom(-1e6);
        assert_eq!(camera.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_resize_updates_aspect_ratio() {
        let mut projection = Projection::new(800, 600);
        assert!((projection.aspect() - 800.0 / 600.0).abs() < 1e-6);

        projection.resize(1600, 600);
        assert!((projection.aspect() - 1600.0 / 600.0).abs() < 1e-6);

        // Doubling the width halves the horizontal scale, so content is not
        // distorted at the moment of resize.
        let narrow = Projection::new(800, 600).matrix();
        let wide = projection.matrix();
        assert!((wide.col(0).x - narrow.col(0).x / 2.0).abs() < 1e-6);
        assert!((wide.col(1).y - narrow.col(1).y).abs() < 1e-6);
    }
}
