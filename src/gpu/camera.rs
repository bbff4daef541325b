//! Orbit camera.
//!
//! Rotate and zoom only; the target is fixed at the origin. While the user is
//! not dragging, the camera drifts around the vertical axis on its own.

use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::TAU;

/// Radians of orbit per pixel of drag.
const ROTATE_PER_PIXEL: f32 = 0.005;
/// Distance factor per scroll line.
const ZOOM_PER_LINE: f32 = 0.95;
/// Pitch stays just short of the poles.
const PITCH_LIMIT: f32 = 1.5;

/// Camera settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Starting distance from the target.
    pub distance: f32,
    /// Closest allowed distance.
    pub min_distance: f32,
    /// Farthest allowed distance.
    pub max_distance: f32,
    /// Idle rotation speed; 1.0 is one orbit per minute.
    pub auto_rotate_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 300.0,
            distance: 25.0,
            min_distance: 5.0,
            max_distance: 50.0,
            auto_rotate_speed: 0.5,
        }
    }
}

/// Orbit camera for viewing the particle field.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    config: CameraConfig,
}

impl OrbitCamera {
    /// Camera on +Z at the configured distance, looking at the origin.
    pub fn new(config: CameraConfig) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: config.distance.clamp(config.min_distance, config.max_distance),
            target: Vec3::ZERO,
            config,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// View matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Perspective projection for the given aspect ratio (wgpu depth range).
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.config.fov_y_degrees.to_radians(),
            aspect,
            self.config.near,
            self.config.far,
        )
    }

    /// Orbit by a pointer drag in pixels.
    pub fn orbit(&mut self, drag: Vec2) {
        self.yaw -= drag.x * ROTATE_PER_PIXEL;
        self.pitch = (self.pitch + drag.y * ROTATE_PER_PIXEL).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Zoom by scroll lines; positive moves closer.
    pub fn zoom(&mut self, lines: f32) {
        if lines != 0.0 {
            self.distance = (self.distance * ZOOM_PER_LINE.powf(lines))
                .clamp(self.config.min_distance, self.config.max_distance);
        }
    }

    /// Advance idle auto-rotation by `dt` seconds.
    pub fn update(&mut self, dt: f32, idle: bool) {
        if idle {
            self.yaw -= self.auto_rotate_rate() * dt;
        }
    }

    /// Auto-rotation rate in radians per second.
    pub fn auto_rotate_rate(&self) -> f32 {
        TAU / 60.0 * self.config.auto_rotate_speed
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_positive_z() {
        let cam = OrbitCamera::default();
        assert!((cam.position() - Vec3::new(0.0, 0.0, 25.0)).length() < 1e-5);
        // Origin sits 25 units in front of the camera
        let origin_view = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert!((origin_view.z + 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut cam = OrbitCamera::default();
        cam.zoom(1000.0);
        assert_eq!(cam.distance, 5.0);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance, 50.0);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut cam = OrbitCamera::default();
        cam.orbit(Vec2::new(0.0, 10_000.0));
        assert_eq!(cam.pitch, PITCH_LIMIT);
    }

    #[test]
    fn test_auto_rotate_only_when_idle() {
        let mut cam = OrbitCamera::default();
        cam.update(1.0, false);
        assert_eq!(cam.yaw, 0.0);
        cam.update(60.0, true);
        // Speed 0.5 is half an orbit per minute
        assert!((cam.yaw + std::f32::consts::PI).abs() < 1e-4);
    }
}
