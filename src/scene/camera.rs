use crate::animation::Mode;
use crate::config::CameraConfig;
use crate::math::{Mat4, Vec3};

/// Radians of orbit per pixel of drag
const ORBIT_SENSITIVITY: f32 = 0.01;
/// Distance change per unit of wheel delta
const ZOOM_SENSITIVITY: f32 = 0.5;

/// Camera that orbits the tree on its own once formed and otherwise follows
/// user orbit/zoom within fixed limits.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view, radians
    pub fov: f32,
    config: CameraConfig,
}

impl CameraRig {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            position: config.start,
            target: Vec3::ZERO,
            fov: config.fov_degrees.to_radians(),
            config,
        }
    }

    /// Per-frame update; only the formed scene drives the camera
    pub fn update(&mut self, mode: Mode, time: f32) {
        if mode.is_formed() {
            let angle = time * self.config.orbit_speed;
            self.position.x = angle.sin() * self.config.orbit_radius;
            self.position.z = angle.cos() * self.config.orbit_radius;
            self.target = Vec3::ZERO;
        }
    }

    /// Drag-orbit around the target, polar angle clamped
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        let offset = self.position - self.target;
        let radius = offset.length().max(f32::EPSILON);
        let azimuth = offset.x.atan2(offset.z) - delta_x * ORBIT_SENSITIVITY;
        let polar = ((offset.y / radius).clamp(-1.0, 1.0).acos() - delta_y * ORBIT_SENSITIVITY)
            .clamp(self.config.min_polar, self.config.max_polar);
        self.place(radius, azimuth, polar);
    }

    /// Move toward or away from the target, distance clamped
    pub fn zoom(&mut self, delta: f32) {
        let offset = self.position - self.target;
        let radius = offset.length().max(f32::EPSILON);
        let azimuth = offset.x.atan2(offset.z);
        let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let radius = (radius + delta * ZOOM_SENSITIVITY)
            .clamp(self.config.min_distance, self.config.max_distance);
        self.place(radius, azimuth, polar);
    }

    fn place(&mut self, radius: f32, azimuth: f32, polar: f32) {
        let sin_polar = polar.sin();
        self.position = self.target
            + Vec3::new(
                radius * sin_polar * azimuth.sin(),
                radius * polar.cos(),
                radius * sin_polar * azimuth.cos(),
            );
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(&self.target)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, Vec3::UP)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective(self.fov, aspect, 0.1, 200.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> CameraRig {
        CameraRig::new(CameraConfig::default())
    }

    #[test]
    fn test_starts_at_configured_position() {
        let cam = rig();
        assert_eq!(cam.position, Vec3::new(0.0, 5.0, 35.0));
        assert!((cam.fov - 50f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_auto_orbit_only_when_formed() {
        let mut cam = rig();
        cam.update(Mode::Chaos, 12.0);
        assert_eq!(cam.position, Vec3::new(0.0, 5.0, 35.0));

        cam.update(Mode::Formed, 12.0);
        assert!((cam.position.x - (1.2f32).sin() * 30.0).abs() < 1e-4);
        assert!((cam.position.z - (1.2f32).cos() * 30.0).abs() < 1e-4);
        assert_eq!(cam.position.y, 5.0);
    }

    #[test]
    fn test_zoom_clamps_distance() {
        let mut cam = rig();
        cam.zoom(-1000.0);
        assert!((cam.distance() - 10.0).abs() < 1e-3);
        cam.zoom(1000.0);
        assert!((cam.distance() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_orbit_clamps_polar_angle() {
        let config = CameraConfig::default();
        let mut cam = rig();
        cam.orbit(0.0, 10_000.0);
        let polar = (cam.position.y / cam.distance()).acos();
        assert!((polar - config.min_polar).abs() < 1e-3);
        cam.orbit(0.0, -10_000.0);
        let polar = (cam.position.y / cam.distance()).acos();
        assert!((polar - config.max_polar).abs() < 1e-3);
    }

    #[test]
    fn test_orbit_keeps_distance() {
        let mut cam = rig();
        let before = cam.distance();
        cam.orbit(120.0, 3.0);
        assert!((cam.distance() - before).abs() < 1e-3);
    }
}
