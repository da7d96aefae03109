//! Third-person chase camera that trails the tank.

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye offset behind and above the target, in target space.
    pub offset: [f32; 3],
    /// Look-at point ahead of the target, in target space.
    pub look_offset: [f32; 3],
    /// Fraction of the remaining distance covered each frame.
    pub damping: f32,
    pub min_height: f32,
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            offset: [0.0, 5.0, 10.0],
            look_offset: [0.0, 0.0, -5.0],
            damping: 0.1,
            min_height: 3.0,
            fov_degrees: 75.0,
        }
    }
}

pub struct ChaseCamera {
    config: CameraConfig,
    eye: Point3<f32>,
    target: Point3<f32>,
}

impl ChaseCamera {
    pub fn new(config: CameraConfig) -> Self {
        ChaseCamera {
            config,
            eye: Point3::new(10.0, 10.0, 10.0),
            target: Point3::origin(),
        }
    }

    pub fn eye(&self) -> Point3<f32> {
        self.eye
    }

    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    pub fn fov(&self) -> f32 {
        self.config.fov_degrees.to_radians()
    }

    /// Eases toward the spot behind a target at `position` facing `yaw`.
    pub fn follow(&mut self, position: &Vector3<f32>, yaw: f32) {
        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), yaw);
        let anchor = Point3::from(*position);

        let mut desired = anchor + rotation * Vector3::from(self.config.offset);
        desired.y = desired.y.max(self.config.min_height);

        self.eye = self.eye + (desired - self.eye) * self.config.damping;
        self.target = anchor + rotation * Vector3::from(self.config.look_offset);
    }

    /// Jumps straight to the resting position for a target.
    pub fn snap(&mut self, position: &Vector3<f32>, yaw: f32) {
        let damping = self.config.damping;
        self.config.damping = 1.0;
        self.follow(position, yaw);
        self.config.damping = damping;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.eye, &self.target, &Vector3::y())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn snap_places_eye_behind_and_above() {
        let mut camera = ChaseCamera::new(CameraConfig::default());
        camera.snap(&Vector3::new(0.0, 0.5, 0.0), 0.0);
        assert_relative_eq!(camera.eye(), Point3::new(0.0, 5.5, 10.0), epsilon = 1e-6);
        assert_relative_eq!(camera.target(), Point3::new(0.0, 0.5, -5.0), epsilon = 1e-6);
    }

    #[test]
    fn offset_rotates_with_yaw() {
        let mut camera = ChaseCamera::new(CameraConfig::default());
        camera.snap(&Vector3::zeros(), FRAC_PI_2);
        assert_relative_eq!(camera.eye(), Point3::new(10.0, 5.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn follow_moves_a_tenth_of_the_way() {
        let mut camera = ChaseCamera::new(CameraConfig::default());
        camera.snap(&Vector3::zeros(), 0.0);
        camera.follow(&Vector3::new(10.0, 0.0, 0.0), 0.0);
        assert_relative_eq!(camera.eye().x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn eye_never_sinks_below_min_height() {
        let config = CameraConfig {
            offset: [0.0, -8.0, 10.0],
            ..CameraConfig::default()
        };
        let mut camera = ChaseCamera::new(config);
        camera.snap(&Vector3::zeros(), 0.0);
        assert_relative_eq!(camera.eye().y, 3.0);
    }
}
