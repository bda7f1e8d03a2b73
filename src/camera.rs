use crate::math::Mat4;
use serde::Deserialize;
use std::f32::consts::{FRAC_PI_4, FRAC_PI_6};

/// Fixed orbital camera around the board centre.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Azimuth of the eye on its orbit, radians.
    pub angle: f32,
    pub distance: f32,
    pub height: f32,
    /// Extra pitch applied after the look-at, radians.
    pub tilt: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    #[serde(skip)]
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            angle: FRAC_PI_4,
            distance: 25.0,
            height: 15.0,
            tilt: -FRAC_PI_6,
            fov_y: FRAC_PI_4,
            near: 0.1,
            far: 1000.0,
            aspect: 800.0 / 600.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewProjection {
    pub view: Mat4,
    pub projection: Mat4,
}

impl ViewProjection {
    pub fn combined(&self) -> Mat4 {
        self.projection * self.view
    }
}

impl Camera {
    pub fn eye(&self) -> [f32; 3] {
        [
            self.distance * self.angle.cos(),
            self.height,
            self.distance * self.angle.sin(),
        ]
    }

    /// Tracks the viewport aspect; degenerate sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn view_projection(&self) -> ViewProjection {
        compute_view_projection(self, self.aspect)
    }
}

pub fn compute_view_projection(camera: &Camera, aspect: f32) -> ViewProjection {
    let projection = Mat4::perspective(camera.fov_y, aspect, camera.near, camera.far);
    let view = Mat4::look_at(camera.eye(), [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]).rotate_x(camera.tilt);
    ViewProjection { view, projection }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_sits_on_the_orbit() {
        let cam = Camera::default();
        let [x, y, z] = cam.eye();
        assert!(((x * x + z * z).sqrt() - 25.0).abs() < 1e-4);
        assert_eq!(y, 15.0);
        assert!((x - z).abs() < 1e-4);
    }

    #[test]
    fn resize_updates_aspect_only() {
        let mut cam = Camera::default();
        cam.resize(1920, 1080);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-6);
        cam.resize(100, 0);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(cam.distance, 25.0);
    }

    #[test]
    fn board_centre_is_in_view() {
        let vp = Camera::default().view_projection();
        let p = vp.combined().transform_point([0.0, 0.0, 0.0]);
        assert!(p[0].abs() <= 1.0 && p[1].abs() <= 1.0);
        assert!((-1.0..=1.0).contains(&p[2]));
    }

    #[test]
    fn deterministic_for_same_parameters() {
        let cam = Camera::default();
        assert_eq!(cam.view_projection(), compute_view_projection(&cam, cam.aspect));
    }
}
