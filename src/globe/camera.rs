use glam::{DMat3, DVec3};
use std::f64::consts::FRAC_PI_2;

use crate::globe::projection::normalize_angle;

/// Globe rotation in radians.
///
/// `heading` turns the globe about its polar axis, `tilt` about the local
/// z axis. Both are kept in (-π, π].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Orientation {
    pub heading: f64,
    pub tilt: f64,
}

impl Orientation {
    pub fn new(heading: f64, tilt: f64) -> Self {
        Self {
            heading: normalize_angle(heading),
            tilt: normalize_angle(tilt),
        }
    }

    /// Model rotation, Euler XYZ: Rx(π/2)·Ry(heading)·Rz(tilt).
    /// The fixed quarter turn about x stands the poles upright on screen.
    pub fn rotation(&self) -> DMat3 {
        DMat3::from_rotation_x(FRAC_PI_2)
            * DMat3::from_rotation_y(self.heading)
            * DMat3::from_rotation_z(self.tilt)
    }
}

/// A ray in world space. `dir` is unit length.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: DVec3,
    pub dir: DVec3,
}

impl Ray {
    /// Distance to the nearest intersection in front of the origin with a
    /// sphere, if any.
    pub fn hit_sphere(&self, center: DVec3, radius: f64) -> Option<f64> {
        let oc = self.origin - center;
        let b = oc.dot(self.dir);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let near = -b - sq;
        if near > 0.0 {
            return Some(near);
        }
        let far = -b + sq;
        (far > 0.0).then_some(far)
    }
}

/// Perspective camera on the +x axis looking at the origin with +z up.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: DVec3,
    /// Vertical field of view in radians
    pub fov_y: f64,
    forward: DVec3,
    right: DVec3,
    up: DVec3,
}

impl Camera {
    pub fn new(distance: f64, fov_y_deg: f64) -> Self {
        let eye = DVec3::new(distance, 0.0, 0.0);
        let forward = (-eye).normalize();
        let raw_up = DVec3::Z;
        let right = forward.cross(raw_up).normalize();
        let up = right.cross(forward).normalize();
        Self {
            eye,
            fov_y: fov_y_deg.to_radians(),
            forward,
            right,
            up,
        }
    }

    /// Half-extent of the image plane at unit depth, (horizontal, vertical).
    /// Braille pixels are close enough to square that width/height is the aspect.
    fn half_extent(&self, width: usize, height: usize) -> (f64, f64) {
        let half_h = (self.fov_y / 2.0).tan();
        let aspect = width.max(1) as f64 / height.max(1) as f64;
        (half_h * aspect, half_h)
    }

    /// Project a world point to braille pixel coordinates.
    /// Returns `None` for points at or behind the eye.
    pub fn project(&self, p: DVec3, width: usize, height: usize) -> Option<(f64, f64)> {
        let v = p - self.eye;
        let depth = v.dot(self.forward);
        if depth <= 1e-9 {
            return None;
        }
        let (hx, hy) = self.half_extent(width, height);
        let ndc_x = v.dot(self.right) / depth / hx;
        let ndc_y = v.dot(self.up) / depth / hy;

        let px = (ndc_x + 1.0) * 0.5 * width as f64;
        let py = (1.0 - ndc_y) * 0.5 * height as f64;
        Some((px, py))
    }

    /// Ray from the eye through a braille pixel position.
    pub fn ray(&self, px: f64, py: f64, width: usize, height: usize) -> Ray {
        let ndc_x = px / width.max(1) as f64 * 2.0 - 1.0;
        let ndc_y = 1.0 - py / height.max(1) as f64 * 2.0;
        let (hx, hy) = self.half_extent(width, height);
        let dir = (self.forward + self.right * (ndc_x * hx) + self.up * (ndc_y * hy)).normalize();
        Ray {
            origin: self.eye,
            dir,
        }
    }

    /// Whether a point on (or just above) a sphere centred at the origin
    /// faces the eye.
    #[inline(always)]
    pub fn faces(&self, p: DVec3) -> bool {
        p.dot(self.eye - p) > 0.0
    }

    /// Projected radius in pixels of a sphere of `radius` centred at the origin.
    pub fn disk_radius(&self, radius: f64, height: usize) -> f64 {
        let dist = self.eye.length();
        if dist <= radius {
            return f64::INFINITY;
        }
        let half_angle = (radius / dist).asin();
        half_angle.tan() / (self.fov_y / 2.0).tan() * height as f64 * 0.5
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(10.0, 75.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::projection::lat_lon_to_vec3;

    #[test]
    fn test_origin_projects_to_center() {
        let cam = Camera::default();
        let (x, y) = cam.project(DVec3::ZERO, 200, 100).unwrap();
        assert!((x - 100.0).abs() < 1e-9);
        assert!((y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_screen_axes() {
        let cam = Camera::default();
        // +y world is screen right, +z world is screen up
        let (x, _) = cam.project(DVec3::new(0.0, 1.0, 0.0), 100, 100).unwrap();
        assert!(x > 50.0);
        let (_, y) = cam.project(DVec3::new(0.0, 0.0, 1.0), 100, 100).unwrap();
        assert!(y < 50.0);
    }

    #[test]
    fn test_behind_eye() {
        let cam = Camera::default();
        assert!(cam.project(DVec3::new(20.0, 0.0, 0.0), 100, 100).is_none());
    }

    #[test]
    fn test_ray_roundtrip_hits_projected_point() {
        let cam = Camera::default();
        let p = DVec3::new(1.0, 2.0, -1.5);
        let (px, py) = cam.project(p, 160, 120).unwrap();
        let ray = cam.ray(px, py, 160, 120);
        let to_p = (p - ray.origin).normalize();
        assert!(ray.dir.dot(to_p) > 1.0 - 1e-9);
    }

    #[test]
    fn test_hit_sphere_nearest() {
        let ray = Ray {
            origin: DVec3::new(10.0, 0.0, 0.0),
            dir: DVec3::NEG_X,
        };
        let t = ray.hit_sphere(DVec3::ZERO, 5.0).unwrap();
        assert!((t - 5.0).abs() < 1e-9);
        assert!(ray.hit_sphere(DVec3::new(0.0, 6.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_heading_brings_longitude_to_front() {
        // A marker at lon L faces the camera once heading = -L
        for lon in [-150.0f64, -45.0, 0.0, 60.0, 170.0] {
            let o = Orientation::new(-lon.to_radians(), 0.0);
            let w = o.rotation() * lat_lon_to_vec3(0.0, lon, 5.0);
            assert!((w - DVec3::new(5.0, 0.0, 0.0)).length() < 1e-9, "lon {lon}: {w:?}");
        }
    }

    #[test]
    fn test_north_pole_is_screen_up() {
        let o = Orientation::default();
        let w = o.rotation() * lat_lon_to_vec3(90.0, 0.0, 5.0);
        assert!((w - DVec3::new(0.0, 0.0, 5.0)).length() < 1e-9);
    }

    #[test]
    fn test_faces() {
        let cam = Camera::default();
        assert!(cam.faces(DVec3::new(5.0, 0.0, 0.0)));
        assert!(!cam.faces(DVec3::new(-5.0, 0.0, 0.0)));
        // Limb at x = r²/d is the boundary
        assert!(!cam.faces(DVec3::new(0.0, 5.0, 0.0)));
    }
}
