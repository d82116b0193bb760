use glam::DVec3;
use std::f64::consts::{PI, TAU};

/// Place a geographic point on a sphere of the given radius.
///
/// The north pole maps to +y. Longitude 0 sits on the -x half of the
/// equator plane, so that a globe heading of `-lon` turns it towards the camera.
#[inline(always)]
pub fn lat_lon_to_vec3(lat: f64, lon: f64, radius: f64) -> DVec3 {
    let colat = (90.0 - lat) * (PI / 180.0);
    let azimuth = (lon + 180.0) * (PI / 180.0);

    let (sin_colat, cos_colat) = colat.sin_cos();
    let (sin_az, cos_az) = azimuth.sin_cos();

    DVec3::new(
        -radius * sin_colat * cos_az,
        radius * cos_colat,
        radius * sin_colat * sin_az,
    )
}

/// Wrap an angle (radians) into (-π, π].
///
/// Non-finite input is returned as is.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    // Bring huge inputs close first so the stepping below stays bounded
    let mut a = if angle.abs() > 4.0 * TAU {
        angle.rem_euclid(TAU)
    } else {
        angle
    };
    while a > PI {
        a -= TAU;
    }
    while a <= -PI {
        a += TAU;
    }
    a
}

/// Signed rotation taking `from` to `to` the short way round.
/// Magnitude never exceeds π.
#[inline]
pub fn shortest_delta(from: f64, to: f64) -> f64 {
    let mut delta = to - from;
    if delta > PI {
        delta -= TAU;
    } else if delta < -PI {
        delta += TAU;
    }
    delta
}

/// Cubic ease-in/ease-out over [0, 1]; input is clamped.
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
