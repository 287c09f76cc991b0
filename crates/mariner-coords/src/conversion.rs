//! Free conversion functions shared by both sphere point types.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

/// Cartesian position of the spherical triple `(azimuthal, polar, radial)`.
#[inline]
#[must_use]
pub fn to_cartesian(azimuthal: f32, polar: f32, radial: f32) -> Vec3 {
    let (sin_az, cos_az) = azimuthal.sin_cos();
    let (sin_polar, cos_polar) = polar.sin_cos();
    Vec3::new(
        radial * cos_polar * cos_az,
        radial * cos_polar * sin_az,
        radial * sin_polar,
    )
}

/// Azimuth of a cartesian vector in `[0, 2π)`; 0 when the vector lies on the Z axis.
#[inline]
#[must_use]
pub fn azimuth_from_cartesian(cartesian: Vec3) -> f32 {
    if cartesian.x == 0.0 && cartesian.y == 0.0 {
        return 0.0;
    }
    let azimuth = (-cartesian.y).atan2(-cartesian.x) + PI;
    // atan2 returns +π for a -0.0 numerator, which would land exactly on 2π.
    if azimuth >= TAU { azimuth - TAU } else { azimuth }
}

/// Polar angle of a cartesian vector in `[-π/2, π/2]`; 0 for the zero vector.
#[inline]
#[must_use]
pub fn polar_from_cartesian(cartesian: Vec3) -> f32 {
    let xy_length = cartesian.truncate().length();
    if xy_length == 0.0 && cartesian.z == 0.0 {
        return 0.0;
    }
    cartesian.z.atan2(xy_length)
}

/// Equirectangular texture coordinates: `u = az / 2π`, `v = 0.5 - polar / π`.
///
/// `v = 0` is the north pole row, `v = 1` the south pole row.
#[inline]
#[must_use]
pub fn to_uv(azimuthal: f32, polar: f32) -> Vec2 {
    Vec2::new(azimuthal / TAU, -polar / PI + 0.5)
}

/// `(azimuthal, polar)` for a latitude/longitude pair in degrees.
///
/// Longitude -180° maps to azimuth 0. Inputs are not clamped.
#[inline]
#[must_use]
pub fn from_latitude_and_longitude(latitude_deg: f32, longitude_deg: f32) -> (f32, f32) {
    let azimuthal = (longitude_deg + 180.0) / 180.0 * PI;
    let polar = latitude_deg / 180.0 * PI;
    (azimuthal, polar)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn test_azimuth_zero_on_positive_x() {
        assert_eq!(azimuth_from_cartesian(Vec3::X), 0.0);
        assert_eq!(azimuth_from_cartesian(Vec3::new(1.0, -0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_azimuth_quadrants() {
        let cases = [
            (Vec3::Y, FRAC_PI_2),
            (Vec3::NEG_X, PI),
            (Vec3::NEG_Y, 3.0 * FRAC_PI_2),
        ];
        for (v, expected) in cases {
            let az = azimuth_from_cartesian(v);
            assert!((az - expected).abs() < 1e-6, "{v:?}: got {az}, expected {expected}");
        }
    }

    #[test]
    fn test_azimuth_stays_below_tau() {
        let az = azimuth_from_cartesian(Vec3::new(1.0, -1e-7, 0.0));
        assert!((0.0..TAU).contains(&az), "azimuth {az} escaped [0, 2π)");
    }

    #[test]
    fn test_zero_vector_is_origin_angles() {
        assert_eq!(azimuth_from_cartesian(Vec3::ZERO), 0.0);
        assert_eq!(polar_from_cartesian(Vec3::ZERO), 0.0);
    }

    #[test]
    fn test_poles() {
        assert_eq!(azimuth_from_cartesian(Vec3::Z), 0.0);
        assert!((polar_from_cartesian(Vec3::Z) - FRAC_PI_2).abs() < 1e-6);
        assert!((polar_from_cartesian(Vec3::NEG_Z) + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_uv_boundaries() {
        assert_eq!(to_uv(0.0, 0.0), Vec2::new(0.0, 0.5));
        let just_under = TAU - 1e-4;
        let u = to_uv(just_under, 0.0).x;
        assert!(u < 1.0 && u > 0.9999, "u for azimuth just under 2π was {u}");
        assert_eq!(to_uv(0.0, FRAC_PI_2).y, 0.0);
        assert_eq!(to_uv(0.0, -FRAC_PI_2).y, 1.0);
    }

    #[test]
    fn test_lat_lon_origin() {
        let (az, polar) = from_latitude_and_longitude(0.0, 0.0);
        assert_eq!(az, PI);
        assert_eq!(polar, 0.0);
    }

    #[test]
    fn test_lat_lon_not_clamped() {
        let (az, polar) = from_latitude_and_longitude(180.0, 360.0);
        assert!((az - 3.0 * PI).abs() < 1e-5);
        assert!((polar - PI).abs() < 1e-6);
    }

    #[test]
    fn test_to_cartesian_axes() {
        let x = to_cartesian(0.0, 0.0, 2.0);
        assert!((x - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
        let z = to_cartesian(1.3, FRAC_PI_2, 1.0);
        assert!((z - Vec3::Z).length() < 1e-6);
    }
}
