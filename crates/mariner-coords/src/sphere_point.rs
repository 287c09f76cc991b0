//! Angular points on the unit sphere and on spheres of arbitrary radius.

use glam::{Vec2, Vec3};

use crate::conversion::{
    azimuth_from_cartesian, from_latitude_and_longitude, polar_from_cartesian, to_cartesian,
    to_uv,
};

/// A direction from the globe center, with an implicit radius of 1.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UnitSpherePoint {
    /// Radians in `[0, 2π)`, 0 on `+X`.
    pub azimuthal: f32,
    /// Radians in `[-π/2, π/2]`, positive toward `+Z`.
    pub polar: f32,
}

/// A point in spherical coordinates with an explicit radius.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RadialSpherePoint {
    pub azimuthal: f32,
    pub polar: f32,
    /// Distance from the origin, `>= 0`.
    pub radial: f32,
}

impl UnitSpherePoint {
    #[must_use]
    pub const fn new(azimuthal: f32, polar: f32) -> Self {
        Self { azimuthal, polar }
    }

    /// Direction of a cartesian vector. The vector's length is discarded.
    #[must_use]
    pub fn from_cartesian(cartesian: Vec3) -> Self {
        Self {
            azimuthal: azimuth_from_cartesian(cartesian),
            polar: polar_from_cartesian(cartesian),
        }
    }

    /// Point for a latitude/longitude pair in degrees.
    #[must_use]
    pub fn from_latitude_and_longitude(latitude_deg: f32, longitude_deg: f32) -> Self {
        let (azimuthal, polar) = from_latitude_and_longitude(latitude_deg, longitude_deg);
        Self { azimuthal, polar }
    }

    /// The same direction at radius 1.
    #[must_use]
    pub fn to_radial(self) -> RadialSpherePoint {
        self.with_radius(1.0)
    }

    #[must_use]
    pub fn with_radius(self, radial: f32) -> RadialSpherePoint {
        RadialSpherePoint {
            azimuthal: self.azimuthal,
            polar: self.polar,
            radial,
        }
    }

    /// Unit-length cartesian direction.
    #[must_use]
    pub fn to_cartesian(self) -> Vec3 {
        to_cartesian(self.azimuthal, self.polar, 1.0)
    }

    /// Equirectangular texture coordinates for sampling globe maps.
    #[must_use]
    pub fn to_uv(self) -> Vec2 {
        to_uv(self.azimuthal, self.polar)
    }

    /// Great-circle angle to `other` in radians.
    #[must_use]
    pub fn angular_distance(self, other: UnitSpherePoint) -> f32 {
        self.to_cartesian()
            .dot(other.to_cartesian())
            .clamp(-1.0, 1.0)
            .acos()
    }
}

impl RadialSpherePoint {
    #[must_use]
    pub const fn new(azimuthal: f32, polar: f32, radial: f32) -> Self {
        Self {
            azimuthal,
            polar,
            radial,
        }
    }

    /// Spherical coordinates of a cartesian vector. The zero vector maps to all zeros.
    #[must_use]
    pub fn from_cartesian(cartesian: Vec3) -> Self {
        Self {
            azimuthal: azimuth_from_cartesian(cartesian),
            polar: polar_from_cartesian(cartesian),
            radial: cartesian.length(),
        }
    }

    /// Drop the radius.
    #[must_use]
    pub fn to_unit(self) -> UnitSpherePoint {
        UnitSpherePoint {
            azimuthal: self.azimuthal,
            polar: self.polar,
        }
    }

    #[must_use]
    pub fn to_cartesian(self) -> Vec3 {
        to_cartesian(self.azimuthal, self.polar, self.radial)
    }

    #[must_use]
    pub fn to_uv(self) -> Vec2 {
        to_uv(self.azimuthal, self.polar)
    }
}

impl From<UnitSpherePoint> for RadialSpherePoint {
    fn from(point: UnitSpherePoint) -> Self {
        point.to_radial()
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    use super::*;

    const EPSILON: f32 = 1e-4;

    /// Deterministic spread of unit vectors away from the poles.
    fn sample_directions() -> Vec<Vec3> {
        let mut out = Vec::new();
        for i in 0..24 {
            for j in 1..12 {
                let az = i as f32 / 24.0 * TAU;
                let polar = -FRAC_PI_2 + j as f32 / 12.0 * PI;
                let v = Vec3::new(
                    polar.cos() * az.cos() + 0.01 * j as f32,
                    polar.cos() * az.sin() - 0.02,
                    polar.sin(),
                );
                out.push(v.normalize());
            }
        }
        out
    }

    #[test]
    fn test_cartesian_round_trip_unit() {
        for v in sample_directions() {
            let back = UnitSpherePoint::from_cartesian(v).to_cartesian();
            assert!((back - v).abs().max_element() < EPSILON, "{v:?} came back as {back:?}");
        }
    }

    #[test]
    fn test_cartesian_round_trip_radial() {
        for v in sample_directions() {
            let scaled = v * 19.0;
            let point = RadialSpherePoint::from_cartesian(scaled);
            assert!((point.radial - 19.0).abs() < EPSILON);
            let back = point.to_cartesian();
            assert!((back - scaled).length() < 19.0 * EPSILON, "{scaled:?} -> {back:?}");
        }
    }

    #[test]
    fn test_from_cartesian_keeps_convention_ranges() {
        for v in sample_directions() {
            let p = UnitSpherePoint::from_cartesian(v);
            assert!((0.0..TAU).contains(&p.azimuthal), "azimuth {}", p.azimuthal);
            assert!((-FRAC_PI_2..=FRAC_PI_2).contains(&p.polar), "polar {}", p.polar);
        }
    }

    #[test]
    fn test_zero_radius_is_all_zero() {
        let p = RadialSpherePoint::from_cartesian(Vec3::ZERO);
        assert_eq!(p, RadialSpherePoint::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_unit_radial_conversions() {
        let unit = UnitSpherePoint::new(1.0, -0.5);
        let radial = unit.to_radial();
        assert_eq!(radial.radial, 1.0);
        assert_eq!(radial.to_unit(), unit);
        assert_eq!(RadialSpherePoint::from(unit), radial);
        assert_eq!(unit.with_radius(0.95).to_uv(), unit.to_uv());
    }

    #[test]
    fn test_greenwich_faces_negative_x() {
        let p = UnitSpherePoint::from_latitude_and_longitude(0.0, 0.0);
        assert_eq!(p.azimuthal, PI);
        assert_eq!(p.polar, 0.0);
        assert!((p.to_cartesian() - Vec3::NEG_X).length() < 1e-6);
    }

    #[test]
    fn test_angular_distance() {
        let a = UnitSpherePoint::new(0.0, 0.0);
        let b = UnitSpherePoint::new(FRAC_PI_2, 0.0);
        assert!((a.angular_distance(b) - FRAC_PI_2).abs() < 1e-5);
        assert_eq!(a.angular_distance(a), 0.0);
        let north = UnitSpherePoint::new(0.0, FRAC_PI_2);
        let south = UnitSpherePoint::new(2.0, -FRAC_PI_2);
        assert!((north.angular_distance(south) - PI).abs() < 1e-3);
    }
}
