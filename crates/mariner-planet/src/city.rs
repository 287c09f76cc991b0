//! Cities placed on the globe surface.

use glam::{Quat, Vec3};
use mariner_config::CityConfig;
use mariner_coords::{RadialSpherePoint, UnitSpherePoint};
use mariner_math::from_look_at;

use crate::land::LandQueryService;

/// A city standing on the globe surface.
#[derive(Clone, Debug, PartialEq)]
pub struct City {
    pub id: usize,
    pub name: String,
    pub country: String,
    /// Direction from the globe center.
    pub location: UnitSpherePoint,
    /// `location` at the surface height sampled from the topology map.
    pub position: RadialSpherePoint,
    /// Forward runs west along the local parallel, up points away from the center.
    pub rotation: Quat,
    pub discovered: bool,
}

impl City {
    /// Place `config` on the surface described by `land`.
    pub fn place(id: usize, config: &CityConfig, land: &LandQueryService) -> Self {
        let location =
            UnitSpherePoint::from_latitude_and_longitude(config.latitude, config.longitude);
        let height = land.get_height_at_point(location);
        let unit = location.to_cartesian();
        Self {
            id,
            name: config.name.clone(),
            country: config.country.clone(),
            location,
            position: location.with_radius(height),
            rotation: from_look_at(unit.cross(Vec3::Z), unit),
            discovered: false,
        }
    }

    pub fn cartesian_position(&self) -> Vec3 {
        self.position.to_cartesian()
    }

    /// Whether the city lies within `radius` radians of `point`.
    pub fn is_within(&self, point: UnitSpherePoint, radius: f32) -> bool {
        self.location.angular_distance(point) <= radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mariner_render::ScalarImage;

    fn flat_land(topology_byte: u8) -> LandQueryService {
        LandQueryService::new(
            ScalarImage::new(2, 2, vec![255; 4]).unwrap(),
            ScalarImage::new(2, 2, vec![topology_byte; 4]).unwrap(),
            0.5,
            0.95,
            true,
        )
    }

    #[test]
    fn test_city_sits_on_surface() {
        let config = CityConfig::new("Lisbon", "Portugal", 38.685108, -9.238115);
        let city = City::place(0, &config, &flat_land(0));
        assert_eq!(city.position.radial, 0.95);
        assert!(!city.discovered);
        assert!((city.cartesian_position().length() - 0.95).abs() < 1e-5);
    }

    #[test]
    fn test_city_up_points_away_from_center() {
        let config = CityConfig::new("Bogota", "Colombia", 4.710989, -74.072090);
        let city = City::place(1, &config, &flat_land(255));
        let unit = city.location.to_cartesian();
        // Local up is the +Z column of the rotation.
        let up = city.rotation * Vec3::Z;
        assert!(up.dot(unit) > 0.999, "up {up:?} should match radial {unit:?}");
        let forward = city.rotation * Vec3::Y;
        assert!(forward.dot(unit).abs() < 1e-4, "forward should be tangent");
    }

    #[test]
    fn test_is_within() {
        let config = CityConfig::new("Honolulu", "USA", 21.309919, -157.858154);
        let city = City::place(2, &config, &flat_land(0));
        let nearby = UnitSpherePoint::new(city.location.azimuthal + 0.01, city.location.polar);
        assert!(city.is_within(nearby, 0.08));
        let far = UnitSpherePoint::new(city.location.azimuthal + 1.0, city.location.polar);
        assert!(!city.is_within(far, 0.08));
    }
}
