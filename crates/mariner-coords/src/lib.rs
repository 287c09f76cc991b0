//! Spherical coordinates on the globe.
//!
//! The cartesian frame is right handed with `+Z` up. Angles are radians:
//!
//! - azimuth 0 lies on the `+X` axis and increases clockwise seen from `+Z`,
//!   normalized into `[0, 2π)`
//! - polar 0 is the XY plane, increasing toward `+Z`, within `[-π/2, π/2]`
//!
//! ```rust
//! use mariner_coords::UnitSpherePoint;
//!
//! let greenwich = UnitSpherePoint::from_latitude_and_longitude(0.0, 0.0);
//! assert_eq!(greenwich.azimuthal, std::f32::consts::PI);
//! ```

mod conversion;
mod sphere_point;

pub use conversion::{
    azimuth_from_cartesian, from_latitude_and_longitude, polar_from_cartesian, to_cartesian,
    to_uv,
};
pub use sphere_point::{RadialSpherePoint, UnitSpherePoint};
