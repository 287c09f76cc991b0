//! What navigation needs from the globe.

use mariner_coords::UnitSpherePoint;

use crate::globe::GlobeError;

/// Collision, height and visibility access to a globe.
pub trait GlobeSurface {
    /// Whether `point` blocks movement.
    fn is_land_at_point(&self, point: UnitSpherePoint) -> bool;

    /// Surface radius at `point` on the unit globe.
    fn get_height_at_point(&self, point: UnitSpherePoint) -> f32;

    /// Reveal the area around `position`. Submits GPU work without waiting for it.
    fn update_visibility(&mut self, position: UnitSpherePoint) -> Result<(), GlobeError>;
}
