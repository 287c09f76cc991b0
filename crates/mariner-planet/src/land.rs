//! Point queries against the CPU mirrors of the land mask and topology maps.

use mariner_coords::UnitSpherePoint;
use mariner_render::ScalarImage;

/// Land/water and surface-height queries used for boat collision and city
/// placement.
///
/// The mirrors are captured once when the globe is built and never change.
#[derive(Clone, Debug)]
pub struct LandQueryService {
    land_mask: ScalarImage,
    topology: ScalarImage,
    land_mask_cutoff: f32,
    water_surface_height: f32,
    collision_enabled: bool,
}

impl LandQueryService {
    pub fn new(
        land_mask: ScalarImage,
        topology: ScalarImage,
        land_mask_cutoff: f32,
        water_surface_height: f32,
        collision_enabled: bool,
    ) -> Self {
        Self {
            land_mask,
            topology,
            land_mask_cutoff,
            water_surface_height,
            collision_enabled,
        }
    }

    /// Whether `point` blocks movement. Always `false` with collision disabled.
    pub fn is_land_at_point(&self, point: UnitSpherePoint) -> bool {
        if !self.collision_enabled {
            return false;
        }
        self.land_mask_sample(point) <= self.land_mask_cutoff
    }

    /// Surface radius at `point`: the water line for a topology sample of 0,
    /// the outer mesh radius 1 for a sample of 1.
    pub fn get_height_at_point(&self, point: UnitSpherePoint) -> f32 {
        let sample = self.topology_sample(point);
        // Written so both endpoints are exact.
        (1.0 - sample) * self.water_surface_height + sample
    }

    pub fn land_mask_sample(&self, point: UnitSpherePoint) -> f32 {
        self.land_mask.sample_nearest(point.to_uv())
    }

    pub fn topology_sample(&self, point: UnitSpherePoint) -> f32 {
        self.topology.sample_nearest(point.to_uv())
    }

    pub fn land_mask_cutoff(&self) -> f32 {
        self.land_mask_cutoff
    }

    pub fn water_surface_height(&self) -> f32 {
        self.water_surface_height
    }

    pub fn collision_enabled(&self) -> bool {
        self.collision_enabled
    }

    pub fn land_mask(&self) -> &ScalarImage {
        &self.land_mask
    }

    pub fn topology(&self) -> &ScalarImage {
        &self.topology
    }
}
