//! The procedurally generated globe.
//!
//! [`Globe::build`] uploads the planet maps from an [`ImageStore`], runs the
//! vertex positioning and normal passes to completion, mirrors the land mask
//! and topology on the CPU for [`LandQueryService`] and places the cities.
//! Each simulation tick then calls [`GlobeSurface::update_visibility`] to grow
//! the explored area around the boat.

mod city;
mod globe;
mod image_store;
mod land;
mod passes;
mod surface;
mod visibility;

pub use city::City;
pub use globe::{Globe, GlobeError, GlobeSettings, GlobeTextures, RenderableGlobe};
pub use image_store::{
    DirectoryImageStore, ImageStore, ImageStoreError, MapKind, ProceduralImageStore,
};
pub use land::LandQueryService;
pub use passes::{
    CALCULATE_NORMALS_SHADER, ComputePipelineOrchestrator, NORMAL_MAP_FORMAT,
    POSITION_VERTICES_SHADER, PassKind, PassResources, SurfaceParams,
    UPDATE_VISIBILITY_SHADER, VisibilityParams, WORKGROUP_SIZE, normal_work_groups,
    position_work_groups, visibility_work_groups,
};
pub use surface::GlobeSurface;
pub use visibility::{VISIBILITY_TEXEL_SIZE, VisibilityMask, VisibilityTexel};
