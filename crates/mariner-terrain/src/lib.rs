//! Procedural planet maps: fBm simplex elevation sampled on the unit sphere and
//! rendered into equirectangular topology, bathymetry, land-mask and albedo images.

mod heightmap;
mod maps;

pub use heightmap::{HeightmapParams, HeightmapSampler};
pub use maps::{PlanetMapParams, PlanetMaps, generate_planet_maps, texel_direction};
