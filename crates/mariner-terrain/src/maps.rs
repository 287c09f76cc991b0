//! Equirectangular planet maps.
//!
//! Texel `(x, y)` of a `width × height` map covers the direction whose UV
//! coordinates are `((x + 0.5) / width, (y + 0.5) / height)`, using the same
//! UV convention as the globe sampling code (row 0 is the north pole).

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use image::{GrayImage, Luma, Rgba, RgbaImage};
use mariner_coords::UnitSpherePoint;

use crate::{HeightmapParams, HeightmapSampler};

/// Parameters for turning elevation noise into planet maps.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetMapParams {
    pub heightmap: HeightmapParams,
    /// Normalized elevation of the coastline, in `[-1, 1)`.
    pub sea_level: f64,
    /// How quickly the land mask saturates away from the coast. Higher values
    /// give a crisper shoreline.
    pub shore_sharpness: f64,
}

impl Default for PlanetMapParams {
    fn default() -> Self {
        Self {
            heightmap: HeightmapParams::default(),
            sea_level: 0.05,
            shore_sharpness: 8.0,
        }
    }
}

/// The four source maps a globe is built from.
#[derive(Clone, Debug)]
pub struct PlanetMaps {
    /// Land elevation above the coast, 0 at and below sea level.
    pub topology: GrayImage,
    /// Water depth below the coast, 0 on land.
    pub bathymetry: GrayImage,
    /// 0 deep inland, 255 open water, crossing the midpoint at the coastline.
    pub land_mask: GrayImage,
    pub albedo: RgbaImage,
}

/// Unit direction through the center of texel `(x, y)` of a `width × height` map.
pub fn texel_direction(x: u32, y: u32, width: u32, height: u32) -> Vec3 {
    let azimuthal = (x as f32 + 0.5) / width as f32 * TAU;
    let polar = (0.5 - (y as f32 + 0.5) / height as f32) * PI;
    UnitSpherePoint::new(azimuthal, polar).to_cartesian()
}

/// Render all four maps at `width × height`.
pub fn generate_planet_maps(width: u32, height: u32, params: &PlanetMapParams) -> PlanetMaps {
    let sampler = HeightmapSampler::new(params.heightmap.clone());
    let sea = params.sea_level.clamp(-1.0, 0.999);

    let mut maps = PlanetMaps {
        topology: GrayImage::new(width, height),
        bathymetry: GrayImage::new(width, height),
        land_mask: GrayImage::new(width, height),
        albedo: RgbaImage::new(width, height),
    };

    for y in 0..height {
        for x in 0..width {
            let elevation = sampler.sample_normalized(texel_direction(x, y, width, height));

            let land_height = ((elevation - sea) / (1.0 - sea)).clamp(0.0, 1.0);
            let depth = ((sea - elevation) / (sea + 1.0)).clamp(0.0, 1.0);
            let mask = (0.5 - (elevation - sea) * params.shore_sharpness).clamp(0.0, 1.0);

            maps.topology.put_pixel(x, y, Luma([to_byte(land_height)]));
            maps.bathymetry.put_pixel(x, y, Luma([to_byte(depth)]));
            maps.land_mask.put_pixel(x, y, Luma([to_byte(mask)]));
            maps.albedo.put_pixel(x, y, albedo(elevation >= sea, land_height, depth));
        }
    }

    maps
}

fn to_byte(value: f64) -> u8 {
    (value * 255.0).round() as u8
}

fn albedo(is_land: bool, land_height: f64, depth: f64) -> Rgba<u8> {
    let (from, to, t) = if is_land {
        if land_height < 0.6 {
            ([86.0, 125.0, 70.0], [150.0, 130.0, 90.0], land_height / 0.6)
        } else {
            ([150.0, 130.0, 90.0], [240.0, 240.0, 245.0], (land_height - 0.6) / 0.4)
        }
    } else {
        ([70.0, 140.0, 190.0], [12.0, 35.0, 90.0], depth)
    };
    let mix = |i: usize| (from[i] + (to[i] - from[i]) * t).round() as u8;
    Rgba([mix(0), mix(1), mix(2), 255])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texel_direction_matches_uv_convention() {
        let (w, h) = (64, 32);
        for (x, y) in [(0, 0), (10, 5), (63, 31), (32, 16)] {
            let uv = UnitSpherePoint::from_cartesian(texel_direction(x, y, w, h)).to_uv();
            let px = (uv.x * w as f32) as u32;
            let py = (uv.y * h as f32) as u32;
            assert_eq!((px, py), (x, y), "texel center must sample back to its own texel");
        }
    }

    #[test]
    fn test_first_row_is_northern() {
        assert!(texel_direction(3, 0, 16, 8).z > 0.9);
        assert!(texel_direction(3, 7, 16, 8).z < -0.9);
    }

    #[test]
    fn test_maps_are_consistent_per_texel() {
        let maps = generate_planet_maps(48, 24, &PlanetMapParams::default());
        let cutoff = 127u8;
        let mut saw_land = false;
        let mut saw_water = false;
        for (x, y, mask) in maps.land_mask.enumerate_pixels() {
            let topology = maps.topology.get_pixel(x, y)[0];
            let depth = maps.bathymetry.get_pixel(x, y)[0];
            assert!(topology == 0 || depth == 0, "({x}, {y}) is both land and sea");
            if mask[0] < cutoff {
                saw_land = true;
                assert_eq!(depth, 0, "inland texel ({x}, {y}) has water depth");
            } else if mask[0] > 128 {
                saw_water = true;
                assert_eq!(topology, 0, "open-water texel ({x}, {y}) has land height");
            }
            assert_eq!(maps.albedo.get_pixel(x, y)[3], 255);
        }
        assert!(saw_land && saw_water, "default planet should have land and sea");
    }

    #[test]
    fn test_generation_is_deterministic() {
        let params = PlanetMapParams::default();
        let a = generate_planet_maps(16, 8, &params);
        let b = generate_planet_maps(16, 8, &params);
        assert_eq!(a.land_mask, b.land_mask);
        assert_eq!(a.albedo, b.albedo);
    }

    #[test]
    fn test_map_dimensions() {
        let maps = generate_planet_maps(20, 10, &PlanetMapParams::default());
        for img in [&maps.topology, &maps.bathymetry, &maps.land_mask] {
            assert_eq!(img.dimensions(), (20, 10));
        }
        assert_eq!(maps.albedo.dimensions(), (20, 10));
    }
}
