//! End-to-end globe tests on a real device. Each test skips itself when no
//! GPU adapter is available.

use std::f32::consts::PI;

use image::{GrayImage, Luma, Rgba, RgbaImage};
use mariner_config::CityConfig;
use mariner_coords::UnitSpherePoint;
use mariner_cubesphere::{CubeFace, grid_vertex_direction, vertex_index};
use mariner_planet::{
    Globe, GlobeSettings, GlobeSurface, ImageStore, ImageStoreError, MapKind, PassKind,
    WORKGROUP_SIZE,
};
use mariner_render::{GpuContext, WorkGroups, init_gpu_context_blocking, read_texture};
use mariner_terrain::texel_direction;

const MAP_SIZE: (u32, u32) = (64, 32);
const VISIBILITY_SIZE: (u32, u32) = (64, 32);
const VIEW_RADIUS: f32 = 0.3;

/// Western hemisphere (azimuth below π) is land at full height, the rest is
/// open ocean at full depth.
struct SplitStore;

impl ImageStore for SplitStore {
    fn scalar_map(
        &self,
        kind: MapKind,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, ImageStoreError> {
        Ok(GrayImage::from_fn(width, height, |x, _| {
            let land = x < width / 2;
            let value = match kind {
                MapKind::LandMask => {
                    if land {
                        0
                    } else {
                        255
                    }
                }
                MapKind::Topology => {
                    if land {
                        255
                    } else {
                        0
                    }
                }
                MapKind::Bathymetry => {
                    if land {
                        0
                    } else {
                        255
                    }
                }
                MapKind::Albedo => 0,
            };
            Luma([value])
        }))
    }

    fn color_map(
        &self,
        _kind: MapKind,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, ImageStoreError> {
        Ok(RgbaImage::from_pixel(width, height, Rgba([40, 80, 160, 255])))
    }
}

fn gpu() -> Option<GpuContext> {
    match init_gpu_context_blocking() {
        Ok(gpu) => Some(gpu),
        Err(err) => {
            eprintln!("Skipping test: {err}");
            None
        }
    }
}

fn settings(vertices_per_edge: u32) -> GlobeSettings {
    GlobeSettings {
        vertices_per_edge,
        map_size: MAP_SIZE,
        visibility_size: VISIBILITY_SIZE,
        visibility_radius: VIEW_RADIUS,
        ..GlobeSettings::default()
    }
}

fn build(gpu: &GpuContext, vertices_per_edge: u32, cities: &[CityConfig]) -> Globe {
    Globe::build(gpu, &SplitStore, settings(vertices_per_edge), cities).expect("globe builds")
}

#[test]
fn test_one_off_passes_complete_before_build_returns() {
    let Some(gpu) = gpu() else { return };
    let globe = build(&gpu, 20, &[]);
    assert!(globe.orchestrator().one_off_complete());
    assert_eq!(
        globe.orchestrator().work_groups(PassKind::PositionVertices),
        WorkGroups::new(2, 2, 6)
    );
    assert_eq!(
        globe.orchestrator().work_groups(PassKind::UpdateVisibility),
        WorkGroups::covering((VISIBILITY_SIZE.0, VISIBILITY_SIZE.1, 1), WORKGROUP_SIZE)
    );
    assert_eq!(globe.shaders().len(), 3, "one module per pass");
}

#[test]
fn test_positions_follow_the_warp_and_stay_in_bounds() {
    let Some(gpu) = gpu() else { return };
    let n = 17;
    let globe = build(&gpu, n, &[]);
    let positions = globe.read_positions().unwrap();
    assert_eq!(positions.len(), 6 * (n * n) as usize);

    let seabed = globe.settings().seabed_height;
    // Allow for rounding in normalize().
    let bounds = globe.renderable().bounds.scaled(1.0 + 1e-5);
    for face in CubeFace::ALL {
        for row in 0..n {
            for col in 0..n {
                let p = positions[vertex_index(face, col, row, n) as usize];
                assert_eq!(p.w, 1.0);
                let xyz = p.truncate();
                let radius = xyz.length();
                assert!(
                    (seabed - 1e-4..=1.0 + 1e-4).contains(&radius),
                    "{face:?} ({col}, {row}) radius {radius}"
                );
                assert!(bounds.contains_point(xyz), "{xyz:?} escapes the mesh bound");

                let expected = grid_vertex_direction(face, col, row, n);
                assert!(
                    (xyz / radius - expected).length() < 1e-4,
                    "{face:?} ({col}, {row}): {xyz:?} vs {expected:?}"
                );
            }
        }
    }
}

#[test]
fn test_land_rises_and_ocean_sinks() {
    let Some(gpu) = gpu() else { return };
    let n = 33;
    let globe = build(&gpu, n, &[]);
    let positions = globe.read_positions().unwrap();
    let seabed = globe.settings().seabed_height;

    let mut checked = 0;
    for p in &positions {
        let point = UnitSpherePoint::from_cartesian(p.truncate());
        // Stay clear of the coastlines at azimuth 0 and π.
        let az = point.azimuthal;
        let radius = p.truncate().length();
        if az > 0.2 && az < PI - 0.2 {
            assert!((radius - 1.0).abs() < 1e-4, "land at {az} has radius {radius}");
            checked += 1;
        } else if az > PI + 0.2 && az < 2.0 * PI - 0.2 {
            assert!((radius - seabed).abs() < 1e-4, "ocean at {az} has radius {radius}");
            checked += 1;
        }
    }
    assert!(checked > positions.len() / 2, "only {checked} vertices checked");
}

#[test]
fn test_land_queries_use_captured_mirrors() {
    let Some(gpu) = gpu() else { return };
    let globe = build(&gpu, 4, &[]);
    let land = UnitSpherePoint::new(1.0, 0.2);
    let ocean = UnitSpherePoint::new(4.0, -0.2);
    assert!(globe.is_land_at_point(land));
    assert!(!globe.is_land_at_point(ocean));
    assert_eq!(globe.get_height_at_point(land), 1.0);
    assert_eq!(globe.get_height_at_point(ocean), globe.settings().water_surface_height);
}

#[test]
fn test_normal_map_points_outward_on_flat_ocean() {
    let Some(gpu) = gpu() else { return };
    let globe = build(&gpu, 4, &[]);
    let normal_map = &globe.textures().normal_map;
    let bytes = read_texture(&gpu.device, &gpu.queue, normal_map).unwrap();
    let (width, height) = normal_map.dimensions;

    // Ocean columns away from both coasts and rows away from the poles.
    for y in 4..height - 4 {
        for x in width / 2 + 3..width - 3 {
            let i = ((y * width + x) * 4) as usize;
            let decode = |b: u8| f32::from(b) / 255.0 * 2.0 - 1.0;
            let normal =
                glam::Vec3::new(decode(bytes[i]), decode(bytes[i + 1]), decode(bytes[i + 2]));
            let radial = texel_direction(x, y, width, height);
            assert!(
                normal.normalize().dot(radial) > 0.98,
                "texel ({x}, {y}) normal {normal:?} vs radial {radial:?}"
            );
        }
    }
}

#[test]
fn test_visibility_reveals_and_remembers() {
    let Some(gpu) = gpu() else { return };
    let mut globe = build(&gpu, 4, &[]);
    let (width, height) = VISIBILITY_SIZE;

    let first = UnitSpherePoint::new(1.0, 0.0);
    let second = UnitSpherePoint::new(4.0, 0.0);
    let angle_to = |point: UnitSpherePoint, x: u32, y: u32| {
        texel_direction(x, y, width, height)
            .dot(point.to_cartesian())
            .clamp(-1.0, 1.0)
            .acos()
    };

    let untouched = globe.read_visibility().unwrap();
    assert!(untouched.iter().all(|t| t.ever_seen == 0.0 && t.visible == 0.0));

    globe.update_visibility(first).unwrap();
    let after_first = globe.read_visibility().unwrap();
    let mut revealed = 0;
    for y in 0..height {
        for x in 0..width {
            let angle = angle_to(first, x, y);
            if (angle - VIEW_RADIUS).abs() < 1e-3 {
                continue;
            }
            let texel = after_first[(y * width + x) as usize];
            let expected = if angle < VIEW_RADIUS { 1.0 } else { 0.0 };
            assert_eq!(texel.visible, expected, "({x}, {y}) at {angle} rad");
            assert_eq!(texel.ever_seen, expected, "({x}, {y}) at {angle} rad");
            if expected == 1.0 {
                revealed += 1;
            }
        }
    }
    assert!(revealed > 0, "nothing revealed around {first:?}");

    globe.update_visibility(second).unwrap();
    let after_second = globe.read_visibility().unwrap();
    for (before, after) in after_first.iter().zip(&after_second) {
        assert!(after.ever_seen >= before.ever_seen, "ever-seen must never clear");
    }
    for y in 0..height {
        for x in 0..width {
            if angle_to(first, x, y) < VIEW_RADIUS - 1e-3 {
                let texel = after_second[(y * width + x) as usize];
                assert_eq!(texel.ever_seen, 1.0);
                assert_eq!(texel.visible, 0.0, "({x}, {y}) is no longer in view");
            }
        }
    }
}

#[test]
fn test_cities_are_discovered_once() {
    let Some(gpu) = gpu() else { return };
    // Longitude for azimuth 1.0 on the equator.
    let longitude = 1.0f32.to_degrees() - 180.0;
    let cities = [
        CityConfig::new("Near", "Here", 0.0, longitude),
        CityConfig::new("Far", "There", 0.0, longitude + 90.0),
    ];
    let mut globe = build(&gpu, 4, &cities);
    assert_eq!(globe.cities().len(), 2);
    assert_eq!(globe.cities()[0].position.radial, 1.0, "city on full-height land");

    globe.update_visibility(UnitSpherePoint::new(1.0, 0.0)).unwrap();
    assert!(globe.cities()[0].discovered);
    assert!(!globe.cities()[1].discovered);

    let again = globe.discover_cities_near(UnitSpherePoint::new(1.0, 0.0), VIEW_RADIUS);
    assert!(again.is_empty(), "already discovered cities are not reported twice");
}
