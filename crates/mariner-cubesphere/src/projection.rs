//! Cube-to-sphere tangent-warp projection.
//!
//! Remapping each face coordinate through `tan(s * π/4)` before normalizing
//! spreads grid cells far more evenly over the sphere than plain
//! normalization. The position compute kernel runs the same arithmetic; these
//! functions are its CPU mirror.

use std::f32::consts::FRAC_PI_4;

use glam::Vec3;

use crate::{CubeFace, FaceCoord};

/// Convert a [`FaceCoord`] to a point on the surface of the `[-1, 1]` cube.
///
/// The face center `(u=0.5, v=0.5)` maps to the face normal vector.
#[inline]
#[must_use]
pub fn face_coord_to_cube_point(fc: &FaceCoord) -> Vec3 {
    let s = 2.0 * fc.u - 1.0;
    let t = 2.0 * fc.v - 1.0;
    fc.face.normal() + s * fc.face.tangent() + t * fc.face.bitangent()
}

/// Project a [`FaceCoord`] onto the unit sphere using the tangent warp.
#[inline]
#[must_use]
pub fn face_coord_to_sphere(fc: &FaceCoord) -> Vec3 {
    let s = 2.0 * fc.u - 1.0;
    let t = 2.0 * fc.v - 1.0;

    // tan(π/4) = 1, so the warp is the identity at the face edges.
    let ws = (s * FRAC_PI_4).tan();
    let wt = (t * FRAC_PI_4).tan();

    (fc.face.normal() + ws * fc.face.tangent() + wt * fc.face.bitangent()).normalize()
}

/// Unit direction of grid vertex `(col, row)` on `face`.
#[inline]
#[must_use]
pub fn grid_vertex_direction(face: CubeFace, col: u32, row: u32, vertices_per_edge: u32) -> Vec3 {
    face_coord_to_sphere(&FaceCoord::from_grid(face, col, row, vertices_per_edge))
}
