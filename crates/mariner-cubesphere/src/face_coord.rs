//! 2D local coordinates on a cube face.

use crate::CubeFace;

/// A 2D coordinate on a cube face. `u` and `v` are in the range \[0, 1\].
///
/// `u` follows the face tangent (grid column) and `v` the bitangent (grid row).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceCoord {
    pub face: CubeFace,
    pub u: f32,
    pub v: f32,
}

impl FaceCoord {
    /// Construct a `FaceCoord`, clamping `u` and `v` to \[0, 1\].
    #[must_use]
    pub fn new(face: CubeFace, u: f32, v: f32) -> Self {
        Self {
            face,
            u: u.clamp(0.0, 1.0),
            v: v.clamp(0.0, 1.0),
        }
    }

    /// Coordinate of grid vertex `(col, row)` on a face with `vertices_per_edge` vertices per side.
    ///
    /// Column and row `vertices_per_edge - 1` land exactly on the face edge.
    #[must_use]
    pub fn from_grid(face: CubeFace, col: u32, row: u32, vertices_per_edge: u32) -> Self {
        let last = vertices_per_edge.saturating_sub(1).max(1) as f32;
        Self::new(face, col as f32 / last, row as f32 / last)
    }
}
