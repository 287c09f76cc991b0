//! Triangle index topology of the cube-sphere grid.
//!
//! The index buffer depends only on the number of vertices per edge. Vertex
//! `(face, row, col)` lives at flat index `face·n² + row·n + col`, which is the
//! layout the position pass writes.

use std::sync::Arc;

use crate::CubeFace;

/// Smallest grid that still has one cell per face.
pub const MIN_VERTICES_PER_EDGE: u32 = 2;

/// Number of vertices in a grid with `n` vertices per edge.
#[must_use]
pub const fn vertex_count(n: u32) -> u32 {
    6 * n * n
}

/// Number of triangles in a grid with `n` vertices per edge.
#[must_use]
pub const fn triangle_count(n: u32) -> u32 {
    let cells = n.saturating_sub(1);
    6 * cells * cells * 2
}

/// Flat vertex index of grid vertex `(col, row)` on `face`.
#[inline]
#[must_use]
pub const fn vertex_index(face: CubeFace, col: u32, row: u32, n: u32) -> u32 {
    face as u32 * n * n + row * n + col
}

/// Immutable triangle list for a cube-sphere of a given resolution.
///
/// Triangles wind counter-clockwise seen from outside the sphere. The index
/// data is shared, so clones are cheap and every mesh of the same resolution
/// can reuse one topology.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CubeSphereTopology {
    vertices_per_edge: u32,
    indices: Arc<[u32]>,
}

impl CubeSphereTopology {
    /// Build the index list. Resolutions below [`MIN_VERTICES_PER_EDGE`] are raised to it.
    #[must_use]
    pub fn new(vertices_per_edge: u32) -> Self {
        let n = vertices_per_edge.max(MIN_VERTICES_PER_EDGE);
        let mut indices = Vec::with_capacity(triangle_count(n) as usize * 3);

        for face in CubeFace::ALL {
            for row in 0..n - 1 {
                for col in 0..n - 1 {
                    let v0 = vertex_index(face, col, row, n);
                    let v1 = v0 + 1;
                    let v2 = v0 + n;
                    let v3 = v2 + 1;
                    indices.extend_from_slice(&[v0, v1, v2, v2, v1, v3]);
                }
            }
        }

        Self {
            vertices_per_edge: n,
            indices: indices.into(),
        }
    }

    #[must_use]
    pub fn vertices_per_edge(&self) -> u32 {
        self.vertices_per_edge
    }

    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        vertex_count(self.vertices_per_edge)
    }

    #[must_use]
    pub fn triangle_count(&self) -> u32 {
        (self.indices.len() / 3) as u32
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Iterate triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}
