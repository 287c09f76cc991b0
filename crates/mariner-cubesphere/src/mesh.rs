//! Cube-sphere mesh: index topology, position buffer handle and bounds.

use mariner_math::Aabb;

use crate::CubeSphereTopology;

/// Bytes per vertex in the position buffer: one `vec4<f32>`, `w` unused.
pub const POSITION_STRIDE: u64 = 16;

/// A cube-sphere mesh: shared index topology plus a position buffer owned elsewhere.
///
/// `P` is the handle of the buffer the position pass writes into (a GPU buffer
/// in the renderer, a plain `Vec` in tests). The mesh never touches its contents.
#[derive(Clone, Debug)]
pub struct CubeSphereMesh<P> {
    topology: CubeSphereTopology,
    positions: P,
}

impl<P> CubeSphereMesh<P> {
    pub fn new(topology: CubeSphereTopology, positions: P) -> Self {
        Self {
            topology,
            positions,
        }
    }

    pub fn topology(&self) -> &CubeSphereTopology {
        &self.topology
    }

    pub fn positions(&self) -> &P {
        &self.positions
    }

    pub fn vertices_per_edge(&self) -> u32 {
        self.topology.vertices_per_edge()
    }

    /// Size in bytes the position buffer must have for this resolution.
    pub fn position_buffer_size(&self) -> u64 {
        Self::position_buffer_size_for(self.topology.vertices_per_edge())
    }

    pub fn position_buffer_size_for(vertices_per_edge: u32) -> u64 {
        u64::from(crate::vertex_count(vertices_per_edge)) * POSITION_STRIDE
    }

    /// Pre-displacement bound. Warped and height-displaced vertices never leave it.
    pub fn bounds(&self) -> Aabb {
        Aabb::unit_cube()
    }
}
