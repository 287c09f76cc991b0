//! Cube-sphere grid: face bases, tangent-warp projection and the fixed index topology.
//!
//! Vertex positions are produced on the GPU; this crate owns everything about
//! the mesh that depends only on the grid resolution, plus a CPU mirror of the
//! warp used to check the GPU output.

mod cube_face;
mod face_coord;
mod mesh;
mod projection;
mod topology;

pub use cube_face::CubeFace;
pub use face_coord::FaceCoord;
pub use mesh::{CubeSphereMesh, POSITION_STRIDE};
pub use projection::{face_coord_to_cube_point, face_coord_to_sphere, grid_vertex_direction};
pub use topology::{
    CubeSphereTopology, MIN_VERTICES_PER_EDGE, triangle_count, vertex_count, vertex_index,
};
