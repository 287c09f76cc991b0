//! Rotation construction and bounding volumes for the Mariner globe.

mod aabb;
mod rotation;

pub use aabb::Aabb;
pub use rotation::{NEARLY_ZERO, from_between_vectors, from_look_at, from_orthonormal_matrix};
