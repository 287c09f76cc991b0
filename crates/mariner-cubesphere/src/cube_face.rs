//! The six faces of the cube-sphere and their basis vectors.

use glam::Vec3;

/// The six faces of the cube that forms the globe mesh.
///
/// The discriminant is the face's slab index in the vertex buffer and the
/// `z` work-group coordinate of the position pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CubeFace {
    /// +X face
    PosX = 0,
    /// −X face
    NegX = 1,
    /// +Y face
    PosY = 2,
    /// −Y face
    NegY = 3,
    /// +Z face
    PosZ = 4,
    /// −Z face
    NegZ = 5,
}

impl CubeFace {
    /// All six faces in slab order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::NegX,
        CubeFace::PosY,
        CubeFace::NegY,
        CubeFace::PosZ,
        CubeFace::NegZ,
    ];

    /// Face for a slab index, `None` outside `0..6`.
    #[must_use]
    pub fn from_index(index: u32) -> Option<CubeFace> {
        CubeFace::ALL.get(index as usize).copied()
    }

    #[must_use]
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Outward-pointing unit normal for this face.
    #[must_use]
    pub fn normal(self) -> Vec3 {
        match self {
            CubeFace::PosX => Vec3::X,
            CubeFace::NegX => Vec3::NEG_X,
            CubeFace::PosY => Vec3::Y,
            CubeFace::NegY => Vec3::NEG_Y,
            CubeFace::PosZ => Vec3::Z,
            CubeFace::NegZ => Vec3::NEG_Z,
        }
    }

    /// Direction of increasing grid column on this face.
    #[must_use]
    pub fn tangent(self) -> Vec3 {
        match self {
            CubeFace::PosX => Vec3::NEG_Z,
            CubeFace::NegX => Vec3::Z,
            CubeFace::PosY | CubeFace::NegY | CubeFace::PosZ => Vec3::X,
            CubeFace::NegZ => Vec3::NEG_X,
        }
    }

    /// Direction of increasing grid row on this face.
    #[must_use]
    pub fn bitangent(self) -> Vec3 {
        match self {
            CubeFace::PosX | CubeFace::NegX | CubeFace::PosZ | CubeFace::NegZ => Vec3::Y,
            CubeFace::PosY => Vec3::NEG_Z,
            CubeFace::NegY => Vec3::Z,
        }
    }
}
