//! Quaternion construction from bases, vector pairs and look directions.
//!
//! All functions use the Z-up frame of the globe: canonical forward is `+Y`,
//! canonical right is `+X` and canonical up is `+Z`. A rotation built here maps
//! those canonical axes onto the requested basis.

use glam::{Mat3, Quat, Vec3};

/// Threshold below which a scalar is treated as zero.
pub const NEARLY_ZERO: f32 = 1.0e-6;

/// Convert an orthonormal basis into a quaternion.
///
/// The dominant-diagonal branch is used when the trace is not positive, which
/// keeps the result stable for rotations close to 180°. The input is not
/// validated: a matrix whose columns are not unit length and mutually
/// perpendicular produces an unnormalized quaternion.
#[must_use]
pub fn from_orthonormal_matrix(m: Mat3) -> Quat {
    debug_assert!(
        is_roughly_orthonormal(m),
        "from_orthonormal_matrix called with a non-orthonormal basis: {m:?}"
    );

    // Row-major names: mRC is row R of column C.
    let (m00, m10, m20) = (m.x_axis.x, m.x_axis.y, m.x_axis.z);
    let (m01, m11, m21) = (m.y_axis.x, m.y_axis.y, m.y_axis.z);
    let (m02, m12, m22) = (m.z_axis.x, m.z_axis.y, m.z_axis.z);

    let trace = m00 + m11 + m22;
    if trace > 0.0 {
        let s = 0.5 / (trace + 1.0).sqrt();
        Quat::from_xyzw((m21 - m12) * s, (m02 - m20) * s, (m10 - m01) * s, 0.25 / s)
    } else if m00 > m11 && m00 > m22 {
        let s = 2.0 * (1.0 + m00 - m11 - m22).sqrt();
        Quat::from_xyzw(0.25 * s, (m01 + m10) / s, (m02 + m20) / s, (m21 - m12) / s)
    } else if m11 > m22 {
        let s = 2.0 * (1.0 + m11 - m00 - m22).sqrt();
        Quat::from_xyzw((m01 + m10) / s, 0.25 * s, (m12 + m21) / s, (m02 - m20) / s)
    } else {
        let s = 2.0 * (1.0 + m22 - m00 - m11).sqrt();
        Quat::from_xyzw((m02 + m20) / s, (m12 + m21) / s, 0.25 * s, (m10 - m01) / s)
    }
}

/// Shortest-arc rotation taking the direction of `v1` onto the direction of `v2`.
///
/// Parallel inputs and near-zero inputs yield the identity. For antiparallel
/// inputs the axis is undefined, so a perpendicular of `v1` is picked.
#[must_use]
pub fn from_between_vectors(v1: Vec3, v2: Vec3) -> Quat {
    let a = (v1.length_squared() * v2.length_squared()).sqrt();
    let mut b = a + v1.dot(v2);
    if (b - 2.0 * a).abs() <= NEARLY_ZERO || a.abs() <= NEARLY_ZERO {
        return Quat::IDENTITY;
    }

    let axis = if b < 1.0e-6 * a {
        b = 0.0;
        if v1.x.abs() > v1.z.abs() {
            Vec3::new(-v1.y, v1.x, 0.0)
        } else {
            Vec3::new(0.0, -v1.z, v1.y)
        }
    } else {
        v1.cross(v2)
    };

    Quat::from_xyzw(axis.x, axis.y, axis.z, b).normalize()
}

/// Rotation that points canonical forward along `forward` with `up_hint`
/// resolving the roll.
///
/// `forward` and `up_hint` must not be parallel; the basis is degenerate in
/// that case and the result is meaningless.
#[must_use]
pub fn from_look_at(forward: Vec3, up_hint: Vec3) -> Quat {
    let right = forward.cross(up_hint).normalize();
    let up = right.cross(forward).normalize();
    from_orthonormal_matrix(Mat3::from_cols(right, forward.normalize(), up))
}

fn is_roughly_orthonormal(m: Mat3) -> bool {
    const TOLERANCE: f32 = 1.0e-3;
    let cols = [m.x_axis, m.y_axis, m.z_axis];
    let unit = cols.iter().all(|c| (c.length() - 1.0).abs() < TOLERANCE);
    let perpendicular = cols[0].dot(cols[1]).abs() < TOLERANCE
        && cols[1].dot(cols[2]).abs() < TOLERANCE
        && cols[0].dot(cols[2]).abs() < TOLERANCE;
    unit && perpendicular
}
