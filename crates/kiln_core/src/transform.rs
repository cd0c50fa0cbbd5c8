//! Affine transform helpers
//!
//! The import context composes transforms the way scene descriptions do:
//! every directive post-multiplies the active transform, so its argument is
//! expressed in the current local frame.

use glam::{Affine3A, Mat3, Mat4, Vec3, Vec4};

/// Returns `true` when `t` is exactly the identity transform.
#[inline]
#[must_use]
pub fn is_identity(t: &Affine3A) -> bool {
    *t == Affine3A::IDENTITY
}

/// Moves `t` by `v` expressed in its own local frame.
///
/// Rotation and scale are preserved; the new translation is
/// `t.matrix3 * v + t.translation`.
#[must_use]
pub fn translated(t: &Affine3A, v: Vec3) -> Affine3A {
    Affine3A {
        matrix3: t.matrix3,
        translation: t.matrix3 * glam::Vec3A::from(v) + t.translation,
    }
}

/// Post-multiplies a non-uniform scale.
#[must_use]
pub fn scaled(t: &Affine3A, s: Vec3) -> Affine3A {
    *t * Affine3A::from_scale(s)
}

/// Post-multiplies a rotation of `degrees` around `axis`.
///
/// Returns `None` for a zero-length axis.
#[must_use]
pub fn rotated(t: &Affine3A, degrees: f32, axis: Vec3) -> Option<Affine3A> {
    let axis = axis.try_normalize()?;
    Some(*t * Affine3A::from_axis_angle(axis, degrees.to_radians()))
}

/// Builds an affine transform from 16 column-major matrix entries.
///
/// Returns `None` if the matrix is projective (bottom row not `0 0 0 1`)
/// or contains non-finite values.
#[must_use]
pub fn from_column_major(values: &[f32; 16]) -> Option<Affine3A> {
    let mat = Mat4::from_cols_array(values);
    if !mat.is_finite() {
        return None;
    }
    if mat.row(3) != Vec4::new(0.0, 0.0, 0.0, 1.0) {
        return None;
    }
    Some(Affine3A::from_mat4(mat))
}

/// Matrix used to transform normals: inverse-transpose of the linear part.
///
/// Falls back to the linear part itself when it is singular.
#[must_use]
pub fn normal_matrix(t: &Affine3A) -> Mat3 {
    let linear = Mat3::from(t.matrix3);
    if linear.determinant().abs() <= f32::EPSILON {
        return linear;
    }
    linear.inverse().transpose()
}
