//! Stateless 4×4 transform helpers.
//!
//! Every function returns a fresh [`Mat4`]; nothing here holds state. Matrices
//! compose right-to-left: `multiply(a, b)` applies `b` first, then `a`, which
//! is the same convention glam's `*` operator uses for column vectors.
//!
//! The projection targets the GPU API's 0..1 depth range (right-handed view
//! space, camera looking down −Z).

use crate::error::{DemoError, Result};
use glam::{Mat4, Vec3};

/// Determinants smaller than this in magnitude are treated as singular.
pub const SINGULAR_EPSILON: f32 = 1e-8;

/// View matrix for a camera at `eye` looking at `target`.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, target, up)
}

/// Perspective projection with a vertical field of view in radians.
pub fn perspective(fov_radians: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_radians, aspect, near, far)
}

pub fn scale(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_scale(Vec3::new(x, y, z))
}

pub fn rotate_x(theta: f32) -> Mat4 {
    Mat4::from_rotation_x(theta)
}

pub fn rotate_y(theta: f32) -> Mat4 {
    Mat4::from_rotation_y(theta)
}

pub fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

/// Composes two transforms so that `b` is applied first, then `a`.
pub fn multiply(a: Mat4, b: Mat4) -> Mat4 {
    a * b
}

/// Inverts `m`, failing with [`DemoError::SingularMatrix`] when its
/// determinant is within [`SINGULAR_EPSILON`] of zero.
pub fn invert(m: Mat4) -> Result<Mat4> {
    let determinant = m.determinant();
    if !determinant.is_finite() || determinant.abs() < SINGULAR_EPSILON {
        return Err(DemoError::SingularMatrix { determinant });
    }
    Ok(m.inverse())
}
