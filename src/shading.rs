//! Reference implementation of the surface shading model.
//!
//! The GPU runs these formulas in `src/shaders/*.wgsl`; the functions here are
//! the same math on the CPU so the behaviour can be checked without a device.
//! The literal constants are shared with the shaders and must stay in sync.
//!
//! | Surface | Colour |
//! |---------|--------|
//! | outer cube | `sample(normalize(position))` |
//! | prism | `white * mix(sample(reflected), sample(refracted), 0.5)` |
//! | lit prism | `mix(vec4(b, b, b, 1), sample(reflected), 0.1)` |

use crate::cubemap::CubeMapData;
use glam::{Mat4, Vec3, Vec4};

/// Index-of-refraction ratio used for the refracted ray.
pub const REFRACTION_ETA: f32 = 0.75;
/// Weight of the refracted sample against the reflected one.
pub const REFLECT_REFRACT_MIX: f32 = 0.5;
/// Weight of the reflected sample over the lit base colour.
pub const SHEEN_MIX: f32 = 0.1;
/// Lowest brightness the directional light can produce.
pub const BRIGHTNESS_FLOOR: f32 = 0.1;
/// Flat base colour of the unlit prism.
pub const PRISM_BASE_COLOR: Vec4 = Vec4::ONE;

/// Mirror `incident` about `normal` (`normal` expected unit length).
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

/// Bend `incident` through a surface with index ratio `eta`.
///
/// Returns the zero vector on total internal reflection.
pub fn refract(incident: Vec3, normal: Vec3, eta: f32) -> Vec3 {
    let n_dot_i = normal.dot(incident);
    let k = 1.0 - eta * eta * (1.0 - n_dot_i * n_dot_i);
    if k < 0.0 {
        Vec3::ZERO
    } else {
        eta * incident - (eta * n_dot_i + k.sqrt()) * normal
    }
}

/// Component-wise linear blend, `a` at `t = 0`, `b` at `t = 1`.
pub fn mix(a: Vec4, b: Vec4, t: f32) -> Vec4 {
    a * (1.0 - t) + b * t
}

/// Light direction carried into object space by `inv_matrix`.
///
/// The homogeneous vector `(light, 0)` is transformed and then normalised as
/// a 4-vector before its `xyz` part is used, exactly as the vertex stage does.
pub fn object_space_light(inv_matrix: Mat4, light_direction: Vec3) -> Vec3 {
    (inv_matrix * light_direction.extend(0.0))
        .normalize_or_zero()
        .truncate()
}

/// Directional brightness for a vertex normal, clamped to
/// `[BRIGHTNESS_FLOOR, 1.0]`. NaN collapses to the floor.
pub fn brightness(normal: Vec3, inv_light: Vec3) -> f32 {
    normal.dot(inv_light).max(BRIGHTNESS_FLOOR).min(1.0)
}

/// Fragment colour of the outer cube at an object-space position.
pub fn shade_outer(cubemap: &CubeMapData, position: Vec3) -> Vec4 {
    cubemap.sample(position.normalize_or_zero())
}

/// Direction pair used by both prism variants.
fn prism_directions(position: Vec3, normal: Vec3) -> (Vec3, Vec3) {
    let reflected = reflect(position, normal).normalize_or_zero();
    let refracted = refract(position, normal, REFRACTION_ETA).normalize_or_zero();
    (reflected, refracted)
}

/// Fragment colour of the unlit prism.
pub fn shade_reflect_refract(cubemap: &CubeMapData, position: Vec3, normal: Vec3) -> Vec4 {
    let (reflected, refracted) = prism_directions(position, normal);
    PRISM_BASE_COLOR
        * mix(
            cubemap.sample(reflected),
            cubemap.sample(refracted),
            REFLECT_REFRACT_MIX,
        )
}

/// Fragment colour of the lit prism given the interpolated brightness.
pub fn shade_lit(cubemap: &CubeMapData, position: Vec3, normal: Vec3, brightness: f32) -> Vec4 {
    let (reflected, _) = prism_directions(position, normal);
    let base = Vec4::new(brightness, brightness, brightness, 1.0);
    mix(base, cubemap.sample(reflected), SHEEN_MIX)
}
