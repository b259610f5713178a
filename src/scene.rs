//! Fixed scene layout and the per-frame transform plan.
//!
//! Everything the frame loop needs to know about *where* things are lives
//! here as pure functions of the tick and viewport: the camera, the two model
//! matrices and, for the lit prism, the inverse transform that carries the
//! light into object space. None of it touches the GPU.

use crate::animation::Viewport;
use crate::error::Result;
use crate::program::ShadingProgram;
use crate::transform::{invert, look_at, multiply, perspective, rotate_x, rotate_y, scale, translate};
use glam::{Mat4, Vec3};
use std::f64::consts::TAU;

/// Camera position before the view offset is applied.
pub const EYE: Vec3 = Vec3::new(0.0, 0.0, -1.0);
/// Point the camera looks at.
pub const LOOK_TARGET: Vec3 = Vec3::ZERO;
/// Translation appended to the look-at matrix.
pub const VIEW_OFFSET: Vec3 = Vec3::new(0.0, 0.0, 4.0);
pub const FOV_DEGREES: f32 = 75.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 500.0;
/// Uniform scale of the environment cube.
pub const OUTER_CUBE_SCALE: f32 = 5.0;
/// Prism rotation about X, radians per tick.
pub const PRISM_SPIN_X: f64 = 0.01;
/// Prism rotation about Y, radians per tick.
pub const PRISM_SPIN_Y: f64 = 0.013;
/// World-space direction of the directional light.
pub const LIGHT_DIRECTION: Vec3 = Vec3::new(0.5, 0.5, -1.0);

/// View and projection for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Camera {
    /// Rebuild the fixed camera for the current viewport aspect ratio.
    pub fn for_viewport(viewport: Viewport) -> Self {
        let view = multiply(
            look_at(EYE, LOOK_TARGET, Vec3::Y),
            translate(VIEW_OFFSET.x, VIEW_OFFSET.y, VIEW_OFFSET.z),
        );
        let projection = perspective(
            FOV_DEGREES.to_radians(),
            viewport.aspect(),
            NEAR_PLANE,
            FAR_PLANE,
        );
        Self { view, projection }
    }

    /// `projection · view`.
    pub fn view_projection(&self) -> Mat4 {
        multiply(self.projection, self.view)
    }
}

/// Inverse transform and light direction for the lit program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub inv_matrix: Mat4,
    pub light_direction: Vec3,
}

impl Lighting {
    /// Lighting for an object drawn with `model` through `camera`.
    ///
    /// Fails with [`SingularMatrix`](crate::DemoError::SingularMatrix) when
    /// `projection · view · model` cannot be inverted.
    pub fn for_model(camera: &Camera, model: Mat4) -> Result<Self> {
        let inv_matrix = invert(multiply(camera.view_projection(), model))?;
        Ok(Self {
            inv_matrix,
            light_direction: LIGHT_DIRECTION,
        })
    }
}

/// Uniforms shared by a draw call, apart from the instance's own model matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Uniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub lighting: Option<Lighting>,
}

impl Uniforms {
    pub fn new(camera: &Camera) -> Self {
        Self {
            view: camera.view,
            projection: camera.projection,
            lighting: None,
        }
    }

    pub fn with_lighting(mut self, lighting: Option<Lighting>) -> Self {
        self.lighting = lighting;
        self
    }
}

/// Model matrix of the environment cube. Never changes.
pub fn outer_cube_model() -> Mat4 {
    scale(OUTER_CUBE_SCALE, OUTER_CUBE_SCALE, OUTER_CUBE_SCALE)
}

/// Prism rotation angles `(x, y)` for `tick`, each reduced into `[0, 2π)`.
pub fn prism_angles(tick: u64) -> (f32, f32) {
    let t = tick as f64;
    (
        (PRISM_SPIN_X * t).rem_euclid(TAU) as f32,
        (PRISM_SPIN_Y * t).rem_euclid(TAU) as f32,
    )
}

/// Model matrix of the prism: `rotateX(0.01·t) · rotateY(0.013·t)`.
pub fn prism_model(tick: u64) -> Mat4 {
    let (x, y) = prism_angles(tick);
    multiply(rotate_x(x), rotate_y(y))
}

/// Everything one frame of the prism scene needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePlan {
    pub camera: Camera,
    pub outer_cube_model: Mat4,
    pub prism_model: Mat4,
    pub prism_lighting: Option<Lighting>,
}

impl FramePlan {
    /// Uniforms for the outer cube.
    pub fn outer_cube_uniforms(&self) -> Uniforms {
        Uniforms::new(&self.camera)
    }

    /// Uniforms for the prism, lit if the plan carries lighting.
    pub fn prism_uniforms(&self) -> Uniforms {
        Uniforms::new(&self.camera).with_lighting(self.prism_lighting)
    }
}

/// Plan the frame at `tick`. Lighting is only computed when `prism_program`
/// needs it, so a singular transform can only fail lit frames.
pub fn plan_frame(tick: u64, viewport: Viewport, prism_program: ShadingProgram) -> Result<FramePlan> {
    let camera = Camera::for_viewport(viewport);
    let prism_model = prism_model(tick);
    let prism_lighting = if prism_program.requires_lighting() {
        Some(Lighting::for_model(&camera, prism_model)?)
    } else {
        None
    };

    Ok(FramePlan {
        camera,
        outer_cube_model: outer_cube_model(),
        prism_model,
        prism_lighting,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DemoError;

    const TOLERANCE: f32 = 1e-4;

    #[test]
    fn prism_angles_follow_tick() {
        assert_eq!(prism_angles(0), (0.0, 0.0));

        let (x, y) = prism_angles(100);
        assert!((x - 1.0).abs() < TOLERANCE);
        assert!((y - 1.3).abs() < TOLERANCE);

        let (x, y) = prism_angles(1000);
        assert!((x as f64 - 10.0f64.rem_euclid(TAU)).abs() < 1e-4);
        assert!((y as f64 - 13.0f64.rem_euclid(TAU)).abs() < 1e-4);
    }

    #[test]
    fn prism_angles_stay_in_one_turn() {
        for tick in [0, 1, 628, 629, 10_000, 1_000_000_007, u64::MAX / 3] {
            let (x, y) = prism_angles(tick);
            assert!((0.0..std::f32::consts::TAU + 1e-3).contains(&x));
            assert!((0.0..std::f32::consts::TAU + 1e-3).contains(&y));
            assert_eq!(prism_angles(tick), (x, y));
        }
    }

    #[test]
    fn prism_model_composes_x_then_y() {
        let tick = 250;
        let expected = rotate_x(2.5) * rotate_y((0.013f64 * 250.0) as f32);
        assert!(prism_model(tick).abs_diff_eq(expected, TOLERANCE));
    }

    #[test]
    fn prism_model_at_tick_zero_is_identity() {
        assert!(prism_model(0).abs_diff_eq(Mat4::IDENTITY, TOLERANCE));
    }

    #[test]
    fn outer_cube_is_scaled_by_five() {
        let p = outer_cube_model().transform_point3(Vec3::ONE);
        assert!(p.abs_diff_eq(Vec3::splat(5.0), TOLERANCE));
    }

    #[test]
    fn camera_sees_origin_five_units_ahead() {
        let camera = Camera::for_viewport(Viewport::square(800));
        let origin = camera.view.transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), TOLERANCE));
    }

    #[test]
    fn camera_projection_uses_viewport_aspect() {
        let square = Camera::for_viewport(Viewport::square(300));
        let expected = perspective(75f32.to_radians(), 1.0, NEAR_PLANE, FAR_PLANE);
        assert!(square.projection.abs_diff_eq(expected, TOLERANCE));

        let wide = Camera::for_viewport(Viewport { width: 200, height: 100 });
        let expected = perspective(75f32.to_radians(), 2.0, NEAR_PLANE, FAR_PLANE);
        assert!(wide.projection.abs_diff_eq(expected, TOLERANCE));
    }

    #[test]
    fn lit_plan_carries_inverse_of_full_transform() {
        let plan = plan_frame(42, Viewport::square(512), ShadingProgram::ReflectRefractLit).unwrap();
        let lighting = plan.prism_lighting.expect("lit plan has lighting");

        let forward = plan.camera.projection * plan.camera.view * plan.prism_model;
        assert!((lighting.inv_matrix * forward).abs_diff_eq(Mat4::IDENTITY, 1e-3));
        assert_eq!(lighting.light_direction, LIGHT_DIRECTION);
        assert_eq!(plan.prism_uniforms().lighting, Some(lighting));
        assert_eq!(plan.outer_cube_uniforms().lighting, None);
    }

    #[test]
    fn unlit_plan_skips_lighting() {
        let plan = plan_frame(42, Viewport::square(512), ShadingProgram::ReflectRefract).unwrap();
        assert!(plan.prism_lighting.is_none());
        assert!(plan.prism_uniforms().lighting.is_none());
    }

    #[test]
    fn singular_model_fails_lighting() {
        let camera = Camera::for_viewport(Viewport::square(512));
        let err = Lighting::for_model(&camera, scale(0.0, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, DemoError::SingularMatrix { .. }));
    }

    #[test]
    fn plans_are_reproducible() {
        let a = plan_frame(9_999, Viewport::square(640), ShadingProgram::ReflectRefractLit).unwrap();
        let b = plan_frame(9_999, Viewport::square(640), ShadingProgram::ReflectRefractLit).unwrap();
        assert_eq!(a, b);
    }
}
