//! Shading program selection and the uniform block every program reads.
//!
//! A mesh picks one [`ShadingProgram`]; the renderer dispatches on it to choose
//! the WGSL module and to decide whether lighting uniforms are mandatory. All
//! programs share one uniform layout, [`MeshUniforms`], so a single bind group
//! layout serves every pipeline.
//!
//! # WGSL Declaration
//!
//! ```wgsl
//! struct Uniforms {
//!     uModel: mat4x4<f32>,
//!     uView: mat4x4<f32>,
//!     uProjection: mat4x4<f32>,
//!     uInvMatrix: mat4x4<f32>,
//!     uLightDirection: vec3<f32>,
//! }
//! @group(0) @binding(0) var<uniform> u: Uniforms;
//! @group(0) @binding(1) var uTextureCube: texture_cube<f32>;
//! @group(0) @binding(2) var uTextureCubeSampler: sampler;
//! ```

use crate::error::{DemoError, Result};
use crate::scene::Uniforms;
use glam::Mat4;

pub const U_MODEL: &str = "uModel";
pub const U_VIEW: &str = "uView";
pub const U_PROJECTION: &str = "uProjection";
pub const U_TEXTURE_CUBE: &str = "uTextureCube";
pub const U_INV_MATRIX: &str = "uInvMatrix";
pub const U_LIGHT_DIRECTION: &str = "uLightDirection";

/// How a mesh's fragments are coloured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShadingProgram {
    /// Direct cube-map lookup along the object-space position.
    Plain,
    /// Even blend of reflected and refracted cube-map samples.
    ReflectRefract,
    /// Directionally lit base colour with a faint reflected sheen.
    ReflectRefractLit,
}

impl ShadingProgram {
    pub const ALL: [ShadingProgram; 3] = [
        ShadingProgram::Plain,
        ShadingProgram::ReflectRefract,
        ShadingProgram::ReflectRefractLit,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether `uInvMatrix` and `uLightDirection` must be supplied.
    pub fn requires_lighting(self) -> bool {
        matches!(self, ShadingProgram::ReflectRefractLit)
    }

    pub fn label(self) -> &'static str {
        match self {
            ShadingProgram::Plain => "Plain Cube-Map Program",
            ShadingProgram::ReflectRefract => "Reflect/Refract Program",
            ShadingProgram::ReflectRefractLit => "Lit Reflect/Refract Program",
        }
    }

    /// WGSL source with `vs` and `fs` entry points.
    pub fn shader_source(self) -> &'static str {
        match self {
            ShadingProgram::Plain => include_str!("shaders/cube.wgsl"),
            ShadingProgram::ReflectRefract => include_str!("shaders/prism.wgsl"),
            ShadingProgram::ReflectRefractLit => include_str!("shaders/prism_lit.wgsl"),
        }
    }

    /// Uniform names the program's shader consumes.
    pub fn uniform_names(self) -> &'static [&'static str] {
        const BASE: &[&str] = &[U_MODEL, U_VIEW, U_PROJECTION, U_TEXTURE_CUBE];
        const LIT: &[&str] = &[
            U_MODEL,
            U_VIEW,
            U_PROJECTION,
            U_TEXTURE_CUBE,
            U_INV_MATRIX,
            U_LIGHT_DIRECTION,
        ];
        if self.requires_lighting() { LIT } else { BASE }
    }
}

/// GPU layout of the per-draw uniform block (272 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub inv_matrix: [[f32; 4]; 4],
    pub light_direction: [f32; 3],
    /// Padding for 16-byte alignment.
    pub _padding: f32,
}

impl MeshUniforms {
    /// Pack `model` and `uniforms` for `program`.
    ///
    /// Lit programs without lighting fail with [`DemoError::MissingLighting`];
    /// unlit programs get an identity inverse and a zero light.
    pub fn pack(model: Mat4, uniforms: &Uniforms, program: ShadingProgram) -> Result<Self> {
        let (inv_matrix, light_direction) = match (uniforms.lighting, program.requires_lighting()) {
            (Some(lighting), true) => (lighting.inv_matrix, lighting.light_direction.to_array()),
            (None, true) => return Err(DemoError::MissingLighting),
            (_, false) => (Mat4::IDENTITY, [0.0; 3]),
        };

        Ok(Self {
            model: model.to_cols_array_2d(),
            view: uniforms.view.to_cols_array_2d(),
            projection: uniforms.projection.to_cols_array_2d(),
            inv_matrix: inv_matrix.to_cols_array_2d(),
            light_direction,
            _padding: 0.0,
        })
    }
}
