//! # Prismbox
//!
//! **A refracting prism inside a procedurally painted cube map.**
//!
//! An outer cube, scaled to surround the camera, samples a six-face cube-map
//! texture generated on the CPU. Inside it a slowly tumbling prism blends
//! reflected and refracted samples of the same cube map, optionally lit by a
//! fixed directional light carried into object space every frame.
//!
//! ## Quick Start
//!
//! ```no_run
//! use prismbox::{AppConfig, ShadingProgram};
//!
//! fn main() -> prismbox::Result<()> {
//!     prismbox::run(
//!         AppConfig::new()
//!             .face_size(512)
//!             .prism_program(ShadingProgram::ReflectRefract),
//!     )
//! }
//! ```
//!
//! ## Layout
//!
//! - [`AnimationLoop`]: lifecycle, tick counter and square viewport reconciliation
//! - [`transform`]: the matrix helpers every frame is built from
//! - [`scene`]: the fixed camera and the per-tick model matrices
//! - [`TextureCubeBuilder`]: deterministic face painting
//! - [`MeshRenderer`] and [`MeshInstance`]: one draw path for every [`ShadingProgram`]
//! - [`shading`]: the shader formulas as CPU reference functions
//!
//! Everything that does not need a GPU is a pure function and is tested as such.

mod animation;
mod app;
mod clip_quad;
mod cube_texture;
mod cubemap;
mod demo;
mod error;
mod gpu;
mod label;
mod mesh;
mod program;
mod renderable;
pub mod scene;
pub mod shading;
pub mod transform;

pub use animation::{
    AnimationLoop, FrameHandler, FrameInfo, FrameStatus, HostSurface, LoopState, Viewport,
};
pub use app::{AppConfig, DEFAULT_FACE_SIZE, DemoKind, WindowSurface, export_faces, run};
pub use clip_quad::{ClipSpaceQuad, QuadUniforms};
pub use cube_texture::CubeTexture;
pub use cubemap::{Axis, CubeFace, CubeMapData, Sign, TextureCubeBuilder};
pub use demo::{PrismDemo, PrismScene, QuadDemo, QuadScene};
pub use error::{DemoError, Result};
pub use gpu::GpuContext;
pub use label::LabelFont;
pub use mesh::{Mesh, Vertex3d, cube_geometry};
pub use program::{MeshUniforms, ShadingProgram};
pub use renderable::{MeshInstance, MeshRenderer};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec3, Vec4};
