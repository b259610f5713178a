//! Cube geometry shared by both scene meshes.
//!
//! - [`Vertex3d`]: position and normal, the two attributes every shading
//!   program reads (`positions` at location 0, `normals` at location 1)
//! - [`cube_geometry`]: the ±1 cube with per-face normals, as plain data
//! - [`Mesh`]: that geometry uploaded to GPU buffers
//!
//! # Vertex Layout
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |

use crate::gpu::GpuContext;

/// Half the edge length of the cube primitive.
pub const CUBE_HALF_EXTENT: f32 = 1.0;

/// A mesh vertex (24 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// Object-space position.
    pub position: [f32; 3],
    /// Unit face normal.
    pub normal: [f32; 3],
}

impl Vertex3d {
    /// The wgpu vertex buffer layout descriptor for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // positions
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normals
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// Vertices and indices of the cube spanning `±CUBE_HALF_EXTENT`.
///
/// 24 vertices (four per face so each face keeps its own normal) and 36
/// indices, counter-clockwise when seen from outside.
pub fn cube_geometry() -> (Vec<Vertex3d>, Vec<u32>) {
    let h = CUBE_HALF_EXTENT;

    #[rustfmt::skip]
    let vertices = vec![
        // Front face (Z+)
        Vertex3d::new([-h, -h,  h], [ 0.0,  0.0,  1.0]),
        Vertex3d::new([ h, -h,  h], [ 0.0,  0.0,  1.0]),
        Vertex3d::new([ h,  h,  h], [ 0.0,  0.0,  1.0]),
        Vertex3d::new([-h,  h,  h], [ 0.0,  0.0,  1.0]),
        // Back face (Z-)
        Vertex3d::new([ h, -h, -h], [ 0.0,  0.0, -1.0]),
        Vertex3d::new([-h, -h, -h], [ 0.0,  0.0, -1.0]),
        Vertex3d::new([-h,  h, -h], [ 0.0,  0.0, -1.0]),
        Vertex3d::new([ h,  h, -h], [ 0.0,  0.0, -1.0]),
        // Top face (Y+)
        Vertex3d::new([-h,  h,  h], [ 0.0,  1.0,  0.0]),
        Vertex3d::new([ h,  h,  h], [ 0.0,  1.0,  0.0]),
        Vertex3d::new([ h,  h, -h], [ 0.0,  1.0,  0.0]),
        Vertex3d::new([-h,  h, -h], [ 0.0,  1.0,  0.0]),
        // Bottom face (Y-)
        Vertex3d::new([-h, -h, -h], [ 0.0, -1.0,  0.0]),
        Vertex3d::new([ h, -h, -h], [ 0.0, -1.0,  0.0]),
        Vertex3d::new([ h, -h,  h], [ 0.0, -1.0,  0.0]),
        Vertex3d::new([-h, -h,  h], [ 0.0, -1.0,  0.0]),
        // Right face (X+)
        Vertex3d::new([ h, -h,  h], [ 1.0,  0.0,  0.0]),
        Vertex3d::new([ h, -h, -h], [ 1.0,  0.0,  0.0]),
        Vertex3d::new([ h,  h, -h], [ 1.0,  0.0,  0.0]),
        Vertex3d::new([ h,  h,  h], [ 1.0,  0.0,  0.0]),
        // Left face (X-)
        Vertex3d::new([-h, -h, -h], [-1.0,  0.0,  0.0]),
        Vertex3d::new([-h, -h,  h], [-1.0,  0.0,  0.0]),
        Vertex3d::new([-h,  h,  h], [-1.0,  0.0,  0.0]),
        Vertex3d::new([-h,  h, -h], [-1.0,  0.0,  0.0]),
    ];

    #[rustfmt::skip]
    let indices: Vec<u32> = vec![
        0,  1,  2,  2,  3,  0,  // front
        4,  5,  6,  6,  7,  4,  // back
        8,  9,  10, 10, 11, 8,  // top
        12, 13, 14, 14, 15, 12, // bottom
        16, 17, 18, 18, 19, 16, // right
        20, 21, 22, 22, 23, 20, // left
    ];

    (vertices, indices)
}

/// GPU-resident geometry with vertex and index buffers. Immutable once built.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

impl Mesh {
    /// Upload `vertices` and `indices` (three per triangle).
    pub fn new(gpu: &GpuContext, vertices: &[Vertex3d], indices: &[u32]) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// Upload [`cube_geometry`].
    pub fn cube(gpu: &GpuContext) -> Self {
        let (vertices, indices) = cube_geometry();
        Self::new(gpu, &vertices, &indices)
    }
}
