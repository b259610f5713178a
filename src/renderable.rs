//! Depth-tested mesh rendering with per-program pipelines.
//!
//! A [`MeshInstance`] is a flat record: model matrix, shared geometry, a bind
//! group over the shared cube texture and the [`ShadingProgram`] that colours
//! it. [`MeshRenderer`]
//! owns one pipeline per program and a depth buffer, and draws any instance
//! through the single [`render`](MeshRenderer::render) entry point.
//!
//! # Bindings
//!
//! All programs share one bind group layout at group 0:
//!
//! | Binding | Resource | Stages |
//! |---------|----------|--------|
//! | 0 | [`MeshUniforms`] | vertex, fragment |
//! | 1 | cube texture view | fragment |
//! | 2 | filtering sampler | fragment |
//!
//! Each instance owns its uniform buffer and bind group, so two instances
//! drawn in the same pass never see each other's matrices.
//!
//! # Pipeline Configuration
//!
//! - No face culling (the camera sits inside the outer cube)
//! - Depth write with less-or-equal comparison
//! - Opaque output

use crate::cube_texture::CubeTexture;
use crate::error::Result;
use crate::gpu::{DEPTH_FORMAT, GpuContext};
use crate::mesh::{Mesh, Vertex3d};
use crate::program::{MeshUniforms, ShadingProgram};
use crate::scene::Uniforms;
use glam::Mat4;
use std::rc::Rc;

/// One drawable object.
pub struct MeshInstance {
    /// Updated by the frame loop; the renderer only reads it.
    pub model: Mat4,
    program: ShadingProgram,
    mesh: Rc<Mesh>,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl MeshInstance {
    pub fn program(&self) -> ShadingProgram {
        self.program
    }
}

/// Draws [`MeshInstance`]s with depth testing.
pub struct MeshRenderer {
    pipelines: [wgpu::RenderPipeline; 3],
    bind_group_layout: wgpu::BindGroupLayout,
    #[allow(dead_code)]
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl MeshRenderer {
    /// Compile every [`ShadingProgram`] and allocate a surface-sized depth buffer.
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipelines = ShadingProgram::ALL.map(|program| Self::create_pipeline(gpu, &pipeline_layout, program));
        let (depth_texture, depth_view) = Self::create_depth_texture(gpu);

        Self {
            pipelines,
            bind_group_layout,
            depth_texture,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
        }
    }

    fn create_pipeline(
        gpu: &GpuContext,
        layout: &wgpu::PipelineLayout,
        program: ShadingProgram,
    ) -> wgpu::RenderPipeline {
        let shader = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(program.label()),
            source: wgpu::ShaderSource::Wgsl(program.shader_source().into()),
        });

        gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(program.label()),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Build an instance drawing `mesh` with `texture` through `program`.
    /// The bind group references `texture`; nothing is copied.
    pub fn create_instance(
        &self,
        gpu: &GpuContext,
        mesh: Rc<Mesh>,
        texture: &CubeTexture,
        program: ShadingProgram,
        model: Mat4,
    ) -> MeshInstance {
        let uniform_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mesh Uniforms"),
            size: std::mem::size_of::<MeshUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        MeshInstance {
            model,
            program,
            mesh,
            uniform_buffer,
            bind_group,
        }
    }

    fn create_depth_texture(gpu: &GpuContext) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Recreate the depth buffer if the surface size changed.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            let (texture, view) = Self::create_depth_texture(gpu);
            self.depth_texture = texture;
            self.depth_view = view;
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Depth attachment for the pass that draws instances.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Upload `instance`'s uniforms and draw it.
    ///
    /// Nothing is recorded if the uniforms cannot be packed, e.g. a lit
    /// instance without lighting.
    pub fn render(
        &self,
        gpu: &GpuContext,
        render_pass: &mut wgpu::RenderPass,
        instance: &MeshInstance,
        uniforms: &Uniforms,
    ) -> Result<()> {
        let packed = MeshUniforms::pack(instance.model, uniforms, instance.program)?;
        gpu.queue
            .write_buffer(&instance.uniform_buffer, 0, bytemuck::cast_slice(&[packed]));

        render_pass.set_pipeline(&self.pipelines[instance.program.index()]);
        render_pass.set_bind_group(0, &instance.bind_group, &[]);
        render_pass.set_vertex_buffer(0, instance.mesh.vertex_buffer.slice(..));
        render_pass.set_index_buffer(instance.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..instance.mesh.index_count, 0, 0..1);
        Ok(())
    }
}
