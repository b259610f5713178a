//! A quad covering all of clip space, coloured by its own position.
//!
//! The fragment colour is `(x, y, 0, 1)` in clip coordinates, so the lower
//! left is black, the upper right yellow, and the negative halves clamp to
//! zero. The shader also receives the viewport resolution and a tick-derived
//! time.
//!
//! # WGSL Declaration
//!
//! ```wgsl
//! struct QuadUniforms {
//!     uResolution: vec2<f32>,
//!     uTime: f32,
//! }
//! @group(0) @binding(0) var<uniform> u: QuadUniforms;
//! ```

use crate::animation::Viewport;
use crate::gpu::GpuContext;

/// Seconds-like time unit per tick handed to `uTime`.
pub const TIME_PER_TICK: f32 = 0.01;

/// Uniforms for [`ClipSpaceQuad`] (16 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadUniforms {
    /// Viewport size in pixels `[width, height]`.
    pub resolution: [f32; 2],
    /// `tick · TIME_PER_TICK`.
    pub time: f32,
    /// Padding for 16-byte alignment.
    pub _padding: f32,
}

impl QuadUniforms {
    pub fn new(viewport: Viewport, tick: u64) -> Self {
        Self {
            resolution: [viewport.width as f32, viewport.height as f32],
            time: (tick as f64 * TIME_PER_TICK as f64) as f32,
            _padding: 0.0,
        }
    }
}

/// Full-screen clip-space quad pass.
pub struct ClipSpaceQuad {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ClipSpaceQuad {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Clip-Space Quad Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/quad.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Quad Uniforms"),
            size: std::mem::size_of::<QuadUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Quad Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Quad Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Quad Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Quad Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[],
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
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }

    /// Upload uniforms for `tick` and draw the covering triangle.
    pub fn render(&self, gpu: &GpuContext, render_pass: &mut wgpu::RenderPass, viewport: Viewport, tick: u64) {
        let uniforms = QuadUniforms::new(viewport, tick);
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
