//! The two runnable scenes, as [`FrameHandler`]s over a winit window.
//!
//! - [`PrismDemo`]: the environment cube with the rotating reflect/refract prism
//! - [`QuadDemo`]: the clip-space colour quad
//!
//! Both build their GPU state in `initialize` and keep the wgpu surface in
//! step with the window before drawing each frame.

use crate::animation::{FrameHandler, FrameInfo, Viewport};
use crate::clip_quad::ClipSpaceQuad;
use crate::cube_texture::CubeTexture;
use crate::cubemap::TextureCubeBuilder;
use crate::error::Result;
use crate::gpu::GpuContext;
use crate::label::LabelFont;
use crate::mesh::Mesh;
use crate::program::ShadingProgram;
use crate::renderable::{MeshInstance, MeshRenderer};
use crate::scene::{outer_cube_model, plan_frame, prism_model};
use std::rc::Rc;
use std::sync::Arc;
use winit::window::Window;

/// Loop-scoped handles of the prism scene.
pub struct PrismScene {
    gpu: GpuContext,
    renderer: MeshRenderer,
    outer_cube: MeshInstance,
    prism: MeshInstance,
}

/// Outer cube plus rotating prism, both textured by the generated cube map.
pub struct PrismDemo {
    window: Arc<Window>,
    face_size: i64,
    program: ShadingProgram,
    font: LabelFont,
}

impl PrismDemo {
    pub fn new(window: Arc<Window>, face_size: i64, program: ShadingProgram, font: LabelFont) -> Self {
        Self {
            window,
            face_size,
            program,
            font,
        }
    }
}

impl FrameHandler for PrismDemo {
    type Scene = PrismScene;

    fn initialize(&mut self) -> Result<PrismScene> {
        let cubemap = TextureCubeBuilder::new()
            .with_font(self.font.clone())
            .build(self.face_size)?;
        let gpu = GpuContext::new(Arc::clone(&self.window))?;

        let texture = CubeTexture::from_data(&gpu, &cubemap, "Environment Cube Map");
        let mesh = Rc::new(Mesh::cube(&gpu));
        let renderer = MeshRenderer::new(&gpu);

        let outer_cube = renderer.create_instance(
            &gpu,
            Rc::clone(&mesh),
            &texture,
            ShadingProgram::Plain,
            outer_cube_model(),
        );
        let prism = renderer.create_instance(&gpu, mesh, &texture, self.program, prism_model(0));

        tracing::info!(
            face_size = self.face_size,
            program = ?self.program,
            "prism scene initialized"
        );

        Ok(PrismScene {
            gpu,
            renderer,
            outer_cube,
            prism,
        })
    }

    fn on_frame(&mut self, scene: &mut PrismScene, frame: FrameInfo) -> Result<()> {
        let size = self.window.inner_size();
        scene.gpu.resize(size.width, size.height);
        scene.renderer.ensure_depth_size(&scene.gpu);

        let plan = plan_frame(frame.tick, frame.viewport, scene.prism.program())?;
        scene.outer_cube.model = plan.outer_cube_model;
        scene.prism.model = plan.prism_model;

        let PrismScene {
            gpu,
            renderer,
            outer_cube,
            prism,
        } = &*scene;

        draw_to_surface(
            gpu,
            "Prism Pass",
            Some(renderer.depth_view()),
            frame.viewport,
            |gpu, pass| {
                renderer.render(gpu, pass, outer_cube, &plan.outer_cube_uniforms())?;
                renderer.render(gpu, pass, prism, &plan.prism_uniforms())
            },
        )
    }
}

/// Loop-scoped handles of the quad scene.
pub struct QuadScene {
    gpu: GpuContext,
    quad: ClipSpaceQuad,
}

/// A single full-screen quad coloured by clip-space position.
pub struct QuadDemo {
    window: Arc<Window>,
}

impl QuadDemo {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl FrameHandler for QuadDemo {
    type Scene = QuadScene;

    fn initialize(&mut self) -> Result<QuadScene> {
        let gpu = GpuContext::new(Arc::clone(&self.window))?;
        let quad = ClipSpaceQuad::new(&gpu);
        tracing::info!("quad scene initialized");
        Ok(QuadScene { gpu, quad })
    }

    fn on_frame(&mut self, scene: &mut QuadScene, frame: FrameInfo) -> Result<()> {
        let size = self.window.inner_size();
        scene.gpu.resize(size.width, size.height);

        let QuadScene { gpu, quad } = &*scene;
        draw_to_surface(gpu, "Quad Pass", None, frame.viewport, |gpu, pass| {
            quad.render(gpu, pass, frame.viewport, frame.tick);
            Ok(())
        })
    }
}

/// Acquire the next surface texture, clear it (and `depth`), set the square
/// `viewport` and let `draw` record into the pass.
///
/// A frame whose surface texture cannot be acquired right now is dropped
/// silently. If `draw` fails nothing is submitted.
fn draw_to_surface<F>(
    gpu: &GpuContext,
    label: &str,
    depth: Option<&wgpu::TextureView>,
    viewport: Viewport,
    draw: F,
) -> Result<()>
where
    F: FnOnce(&GpuContext, &mut wgpu::RenderPass) -> Result<()>,
{
    let Some(output) = gpu.acquire_frame()? else {
        return Ok(());
    };
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(label),
        });

    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: depth.map(|depth_view| wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        // Always the full square; whatever exceeds a non-square surface is cropped
        let [x, y, width, height] = viewport.rect();
        render_pass.set_viewport(x, y, width, height, 0.0, 1.0);

        draw(gpu, &mut render_pass)?;
    }

    gpu.queue.submit(std::iter::once(encoder.finish()));
    output.present();
    Ok(())
}
