use std::path::{Path, PathBuf};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::animation::{AnimationLoop, FrameStatus, HostSurface};
use crate::cubemap::TextureCubeBuilder;
use crate::demo::{PrismDemo, QuadDemo};
use crate::error::{DemoError, Result};
use crate::label::LabelFont;
use crate::program::ShadingProgram;

/// Default cube-map face edge length in pixels.
pub const DEFAULT_FACE_SIZE: i64 = 512;

/// Which scene to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DemoKind {
    /// Environment cube with the reflect/refract prism.
    #[default]
    Prism,
    /// Clip-space colour quad.
    Quad,
}

/// Window and scene settings.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub demo: DemoKind,
    /// Passed to the cube-map builder unchecked; it rejects bad sizes.
    pub face_size: i64,
    pub prism_program: ShadingProgram,
    /// TrueType/OpenType font for the face labels, the embedded serif if `None`.
    pub label_font: Option<PathBuf>,
    /// Stop after this many rendered frames.
    pub max_frames: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Prismbox".to_string(),
            width: 800,
            height: 600,
            demo: DemoKind::Prism,
            face_size: DEFAULT_FACE_SIZE,
            prism_program: ShadingProgram::ReflectRefractLit,
            label_font: None,
            max_frames: None,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn demo(mut self, demo: DemoKind) -> Self {
        self.demo = demo;
        self
    }

    pub fn face_size(mut self, face_size: i64) -> Self {
        self.face_size = face_size;
        self
    }

    pub fn prism_program(mut self, program: ShadingProgram) -> Self {
        self.prism_program = program;
        self
    }

    pub fn label_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.label_font = Some(path.into());
        self
    }

    pub fn max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Load the configured label font, or the embedded one.
    pub fn load_label_font(&self) -> Result<LabelFont> {
        match &self.label_font {
            Some(path) => LabelFont::load(path),
            None => LabelFont::embedded(),
        }
    }

    /// Whether `rendered` frames exhaust the frame limit.
    pub fn frame_limit_reached(&self, rendered: u64) -> bool {
        self.max_frames.is_some_and(|limit| rendered >= limit)
    }
}

/// The window as an animation-loop drawing surface.
pub struct WindowSurface {
    window: Arc<Window>,
}

impl WindowSurface {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl HostSurface for WindowSurface {
    fn client_size(&self) -> (i64, i64) {
        let size = self.window.inner_size();
        (size.width as i64, size.height as i64)
    }

    fn set_drawing_buffer_size(&mut self, width: u32, height: u32) {
        // The compositor may apply this later or not at all
        let _ = self
            .window
            .request_inner_size(PhysicalSize::new(width, height));
    }
}

enum ActiveLoop {
    Prism(AnimationLoop<PrismDemo>),
    Quad(AnimationLoop<QuadDemo>),
}

impl ActiveLoop {
    fn start(&mut self) -> Result<()> {
        match self {
            ActiveLoop::Prism(animation) => animation.start(),
            ActiveLoop::Quad(animation) => animation.start(),
        }
    }

    fn frame(&mut self, surface: &mut WindowSurface) -> Result<FrameStatus> {
        match self {
            ActiveLoop::Prism(animation) => animation.frame(surface),
            ActiveLoop::Quad(animation) => animation.frame(surface),
        }
    }

    fn stop(&mut self) {
        match self {
            ActiveLoop::Prism(animation) => animation.stop(),
            ActiveLoop::Quad(animation) => animation.stop(),
        }
    }
}

struct Running {
    window: Arc<Window>,
    surface: WindowSurface,
    active: ActiveLoop,
}

struct DemoApp {
    config: AppConfig,
    font: LabelFont,
    running: Option<Running>,
    error: Option<DemoError>,
}

impl DemoApp {
    fn launch(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attrs = WindowAttributes::default()
            .with_title(&self.config.title)
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| DemoError::SurfaceUnavailable(e.to_string()))?,
        );

        let mut active = match self.config.demo {
            DemoKind::Prism => ActiveLoop::Prism(AnimationLoop::new(PrismDemo::new(
                Arc::clone(&window),
                self.config.face_size,
                self.config.prism_program,
                self.font.clone(),
            ))),
            DemoKind::Quad => ActiveLoop::Quad(AnimationLoop::new(QuadDemo::new(Arc::clone(&window)))),
        };
        active.start()?;

        window.request_redraw();
        self.running = Some(Running {
            surface: WindowSurface::new(Arc::clone(&window)),
            window,
            active,
        });
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: DemoError) {
        if let Some(running) = self.running.as_mut() {
            running.active.stop();
        }
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() || self.error.is_some() {
            return;
        }
        if self.config.frame_limit_reached(0) {
            tracing::info!("frame limit is zero, nothing to render");
            event_loop.exit();
            return;
        }
        if let Err(e) = self.launch(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                running.active.stop();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => match running.active.frame(&mut running.surface) {
                Ok(FrameStatus::Rendered { tick }) => {
                    if self.config.frame_limit_reached(tick + 1) {
                        tracing::info!(frames = tick + 1, "frame limit reached");
                        running.active.stop();
                        event_loop.exit();
                    } else {
                        running.window.request_redraw();
                    }
                }
                Ok(FrameStatus::Skipped) => running.window.request_redraw(),
                Ok(FrameStatus::Stopped) => event_loop.exit(),
                Err(e) => self.fail(event_loop, e),
            },
            _ => {}
        }
    }
}

/// Open a window and run the configured demo until it is closed, reaches its
/// frame limit, or fails.
///
/// # Example
/// ```ignore
/// prismbox::run(AppConfig::new().demo(DemoKind::Quad).max_frames(600))?;
/// ```
pub fn run(config: AppConfig) -> Result<()> {
    let font = config.load_label_font()?;

    let event_loop = EventLoop::new().map_err(|e| DemoError::SurfaceUnavailable(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DemoApp {
        config,
        font,
        running: None,
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| DemoError::SurfaceUnavailable(e.to_string()))?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Build the configured cube map and write its faces to `dir` as PNG.
pub fn export_faces(config: &AppConfig, dir: &Path) -> Result<()> {
    let cubemap = TextureCubeBuilder::new()
        .with_font(config.load_label_font()?)
        .build(config.face_size)?;
    cubemap.export_png(dir)?;
    tracing::info!(dir = %dir.display(), size = cubemap.size(), "exported cube-map faces");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_scene() {
        let config = AppConfig::default();
        assert_eq!(config.demo, DemoKind::Prism);
        assert_eq!(config.face_size, 512);
        assert_eq!(config.prism_program, ShadingProgram::ReflectRefractLit);
        assert!(config.label_font.is_none());
        assert!(config.max_frames.is_none());
    }

    #[test]
    fn builder_sets_every_field() {
        let config = AppConfig::new()
            .title("Quad")
            .size(300, 900)
            .demo(DemoKind::Quad)
            .face_size(64)
            .prism_program(ShadingProgram::ReflectRefract)
            .label_font("/fonts/label.ttf")
            .max_frames(10);

        assert_eq!(config.title, "Quad");
        assert_eq!((config.width, config.height), (300, 900));
        assert_eq!(config.demo, DemoKind::Quad);
        assert_eq!(config.face_size, 64);
        assert_eq!(config.prism_program, ShadingProgram::ReflectRefract);
        assert_eq!(config.label_font, Some(PathBuf::from("/fonts/label.ttf")));
        assert_eq!(config.max_frames, Some(10));
    }

    #[test]
    fn zero_frame_limit_is_reached_before_any_frame() {
        let config = AppConfig::new().max_frames(0);
        assert!(config.frame_limit_reached(0));
    }

    #[test]
    fn frame_limit_counts_rendered_frames() {
        let config = AppConfig::new().max_frames(3);
        assert!(!config.frame_limit_reached(0));
        assert!(!config.frame_limit_reached(2));
        assert!(config.frame_limit_reached(3));
        assert!(!AppConfig::new().frame_limit_reached(u64::MAX));
    }

    #[test]
    fn default_label_font_is_the_embedded_one() {
        assert!(AppConfig::new().load_label_font().is_ok());
    }

    #[test]
    fn missing_font_file_is_an_io_error() {
        let config = AppConfig::new().label_font("/definitely/not/here.ttf");
        assert!(matches!(config.load_label_font(), Err(DemoError::Io(_))));
    }

    #[test]
    fn export_rejects_invalid_face_size_before_writing() {
        let dir = std::env::temp_dir().join(format!("prismbox-bad-export-{}", std::process::id()));
        let config = AppConfig::new().face_size(0);

        let err = export_faces(&config, &dir).unwrap_err();
        assert!(matches!(err, DemoError::InvalidTextureSize(0)));
        assert!(!dir.exists());
    }
}
