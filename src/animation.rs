//! Frame loop lifecycle, tick bookkeeping and viewport reconciliation.
//!
//! [`AnimationLoop`] is an explicit context object: it owns a [`FrameHandler`],
//! the scene handles that handler builds once in
//! [`initialize`](FrameHandler::initialize), a monotonically increasing tick,
//! and the last viewport it derived from the host surface. Nothing here is
//! global, so any number of loops can run side by side (and tests can drive
//! one without a window).
//!
//! ```text
//! Uninitialized --start()--> Running --stop() / frame error--> Stopped
//! ```
//!
//! Each call to [`frame`](AnimationLoop::frame) corresponds to one display
//! refresh. The viewport is always square and driven by the surface's client
//! width.
//!
//! # Example
//!
//! ```
//! use prismbox::{AnimationLoop, FrameHandler, FrameInfo, FrameStatus, HostSurface};
//!
//! struct Canvas;
//! impl HostSurface for Canvas {
//!     fn client_size(&self) -> (i64, i64) { (800, 600) }
//!     fn set_drawing_buffer_size(&mut self, _width: u32, _height: u32) {}
//! }
//!
//! struct Counter;
//! impl FrameHandler for Counter {
//!     type Scene = Vec<u64>;
//!     fn initialize(&mut self) -> prismbox::Result<Self::Scene> { Ok(Vec::new()) }
//!     fn on_frame(&mut self, seen: &mut Vec<u64>, frame: FrameInfo) -> prismbox::Result<()> {
//!         seen.push(frame.tick);
//!         Ok(())
//!     }
//! }
//!
//! let mut animation = AnimationLoop::new(Counter);
//! animation.start().unwrap();
//! assert_eq!(animation.frame(&mut Canvas).unwrap(), FrameStatus::Rendered { tick: 0 });
//! assert_eq!(animation.viewport().unwrap().height, 800);
//! animation.stop();
//! ```

use crate::error::{DemoError, Result};

/// Drawing-buffer dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }

    /// Width over height; 1.0 for a degenerate viewport.
    pub fn aspect(self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// `[x, y, width, height]` of the render-pass viewport, anchored at the
    /// origin and never shrunk to the surface.
    pub fn rect(self) -> [f32; 4] {
        [0.0, 0.0, self.width as f32, self.height as f32]
    }
}

/// Lifecycle state of an [`AnimationLoop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Running,
    /// Terminal.
    Stopped,
}

/// The canvas a loop draws into.
pub trait HostSurface {
    /// Size the host currently reports. May be zero or negative mid-resize.
    fn client_size(&self) -> (i64, i64);

    /// Resize the backing drawing buffer.
    fn set_drawing_buffer_size(&mut self, width: u32, height: u32);
}

/// Per-frame input handed to [`FrameHandler::on_frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameInfo {
    pub tick: u64,
    pub viewport: Viewport,
}

/// The scene-specific half of a loop.
pub trait FrameHandler {
    /// Loop-scoped handles built once and dropped on stop.
    type Scene;

    /// Build everything the frames need. Runs exactly once.
    fn initialize(&mut self) -> Result<Self::Scene>;

    /// Render one frame. An error stops the loop.
    fn on_frame(&mut self, scene: &mut Self::Scene, frame: FrameInfo) -> Result<()>;
}

/// Outcome of a single [`AnimationLoop::frame`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// The handler ran for `tick`.
    Rendered { tick: u64 },
    /// The surface reported a transient size; nothing was rendered.
    Skipped,
    /// The loop is not running; the handler was not invoked.
    Stopped,
}

/// Drives a [`FrameHandler`] through its lifecycle.
pub struct AnimationLoop<H: FrameHandler> {
    handler: H,
    scene: Option<H::Scene>,
    state: LoopState,
    tick: u64,
    last_client_size: Option<(i64, i64)>,
    viewport: Option<Viewport>,
}

impl<H: FrameHandler> AnimationLoop<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            scene: None,
            state: LoopState::Uninitialized,
            tick: 0,
            last_client_size: None,
            viewport: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Tick the next rendered frame will receive.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Viewport from the last reconciliation, if any frame has seen the surface.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn scene(&self) -> Option<&H::Scene> {
        self.scene.as_ref()
    }

    /// Run [`FrameHandler::initialize`] and enter `Running`.
    ///
    /// A failed initialization leaves the loop `Stopped` with no scene.
    pub fn start(&mut self) -> Result<()> {
        if self.state != LoopState::Uninitialized {
            return Err(DemoError::InvalidLoopState {
                operation: "start",
                state: self.state,
            });
        }

        match self.handler.initialize() {
            Ok(scene) => {
                self.scene = Some(scene);
                self.state = LoopState::Running;
                tracing::info!("animation loop started");
                Ok(())
            }
            Err(e) => {
                self.state = LoopState::Stopped;
                tracing::error!(error = %e, "animation loop failed to initialize");
                Err(e)
            }
        }
    }

    /// Drive one refresh against `surface`.
    pub fn frame<S: HostSurface + ?Sized>(&mut self, surface: &mut S) -> Result<FrameStatus> {
        if self.state != LoopState::Running {
            return Ok(FrameStatus::Stopped);
        }
        let viewport = match self.reconcile_viewport(surface) {
            Ok(viewport) => viewport,
            Err(race) => {
                tracing::warn!(tick = self.tick, "skipping frame: {race}");
                return Ok(FrameStatus::Skipped);
            }
        };
        let Some(scene) = self.scene.as_mut() else {
            return Ok(FrameStatus::Stopped);
        };

        let tick = self.tick;
        tracing::trace!(tick, "frame");
        match self.handler.on_frame(scene, FrameInfo { tick, viewport }) {
            Ok(()) => {
                self.tick += 1;
                Ok(FrameStatus::Rendered { tick })
            }
            Err(e) => {
                tracing::error!(tick, error = %e, "frame failed, stopping animation loop");
                self.stop();
                Err(e)
            }
        }
    }

    /// Enter `Stopped` and release the scene. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        self.scene = None;
        self.state = LoopState::Stopped;
        tracing::info!(frames = self.tick, "animation loop stopped");
    }

    /// Compare the surface's size with the last one seen and resize to a
    /// width-driven square on change. A non-positive dimension is a
    /// [`DemoError::ResizeRace`] and leaves the viewport untouched.
    fn reconcile_viewport<S: HostSurface + ?Sized>(&mut self, surface: &mut S) -> Result<Viewport> {
        let (width, height) = surface.client_size();
        if width <= 0 || height <= 0 {
            return Err(DemoError::ResizeRace { width, height });
        }

        if let Some(viewport) = self.viewport
            && self.last_client_size == Some((width, height))
        {
            return Ok(viewport);
        }

        let side = u32::try_from(width).unwrap_or(u32::MAX);
        surface.set_drawing_buffer_size(side, side);
        let viewport = Viewport::square(side);
        self.last_client_size = Some((width, height));
        self.viewport = Some(viewport);
        tracing::debug!(width, height, side, "viewport reconciled");
        Ok(viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeSurface {
        client: (i64, i64),
        buffer: Option<(u32, u32)>,
        resizes: usize,
    }

    impl FakeSurface {
        fn new(width: i64, height: i64) -> Self {
            Self {
                client: (width, height),
                ..Default::default()
            }
        }
    }

    impl HostSurface for FakeSurface {
        fn client_size(&self) -> (i64, i64) {
            self.client
        }

        fn set_drawing_buffer_size(&mut self, width: u32, height: u32) {
            self.buffer = Some((width, height));
            self.resizes += 1;
        }
    }

    #[derive(Default)]
    struct Recorder {
        initialized: usize,
        frames: Vec<FrameInfo>,
        fail_init: bool,
        fail_at: Option<u64>,
    }

    struct Scene;

    impl FrameHandler for Recorder {
        type Scene = Scene;

        fn initialize(&mut self) -> Result<Scene> {
            self.initialized += 1;
            if self.fail_init {
                return Err(DemoError::SurfaceUnavailable("no adapter".into()));
            }
            Ok(Scene)
        }

        fn on_frame(&mut self, _scene: &mut Scene, frame: FrameInfo) -> Result<()> {
            self.frames.push(frame);
            if self.fail_at == Some(frame.tick) {
                return Err(DemoError::SingularMatrix { determinant: 0.0 });
            }
            Ok(())
        }
    }

    fn running(handler: Recorder) -> AnimationLoop<Recorder> {
        let mut animation = AnimationLoop::new(handler);
        animation.start().unwrap();
        animation
    }

    #[test]
    fn viewport_is_square_and_width_driven() {
        let mut animation = running(Recorder::default());
        let mut surface = FakeSurface::new(800, 600);

        animation.frame(&mut surface).unwrap();
        assert_eq!(surface.buffer, Some((800, 800)));
        assert_eq!(animation.viewport(), Some(Viewport::square(800)));

        surface.client = (300, 900);
        animation.frame(&mut surface).unwrap();
        assert_eq!(surface.buffer, Some((300, 300)));
        assert_eq!(animation.handler().frames[1].viewport, Viewport::square(300));
    }

    #[test]
    fn viewport_stays_square_when_the_surface_keeps_its_aspect() {
        // The fake surface never applies the requested buffer size
        let mut animation = running(Recorder::default());
        let mut surface = FakeSurface::new(800, 600);

        for _ in 0..3 {
            animation.frame(&mut surface).unwrap();
        }
        assert_eq!(surface.client, (800, 600));
        for frame in &animation.handler().frames {
            assert_eq!(frame.viewport.rect(), [0.0, 0.0, 800.0, 800.0]);
            assert_eq!(frame.viewport.aspect(), 1.0);
        }
    }

    #[test]
    fn non_positive_size_is_a_resize_race() {
        let mut animation = running(Recorder::default());
        let mut surface = FakeSurface::new(0, 500);

        let err = animation.reconcile_viewport(&mut surface).unwrap_err();
        assert!(matches!(
            err,
            DemoError::ResizeRace {
                width: 0,
                height: 500
            }
        ));
        assert_eq!(surface.resizes, 0);
        assert_eq!(animation.viewport(), None);
    }

    #[test]
    fn unchanged_size_does_not_resize_again() {
        let mut animation = running(Recorder::default());
        let mut surface = FakeSurface::new(640, 480);

        for _ in 0..5 {
            animation.frame(&mut surface).unwrap();
        }
        assert_eq!(surface.resizes, 1);
    }

    #[test]
    fn transient_size_skips_the_frame() {
        let mut animation = running(Recorder::default());
        let mut surface = FakeSurface::new(500, 500);
        animation.frame(&mut surface).unwrap();

        surface.client = (0, 500);
        assert_eq!(animation.frame(&mut surface).unwrap(), FrameStatus::Skipped);
        surface.client = (500, -3);
        assert_eq!(animation.frame(&mut surface).unwrap(), FrameStatus::Skipped);

        assert_eq!(animation.tick(), 1);
        assert_eq!(animation.handler().frames.len(), 1);
        assert_eq!(animation.viewport(), Some(Viewport::square(500)));
        assert_eq!(animation.state(), LoopState::Running);

        surface.client = (500, 500);
        assert_eq!(
            animation.frame(&mut surface).unwrap(),
            FrameStatus::Rendered { tick: 1 }
        );
    }

    #[test]
    fn frame_before_start_does_nothing() {
        let mut animation = AnimationLoop::new(Recorder::default());
        let mut surface = FakeSurface::new(100, 100);

        assert_eq!(animation.frame(&mut surface).unwrap(), FrameStatus::Stopped);
        assert!(animation.handler().frames.is_empty());
        assert_eq!(surface.resizes, 0);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut animation = running(Recorder::default());
        let err = animation.start().unwrap_err();
        assert!(matches!(
            err,
            DemoError::InvalidLoopState {
                operation: "start",
                state: LoopState::Running
            }
        ));
        assert_eq!(animation.handler().initialized, 1);
    }

    #[test]
    fn failed_initialization_leaves_nothing_running() {
        let mut animation = AnimationLoop::new(Recorder {
            fail_init: true,
            ..Default::default()
        });

        assert!(matches!(
            animation.start(),
            Err(DemoError::SurfaceUnavailable(_))
        ));
        assert_eq!(animation.state(), LoopState::Stopped);
        assert!(animation.scene().is_none());

        let mut surface = FakeSurface::new(100, 100);
        assert_eq!(animation.frame(&mut surface).unwrap(), FrameStatus::Stopped);
    }

    #[test]
    fn frame_error_stops_the_loop_and_is_returned() {
        let mut animation = running(Recorder {
            fail_at: Some(2),
            ..Default::default()
        });
        let mut surface = FakeSurface::new(256, 256);

        animation.frame(&mut surface).unwrap();
        animation.frame(&mut surface).unwrap();
        let err = animation.frame(&mut surface).unwrap_err();

        assert!(matches!(err, DemoError::SingularMatrix { .. }));
        assert_eq!(animation.state(), LoopState::Stopped);
        assert!(animation.scene().is_none());
        assert_eq!(animation.frame(&mut surface).unwrap(), FrameStatus::Stopped);
        assert_eq!(animation.handler().frames.len(), 3);
    }

    #[test]
    fn stop_is_idempotent_and_terminal() {
        let mut animation = running(Recorder::default());
        animation.stop();
        animation.stop();

        assert_eq!(animation.state(), LoopState::Stopped);
        assert!(animation.scene().is_none());
        assert!(matches!(
            animation.start(),
            Err(DemoError::InvalidLoopState { .. })
        ));
        assert_eq!(animation.handler().initialized, 1);
    }

    #[test]
    fn independent_loops_keep_their_own_ticks() {
        let mut a = running(Recorder::default());
        let mut b = running(Recorder::default());
        let mut surface = FakeSurface::new(64, 64);

        for _ in 0..3 {
            a.frame(&mut surface).unwrap();
        }
        b.frame(&mut surface).unwrap();

        assert_eq!(a.tick(), 3);
        assert_eq!(b.tick(), 1);
    }

    #[test]
    fn degenerate_viewport_aspect_is_one() {
        assert_eq!(Viewport { width: 10, height: 0 }.aspect(), 1.0);
        assert_eq!(Viewport { width: 300, height: 150 }.aspect(), 2.0);
    }
}
