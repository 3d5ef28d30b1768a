use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::{Camera, CameraKind, Lens, StaticCamera};
use crate::composer::RenderComposer;
use crate::frame::{FpsCounter, FrameLimiter};
use crate::geometry::Polyhedron;
use crate::gpu::{GpuContext, GpuError};
use crate::input::{EventTranslator, Keymap};
use crate::orbit_camera::{CameraError, OrbitCamera, OrbitConfig};
use crate::state::{Flow, SceneState};
use crate::texture::{Texture, TextureError, TextureImage, TextureOptions};

/// Anything that stops the app from starting or keeps it from running.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] GpuError),
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Configuration for the app window and scene.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Target frames per second; `0` disables the limiter.
    pub frame_rate: u32,
    pub texture_path: PathBuf,
    pub texture: TextureOptions,
    pub camera: CameraKind,
    /// Starting eye position for the orbit camera.
    pub eye: Vec3,
    pub lens: Lens,
    pub orbit: OrbitConfig,
    pub keymap: Keymap,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Lab".to_string(),
            width: 800,
            height: 600,
            frame_rate: 60,
            texture_path: PathBuf::from("wall.jpg"),
            texture: TextureOptions::default(),
            camera: CameraKind::default(),
            eye: Vec3::new(0.0, 0.0, -5.0),
            lens: Lens::default(),
            orbit: OrbitConfig::default(),
            keymap: Keymap::default(),
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

    pub fn frame_rate(mut self, fps: u32) -> Self {
        self.frame_rate = fps;
        self
    }

    pub fn texture_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.texture_path = path.into();
        self
    }

    pub fn texture_options(mut self, options: TextureOptions) -> Self {
        self.texture = options;
        self
    }

    pub fn camera(mut self, kind: CameraKind) -> Self {
        self.camera = kind;
        self
    }

    pub fn eye(mut self, eye: Vec3) -> Self {
        self.eye = eye;
        self
    }

    /// Build the configured camera strategy.
    pub fn build_camera(&self) -> Result<Box<dyn Camera>, CameraError> {
        let camera: Box<dyn Camera> = match self.camera {
            CameraKind::Orbit => Box::new(OrbitCamera::initialize(self.eye, self.lens, self.orbit)?),
            CameraKind::Static => Box::new(StaticCamera {
                lens: self.lens,
                ..StaticCamera::default()
            }),
        };
        Ok(camera)
    }
}

/// Open the window and run until the user quits.
///
/// The texture is decoded and the camera built before the window opens, so
/// a missing image or a degenerate eye fails fast.
///
/// # Example
/// ```no_run
/// use orbitlab::{AppConfig, run};
///
/// run(AppConfig::new().title("Cube").texture_path("crate.png")).unwrap();
/// ```
pub fn run(config: AppConfig) -> Result<(), AppError> {
    let image = TextureImage::open(&config.texture_path, &config.texture)?;
    let camera = config.build_camera()?;
    let scene = SceneState::new(camera, config.width, config.height);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = LabApp::Pending(Box::new(Pending {
        config,
        image,
        scene,
    }));
    event_loop.run_app(&mut app)?;

    match app {
        LabApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

/// Everything prepared before the window exists.
struct Pending {
    config: AppConfig,
    image: TextureImage,
    scene: SceneState<Box<dyn Camera>>,
}

// Field order is drop order: GPU resources go before the device, the
// surface before its window.
struct Running {
    composer: RenderComposer,
    gpu: GpuContext,
    window: Arc<Window>,
    scene: SceneState<Box<dyn Camera>>,
    translator: EventTranslator,
    keymap: Keymap,
    limiter: FrameLimiter,
    fps: FpsCounter,
    title: String,
}

enum LabApp {
    Pending(Box<Pending>),
    Running(Box<Running>),
    Failed(AppError),
    Finished,
}

impl Running {
    fn start(event_loop: &ActiveEventLoop, pending: Pending) -> Result<Self, AppError> {
        let Pending {
            config,
            image,
            scene,
        } = pending;

        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = GpuContext::new(window.clone())?;
        let texture = Texture::upload(&gpu, &image, &config.texture, "Surface Texture")?;
        let composer = RenderComposer::new(&gpu, &Polyhedron::cube(), texture);

        let now = Instant::now();
        tracing::info!(
            width = gpu.width(),
            height = gpu.height(),
            fps = config.frame_rate,
            "window ready"
        );

        Ok(Self {
            composer,
            gpu,
            window,
            scene,
            translator: EventTranslator::new(&config.keymap),
            keymap: config.keymap,
            limiter: FrameLimiter::new(config.frame_rate, now),
            fps: FpsCounter::new(now),
            title: config.title,
        })
    }

    fn redraw(&mut self) -> Result<(), AppError> {
        let now = Instant::now();
        self.limiter.mark_frame(now);

        let scene = &self.scene;
        match self
            .composer
            .render(&self.gpu, &*scene.camera, scene.rotation, scene.mode)
        {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost, reconfiguring");
                self.gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(wgpu::SurfaceError::OutOfMemory.into());
            }
            Err(err) => tracing::warn!(error = %err, "skipping frame"),
        }

        if let Some(fps) = self.fps.tick(now) {
            self.window
                .set_title(&format!("{} FPS: {:.1}", self.title, fps));
        }
        Ok(())
    }

    /// Returns true when the loop should stop.
    fn handle_window_event(&mut self, event: &WindowEvent) -> Result<bool, AppError> {
        match event {
            WindowEvent::RedrawRequested => {
                self.redraw()?;
                return Ok(false);
            }
            WindowEvent::Resized(size) => self.gpu.resize(size.width, size.height),
            _ => {}
        }

        let Some(input) = self.translator.translate(event) else {
            return Ok(false);
        };
        let modifier_held = self.translator.modifier_held();
        Ok(self.scene.handle(&input, &self.keymap, modifier_held) == Flow::Exit)
    }
}

impl LabApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        tracing::error!(error = %err, "stopping");
        *self = LabApp::Failed(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for LabApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !matches!(self, LabApp::Pending(_)) {
            return;
        }
        let LabApp::Pending(pending) = std::mem::replace(self, LabApp::Finished) else {
            return;
        };

        match Running::start(event_loop, *pending) {
            Ok(running) => *self = LabApp::Running(Box::new(running)),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let LabApp::Running(app) = self else {
            return;
        };

        match app.handle_window_event(&event) {
            Ok(false) => {}
            Ok(true) => {
                tracing::info!("quit requested");
                event_loop.exit();
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let LabApp::Running(app) = self else {
            return;
        };

        if app.limiter.is_due(Instant::now()) {
            app.window.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(app.limiter.deadline()));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let LabApp::Running(app) = self {
            tracing::info!(fps = app.fps.fps(), "shutting down");
            *self = LabApp::Finished;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_lab_setup() {
        let config = AppConfig::default();
        assert_eq!(config.title, "Lab");
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.texture_path, PathBuf::from("wall.jpg"));
        assert_eq!(config.eye, Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn builder_overrides_fields() {
        let config = AppConfig::new()
            .title("Cube")
            .size(1024, 768)
            .frame_rate(0)
            .camera(CameraKind::Static);
        assert_eq!(config.title, "Cube");
        assert_eq!((config.width, config.height), (1024, 768));
        assert_eq!(config.frame_rate, 0);
        assert_eq!(config.camera, CameraKind::Static);
    }

    #[test]
    fn orbit_camera_starts_at_configured_eye() {
        let camera = AppConfig::default().build_camera().unwrap();
        assert!((camera.eye() - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-4);
    }

    #[test]
    fn degenerate_eye_fails_before_window() {
        let err = AppConfig::new().eye(Vec3::ZERO).build_camera().err();
        assert_eq!(err, Some(CameraError::Degenerate(Vec3::ZERO)));
    }

    #[test]
    fn static_camera_uses_configured_lens() {
        let mut config = AppConfig::new().camera(CameraKind::Static);
        config.lens = Lens::new(60.0, 0.5, 100.0);
        let camera = config.build_camera().unwrap();
        let (proj, _) = camera.projection_and_view();
        assert_eq!(proj, config.lens.projection());
    }

    #[test]
    fn missing_texture_fails_before_window() {
        let config = AppConfig::new().texture_path("definitely/not/here.png");
        assert!(matches!(run(config), Err(AppError::Texture(_))));
    }
}
