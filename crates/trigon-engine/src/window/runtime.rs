use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::error::{PipelineError, RenderError};
use crate::input::{apply_key, platform::translate_key_event, Key};
use crate::scene::{RenderDecision, RenderScheduler, Scene, SceneKind};
use crate::surface::RenderSurface;
use crate::texture::ImageLoader;
use crate::transform::CameraState;

/// Window and scene configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub scene: SceneKind,
    /// Image the textured scene samples: a path, a `file://` or an `http(s)://` URL.
    pub texture: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "trigon".to_string(),
            initial_size: LogicalSize::new(800.0, 800.0),
            scene: SceneKind::LayeredTriangles,
            texture: None,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and renders `config.scene` until the window closes
    /// or Escape is pressed.
    ///
    /// Rendering is event-driven: once at startup, then on resize, redraw
    /// requests and camera changes. Returns the first fatal error.
    pub fn run<L>(config: RuntimeConfig, gpu_init: GpuInit, loader: L) -> Result<()>
    where
        L: ImageLoader + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut state = AppState::new(config, gpu_init, loader);
        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// The scene and everything it renders with. Lives as long as the window.
struct Live {
    entry: WindowEntry,
    surface: RenderSurface,
    scene: Scene,
    scheduler: RenderScheduler,
}

struct AppState<L> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    loader: L,

    camera: CameraState,
    live: Option<Live>,

    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<L: ImageLoader> AppState<L> {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, loader: L) -> Self {
        Self {
            config,
            gpu_init,
            loader,
            camera: CameraState::default(),
            live: None,
            exit_requested: false,
            failure: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.request_exit(event_loop);
    }

    fn create_live(&self, event_loop: &ActiveEventLoop) -> Result<Live> {
        let attrs = Window::default_attributes()
            .with_title(format!("{} - {}", self.config.title, self.config.scene))
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let kind = self.config.scene;
        let scene = entry
            .with_gpu(|gpu| Scene::build(gpu, kind))
            .with_context(|| format!("failed to build scene `{kind}`"))?;
        let scheduler = RenderScheduler::new(scene.needs_texture());

        Ok(Live {
            entry,
            surface: RenderSurface::new(),
            scene,
            scheduler,
        })
    }

    /// Runs one render request through the scheduler.
    fn request_render(&mut self, event_loop: &ActiveEventLoop) {
        let Some(live) = self.live.as_mut() else { return };

        match live.scheduler.request(live.scene.texture()) {
            RenderDecision::RenderNow => self.render(event_loop),
            RenderDecision::Coalesced => {}
            RenderDecision::FetchFirst => {
                let fetched = match self.config.texture.as_deref() {
                    Some(uri) => {
                        let (scene, loader) = (&mut live.scene, &self.loader);
                        live.entry
                            .with_gpu(|gpu| pollster::block_on(scene.prepare(gpu, loader, uri)))
                    }
                    None => Err(PipelineError::TextureNotReady),
                };

                match fetched {
                    Ok(()) => {}
                    Err(PipelineError::TextureNotReady) => {
                        log::error!(
                            "scene `{}` samples a texture but none was configured",
                            live.scene.kind()
                        );
                    }
                    Err(err) => log::error!("texture fetch failed, nothing drawn: {err}"),
                }

                if live.scheduler.fetch_finished(live.scene.texture()) {
                    self.render(event_loop);
                }
            }
        }
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let camera = self.camera;
        let Some(live) = self.live.as_mut() else { return };

        let size = live.entry.with_gpu(|gpu| gpu.size());
        if size.width == 0 || size.height == 0 {
            return;
        }

        let Live {
            entry,
            surface,
            scene,
            ..
        } = live;
        let result = entry.with_gpu(|gpu| scene.render(gpu, surface, camera));

        match result {
            Ok(()) => {}
            Err(RenderError::Surface(err)) => {
                match entry.with_gpu(|gpu| gpu.handle_surface_error(err.clone())) {
                    SurfaceErrorAction::Reconfigured => {
                        entry.with_window(|w| w.request_redraw());
                    }
                    SurfaceErrorAction::SkipFrame => log::debug!("frame skipped: {err}"),
                    SurfaceErrorAction::Fatal => {
                        self.fail(event_loop, anyhow::anyhow!("fatal surface error: {err}"));
                    }
                }
            }
            Err(RenderError::Pipeline(err)) => log::error!("render failed: {err}"),
        }
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, key: Key) {
        if key == Key::Escape {
            self.request_exit(event_loop);
            return;
        }
        if let Some(camera) = apply_key(self.camera, key) {
            self.camera = camera;
            self.request_render(event_loop);
        }
    }
}

impl<L: ImageLoader> ApplicationHandler for AppState<L> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.live.is_some() {
            return;
        }

        match self.create_live(event_loop) {
            Ok(live) => {
                self.live = Some(live);
                self.request_render(event_loop);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.live = None;
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if let Some(live) = self.live.as_mut() {
                    live.entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    live.entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(live) = self.live.as_mut() {
                    let new_size = live.entry.with_window(|w| w.inner_size());
                    live.entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    live.entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(key) = translate_key_event(&event) {
                    self.on_key(event_loop, key);
                }
            }

            WindowEvent::RedrawRequested => self.request_render(event_loop),

            _ => {}
        }
    }
}
