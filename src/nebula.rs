//! Viewer builder and runner.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::NebulaConfig;
use crate::error::{GpuError, RunError};
use crate::gpu::{CameraConfig, GpuState, OrbitCamera};
use crate::input::Input;
use crate::scene::Scene;
use crate::selector::Shape;
use crate::spawn::SpawnContext;
use crate::starfield::{Starfield, StarfieldConfig};
use crate::time::FrameClock;
use crate::visuals::{Palette, VisualConfig};

/// A particle morphing viewer.
///
/// Use method chaining to configure, then call `.run()` to open the window.
///
/// ```ignore
/// Nebula::new()
///     .with_particle_count(18_000)
///     .with_visuals(|v| {
///         v.point_size(45.0);
///     })
///     .run()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Nebula {
    config: NebulaConfig,
}

impl Nebula {
    /// Create a viewer with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: NebulaConfig) -> Self {
        Self { config }
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.config.particle_count = count;
        self
    }

    /// Set the palette particles draw their color from.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.config.palette = palette;
        self
    }

    /// Set the shapes visited on successive clicks.
    pub fn with_sequence(mut self, shapes: impl Into<Vec<Shape>>) -> Self {
        self.config.sequence = shapes.into();
        self
    }

    /// Set the fraction of remaining distance closed per tick.
    pub fn with_morph_speed(mut self, speed: f32) -> Self {
        self.config.morph_speed = speed;
        self
    }

    /// Set the whole-cloud rotation per tick, in radians.
    pub fn with_spin(mut self, radians_per_tick: f32) -> Self {
        self.config.spin_per_tick = radians_per_tick;
        self
    }

    /// Fix the RNG seed so every launch builds the same field.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Configure visual settings.
    pub fn with_visuals<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut VisualConfig),
    {
        configure(&mut self.config.visuals);
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.config.camera = camera;
        self
    }

    pub fn with_starfield(mut self, starfield: StarfieldConfig) -> Self {
        self.config.starfield = starfield;
        self
    }

    /// Set the window title prefix.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn config(&self) -> &NebulaConfig {
        &self.config
    }

    /// Build the clouds, open the window and run until it is closed.
    pub fn run(self) -> Result<(), RunError> {
        let scene = Scene::new(&self.config)?;

        let stars = self.config.starfield.enabled.then(|| {
            let mut ctx = match self.config.seed {
                Some(seed) => SpawnContext::from_seed(seed.wrapping_add(1)),
                None => SpawnContext::from_entropy(),
            };
            Starfield::generate(&self.config.starfield, &mut ctx)
        });

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config, scene, stars);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    config: NebulaConfig,
    scene: Scene,
    stars: Option<Starfield>,
    camera: OrbitCamera,
    input: Input,
    clock: FrameClock,
    error: Option<RunError>,
}

impl App {
    fn new(config: NebulaConfig, scene: Scene, stars: Option<Starfield>) -> Self {
        let camera = OrbitCamera::new(config.camera);
        Self {
            window: None,
            gpu_state: None,
            config,
            scene,
            stars,
            camera,
            input: Input::new(),
            clock: FrameClock::new(),
            error: None,
        }
    }

    fn title(&self) -> String {
        format!("{} | {}", self.config.title, self.scene.current_shape().instruction())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: RunError) {
        tracing::error!(error = %err, "viewer failed");
        self.error = Some(err);
        event_loop.exit();
    }

    /// Apply this frame's input, then advance the morph once.
    fn update(&mut self) {
        let (_, dt) = self.clock.tick();

        if self.input.clicked() {
            self.scene.advance();
            if let Some(window) = &self.window {
                window.set_title(&self.title());
            }
        }

        if self.input.held() {
            self.camera.orbit(self.input.mouse_delta());
        }
        self.camera.zoom(self.input.scroll_delta());
        self.camera.update(dt, !self.input.dragging());
        self.input.begin_frame();

        self.scene.tick();

        if self.clock.frame() % 600 == 0 {
            tracing::debug!(fps = self.clock.fps(), "frame stats");
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.config.window_size;
        let window_attrs = Window::default_attributes()
            .with_title(self.title())
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, RunError::Window(err)),
        };
        self.window = Some(window.clone());

        let gpu = pollster::block_on(GpuState::new(
            window,
            &self.scene,
            self.stars.as_ref(),
            &self.config.visuals,
        ));
        match gpu {
            Ok(gpu_state) => {
                tracing::info!(
                    particles = self.scene.len(),
                    stars = self.stars.as_ref().map_or(0, Starfield::len),
                    "viewer started"
                );
                self.gpu_state = Some(gpu_state);
            }
            Err(err) => self.fail(event_loop, RunError::Gpu(err)),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(size);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.set_pixel_ratio(scale_factor);
                }
            }
            WindowEvent::RedrawRequested => {
                self.update();

                if let Some(gpu_state) = &mut self.gpu_state {
                    match gpu_state.render(&self.scene, &self.camera, self.clock.elapsed()) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu_state.resize(winit::dpi::PhysicalSize {
                                width: gpu_state.config.width,
                                height: gpu_state.config.height,
                            });
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            self.fail(event_loop, RunError::Gpu(GpuError::OutOfMemory));
                            return;
                        }
                        Err(err) => tracing::warn!(error = ?err, "dropped frame"),
                    }
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
