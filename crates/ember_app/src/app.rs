//! Winit application handler driving the renderer.

use std::sync::Arc;

use ember_core::{Color, Point3};
use ember_gpu::{BurstQueue, GpuContext, GpuContextConfig, RendererError, SceneRenderer};
use ember_scene::ViewRig;
use rand::Rng;
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::scene::{self, DemoScene};

/// Cursor travel below this many pixels between press and release counts
/// as a tap.
const TAP_SLOP: f32 = 6.0;
const ZOOM_PER_LINE: f32 = 0.1;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Renderer(#[from] RendererError),
    #[error("scene assembly failed: {0}")]
    Scene(#[from] ember_core::EmberError),
}

pub fn run(kind: DemoScene) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = EmberApp::new(kind);
    event_loop.run_app(&mut app)?;
    Ok(())
}

struct EmberApp {
    scene_kind: DemoScene,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    surface_config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<SceneRenderer>,
    rig: ViewRig,
    bursts: Option<BurstQueue>,
    cursor: (f32, f32),
    press_origin: Option<(f32, f32)>,
    dragging: bool,
}

impl EmberApp {
    fn new(scene_kind: DemoScene) -> Self {
        Self {
            scene_kind,
            window: None,
            surface: None,
            surface_config: None,
            renderer: None,
            rig: ViewRig::new(),
            bursts: None,
            cursor: (0.0, 0.0),
            press_origin: None,
            dragging: false,
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let attributes = Window::default_attributes()
            .with_title("Ember")
            .with_inner_size(LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let (context, surface) = pollster::block_on(GpuContext::with_surface(
            window.clone(),
            GpuContextConfig::default(),
        ))?;

        let mut renderer = SceneRenderer::new(context);
        let handles = scene::build(self.scene_kind, &mut renderer, &self.rig)?;
        renderer.surface_created();

        let size = window.inner_size();
        let config = self.configure_surface(&renderer, &surface, size.width, size.height);
        renderer.surface_changed(size.width, size.height);

        info!(width = size.width, height = size.height, "window ready");

        self.bursts = handles.bursts;
        self.surface = Some(surface);
        self.surface_config = Some(config);
        self.renderer = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    fn configure_surface(
        &self,
        renderer: &SceneRenderer,
        surface: &wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> wgpu::SurfaceConfiguration {
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: renderer.context().texture_format(),
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(renderer.context().device(), &config);
        config
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (Some(surface), Some(config), Some(renderer)) = (
            self.surface.as_ref(),
            self.surface_config.as_mut(),
            self.renderer.as_mut(),
        ) else {
            return;
        };
        if width > 0 && height > 0 {
            config.width = width;
            config.height = height;
            surface.configure(renderer.context().device(), config);
        }
        renderer.surface_changed(width, height);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(surface), Some(config), Some(renderer)) = (
            self.window.as_ref(),
            self.surface.as_ref(),
            self.surface_config.as_ref(),
            self.renderer.as_mut(),
        ) else {
            return;
        };

        match surface.get_current_texture() {
            Ok(frame) => {
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                renderer.draw_frame(&view, &self.rig);
                frame.present();
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(renderer.context().device(), config);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("surface out of memory, exiting");
                event_loop.exit();
                return;
            }
            Err(err) => {
                warn!("skipping frame: {err}");
            }
        }

        window.request_redraw();
    }

    fn fire_burst(&self, position: Point3) {
        if let Some(bursts) = &self.bursts {
            let hue = rand::rng().random_range(0.0..360.0);
            bursts.fire(position, Color::from_hsv(hue, 0.75, 1.0));
        }
    }

    /// Maps the cursor to a world point in front of the default camera.
    fn cursor_burst_position(&self) -> Point3 {
        let (width, height) = self
            .surface_config
            .as_ref()
            .map(|config| (config.width as f32, config.height as f32))
            .unwrap_or((1.0, 1.0));
        let nx = (self.cursor.0 / width.max(1.0)) * 2.0 - 1.0;
        let ny = 1.0 - (self.cursor.1 / height.max(1.0)) * 2.0;
        Point3::new(nx * 3.0, 1.2 + ny * 1.5, -1.0)
    }
}

impl ApplicationHandler for EmberApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.initialize(event_loop) {
                error!("failed to initialize: {err}");
                event_loop.exit();
                return;
            }
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => self.resize(size.width, size.height),

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                if self.dragging {
                    self.rig.on_drag(x - self.cursor.0, y - self.cursor.1);
                }
                self.cursor = (x, y);
            }

            WindowEvent::MouseInput { state, button, .. } => match (state, button) {
                (ElementState::Pressed, MouseButton::Left) => {
                    self.dragging = true;
                    self.press_origin = Some(self.cursor);
                }
                (ElementState::Released, MouseButton::Left) => {
                    self.dragging = false;
                    if let Some((x, y)) = self.press_origin.take() {
                        let travel = (self.cursor.0 - x).abs() + (self.cursor.1 - y).abs();
                        if travel < TAP_SLOP {
                            let visible = self.rig.on_tap_toggle();
                            info!(visible, "overlay toggled");
                        }
                    }
                }
                (ElementState::Pressed, MouseButton::Right) => {
                    self.fire_burst(self.cursor_burst_position());
                }
                _ => {}
            },

            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 10.0,
                };
                self.rig.on_zoom(1.0 - lines * ZOOM_PER_LINE);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Space)
                {
                    let mut rng = rand::rng();
                    let position = Point3::new(
                        rng.random_range(-2.0..2.0),
                        rng.random_range(1.0..2.5),
                        rng.random_range(-2.0..0.0),
                    );
                    self.fire_burst(position);
                }
            }

            _ => {}
        }
    }
}
