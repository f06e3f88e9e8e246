//! Platform layer: window, event loop, egui bottom bar and the per-frame
//! tick that drives the orientation controller and texture loading.

pub mod timing;
pub mod ui;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use asset::fetch::SourceFetcher;
use asset::mesh::MeshData;
use asset::{Material, TextureLoader, TextureSources};
use corelib::Quat;
use corelib::bottom_bar::Direction;
use corelib::orientation::OrientationController;
use corelib::transform::{Transform, pinned_pose};
use renderer::GpuState;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::timing::FrameTiming;

const TITLE: &str = "Vitrine";

/// Everything the viewer needs from the command line.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub backends: wgpu::Backends,
    pub show_fps: bool,
    pub width: u32,
    pub height: u32,
    pub textures: TextureSources,
    pub turn_speed_deg: f32,
    pub initial_rotation: Quat,
    pub select: Option<Direction>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            show_fps: false,
            width: 1280,
            height: 720,
            textures: TextureSources::default(),
            turn_speed_deg: corelib::orientation::DEFAULT_SPEED_DEG,
            initial_rotation: pinned_pose(0.0),
            select: None,
        }
    }
}

/// Open the viewer window and block until it is closed.
pub fn run(config: ViewerConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("vitrine-io")
        .build()
        .context("Failed to start async runtime")?;

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = ViewerApp::new(config, runtime);
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow::anyhow!("Event loop error: {e:?}"))?;
    Ok(())
}

struct Gui {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct ViewerApp {
    config: ViewerConfig,
    runtime: tokio::runtime::Runtime,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    gui: Option<Gui>,

    transform: Transform,
    controller: OrientationController,
    material: Material,
    loader: Option<TextureLoader>,
    timing: FrameTiming,
}

impl ViewerApp {
    fn new(config: ViewerConfig, runtime: tokio::runtime::Runtime) -> Self {
        let transform = Transform::from_rotation(config.initial_rotation);
        let controller =
            OrientationController::new(transform.rotation).with_speed(config.turn_speed_deg);
        Self {
            config,
            runtime,
            window: None,
            gpu: None,
            gui: None,
            transform,
            controller,
            material: Material::new(),
            loader: None,
            timing: FrameTiming::new(Instant::now()),
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Failed to create window")?,
        );
        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let mesh = MeshData::cuboid([1.0, 1.0, 1.0]);
        let gpu = pollster::block_on(GpuState::new(window.clone(), self.config.backends, &mesh))?;

        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(
            gpu.device(),
            gpu.surface_format(),
            egui_wgpu::RendererOptions::default(),
        );

        self.gui = Some(Gui {
            ctx,
            state,
            renderer,
        });
        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(())
    }

    /// Startup work: texture fetches and the optional preselected direction.
    fn start(&mut self) {
        let fetcher = Arc::new(SourceFetcher::new());
        self.loader = Some(TextureLoader::spawn(
            self.runtime.handle(),
            fetcher,
            &self.config.textures,
        ));
        if let Some(direction) = self.config.select {
            self.activate(direction);
        }
    }

    fn activate(&mut self, direction: Direction) {
        self.controller.activate(direction, &self.transform);
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        let direction = match event.physical_key {
            PhysicalKey::Code(KeyCode::ArrowLeft) => Direction::Left,
            PhysicalKey::Code(KeyCode::ArrowRight) => Direction::Right,
            PhysicalKey::Code(KeyCode::ArrowUp) => Direction::Front,
            _ => return,
        };
        self.activate(direction);
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let fps = self.timing.tick(now);
        let dt = self.timing.frame_dt;

        self.controller.update(&mut self.transform, dt);

        let pending = match self.loader.as_mut() {
            Some(loader) => {
                loader.apply_pending(&mut self.material);
                loader.pending()
            }
            None => 0,
        };

        let labels = self.controller.labels();
        let (Some(window), Some(gpu), Some(gui)) =
            (self.window.as_ref(), self.gpu.as_mut(), self.gui.as_mut())
        else {
            return;
        };

        if self.config.show_fps {
            if let Some(fps) = fps {
                window.set_title(&format!(
                    "{TITLE} - {:.1} fps ({:.2} ms)",
                    fps,
                    dt * 1000.0
                ));
            }
        }

        gpu.sync_material(&self.material);

        let raw_input = gui.state.take_egui_input(window);
        let mut clicked = None;
        let full_output = gui.ctx.run(raw_input, |ctx| {
            clicked = ui::bottom_bar(ctx, labels);
            ui::loading_hint(ctx, pending);
        });
        gui.state
            .handle_platform_output(window, full_output.platform_output);

        let tris = gui
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = gpu.size();
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };
        let egui_renderer = &mut gui.renderer;
        let textures_delta = full_output.textures_delta;

        let result = gpu.render(self.transform.matrix(), |device, queue, encoder, view| {
            for (id, delta) in &textures_delta.set {
                egui_renderer.update_texture(device, queue, *id, delta);
            }
            egui_renderer.update_buffers(device, queue, encoder, &tris, &screen);
            {
                let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("EguiPass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        depth_slice: None,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                let mut pass = pass.forget_lifetime();
                egui_renderer.render(&mut pass, &tris, &screen);
            }
            for id in &textures_delta.free {
                egui_renderer.free_texture(id);
            }
        });

        match result {
            Ok(()) => {}
            Err(e) if GpuState::is_surface_lost(&e) => {
                log::warn!("Surface lost/outdated, reconfiguring");
                gpu.recreate_surface();
            }
            Err(e) => log::error!("Render error: {e:?}"),
        }

        if let Some(direction) = clicked {
            self.activate(direction);
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_window(event_loop) {
            log::error!("Failed to initialize viewer: {e:#}");
            event_loop.exit();
            return;
        }
        self.start();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let (Some(gui), Some(window)) = (self.gui.as_mut(), self.window.as_ref()) {
            if gui.state.on_window_event(window, &event).consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::debug!("Resized: {}x{}", size.width, size.height);
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event),
            WindowEvent::RedrawRequested => self.frame(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Vsync paces the loop; keep redrawing so transitions and late
        // textures show up without input.
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
