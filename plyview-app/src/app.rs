//! Application shell: window, render loop, and event wiring.

use crate::camera::{Camera, Projection};
use crate::controls::OrbitControls;
use crate::state::{LoadStatus, MeshSlot, ReloadRequest, Selection, ViewerState};
use crate::ui::{MenuAction, UiLayer, viewer_panel};
use glam::{Mat4, Vec3};
use plyview_data::{PlyGeometry, load_ply_file, normalize_geometry, triangulate_points};
use plyview_fetch::{LoadMessage, fetch_geometry};
use plyview_gpu::{GpuMesh, MeshPipeline, Renderer, SceneUniforms, SurfaceWrapper, wgpu};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Startup configuration from the command line.
pub struct ViewerConfig {
    pub base_url: String,
    pub model: String,
    pub parameter: String,
}

/// Run the viewer until its window closes.
pub fn run(config: ViewerConfig) -> Result<(), Box<dyn Error>> {
    init_logging();

    let event_loop = EventLoop::new().map_err(|e| format!("Failed to create event loop: {e}"))?;
    let mut app = App::new(config);
    let run_result = event_loop.run_app(&mut app);
    let app_result = app.finish();
    run_result?;
    app_result
}

fn init_logging() {
    #[cfg(feature = "tracy")]
    {
        use tracing_subscriber::Layer;
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;
        tracing_subscriber::registry()
            .with(tracing_tracy::TracyLayer::default())
            .with(
                tracing_subscriber::fmt::layer().with_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "info".into()),
                ),
            )
            .init();
        return;
    }

    #[cfg(not(feature = "tracy"))]
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

struct App {
    config: Option<ViewerConfig>,
    state: Option<Shell>,
    error: Option<String>,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config: Some(config),
            state: None,
            error: None,
        }
    }

    fn finish(self) -> Result<(), Box<dyn Error>> {
        if let Some(err) = self.error {
            Err(err.into())
        } else {
            Ok(())
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.error.is_some() {
            return;
        }

        let config = self.config.take().expect("config already consumed");

        match Shell::new(event_loop, config) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                error!("Failed to initialize viewer: {err}");
                self.error = Some(err.to_string());
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.window.id() != window_id {
            return;
        }

        if state.handle_window_event(event_loop, &event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size),
            WindowEvent::RedrawRequested => state.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Continuous redraw: damping and in-flight loads advance every
        // frame, so each frame schedules the next.
        if let Some(state) = self.state.as_ref() {
            state.window.request_redraw();
        }
    }
}

struct Shell {
    window: Arc<Window>,
    renderer: Renderer,
    surface: SurfaceWrapper,
    depth_view: wgpu::TextureView,
    pipeline: MeshPipeline,
    ui: UiLayer,
    camera: Camera,
    projection: Projection,
    controls: OrbitControls,
    viewer: ViewerState,
    mesh_slot: MeshSlot<GpuMesh>,
    load_tx: Sender<LoadMessage>,
    load_rx: Receiver<LoadMessage>,
    menu_tx: Sender<MenuAction>,
    menu_rx: Receiver<MenuAction>,
}

impl Shell {
    fn new(event_loop: &ActiveEventLoop, config: ViewerConfig) -> Result<Self, Box<dyn Error>> {
        let window_attributes = Window::default_attributes()
            .with_title("plyview")
            .with_inner_size(PhysicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let renderer = pollster::block_on(Renderer::new())?;
        let size = window.inner_size();

        let surface = renderer.instance().create_surface(window.clone())?;
        let surface = renderer.configure_surface(surface, size.width, size.height)?;
        let depth_view = renderer.create_depth_texture(size.width, size.height);

        let pipeline = MeshPipeline::new(renderer.device(), surface.format());
        let ui = UiLayer::new(renderer.device(), surface.format(), &window);

        let (load_tx, load_rx) = channel();
        let (menu_tx, menu_rx) = channel();

        let viewer = ViewerState::new(
            config.base_url,
            Selection::new(config.model, config.parameter),
        );

        let mut shell = Self {
            window,
            renderer,
            surface,
            depth_view,
            pipeline,
            ui,
            camera: Camera::default_framing(),
            projection: Projection::new(size.width, size.height),
            controls: OrbitControls::new(),
            viewer,
            mesh_slot: MeshSlot::new(),
            load_tx,
            load_rx,
            menu_tx,
            menu_rx,
        };

        let request = shell.viewer.reload();
        shell.start_load(request);

        Ok(shell)
    }

    /// Pre-dispatch events: egui first so UI clicks never reach the camera,
    /// then Escape-to-exit, then orbit controls.
    fn handle_window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: &WindowEvent,
    ) -> bool {
        let ui_consumed = self.ui.on_window_event(&self.window, event);

        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    ..
                },
            ..
        } = event
        {
            event_loop.exit();
            return true;
        }

        if ui_consumed {
            return true;
        }

        self.controls.handle_event(event)
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.surface
            .resize(self.renderer.device(), new_size.width, new_size.height);
        self.projection.resize(new_size.width, new_size.height);
        self.depth_view = self
            .renderer
            .create_depth_texture(new_size.width, new_size.height);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.drain_menu_actions();
        self.drain_load_events();
        self.controls.update(&mut self.camera);

        let model_matrix = self
            .mesh_slot
            .current()
            .map(|mesh| mesh.model_matrix())
            .unwrap_or(Mat4::IDENTITY);
        let uniforms = SceneUniforms::from_matrices(
            self.camera.view_matrix(),
            self.projection.matrix(),
            model_matrix,
        );
        self.pipeline.update_uniforms(self.renderer.queue(), &uniforms);

        match self.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.window.inner_size();
                self.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU Out of Memory - exiting");
                event_loop.exit();
            }
            Err(e) => error!("Render error: {:?}", e),
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.renderer
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });

        self.pipeline.render(
            &mut encoder,
            &surface_view,
            &self.depth_view,
            self.mesh_slot.current(),
        );

        let selection = self.viewer.selection().clone();
        let status = self.viewer.status().clone();
        let actions = self.menu_tx.clone();
        self.ui.draw(
            self.renderer.device(),
            self.renderer.queue(),
            &mut encoder,
            &self.window,
            &surface_view,
            [self.surface.width(), self.surface.height()],
            |ctx| viewer_panel(ctx, &selection, &status, &actions),
        );

        self.renderer.queue().submit(Some(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    fn drain_menu_actions(&mut self) {
        while let Ok(action) = self.menu_rx.try_recv() {
            match action {
                MenuAction::SelectModel(model) => {
                    let request = self.viewer.select(Some(model), None);
                    self.start_load(request);
                }
                MenuAction::SelectParameter(parameter) => {
                    let request = self.viewer.select(None, Some(parameter));
                    self.start_load(request);
                }
                MenuAction::ImportPly(path) => self.import_ply(&path),
            }
        }
    }

    fn drain_load_events(&mut self) {
        while let Ok(message) = self.load_rx.try_recv() {
            if let Some(geometry) = self.viewer.apply(message) {
                self.install_geometry(geometry);
            }
        }
    }

    fn start_load(&self, request: ReloadRequest) {
        info!("Loading model from {}", request.url);
        fetch_geometry(request.url, request.generation, self.load_tx.clone());
    }

    fn import_ply(&mut self, path: &Path) {
        // A local file supersedes whatever download is still in flight.
        self.viewer.invalidate_loads();
        match load_ply_file(path) {
            Ok(geometry) => {
                self.viewer.set_status(LoadStatus::Ready);
                self.install_geometry(geometry);
            }
            Err(err) => {
                error!("Failed to open {}: {err}", path.display());
                self.viewer.set_status(LoadStatus::Failed(err.to_string()));
            }
        }
    }

    /// Normalize, triangulate if needed, upload, and swap the displayed
    /// mesh, then reset the camera framing.
    fn install_geometry(&mut self, mut geometry: PlyGeometry) {
        normalize_geometry(&mut geometry);

        if !geometry.has_faces() {
            let positions: Vec<Vec3> = geometry.positions().collect();
            geometry.triangles = triangulate_points(&positions);
        }

        let model_matrix = if self.viewer.orientation_flip() {
            Mat4::from_rotation_x(std::f32::consts::PI)
        } else {
            Mat4::IDENTITY
        };

        match GpuMesh::upload(self.renderer.device(), &geometry, model_matrix) {
            Ok(mesh) => {
                self.mesh_slot.install(mesh);
                self.camera = Camera::default_framing();
                self.controls.reset();
            }
            Err(err) => {
                error!("Failed to upload mesh: {err}");
                self.viewer.set_status(LoadStatus::Failed(err.to_string()));
            }
        }
    }
}
