//! Egui UI: the button bar, the status line, and the wgpu/winit glue.

use crate::state::{LoadStatus, Selection};
use egui::{Context, TopBottomPanel};
use plyview_gpu::wgpu;
use std::path::PathBuf;
use std::sync::mpsc;
use winit::event::WindowEvent;
use winit::window::Window;

/// Fixed model buttons: display label and the identifier sent on click.
pub const MODEL_BUTTONS: &[(&str, &str)] = &[
    ("Gorgoile", "gorgoile"),
    ("Bimba", "bimba"),
    ("Model C", "C"),
    ("Model D", "D"),
];

/// Fixed parameter buttons: display label and the identifier sent on click.
pub const PARAMETER_BUTTONS: &[(&str, &str)] = &[
    ("Intrinsic saliency", "saliency_limper"),
    ("Vertex visibility", "sommets_visibles_centered"),
    ("Eye surface visibility", "eyes"),
];

/// Actions emitted by the UI, drained by the shell once per frame.
#[derive(Debug, Clone)]
pub enum MenuAction {
    /// Select a model, keeping the current parameter.
    SelectModel(&'static str),
    /// Select a parameter, keeping the current model.
    SelectParameter(&'static str),
    /// Display a PLY file from disk.
    ImportPly(PathBuf),
}

/// Draw the viewer chrome: menu bar, selection buttons, status line.
pub fn viewer_panel(
    ctx: &Context,
    selection: &Selection,
    status: &LoadStatus,
    actions: &mpsc::Sender<MenuAction>,
) {
    TopBottomPanel::top("controls").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open PLY…").clicked() {
                    // Spawn the file dialog on its own thread so it never
                    // blocks the frame loop.
                    let sender = actions.clone();
                    std::thread::spawn(move || {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("PLY Files", &["ply"])
                            .add_filter("All Files", &["*"])
                            .pick_file()
                        {
                            let _ = sender.send(MenuAction::ImportPly(path));
                        }
                    });
                    ui.close();
                }
            });

            ui.separator();
            ui.label("Model:");
            for (label, id) in MODEL_BUTTONS {
                if ui
                    .selectable_label(selection.model == *id, *label)
                    .clicked()
                {
                    let _ = actions.send(MenuAction::SelectModel(*id));
                }
            }

            ui.separator();
            ui.label("Overlay:");
            for (label, id) in PARAMETER_BUTTONS {
                if ui
                    .selectable_label(selection.parameter == *id, *label)
                    .clicked()
                {
                    let _ = actions.send(MenuAction::SelectParameter(*id));
                }
            }
        });
    });

    if let Some(text) = status.indicator_text() {
        TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(text);
        });
    }
}

/// Egui-on-wgpu layer: event translation, per-frame run, and paint.
pub struct UiLayer {
    ctx: Context,
    winit_state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl UiLayer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, window: &Window) -> Self {
        let ctx = Context::default();
        let winit_state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            None,
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            egui_wgpu::RendererOptions {
                msaa_samples: 1,
                depth_stencil_format: None,
                dithering: false,
                ..Default::default()
            },
        );
        Self {
            ctx,
            winit_state,
            renderer,
        }
    }

    /// Feed a window event. Returns true when egui consumed it (e.g. a
    /// click landed on a button, not the scene).
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    /// Run the UI closure for this frame and paint the result on top of the
    /// already-rendered scene.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &Window,
        color_view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
        run_ui: impl FnMut(&Context),
    ) {
        let raw_input = self.winit_state.take_egui_input(window);
        let output = self.ctx.run(raw_input, run_ui);
        self.winit_state
            .handle_platform_output(window, output.platform_output);

        let primitives = self
            .ctx
            .tessellate(output.shapes, output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: output.pixels_per_point,
        };

        for (id, delta) in &output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        self.renderer
            .update_buffers(device, queue, encoder, &primitives, &screen_descriptor);

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Ui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: color_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            self.renderer
                .render(&mut pass, &primitives, &screen_descriptor);
        }

        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
