use egui_wgpu::ScreenDescriptor;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::window::Window;

/// egui state bridged to winit input and painted with wgpu.
pub struct OverlayPainter {
    context: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

/// Tessellated overlay for one frame, ready to be painted.
pub struct OverlayFrame {
    paint_jobs: Vec<egui::ClippedPrimitive>,
    screen: ScreenDescriptor,
    freed: Vec<egui::TextureId>,
}

impl OverlayPainter {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let context = egui::Context::default();
        let state = egui_winit::State::new(
            context.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(device.limits().max_texture_dimension_2d as usize),
        );
        let renderer = egui_wgpu::Renderer::new(device, format, None, 1, false);
        Self {
            context,
            state,
            renderer,
        }
    }

    /// Feeds a window event to egui; returns `true` when egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Runs the UI closure and uploads textures and buffers for the frame.
    ///
    /// Returns the command buffers that must be submitted before the pass that
    /// paints the overlay.
    pub fn prepare(
        &mut self,
        window: &Window,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        size: PhysicalSize<u32>,
        ui: impl FnMut(&egui::Context),
    ) -> (OverlayFrame, Vec<wgpu::CommandBuffer>) {
        let raw_input = self.state.take_egui_input(window);
        let output = self.context.run(raw_input, ui);
        self.state
            .handle_platform_output(window, output.platform_output);

        let pixels_per_point = output.pixels_per_point;
        let paint_jobs = self.context.tessellate(output.shapes, pixels_per_point);
        let screen = ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point,
        };

        for (id, delta) in &output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        let commands = self
            .renderer
            .update_buffers(device, queue, encoder, &paint_jobs, &screen);

        let frame = OverlayFrame {
            paint_jobs,
            screen,
            freed: output.textures_delta.free,
        };
        (frame, commands)
    }

    pub fn paint(&self, pass: &mut wgpu::RenderPass<'static>, frame: &OverlayFrame) {
        self.renderer
            .render(pass, &frame.paint_jobs, &frame.screen);
    }

    /// Releases textures egui no longer needs once the frame is submitted.
    pub fn finish(&mut self, frame: OverlayFrame) {
        for id in &frame.freed {
            self.renderer.free_texture(id);
        }
    }
}
