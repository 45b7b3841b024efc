//! Debug overlay: frame rate, camera readout and the light editor.

use glam::{Vec3, Vec4};

use crate::camera::Camera;
use crate::clock::FrameStats;
use crate::light::LightState;

const DRAG_SPEED: f64 = 0.05;

/// Draws the overlay windows for one frame, writing light edits back into
/// `light`.
pub fn show(ctx: &egui::Context, stats: &FrameStats, light: &mut LightState, camera: &Camera) {
    egui::Window::new("FPS")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.1}", stats.fps));
            ui.label(format!("Frame: {:.2} ms", stats.frame_time_ms));
            ui.separator();
            let position = camera.position();
            ui.label(format!(
                "Camera: ({:.2}, {:.2}, {:.2})",
                position.x, position.y, position.z
            ));
            ui.label(format!("Yaw {:.1}  Pitch {:.1}", camera.yaw(), camera.pitch()));
            ui.weak("Hold right mouse button to look around");
        });

    egui::Window::new("Light")
        .default_pos([10.0, 150.0])
        .resizable(false)
        .show(ctx, |ui| light_editor(ui, light));
}

fn light_editor(ui: &mut egui::Ui, light: &mut LightState) {
    let mut position = light.position.to_array();
    ui.horizontal(|ui| {
        ui.label("Position");
        for (axis, value) in ["x", "y", "z"].into_iter().zip(position.iter_mut()) {
            ui.add(
                egui::DragValue::new(value)
                    .speed(DRAG_SPEED)
                    .prefix(format!("{axis}: ")),
            );
        }
    });
    light.position = Vec3::from_array(position);

    let mut color = light.color().to_array();
    ui.horizontal(|ui| {
        ui.label("Color");
        ui.color_edit_button_rgba_unmultiplied(&mut color);
    });
    light.set_color(Vec4::from_array(color));
}
