//! Toolbar with source name, load status and view controls

use egui::RichText;

use crate::dashboard::state::DashboardState;
use crate::dashboard::theme::ThemeColors;
use crate::preview::PreviewController;

/// Render the toolbar row
pub fn render_toolbar(ui: &mut egui::Ui, state: &mut DashboardState, controller: &PreviewController) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(&state.source_name).strong());

        if controller.is_loading() {
            ui.spinner();
            ui.label(RichText::new("Downloading image...").color(ThemeColors::TEXT_MUTED));
        } else if let Some(error) = controller.last_error() {
            ui.label(RichText::new(format!("Image unavailable: {}", error)).color(ThemeColors::ACCENT_ERROR));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let settings = controller.settings();
            if ui.button("Reset").clicked() {
                state.zoom = settings.min_zoom;
            }
            ui.add(
                egui::Slider::new(&mut state.zoom, settings.min_zoom..=settings.max_zoom)
                    .fixed_decimals(1)
                    .suffix("x")
                    .text("Zoom"),
            );
            ui.checkbox(&mut state.show_overlays, "Boxes");
        });
    });
}
