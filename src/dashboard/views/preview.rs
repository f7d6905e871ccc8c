//! Receipt view - aspect-fit image with detection boxes
//!
//! The zoomed content is laid out inside a scroll area, so panning is a plain
//! scroll and overlay rects only change on resize or zoom.

use egui::{Rect, RichText, Rounding, Sense, Stroke};

use crate::dashboard::state::DashboardState;
use crate::dashboard::theme::{to_color32, ThemeColors};
use crate::geometry::{PixelRect, Size};
use crate::preview::PreviewController;

/// Render the receipt preview area
pub fn render_preview(ui: &mut egui::Ui, state: &mut DashboardState, controller: &mut PreviewController) {
    if controller.is_loading() {
        ui.centered_and_justified(|ui| {
            ui.spinner();
        });
        return;
    }

    let Some(texture_id) = state.texture.as_ref().map(|texture| texture.id()) else {
        ui.centered_and_justified(|ui| {
            let message = if controller.last_error().is_some() {
                "The receipt image could not be loaded"
            } else {
                "No receipt image"
            };
            ui.label(RichText::new(message).size(15.0).color(ThemeColors::TEXT_MUTED));
        });
        return;
    };

    // Ctrl+scroll or pinch
    let zoom_delta = ui.input(|i| i.zoom_delta());
    if zoom_delta != 1.0 && ui.rect_contains_pointer(ui.max_rect()) {
        state.zoom = controller.clamp_zoom(state.zoom * zoom_delta);
    }

    let available = ui.available_size();
    controller.on_viewport_changed(Size::new(available.x, available.y), state.zoom);
    state.zoom = controller.viewport().zoom;

    let (Some(natural), Some(transform)) = (controller.natural_size(), controller.transform()) else {
        return;
    };
    let displayed = controller.viewport().displayed_size();

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (content_rect, response) = ui.allocate_exact_size(
                egui::vec2(displayed.width, displayed.height),
                Sense::hover(),
            );
            let painter = ui.painter();

            let image_rect = to_screen(content_rect, &transform.image_rect(natural));
            painter.image(
                texture_id,
                image_rect,
                Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            if !state.show_overlays {
                return;
            }

            let mut hovered_label = None;
            for overlay_box in controller.overlay_boxes() {
                let box_rect = to_screen(content_rect, &overlay_box.rect);
                painter.rect_stroke(
                    box_rect,
                    Rounding::ZERO,
                    Stroke::new(overlay_box.border_width, to_color32(overlay_box.color)),
                );

                if let Some(pointer) = response.hover_pos() {
                    if box_rect.contains(pointer) {
                        hovered_label = overlay_box
                            .label
                            .as_deref()
                            .map(|label| format!("{}: {}", overlay_box.category.display_name(), label));
                    }
                }
            }

            if let Some(label) = hovered_label {
                response.on_hover_text(label);
            }
        });
}

/// Offset a content-space rect by the content origin
fn to_screen(content_rect: Rect, rect: &PixelRect) -> Rect {
    Rect::from_min_size(
        content_rect.min + egui::vec2(rect.x, rect.y),
        egui::vec2(rect.width, rect.height),
    )
}
