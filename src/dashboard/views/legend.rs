//! Category legend

use egui::{RichText, Rounding, Sense};

use crate::dashboard::theme::{to_color32, ThemeColors};
use crate::geometry::Category;
use crate::overlay::widgets::category_color;
use crate::preview::PreviewController;

/// Render the legend with per-category counts
pub fn render_legend(ui: &mut egui::Ui, controller: &PreviewController) {
    ui.heading("Fields");
    ui.add_space(8.0);

    for category in Category::ALL {
        let (shown, missing) = controller.category_counts(category);

        ui.horizontal(|ui| {
            let (swatch, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), Sense::hover());
            ui.painter()
                .rect_filled(swatch, Rounding::same(2.0), to_color32(category_color(category)));
            ui.label(category.display_name());
        });

        let mut detail = format!("{} shown", shown);
        if missing > 0 {
            detail.push_str(&format!(", {} without geometry", missing));
        }
        ui.label(RichText::new(detail).small().color(ThemeColors::TEXT_MUTED));
        ui.add_space(4.0);
    }

    if let Some(upload) = controller.upload() {
        ui.separator();
        ui.label(RichText::new(upload).small().color(ThemeColors::TEXT_SECONDARY));
    }
}
