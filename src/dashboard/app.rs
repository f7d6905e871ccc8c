//! Dashboard application entry point

use eframe::egui;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::borrow::Cow;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::dashboard::state::DashboardState;
use crate::dashboard::theme;
use crate::dashboard::views::{render_legend, render_preview, render_toolbar};
use crate::preview::PreviewController;

/// The receipt preview window
pub struct DashboardApp {
    /// Rendering context, touched only from the UI thread
    controller: PreviewController,
    /// Window-level view state
    state: DashboardState,
    /// Whether theme has been applied
    theme_applied: bool,
}

impl DashboardApp {
    pub fn new(controller: PreviewController, state: DashboardState) -> Self {
        Self {
            controller,
            state,
            theme_applied: false,
        }
    }

    /// Create eframe options for the preview window
    pub fn options(config: &AppConfig) -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([config.window.width, config.window.height])
                .with_min_inner_size([400.0, 400.0])
                .with_title("Receipt OCR Preview"),
            ..Default::default()
        }
    }

    /// Upload the controller's image as a texture when it changed
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let generation = self.controller.image_generation();
        if generation == self.state.texture_generation {
            return;
        }

        if let Some(image) = self.controller.image() {
            let max_side = ctx.input(|i| i.max_texture_side);
            let image = fit_texture_side(image, max_side);
            let color_image = egui::ColorImage::from_rgba_unmultiplied(
                [image.width() as usize, image.height() as usize],
                image.as_raw(),
            );
            match self.state.texture.as_mut() {
                Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
                None => {
                    self.state.texture = Some(ctx.load_texture(
                        "receipt_image",
                        color_image,
                        egui::TextureOptions::LINEAR,
                    ));
                }
            }
            debug!("Uploaded receipt texture (generation {})", generation);
        }
        self.state.texture_generation = generation;
    }
}

/// Downscale a copy of the image when a side exceeds the texture limit.
/// Only the texture shrinks; overlay geometry keeps the natural size.
fn fit_texture_side(image: &RgbaImage, max_side: usize) -> Cow<'_, RgbaImage> {
    let (width, height) = image.dimensions();
    let longest = width.max(height) as usize;
    if max_side == 0 || longest <= max_side {
        return Cow::Borrowed(image);
    }

    let scale = max_side as f64 / longest as f64;
    let target = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max_side as u32);
    let (new_width, new_height) = (target(width), target(height));
    info!(
        "Receipt image {}x{} exceeds texture limit {}, displaying at {}x{}",
        width, height, max_side, new_width, new_height
    );
    Cow::Owned(imageops::resize(image, new_width, new_height, FilterType::Triangle))
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme once
        if !self.theme_applied {
            theme::apply_theme(ctx);
            self.theme_applied = true;
        }

        // Fetch results are consumed here, on the UI thread
        if self.controller.poll_fetch() {
            ctx.request_repaint();
        }
        if self.controller.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        self.sync_texture(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            render_toolbar(ui, &mut self.state, &self.controller);
            ui.add_space(4.0);
        });

        egui::SidePanel::right("legend")
            .resizable(false)
            .default_width(200.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                render_legend(ui, &self.controller);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            render_preview(ui, &mut self.state, &mut self.controller);
        });
    }
}

/// Run the preview window (blocking)
pub fn run_dashboard(
    controller: PreviewController,
    state: DashboardState,
    config: &AppConfig,
) -> Result<(), eframe::Error> {
    let app = DashboardApp::new(controller, state);
    eframe::run_native(
        "Receipt OCR Preview",
        DashboardApp::options(config),
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
